//! Run configuration and credential loading.
//!
//! Everything the walker and orchestrator need is carried in explicit,
//! immutable values constructed once at startup; there is no ambient
//! global state.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Environment variable holding the account email/username.
pub const USERNAME_VAR: &str = "CONFLUENCE_USERNAME";

/// Environment variable holding the API token.
pub const API_TOKEN_VAR: &str = "CONFLUENCE_API_TOKEN";

/// Environment variable holding the site base URL, used when the root is
/// given as a bare identifier instead of a URL.
pub const BASE_URL_VAR: &str = "CONFLUENCE_BASE_URL";

/// Errors constructing the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential variable is unset or empty.
    #[error(
        "missing credential {name}\n  \
         Set {name} in the environment or in a .env file"
    )]
    MissingCredential {
        /// The environment variable name.
        name: &'static str,
    },

    /// No site base URL could be determined.
    #[error(
        "no site base URL: the root was given as a bare identifier\n  \
         Pass a full URL as the root, or set {BASE_URL_VAR}"
    )]
    MissingBaseUrl,

    /// The base URL is present but unusable.
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl {
        /// The offending value.
        url: String,
        /// Parser detail.
        reason: String,
    },
}

/// Basic-auth credentials for the content API.
#[derive(Clone)]
pub struct Credentials {
    /// Account email/username.
    pub username: String,
    /// API token (paired with the username for basic auth).
    pub api_token: String,
}

// Manual Debug so the token never lands in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Loads credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when either variable is
    /// unset or empty. This is fatal: nothing can be fetched without auth.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            username: require_var(USERNAME_VAR)?,
            api_token: require_var(API_TOKEN_VAR)?,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingCredential { name }),
    }
}

/// Immutable configuration for one export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Site origin, scheme + host only.
    pub base_url: Url,
    /// Directory the exported tree is rooted at.
    pub output_root: PathBuf,
    /// Whether to draw the interactive progress bar.
    pub show_progress: bool,
}

/// Determines the site origin for a run.
///
/// When the operator passed a URL root, its scheme and host are the
/// origin; otherwise `CONFLUENCE_BASE_URL` must name the site.
///
/// # Errors
///
/// Returns [`ConfigError::MissingBaseUrl`] when neither source is
/// available, or [`ConfigError::InvalidBaseUrl`] when the value cannot be
/// parsed or has no host.
pub fn resolve_base_url(root_input: &str) -> Result<Url, ConfigError> {
    let trimmed = root_input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return origin_of(trimmed);
    }

    match std::env::var(BASE_URL_VAR) {
        Ok(value) if !value.trim().is_empty() => origin_of(value.trim()),
        _ => Err(ConfigError::MissingBaseUrl),
    }
}

fn origin_of(raw: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    let host = parsed.host_str().ok_or_else(|| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: "URL has no host".to_string(),
    })?;

    let origin = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };
    Url::parse(&origin).map_err(|e| ConfigError::InvalidBaseUrl {
        url: origin,
        reason: e.to_string(),
    })
}
