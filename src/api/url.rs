//! Root URL and identifier recognition.
//!
//! Maps the operator-supplied root (a Confluence Cloud URL or a bare
//! identifier) onto a kind-tagged target. Unrecognized input is the fatal
//! error class: nothing can be discovered without a root.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Folder URLs: `/spaces/KEY/folder/123456`.
#[allow(clippy::expect_used)]
static FOLDER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/folder/(\d+)").expect("folder id regex is valid"));

/// Legacy viewpage URLs: `viewpage.action?pageId=123456`.
#[allow(clippy::expect_used)]
static PAGE_ID_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]pageId=(\d+)").expect("pageId regex is valid"));

/// Modern page URLs: `/spaces/KEY/pages/123456/Page+Title`.
#[allow(clippy::expect_used)]
static PAGE_ID_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/pages/(\d+)").expect("page path regex is valid"));

/// Space URLs: `/spaces/KEY` or `/spaces/KEY/overview`.
#[allow(clippy::expect_used)]
static SPACE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/spaces/([A-Za-z0-9~_-]+)").expect("space key regex is valid"));

/// The export root named by the operator, before the API confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootTarget {
    /// A whole space, by key.
    Space {
        /// The space key.
        key: String,
    },
    /// A folder subtree, by content id.
    Folder {
        /// The folder content id.
        id: String,
    },
    /// A page and its descendants, by content id.
    Page {
        /// The page content id.
        id: String,
    },
}

impl RootTarget {
    /// Lowercase label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Space { .. } => "space",
            Self::Folder { .. } => "folder",
            Self::Page { .. } => "page",
        }
    }
}

/// Errors recognizing the export root.
#[derive(Debug, Error)]
pub enum RootUrlError {
    /// The input looked like a URL but could not be parsed.
    #[error("malformed root URL {input}: {reason}")]
    Malformed {
        /// The raw input.
        input: String,
        /// Parser detail.
        reason: String,
    },

    /// The input parsed but matched no known page/folder/space shape.
    #[error(
        "could not recognize a page, folder, or space in {input}\n  \
         Expected a URL like .../spaces/KEY/pages/123456/Title, \
         .../spaces/KEY/folder/123456, or .../spaces/KEY, \
         or a bare page id / space key"
    )]
    Unrecognized {
        /// The raw input.
        input: String,
    },
}

/// Recognizes the export root from a URL or bare identifier.
///
/// URL inputs are checked in priority order: folder id, `pageId=`
/// parameter, page path id, then space key. Non-URL inputs are a page id
/// when all digits, otherwise a space key.
///
/// # Errors
///
/// Returns [`RootUrlError`] when the input is not a valid URL and not a
/// plausible bare identifier, or when a URL matches none of the known
/// shapes. Both are fatal to the run.
pub fn parse_root_url(input: &str) -> Result<RootTarget, RootUrlError> {
    let trimmed = input.trim();

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Url::parse(trimmed).map_err(|e| RootUrlError::Malformed {
            input: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        if let Some(caps) = FOLDER_ID.captures(trimmed) {
            let id = caps[1].to_string();
            debug!(id = %id, "recognized folder root");
            return Ok(RootTarget::Folder { id });
        }
        if let Some(caps) = PAGE_ID_PARAM
            .captures(trimmed)
            .or_else(|| PAGE_ID_PATH.captures(trimmed))
        {
            let id = caps[1].to_string();
            debug!(id = %id, "recognized page root");
            return Ok(RootTarget::Page { id });
        }
        if let Some(caps) = SPACE_KEY.captures(trimmed) {
            let key = caps[1].to_string();
            debug!(key = %key, "recognized space root");
            return Ok(RootTarget::Space { key });
        }
        return Err(RootUrlError::Unrecognized {
            input: trimmed.to_string(),
        });
    }

    if trimmed.is_empty() {
        return Err(RootUrlError::Unrecognized {
            input: input.to_string(),
        });
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        debug!(id = trimmed, "treating bare numeric input as page id");
        return Ok(RootTarget::Page {
            id: trimmed.to_string(),
        });
    }

    if trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '~' | '_' | '-'))
    {
        debug!(key = trimmed, "treating bare input as space key");
        return Ok(RootTarget::Space {
            key: trimmed.to_string(),
        });
    }

    Err(RootUrlError::Unrecognized {
        input: trimmed.to_string(),
    })
}
