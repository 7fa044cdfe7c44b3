//! Content API collaborator boundary.
//!
//! This module defines the read-only contract the exporter consumes from
//! the remote content-management API, the data model produced at that
//! boundary, and the reqwest-backed implementation.
//!
//! # Architecture
//!
//! - [`ContentApi`] - Async trait the walker and orchestrator depend on
//! - [`RestClient`] - Confluence Cloud REST implementation
//! - [`parse_root_url`] - Root URL/identifier recognition
//!
//! API responses are loosely typed on the wire; ingestion converts them to
//! the closed [`ContentRef`]/[`Attachment`] types and logs-and-skips any
//! record missing a required field rather than propagating partial data.

mod client;
mod url;

pub use self::url::{RootTarget, RootUrlError, parse_root_url};
pub use client::RestClient;

use async_trait::async_trait;
use thiserror::Error;

/// Kind of a node in the source content hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Top-level named collection of content.
    Space,
    /// Non-page organizational node containing child folders/pages.
    Folder,
    /// Leaf content unit exported to one PDF.
    Page,
}

impl ContentKind {
    /// Lowercase label for logs and progress output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Folder => "folder",
            Self::Page => "page",
        }
    }
}

/// A kind-tagged reference to a node in the source hierarchy.
///
/// Immutable once discovered; for spaces the `id` is the space key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    /// What kind of node this is.
    pub kind: ContentKind,
    /// Content id (space key for spaces).
    pub id: String,
    /// Human-readable title (space name for spaces).
    pub title: String,
}

impl ContentRef {
    /// Creates a new content reference.
    #[must_use]
    pub fn new(kind: ContentKind, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Metadata for a file attached to exactly one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Attachment content id.
    pub id: String,
    /// Original filename as stored in the source system.
    pub filename: String,
    /// Size in bytes as reported by the API (0 when unreported).
    pub size_bytes: u64,
    /// Server-relative (or absolute) download link.
    pub download_ref: String,
}

/// Errors returned by content-API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, timeout).
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The request URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx/5xx).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Response body could not be decoded as the expected JSON shape.
    #[error("malformed response from {url}: {source}")]
    Decode {
        /// The request URL.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// A request URL could not be constructed.
    #[error("invalid request URL: {url}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
    },

    /// The response was decoded but did not describe a usable record.
    #[error("content {id} is missing required fields ({missing})")]
    MalformedRecord {
        /// Content id, or `"?"` when even the id was absent.
        id: String,
        /// Which required field was absent.
        missing: &'static str,
    },
}

impl ApiError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a malformed-record error.
    pub fn malformed_record(id: impl Into<String>, missing: &'static str) -> Self {
        Self::MalformedRecord {
            id: id.into(),
            missing,
        }
    }

    /// Returns true when the error is an HTTP response with the given status.
    #[must_use]
    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, Self::HttpStatus { status, .. } if *status == code)
    }
}

/// Read-only contract consumed from the content-management API.
///
/// The walker and orchestrator depend only on this trait, so tests can
/// substitute an in-memory fixture and the REST transport stays swappable.
///
/// # Object Safety
///
/// Uses `async_trait` to support dynamic dispatch via `Arc<dyn ContentApi>`;
/// native async traits are not object-safe.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Resolves a content id into a kind-tagged reference (page or folder).
    async fn content_info(&self, id: &str) -> Result<ContentRef, ApiError>;

    /// Resolves a space key into a reference carrying the space's name.
    async fn space_info(&self, key: &str) -> Result<ContentRef, ApiError>;

    /// Lists the immediate page/folder children of a folder or page, in
    /// server order. Attachment-like children are not tree nodes and are
    /// excluded here.
    async fn child_content(&self, id: &str) -> Result<Vec<ContentRef>, ApiError>;

    /// Lists all pages belonging to a space, in server order.
    async fn space_pages(&self, key: &str) -> Result<Vec<ContentRef>, ApiError>;

    /// Fetches the ancestor chain for a content id, root-first.
    async fn ancestors(&self, id: &str) -> Result<Vec<ContentRef>, ApiError>;

    /// Fetches a page's HTML body (rendered view preferred, storage
    /// format as fallback; empty string when neither is present).
    async fn page_body(&self, id: &str) -> Result<String, ApiError>;

    /// Lists a page's attachment metadata. A page without attachments
    /// yields an empty vector, not an error.
    async fn attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ApiError>;

    /// Downloads one attachment's bytes.
    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, ApiError>;
}
