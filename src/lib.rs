//! Confex Core Library
//!
//! This library provides the core functionality for the confex tool,
//! which exports a tree of Confluence content (a space, a folder, or a
//! page with its descendants) to PDF files, mirroring the original
//! hierarchy on disk and downloading each page's attachments alongside it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`api`] - Content API collaborator: models, REST client, root URL parsing
//! - [`walker`] - Recursive content-tree discovery with duplicate suppression
//! - [`export`] - Per-page export pipeline: sanitization, rendering, persistence
//! - [`config`] - Immutable run configuration and credential loading
//!
//! Discovery completes fully before export begins; pages are exported one
//! at a time in discovery order, and a single page's failure never stops
//! the batch.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod export;
pub mod walker;

// Re-export commonly used types
pub use api::{
    ApiError, Attachment, ContentApi, ContentKind, ContentRef, RestClient, RootTarget,
    RootUrlError, parse_root_url,
};
pub use config::{ConfigError, Credentials, ExportConfig, resolve_base_url};
pub use export::{
    ExportDocument, ExportError, ExportOutcome, ExportResult, Exporter, RenderError, Renderer,
    RunSummary, TextLayoutRenderer, attachment_dirname, page_basename, sanitize_segment,
};
pub use walker::{ContentWalker, DiscoveredPage};
