//! Per-page export pipeline.
//!
//! Turns the walker's ordered page list into artifacts on disk: one PDF
//! (or HTML fallback) per page under its mirrored directory, plus a
//! sibling attachment directory when the page has saved attachments.
//!
//! # Architecture
//!
//! - [`sanitize_segment`] and friends - filesystem-safe naming
//! - [`ExportDocument`] - renderer input / fallback artifact assembly
//! - [`Renderer`] / [`TextLayoutRenderer`] - PDF rendering collaborator
//! - [`Exporter`] - the orchestration loop
//! - [`ExportResult`] / [`RunSummary`] - per-page outcomes and totals

mod document;
mod error;
mod orchestrator;
mod path;
mod renderer;
mod summary;

pub use document::{ExportDocument, human_size};
pub use error::ExportError;
pub use orchestrator::Exporter;
pub use path::{attachment_dirname, page_basename, sanitize_filename, sanitize_segment};
pub use renderer::{RenderError, Renderer, TextLayoutRenderer};
pub use summary::{ExportOutcome, ExportResult, RunSummary};
