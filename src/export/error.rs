//! Error types for the export pipeline.
//!
//! These cover the page-fatal steps of the per-page pipeline; they are
//! captured into the page's [`ExportResult`](super::ExportResult), never
//! allowed to stop the batch.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

/// A page-fatal failure inside the per-page export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The page's output directory could not be created.
    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        /// The directory that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The page body could not be fetched; there is nothing to render or
    /// fall back to.
    #[error("could not fetch body of page {page_id}: {source}")]
    PageBody {
        /// The page's content id.
        page_id: String,
        /// The underlying API error.
        #[source]
        source: ApiError,
    },

    /// A produced artifact (PDF or HTML fallback) could not be written.
    #[error("could not write {path}: {source}")]
    WriteArtifact {
        /// The artifact path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Creates an output-directory error.
    pub fn output_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputDir {
            path: path.into(),
            source,
        }
    }

    /// Creates a page-body fetch error.
    pub fn page_body(page_id: impl Into<String>, source: ApiError) -> Self {
        Self::PageBody {
            page_id: page_id.into(),
            source,
        }
    }

    /// Creates an artifact-write error.
    pub fn write_artifact(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteArtifact {
            path: path.into(),
            source,
        }
    }
}
