//! Per-page outcomes and the run summary.
//!
//! Failure handling in the pipeline is a data-flow decision: every page
//! produces exactly one terminal [`ExportResult`], and the caller decides
//! how to present the aggregate.

use std::path::PathBuf;

/// How a single page's export ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// PDF written.
    Success,
    /// Rendering failed; HTML fallback written instead of a PDF.
    Degraded,
    /// Nothing exportable was produced for the page.
    Failed,
}

impl ExportOutcome {
    /// Operator-facing label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "exported",
            Self::Degraded => "degraded (HTML fallback)",
            Self::Failed => "failed",
        }
    }
}

/// Terminal record of one page's export. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// The exported page's content id.
    pub page_id: String,
    /// The page title, unsanitized.
    pub title: String,
    /// Written PDF, present only on [`ExportOutcome::Success`].
    pub pdf_path: Option<PathBuf>,
    /// Written HTML fallback, present only on [`ExportOutcome::Degraded`].
    pub html_path: Option<PathBuf>,
    /// Attachment directory, present only when at least one attachment
    /// was saved.
    pub attachment_dir: Option<PathBuf>,
    /// Attachments saved alongside the page.
    pub attachments_saved: usize,
    /// Attachments that could not be listed or downloaded.
    pub attachments_failed: usize,
    /// How the page ended.
    pub outcome: ExportOutcome,
    /// Failure detail for [`ExportOutcome::Degraded`] and
    /// [`ExportOutcome::Failed`].
    pub failure_reason: Option<String>,
}

/// Aggregate counts over a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages with a PDF written.
    pub succeeded: usize,
    /// Pages that fell back to HTML.
    pub degraded: usize,
    /// Pages with no artifact.
    pub failed: usize,
}

impl RunSummary {
    /// Tallies the outcome of every result.
    #[must_use]
    pub fn from_results(results: &[ExportResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.outcome {
                ExportOutcome::Success => summary.succeeded += 1,
                ExportOutcome::Degraded => summary.degraded += 1,
                ExportOutcome::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Total pages processed.
    #[must_use]
    pub fn total(self) -> usize {
        self.succeeded + self.degraded + self.failed
    }

    /// True when every page produced a PDF.
    #[must_use]
    pub fn is_clean(self) -> bool {
        self.degraded == 0 && self.failed == 0
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} degraded, {} failed ({} total)",
            self.succeeded,
            self.degraded,
            self.failed,
            self.total()
        )
    }
}
