//! Export orchestration: drives the per-page pipeline over the discovered
//! page list.
//!
//! Pages are processed strictly in discovery order, one at a time. Every
//! page yields exactly one [`ExportResult`]; no failure of any single
//! step stops the batch. Only the caller decides what the aggregate
//! outcome means.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, instrument, warn};

use super::document::ExportDocument;
use super::error::ExportError;
use super::path::{attachment_dirname, page_basename, sanitize_filename};
use super::renderer::Renderer;
use super::summary::{ExportOutcome, ExportResult};
use crate::api::{Attachment, ContentApi, ContentRef};
use crate::config::ExportConfig;
use crate::walker::DiscoveredPage;

/// Drives the per-page export pipeline.
///
/// Holds shared collaborator handles and the immutable run configuration;
/// construct once per run.
pub struct Exporter {
    api: Arc<dyn ContentApi>,
    renderer: Arc<dyn Renderer>,
    output_root: PathBuf,
    show_progress: bool,
}

/// What happened to one page's attachments.
struct AttachmentOutcome {
    /// Attachments whose bytes landed on disk, in listing order.
    saved: Vec<Attachment>,
    /// Listing or download failures.
    failed: usize,
    /// The attachment directory, present only when something was saved.
    dir: Option<PathBuf>,
}

impl AttachmentOutcome {
    fn none() -> Self {
        Self {
            saved: Vec::new(),
            failed: 0,
            dir: None,
        }
    }
}

impl Exporter {
    /// Creates an exporter over the given collaborators and configuration.
    #[must_use]
    pub fn new(
        api: Arc<dyn ContentApi>,
        renderer: Arc<dyn Renderer>,
        config: &ExportConfig,
    ) -> Self {
        Self {
            api,
            renderer,
            output_root: config.output_root.clone(),
            show_progress: config.show_progress,
        }
    }

    /// Exports every discovered page, in input order.
    ///
    /// Returns exactly one result per input entry, in the same order,
    /// regardless of how many individual steps failed.
    #[instrument(skip(self, pages), fields(total = pages.len(), output_root = %self.output_root.display()))]
    pub async fn run(&self, pages: &[DiscoveredPage]) -> Vec<ExportResult> {
        let total = pages.len();
        let bar = (self.show_progress && total > 0).then(|| {
            let bar = ProgressBar::new(total.try_into().unwrap_or(u64::MAX));
            bar.set_style(
                ProgressStyle::with_template("{bar:30.cyan} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        });

        info!(total, "starting export");
        let mut results = Vec::with_capacity(total);

        for (index, discovered) in pages.iter().enumerate() {
            let position = index + 1;
            let display_path = discovered.relative_path.join("/");

            if let Some(bar) = &bar {
                bar.println(format!("[{position}/{total}] {}", discovered.page.title));
                if !display_path.is_empty() {
                    bar.println(format!("    path: {display_path}"));
                }
                bar.set_message(discovered.page.title.clone());
            }
            info!(
                position,
                total,
                page_id = %discovered.page.id,
                title = %discovered.page.title,
                path = %display_path,
                "exporting page"
            );

            let result = self.export_page(discovered).await;

            match result.outcome {
                ExportOutcome::Success => {
                    info!(page_id = %result.page_id, attachments = result.attachments_saved, "page exported");
                }
                ExportOutcome::Degraded => {
                    warn!(
                        page_id = %result.page_id,
                        reason = result.failure_reason.as_deref().unwrap_or("unknown"),
                        "page degraded to HTML fallback"
                    );
                }
                ExportOutcome::Failed => {
                    warn!(
                        page_id = %result.page_id,
                        reason = result.failure_reason.as_deref().unwrap_or("unknown"),
                        "page export failed"
                    );
                }
            }
            if let Some(bar) = &bar {
                if result.attachments_saved + result.attachments_failed > 0 {
                    bar.println(format!(
                        "    attachments: {} saved, {} failed",
                        result.attachments_saved, result.attachments_failed
                    ));
                }
                bar.inc(1);
            }

            results.push(result);
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        info!(total = results.len(), "export finished");
        results
    }

    /// Runs the pipeline for one page. Infallible by construction: every
    /// error is folded into the returned result.
    async fn export_page(&self, discovered: &DiscoveredPage) -> ExportResult {
        let page = &discovered.page;

        let mut out_dir = self.output_root.clone();
        for segment in &discovered.relative_path {
            out_dir.push(segment);
        }
        if let Err(e) = tokio::fs::create_dir_all(&out_dir).await {
            let error = ExportError::output_dir(&out_dir, e);
            return failed_result(page, &AttachmentOutcome::none(), &error);
        }

        let attachments = self.save_attachments(page, &out_dir).await;

        let body = match self.api.page_body(&page.id).await {
            Ok(body) => body,
            Err(e) => {
                let error = ExportError::page_body(&page.id, e);
                return failed_result(page, &attachments, &error);
            }
        };

        let dir_name = attachment_dirname(&page.title, &page.id);
        let document = ExportDocument::build(&page.title, &body, &attachments.saved, &dir_name);
        let base = page_basename(&page.title, &page.id);

        match self.renderer.render_pdf(&document).await {
            Ok(bytes) => {
                let pdf_path = out_dir.join(format!("{base}.pdf"));
                if let Err(e) = tokio::fs::write(&pdf_path, &bytes).await {
                    let error = ExportError::write_artifact(&pdf_path, e);
                    return failed_result(page, &attachments, &error);
                }
                ExportResult {
                    page_id: page.id.clone(),
                    title: page.title.clone(),
                    pdf_path: Some(pdf_path),
                    html_path: None,
                    attachment_dir: attachments.dir.clone(),
                    attachments_saved: attachments.saved.len(),
                    attachments_failed: attachments.failed,
                    outcome: ExportOutcome::Success,
                    failure_reason: None,
                }
            }
            Err(render_error) => {
                warn!(
                    page_id = %page.id,
                    renderer = self.renderer.name(),
                    error = %render_error,
                    "rendering failed, writing HTML fallback"
                );
                let html_path = out_dir.join(format!("{base}.html"));
                if let Err(e) = tokio::fs::write(&html_path, document.html.as_bytes()).await {
                    let error = ExportError::write_artifact(&html_path, e);
                    return failed_result(page, &attachments, &error);
                }
                ExportResult {
                    page_id: page.id.clone(),
                    title: page.title.clone(),
                    pdf_path: None,
                    html_path: Some(html_path),
                    attachment_dir: attachments.dir.clone(),
                    attachments_saved: attachments.saved.len(),
                    attachments_failed: attachments.failed,
                    outcome: ExportOutcome::Degraded,
                    failure_reason: Some(render_error.to_string()),
                }
            }
        }
    }

    /// Lists and downloads a page's attachments. Nothing here is fatal to
    /// the page: listing failure means no attachments, and each download
    /// failure only skips that file.
    async fn save_attachments(&self, page: &ContentRef, out_dir: &Path) -> AttachmentOutcome {
        let listed = match self.api.attachments(&page.id).await {
            Ok(listed) => listed,
            Err(e) => {
                warn!(
                    page_id = %page.id,
                    error = %e,
                    "attachment listing failed, exporting page without attachments"
                );
                return AttachmentOutcome::none();
            }
        };
        if listed.is_empty() {
            return AttachmentOutcome::none();
        }

        let dir = out_dir.join(attachment_dirname(&page.title, &page.id));
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!(
                page_id = %page.id,
                path = %dir.display(),
                error = %e,
                "could not create attachment directory, skipping all attachments"
            );
            return AttachmentOutcome {
                saved: Vec::new(),
                failed: listed.len(),
                dir: None,
            };
        }

        let mut saved = Vec::new();
        let mut failed = 0usize;
        for attachment in &listed {
            match self.api.fetch_attachment(attachment).await {
                Ok(bytes) => {
                    let target = dir.join(sanitize_filename(&attachment.filename));
                    match tokio::fs::write(&target, &bytes).await {
                        Ok(()) => {
                            debug!(
                                page_id = %page.id,
                                filename = %attachment.filename,
                                bytes = bytes.len(),
                                "attachment saved"
                            );
                            saved.push(attachment.clone());
                        }
                        Err(e) => {
                            warn!(
                                page_id = %page.id,
                                path = %target.display(),
                                error = %e,
                                "attachment write failed, skipping"
                            );
                            failed += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        page_id = %page.id,
                        filename = %attachment.filename,
                        error = %e,
                        "attachment download failed, skipping"
                    );
                    failed += 1;
                }
            }
        }

        if saved.is_empty() {
            // Nothing landed; drop the empty directory again.
            let _ = tokio::fs::remove_dir(&dir).await;
            return AttachmentOutcome {
                saved,
                failed,
                dir: None,
            };
        }
        AttachmentOutcome {
            saved,
            failed,
            dir: Some(dir),
        }
    }
}

fn failed_result(
    page: &ContentRef,
    attachments: &AttachmentOutcome,
    error: &ExportError,
) -> ExportResult {
    ExportResult {
        page_id: page.id.clone(),
        title: page.title.clone(),
        pdf_path: None,
        html_path: None,
        attachment_dir: attachments.dir.clone(),
        attachments_saved: attachments.saved.len(),
        attachments_failed: attachments.failed,
        outcome: ExportOutcome::Failed,
        failure_reason: Some(error.to_string()),
    }
}
