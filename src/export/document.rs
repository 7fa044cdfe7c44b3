//! Exportable document assembly.
//!
//! Builds the HTML document a page is rendered from: cleaned body content
//! wrapped in a small self-contained template, plus an attachment-listing
//! section when the page's attachments were saved. The same document is
//! the renderer input and the fallback artifact written when rendering
//! fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::api::Attachment;
use crate::export::path::sanitize_filename;

/// Paired storage-format macro blocks, e.g. `<ac:structured-macro>...</ac:structured-macro>`.
#[allow(clippy::expect_used)]
static MACRO_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ac:structured-macro\b.*?</ac:structured-macro>")
        .expect("macro block regex is valid")
});

/// Self-closing storage-format macros.
#[allow(clippy::expect_used)]
static MACRO_EMPTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<ac:structured-macro\b[^>]*/>").expect("empty macro regex is valid")
});

/// A complete exportable document for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    /// Page title, unsanitized.
    pub title: String,
    /// Full standalone HTML.
    pub html: String,
}

impl ExportDocument {
    /// Assembles the document from a page's raw body and its saved
    /// attachments.
    ///
    /// `saved_attachments` must contain only attachments whose bytes were
    /// actually written under `attachment_dir`; the listing section is
    /// omitted entirely when it is empty.
    #[must_use]
    pub fn build(
        title: &str,
        body_html: &str,
        saved_attachments: &[Attachment],
        attachment_dir: &str,
    ) -> Self {
        let mut content = strip_macros(body_html);
        if !saved_attachments.is_empty() {
            content.push_str(&attachments_section(saved_attachments, attachment_dir));
        }
        Self {
            title: title.to_string(),
            html: page_template(title, &content),
        }
    }
}

/// Removes storage-format macro blocks the renderer cannot express.
fn strip_macros(body: &str) -> String {
    let stripped = MACRO_BLOCK.replace_all(body, "");
    MACRO_EMPTY.replace_all(&stripped, "").into_owned()
}

fn attachments_section(attachments: &[Attachment], attachment_dir: &str) -> String {
    let mut section = String::from("\n<div class=\"attachments\">\n<h2>Attachments</h2>\n<ul>\n");
    for attachment in attachments {
        let link = format!("{attachment_dir}/{}", sanitize_filename(&attachment.filename));
        section.push_str(&format!(
            "<li>{} ({}) &rarr; {}</li>\n",
            escape_html(&attachment.filename),
            human_size(attachment.size_bytes),
            escape_html(&link),
        ));
    }
    section.push_str("</ul>\n</div>\n");
    section
}

fn page_template(title: &str, content: &str) -> String {
    let escaped_title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{escaped_title}</title>
<style>
body {{ font-family: -apple-system, "Segoe UI", Roboto, Arial, sans-serif; line-height: 1.6; color: #172B4D; }}
h1.page-title {{ border-bottom: 2px solid #0052CC; padding-bottom: 10px; }}
code, pre {{ background-color: #F4F5F7; border-radius: 3px; }}
pre {{ padding: 12px; border-left: 3px solid #0052CC; overflow-x: auto; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #DFE1E6; padding: 8px 12px; text-align: left; }}
img {{ max-width: 100%; height: auto; }}
.attachments {{ margin-top: 40px; padding: 20px; background-color: #F4F5F7; border-left: 4px solid #0052CC; }}
</style>
</head>
<body>
<h1 class="page-title">{escaped_title}</h1>
<div class="content">
{content}
</div>
</body>
</html>
"#
    )
}

/// Formats a byte count the way the listing displays it.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
