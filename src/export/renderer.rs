//! Rendering collaborator: HTML-like document body to PDF bytes.
//!
//! The orchestrator only knows the [`Renderer`] trait; rendering failures
//! are expected and handled per page (HTML fallback), never propagated as
//! process-fatal errors.
//!
//! [`TextLayoutRenderer`] is the built-in implementation: it flattens the
//! document to text lines and lays them out on A4 pages with a builtin
//! font. Rich markup the flattening cannot express (images, nested
//! tables) is out of its contract.

use std::sync::LazyLock;

use async_trait::async_trait;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, instrument};

use super::document::ExportDocument;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const TITLE_SIZE_PT: f32 = 16.0;
const BODY_SIZE_PT: f32 = 11.0;
const LINE_HEIGHT_MM: f32 = 6.0;

/// Wrap width in characters for the monospace-ish body layout.
const MAX_LINE_CHARS: usize = 95;

#[allow(clippy::expect_used)]
static HEAD_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<head\b.*?</head>").expect("head regex is valid"));

#[allow(clippy::expect_used)]
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<style\b.*?</style>").expect("style regex is valid"));

#[allow(clippy::expect_used)]
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex is valid"));

/// The template's own title heading; the layout draws the title itself.
#[allow(clippy::expect_used)]
static TITLE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<h1 class="page-title">.*?</h1>"#).expect("title heading regex is valid")
});

/// Errors from the rendering collaborator.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document has no renderable text at all.
    #[error("document has no renderable content")]
    EmptyDocument,

    /// A font could not be loaded or embedded.
    #[error("font error: {message}")]
    Font {
        /// Underlying detail.
        message: String,
    },

    /// The PDF could not be assembled or serialized.
    #[error("PDF assembly error: {message}")]
    Assembly {
        /// Underlying detail.
        message: String,
    },
}

/// Renders an exportable document to PDF bytes.
///
/// # Object Safety
///
/// Uses `async_trait` so the orchestrator can hold `Arc<dyn Renderer>`.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Returns the renderer's name for logs.
    fn name(&self) -> &str;

    /// Renders the document, returning complete PDF bytes.
    async fn render_pdf(&self, document: &ExportDocument) -> Result<Vec<u8>, RenderError>;
}

/// Built-in text-layout PDF renderer.
#[derive(Debug, Default)]
pub struct TextLayoutRenderer;

impl TextLayoutRenderer {
    /// Creates the renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Renderer for TextLayoutRenderer {
    fn name(&self) -> &str {
        "text-layout"
    }

    #[instrument(level = "debug", skip(self, document), fields(title = %document.title))]
    async fn render_pdf(&self, document: &ExportDocument) -> Result<Vec<u8>, RenderError> {
        let lines = flatten_html(&document.html);
        let title = document.title.trim();
        if title.is_empty() && lines.iter().all(|line| line.is_empty()) {
            return Err(RenderError::EmptyDocument);
        }
        debug!(lines = lines.len(), "laying out document");

        let (doc, first_page, first_layer) = PdfDocument::new(
            document.title.clone(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "content",
        );
        let title_font = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font {
                message: e.to_string(),
            })?;
        let body_font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font {
                message: e.to_string(),
            })?;

        let mut layer = doc.get_page(first_page).get_layer(first_layer);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

        if !title.is_empty() {
            layer.use_text(title, TITLE_SIZE_PT, Mm(MARGIN_MM), Mm(y), &title_font);
            y -= 2.0 * LINE_HEIGHT_MM;
        }

        for line in &lines {
            if y < MARGIN_MM {
                let (page, page_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
                layer = doc.get_page(page).get_layer(page_layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }
            if !line.is_empty() {
                layer.use_text(line.as_str(), BODY_SIZE_PT, Mm(MARGIN_MM), Mm(y), &body_font);
            }
            y -= LINE_HEIGHT_MM;
        }

        doc.save_to_bytes().map_err(|e| RenderError::Assembly {
            message: e.to_string(),
        })
    }
}

/// Flattens an HTML document to wrapped text lines.
///
/// Structural closers become line breaks, list items get a dash marker,
/// remaining tags are stripped, and the common entities are decoded.
/// Blank-line runs collapse to one.
fn flatten_html(html: &str) -> Vec<String> {
    let without_head = HEAD_BLOCK.replace_all(html, "");
    let without_style = STYLE_BLOCK.replace_all(&without_head, "");
    let without_title = TITLE_HEADING.replace_all(&without_style, "");

    let mut text = without_title.into_owned();
    for closer in [
        "</p>", "</div>", "</li>", "</tr>", "</table>", "</ul>", "</ol>", "</h1>", "</h2>",
        "</h3>", "</h4>", "</h5>", "</h6>", "<br>", "<br/>", "<br />",
    ] {
        text = text.replace(closer, "\n");
    }
    text = text.replace("<li>", "- ");

    let stripped = ANY_TAG.replace_all(&text, "");
    let decoded = decode_entities(&stripped);

    let mut lines = Vec::new();
    let mut previous_blank = true;
    for raw_line in decoded.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            if !previous_blank {
                lines.push(String::new());
                previous_blank = true;
            }
            continue;
        }
        previous_blank = false;
        lines.extend(wrap_line(line, MAX_LINE_CHARS));
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&rarr;", "->")
        .replace("&amp;", "&")
}

/// Greedy word wrap; words longer than the width are hard-split.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > width {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                wrapped.push(chunk.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > width {
            wrapped.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}
