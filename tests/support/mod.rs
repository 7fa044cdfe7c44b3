//! Shared fixtures for integration tests: an in-memory content API and a
//! stub renderer with scriptable failures.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use confex_core::{
    ApiError, Attachment, ContentApi, ContentKind, ContentRef, ExportDocument, RenderError,
    Renderer,
};

/// In-memory [`ContentApi`] implementation.
///
/// Build the hierarchy with the `add_*`/`link` methods, script failures
/// with the `fail_*` methods, then hand it to the walker/exporter.
#[derive(Default)]
pub struct FixtureApi {
    nodes: HashMap<String, ContentRef>,
    children: HashMap<String, Vec<String>>,
    bodies: HashMap<String, String>,
    attachments: HashMap<String, Vec<Attachment>>,
    attachment_bytes: HashMap<String, Vec<u8>>,
    space_page_ids: HashMap<String, Vec<String>>,
    ancestor_ids: HashMap<String, Vec<String>>,
    fail_children: HashSet<String>,
    fail_bodies: HashSet<String>,
    fail_attachment_listing: HashSet<String>,
    fail_attachment_fetch: HashSet<String>,
    fail_ancestors: HashSet<String>,
}

fn fixture_error(context: &str) -> ApiError {
    ApiError::http_status(format!("fixture://{context}"), 500)
}

impl FixtureApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, id: &str, title: &str) -> ContentRef {
        let page = ContentRef::new(ContentKind::Page, id, title);
        self.nodes.insert(id.to_string(), page.clone());
        self.bodies
            .insert(id.to_string(), format!("<p>body of {title}</p>"));
        page
    }

    pub fn add_folder(&mut self, id: &str, title: &str) -> ContentRef {
        let folder = ContentRef::new(ContentKind::Folder, id, title);
        self.nodes.insert(id.to_string(), folder.clone());
        folder
    }

    pub fn add_space(&mut self, key: &str, name: &str) -> ContentRef {
        let space = ContentRef::new(ContentKind::Space, key, name);
        self.nodes.insert(key.to_string(), space.clone());
        space
    }

    /// Appends `child_id` to `parent_id`'s child listing.
    pub fn link(&mut self, parent_id: &str, child_id: &str) {
        self.children
            .entry(parent_id.to_string())
            .or_default()
            .push(child_id.to_string());
    }

    pub fn set_body(&mut self, page_id: &str, html: &str) {
        self.bodies.insert(page_id.to_string(), html.to_string());
    }

    /// Registers a page in a space's flat listing.
    pub fn add_space_page(&mut self, space_key: &str, page_id: &str) {
        self.space_page_ids
            .entry(space_key.to_string())
            .or_default()
            .push(page_id.to_string());
    }

    /// Sets a page's ancestor chain, root-first.
    pub fn set_ancestors(&mut self, page_id: &str, ancestor_ids: &[&str]) {
        self.ancestor_ids.insert(
            page_id.to_string(),
            ancestor_ids.iter().map(|s| (*s).to_string()).collect(),
        );
    }

    /// Attaches a file with the given bytes to a page.
    pub fn attach(&mut self, page_id: &str, attachment_id: &str, filename: &str, bytes: &[u8]) {
        let attachment = Attachment {
            id: attachment_id.to_string(),
            filename: filename.to_string(),
            size_bytes: bytes.len() as u64,
            download_ref: format!("/download/attachments/{page_id}/{filename}"),
        };
        self.attachments
            .entry(page_id.to_string())
            .or_default()
            .push(attachment);
        self.attachment_bytes
            .insert(attachment_id.to_string(), bytes.to_vec());
    }

    pub fn fail_children_of(&mut self, id: &str) {
        self.fail_children.insert(id.to_string());
    }

    pub fn fail_body_of(&mut self, page_id: &str) {
        self.fail_bodies.insert(page_id.to_string());
    }

    pub fn fail_attachment_listing_of(&mut self, page_id: &str) {
        self.fail_attachment_listing.insert(page_id.to_string());
    }

    pub fn fail_attachment_fetch_of(&mut self, attachment_id: &str) {
        self.fail_attachment_fetch.insert(attachment_id.to_string());
    }

    pub fn fail_ancestors_of(&mut self, page_id: &str) {
        self.fail_ancestors.insert(page_id.to_string());
    }

    fn refs_for(&self, ids: Option<&Vec<String>>) -> Vec<ContentRef> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.nodes.get(id).cloned())
                .collect()
        })
        .unwrap_or_default()
    }
}

#[async_trait]
impl ContentApi for FixtureApi {
    async fn content_info(&self, id: &str) -> Result<ContentRef, ApiError> {
        self.nodes
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::http_status(format!("fixture://content/{id}"), 404))
    }

    async fn space_info(&self, key: &str) -> Result<ContentRef, ApiError> {
        self.nodes
            .get(key)
            .cloned()
            .ok_or_else(|| ApiError::http_status(format!("fixture://space/{key}"), 404))
    }

    async fn child_content(&self, id: &str) -> Result<Vec<ContentRef>, ApiError> {
        if self.fail_children.contains(id) {
            return Err(fixture_error("children"));
        }
        Ok(self.refs_for(self.children.get(id)))
    }

    async fn space_pages(&self, key: &str) -> Result<Vec<ContentRef>, ApiError> {
        Ok(self.refs_for(self.space_page_ids.get(key)))
    }

    async fn ancestors(&self, id: &str) -> Result<Vec<ContentRef>, ApiError> {
        if self.fail_ancestors.contains(id) {
            return Err(fixture_error("ancestors"));
        }
        Ok(self.refs_for(self.ancestor_ids.get(id)))
    }

    async fn page_body(&self, id: &str) -> Result<String, ApiError> {
        if self.fail_bodies.contains(id) {
            return Err(fixture_error("body"));
        }
        Ok(self.bodies.get(id).cloned().unwrap_or_default())
    }

    async fn attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ApiError> {
        if self.fail_attachment_listing.contains(page_id) {
            return Err(fixture_error("attachments"));
        }
        Ok(self.attachments.get(page_id).cloned().unwrap_or_default())
    }

    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, ApiError> {
        if self.fail_attachment_fetch.contains(&attachment.id) {
            return Err(fixture_error("download"));
        }
        self.attachment_bytes
            .get(&attachment.id)
            .cloned()
            .ok_or_else(|| fixture_error("missing-bytes"))
    }
}

/// Renderer stub: cheap deterministic bytes, with per-title failures.
#[derive(Default)]
pub struct StubRenderer {
    fail_titles: HashSet<String>,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(titles: &[&str]) -> Self {
        Self {
            fail_titles: titles.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    fn name(&self) -> &str {
        "stub"
    }

    async fn render_pdf(&self, document: &ExportDocument) -> Result<Vec<u8>, RenderError> {
        if self.fail_titles.contains(&document.title) {
            return Err(RenderError::Assembly {
                message: "stub renderer told to fail".to_string(),
            });
        }
        Ok(b"%PDF-1.4 stub".to_vec())
    }
}
