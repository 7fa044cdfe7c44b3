//! Content-tree discovery.
//!
//! Expands one resolved root reference into the ordered, path-annotated
//! list of pages the exporter will process. Traversal is depth-first
//! pre-order over the collaborator's child listings (space roots use the
//! space-wide page listing plus ancestor chains instead), deterministic
//! for a fixed server response order.
//!
//! A `visited` id set, fresh per call, suppresses duplicate emission when
//! a node is reachable through more than one parent and keeps cyclic
//! hierarchies finite: the first encounter wins. A failed child listing
//! omits that subtree only; sibling subtrees are unaffected.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::api::{ContentApi, ContentKind, ContentRef};
use crate::export::sanitize_segment;

/// A page the walker found, with its location under the export root.
///
/// `relative_path` holds the sanitized ancestor segments from the export
/// root down to, but not including, the page itself. Produced exactly
/// once per reachable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPage {
    /// The page reference.
    pub page: ContentRef,
    /// Sanitized path segments locating the page under the output root.
    pub relative_path: Vec<String>,
}

/// Walks the content hierarchy below a resolved root.
pub struct ContentWalker<'a> {
    api: &'a dyn ContentApi,
}

impl<'a> ContentWalker<'a> {
    /// Creates a walker over the given content API.
    #[must_use]
    pub fn new(api: &'a dyn ContentApi) -> Self {
        Self { api }
    }

    /// Enumerates every reachable page below `root`, in deterministic
    /// order, each exactly once.
    ///
    /// Discovery failures below the root are recoverable: the affected
    /// subtree (or page, in space mode) is logged and omitted. The
    /// result is simply empty when nothing could be listed at all.
    #[instrument(skip(self, root), fields(kind = root.kind.label(), id = %root.id, title = %root.title))]
    pub async fn discover(&self, root: &ContentRef) -> Vec<DiscoveredPage> {
        let discovered = match root.kind {
            ContentKind::Space => self.discover_space(root).await,
            ContentKind::Folder | ContentKind::Page => self.discover_tree(root).await,
        };
        debug!(pages = discovered.len(), "discovery complete");
        discovered
    }

    /// Space roots: flat space-wide page listing, paths rebuilt from each
    /// page's ancestor chain, rooted at the space's sanitized name.
    async fn discover_space(&self, space: &ContentRef) -> Vec<DiscoveredPage> {
        let pages = match self.api.space_pages(&space.id).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(space = %space.id, error = %e, "space page listing failed, nothing to discover");
                return Vec::new();
            }
        };

        let space_segment = sanitize_segment(&space.title);
        let mut visited: HashSet<String> = HashSet::new();
        let mut discovered = Vec::new();

        for page in pages {
            if page.kind != ContentKind::Page {
                debug!(id = %page.id, kind = page.kind.label(), "ignoring non-page space entry");
                continue;
            }
            if !visited.insert(page.id.clone()) {
                debug!(id = %page.id, "page already discovered, keeping first path");
                continue;
            }

            let chain = match self.api.ancestors(&page.id).await {
                Ok(chain) => chain,
                Err(e) => {
                    warn!(
                        page_id = %page.id,
                        title = %page.title,
                        error = %e,
                        "ancestor chain unavailable, omitting page"
                    );
                    continue;
                }
            };

            let mut relative_path = vec![space_segment.clone()];
            relative_path.extend(
                chain
                    .iter()
                    .filter(|ancestor| ancestor.kind != ContentKind::Space)
                    .map(|ancestor| sanitize_segment(&ancestor.title)),
            );
            discovered.push(DiscoveredPage {
                page,
                relative_path,
            });
        }
        discovered
    }

    /// Folder and page roots: explicit-stack depth-first pre-order.
    ///
    /// A folder contributes its sanitized title to its children's paths;
    /// so does a page, for its descendants, while being emitted itself at
    /// the path accumulated so far. The root page (if the root is one) is
    /// emitted with an empty path; a root folder contributes its own name
    /// as the first segment, so its direct pages land under it.
    async fn discover_tree(&self, root: &ContentRef) -> Vec<DiscoveredPage> {
        let mut discovered = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root.id.clone());

        // Stack entries carry the path the node itself lives at.
        let mut stack: Vec<(ContentRef, Vec<String>)> = vec![(root.clone(), Vec::new())];

        while let Some((node, path)) = stack.pop() {
            if node.kind == ContentKind::Page {
                discovered.push(DiscoveredPage {
                    page: node.clone(),
                    relative_path: path.clone(),
                });
            }

            let children = match self.api.child_content(&node.id).await {
                Ok(children) => children,
                Err(e) => {
                    warn!(
                        id = %node.id,
                        title = %node.title,
                        error = %e,
                        "child listing failed, omitting subtree"
                    );
                    continue;
                }
            };

            let mut child_path = path;
            child_path.push(sanitize_segment(&node.title));

            // Reverse push keeps server order on the stack pop.
            for child in children.into_iter().rev() {
                match child.kind {
                    ContentKind::Page | ContentKind::Folder => {
                        if visited.insert(child.id.clone()) {
                            stack.push((child, child_path.clone()));
                        } else {
                            debug!(id = %child.id, "already visited, keeping first discovery");
                        }
                    }
                    ContentKind::Space => {
                        debug!(id = %child.id, "ignoring space-kind child in tree walk");
                    }
                }
            }
        }
        discovered
    }
}
