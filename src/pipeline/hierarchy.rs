//! Hierarchy building: turn the bookmark outline into per-page folder paths
//! and an arena-backed folder tree.
//!
//! A bookmark "owns" the pages from its target page up to the page before
//! the next bookmark at the same or a shallower depth (or the end of the
//! document). [`PageHierarchy::from_outline`] computes every page's
//! enclosing-bookmark path — root to nearest — in a single pass over the
//! outline in document order: a stack of titles is truncated to each
//! bookmark's depth and the bookmark pushed on top, and the stack snapshot
//! at each page *is* that page's path.
//!
//! [`FolderTree`] is the materialised folder structure for the compendium:
//! an array-backed arena with parent indices instead of a pointer-linked
//! tree, which keeps ownership trivial and sibling-title uniqueness a
//! by-product of interning.

use crate::source::OutlineItem;
use std::collections::HashMap;

/// Map from page number to its enclosing-bookmark titles, root → nearest.
///
/// Pages before the first bookmark (or in a document without an outline)
/// have an empty path.
#[derive(Debug, Default)]
pub struct PageHierarchy {
    paths: HashMap<u32, Vec<String>>,
}

impl PageHierarchy {
    /// An empty hierarchy; every page resolves to the top level.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute the hierarchy for a document of `page_count` pages.
    ///
    /// `outline` must be in document order. Bookmarks targeting a page that
    /// was already passed (malformed numbering) are applied late rather
    /// than dropped; bookmarks past the last page never activate.
    pub fn from_outline(outline: &[OutlineItem], page_count: u32) -> Self {
        let mut paths = HashMap::new();
        let mut stack: Vec<String> = Vec::new();
        let mut index = 0;

        for page in 1..=page_count {
            while index < outline.len() && outline[index].page <= page {
                let item = &outline[index];
                stack.truncate(item.depth as usize);
                stack.push(item.title.clone());
                index += 1;
            }
            if !stack.is_empty() {
                paths.insert(page, stack.clone());
            }
        }

        Self { paths }
    }

    /// The enclosing-bookmark path for `page`, root → nearest.
    pub fn path_for(&self, page: u32) -> &[String] {
        self.paths.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The nearest enclosing bookmark title for `page`, if any.
    pub fn nearest_title(&self, page: u32) -> Option<&str> {
        self.path_for(page).last().map(String::as_str)
    }
}

// ── Folder tree ──────────────────────────────────────────────────────────

/// One level of the nested folder hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    /// Folder title, unique among its siblings.
    pub title: String,
    /// Arena index of the parent folder; `None` for top-level folders.
    pub parent: Option<usize>,
}

/// Array-backed folder tree. Nodes are never removed or re-parented once
/// inserted, so the tree is acyclic by construction.
#[derive(Debug, Default)]
pub struct FolderTree {
    nodes: Vec<FolderNode>,
}

impl FolderTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of folders in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find-or-insert every level of `path` (root → leaf) and return the
    /// arena index of the leaf, or `None` for an empty path.
    pub fn intern(&mut self, path: &[String]) -> Option<usize> {
        let mut parent: Option<usize> = None;
        for title in path {
            let found = self
                .nodes
                .iter()
                .position(|n| n.parent == parent && n.title == *title);
            let idx = match found {
                Some(idx) => idx,
                None => {
                    self.nodes.push(FolderNode {
                        title: title.clone(),
                        parent,
                    });
                    self.nodes.len() - 1
                }
            };
            parent = Some(idx);
        }
        parent
    }

    /// Reconstruct the root → leaf title path for the folder at `idx`.
    pub fn path(&self, idx: usize) -> Vec<String> {
        let mut titles = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            titles.push(self.nodes[i].title.clone());
            current = self.nodes[i].parent;
        }
        titles.reverse();
        titles
    }
}
