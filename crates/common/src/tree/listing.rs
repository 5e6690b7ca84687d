use serde::{Deserialize, Serialize};

use crate::ids::ShortId;

use super::file::FileKind;
use super::node::{Child, Node};

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum ListItem {
    Folder {
        name: String,
        /// Set when the folder is the root of a project.
        project: bool,
    },
    File {
        short_id: ShortId,
        name: String,
        kind: FileKind,
    },
}

impl ListItem {
    pub fn name(&self) -> &str {
        match self {
            ListItem::Folder { name, .. } => name,
            ListItem::File { name, .. } => name,
        }
    }
}

/// Owned, deterministic view of a node's children: folders first, then
///  files, both in insertion order. Two listings of an unchanged node
///  are always equal, which keeps paging stable across requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Listing {
    items: Vec<ListItem>,
}

/// A single page cut from a [`Listing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<ListItem>,
    /// Zero-based page actually returned, after clamping.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_files: bool,
}

impl Page {
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }
}

impl Listing {
    pub fn of(node: &Node) -> Self {
        let items = node
            .list_children()
            .into_iter()
            .map(|child| match child {
                Child::Folder { name, node } => ListItem::Folder {
                    name: name.to_string(),
                    project: !node.tag().is_plain(),
                },
                Child::File(file) => ListItem::File {
                    short_id: file.short_id().clone(),
                    name: file.name().to_string(),
                    kind: file.kind().clone(),
                },
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cut page `page` (zero-based) of `per_page` items. Out-of-range
    ///  pages are clamped to the last page; an empty listing yields a
    ///  single empty page 0.
    pub fn page(&self, page: usize, per_page: usize) -> Page {
        let per_page = per_page.max(1);
        let total_items = self.items.len();
        let total_pages = total_items.div_ceil(per_page);
        let page = page.min(total_pages.saturating_sub(1));
        let start = page * per_page;
        let end = (start + per_page).min(total_items);
        Page {
            items: self.items[start..end].to_vec(),
            page,
            total_pages,
            total_items,
            has_files: self
                .items
                .iter()
                .any(|item| matches!(item, ListItem::File { .. })),
        }
    }
}
