use crate::error::Result;

/// Kind of a block listed under a page. Only `Page` entries are traversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildKind {
    Page,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub id: String,
    pub kind: ChildKind,
    pub title: Option<String>,
}

impl ChildEntry {
    pub fn page(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ChildKind::Page,
            title: Some(title.into()),
        }
    }

    pub fn other(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ChildKind::Other(kind.into()),
            title: None,
        }
    }

    pub fn is_page(&self) -> bool {
        self.kind == ChildKind::Page
    }
}

/// One cursor page of a child listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildrenPage {
    pub entries: Vec<ChildEntry>,
    /// Cursor for the next request; `None` once the listing is exhausted.
    pub next_cursor: Option<String>,
}

/// Read access to a tree of pages.
#[allow(async_fn_in_trait)]
pub trait PageDirectory {
    async fn retrieve_title(&self, page_id: &str) -> Result<String>;

    async fn list_children(&self, page_id: &str, cursor: Option<&str>) -> Result<ChildrenPage>;
}
