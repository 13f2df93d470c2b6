use crate::id::page_url;
use serde::{Deserialize, Serialize};

/// Title given to a node that was not expanded because the depth budget ran out.
pub const MAX_DEPTH_TITLE: &str = "Max depth reached";

/// Display text used wherever a node's title could not be retrieved.
pub const UNKNOWN_TITLE: &str = "title unknown";

/// One discovered page and the pages below it, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNode {
    pub id: String,
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub children: Vec<PageNode>,
}

impl PageNode {
    pub fn new(id: impl Into<String>, title: Option<String>) -> Self {
        let id = id.into();
        let url = page_url(&id);
        Self {
            id,
            title,
            url,
            children: Vec::new(),
        }
    }

    /// Build a node with an explicit url instead of the derived one.
    pub fn with_url(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            url: url.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<PageNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN_TITLE)
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn page_count(&self) -> usize {
        1 + self.children.iter().map(PageNode::page_count).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(PageNode::leaf_count).sum()
        }
    }

    /// Number of levels in this subtree; a lone node has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(PageNode::depth).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchStage {
    Title,
    Children,
}

/// A lookup that failed during traversal. The affected node is kept in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub page_id: String,
    pub stage: FetchStage,
    pub message: String,
}

/// The tree produced by a traversal together with every failure met on the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub root: PageNode,
    #[serde(default)]
    pub failures: Vec<FetchFailure>,
}

impl FetchOutcome {
    pub fn complete(root: PageNode) -> Self {
        Self {
            root,
            failures: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failure that kept the root page itself from being read, if any.
    /// Such an outcome has nothing under it worth keeping.
    pub fn root_failure(&self) -> Option<&FetchFailure> {
        self.failures
            .iter()
            .find(|f| f.stage == FetchStage::Title && f.page_id == self.root.id)
    }
}
