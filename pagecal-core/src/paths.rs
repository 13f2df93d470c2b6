use pagecal_notion::PageNode;
use serde::{Serialize, Serializer};

/// One step of a root-to-leaf path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub title: String,
    pub url: String,
}

/// Root-to-leaf sequence of `(title, url)` pairs. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafPath {
    segments: Vec<Segment>,
}

impl LeafPath {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// `[title_1, url_1, ..., title_n, url_n]`
    pub fn flat(&self) -> Vec<&str> {
        self.segments
            .iter()
            .flat_map(|s| [s.title.as_str(), s.url.as_str()])
            .collect()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.title.as_str())
    }

    pub fn leaf(&self) -> &Segment {
        // Paths are only built by `flatten`, which always pushes the leaf.
        &self.segments[self.segments.len() - 1]
    }

    pub fn root(&self) -> &Segment {
        &self.segments[0]
    }
}

impl Serialize for LeafPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.flat().serialize(serializer)
    }
}

/// Enumerate the leaves of `root` depth-first, children in stored order.
///
/// Each interior node's title and url prefix the paths of its descendants but
/// produce no path of their own.
pub fn flatten(root: &PageNode) -> Vec<LeafPath> {
    let mut paths = Vec::new();
    let mut prefix = Vec::new();
    walk(root, &mut prefix, &mut paths);
    paths
}

fn walk(node: &PageNode, prefix: &mut Vec<Segment>, out: &mut Vec<LeafPath>) {
    prefix.push(Segment {
        title: node.display_title().to_string(),
        url: node.url.clone(),
    });

    if node.is_leaf() {
        out.push(LeafPath {
            segments: prefix.clone(),
        });
    } else {
        for child in &node.children {
            walk(child, prefix, out);
        }
    }

    prefix.pop();
}
