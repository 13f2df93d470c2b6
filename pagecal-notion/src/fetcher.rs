use crate::directory::{ChildEntry, PageDirectory};
use crate::error::{NotionError, Result};
use crate::result::{FetchFailure, FetchOutcome, FetchStage, MAX_DEPTH_TITLE, PageNode};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called once per expanded page with the running count and the page title.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Arena slot for a node under construction. Children always sit at higher
/// indices than their parent.
struct Slot {
    id: String,
    title: Option<String>,
    children: Vec<usize>,
}

pub struct HierarchyFetcher<D> {
    directory: D,
    max_depth: Option<usize>,
    progress_callback: Option<ProgressCallback>,
}

impl<D: PageDirectory> HierarchyFetcher<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            progress_callback: None,
        }
    }

    /// `None` removes the depth budget entirely.
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Walk the page tree below `page_id`.
    ///
    /// Never fails: a page whose title lookup fails keeps `title: None` and is
    /// not expanded, a child listing that fails part-way keeps the children
    /// seen so far. Every such failure is recorded in the outcome.
    pub async fn fetch(&self, page_id: &str) -> FetchOutcome {
        info!("Fetching page hierarchy under {} (max depth: {:?})", page_id, self.max_depth);

        let mut arena = vec![Slot {
            id: page_id.to_string(),
            title: None,
            children: Vec::new(),
        }];
        let mut failures = Vec::new();
        let mut queue: VecDeque<(usize, Option<usize>)> = VecDeque::new();
        queue.push_back((0, self.max_depth));
        let mut expanded = 0;

        while let Some((idx, budget)) = queue.pop_front() {
            if budget == Some(0) {
                arena[idx].title = Some(MAX_DEPTH_TITLE.to_string());
                continue;
            }

            let id = arena[idx].id.clone();
            match self.directory.retrieve_title(&id).await {
                Ok(title) => {
                    debug!("Processing page {} ({}), depth remaining {:?}", id, title, budget);
                    arena[idx].title = Some(title);
                }
                Err(e) => {
                    warn!("Failed to retrieve title of {}: {}", id, e);
                    failures.push(FetchFailure {
                        page_id: id,
                        stage: FetchStage::Title,
                        message: e.to_string(),
                    });
                    continue;
                }
            }

            expanded += 1;
            if let Some(ref callback) = self.progress_callback {
                callback(expanded, arena[idx].title.clone().unwrap_or_default());
            }

            let (entries, error) = list_pages(&self.directory, &id).await;
            for entry in entries {
                let child = arena.len();
                arena.push(Slot {
                    id: entry.id,
                    title: None,
                    children: Vec::new(),
                });
                arena[idx].children.push(child);
                queue.push_back((child, budget.map(|b| b - 1)));
            }

            if let Some(e) = error {
                warn!("Failed to list children of {}: {}", id, e);
                failures.push(FetchFailure {
                    page_id: id,
                    stage: FetchStage::Children,
                    message: e.to_string(),
                });
            }
        }

        let root = assemble(arena);
        info!(
            "Hierarchy fetch complete: {} pages, {} failures",
            root.page_count(),
            failures.len()
        );
        FetchOutcome { root, failures }
    }
}

/// Fold the arena into a tree, deepest slots first.
fn assemble(arena: Vec<Slot>) -> PageNode {
    let mut built: Vec<Option<PageNode>> = (0..arena.len()).map(|_| None).collect();

    for (idx, slot) in arena.into_iter().enumerate().rev() {
        let children = slot
            .children
            .iter()
            .filter_map(|child| built[*child].take())
            .collect();
        built[idx] = Some(PageNode::new(slot.id, slot.title).with_children(children));
    }

    built
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_else(|| PageNode::new(String::new(), None))
}

/// Page children of `page_id` across all cursor pages, plus the error that
/// cut the listing short, if any. A cursor handed back unchanged ends the
/// listing with [`NotionError::StalledCursor`].
async fn list_pages<D: PageDirectory>(directory: &D, page_id: &str) -> (Vec<ChildEntry>, Option<NotionError>) {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        match directory.list_children(page_id, cursor.as_deref()).await {
            Ok(listing) => {
                pages.extend(listing.entries.into_iter().filter(ChildEntry::is_page));
                match listing.next_cursor {
                    Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                        let error = NotionError::StalledCursor {
                            page_id: page_id.to_string(),
                            cursor: next,
                        };
                        return (pages, Some(error));
                    }
                    Some(next) => cursor = Some(next),
                    None => return (pages, None),
                }
            }
            Err(e) => return (pages, Some(e)),
        }
    }
}

/// Direct child pages of `page_id`. Unlike [`HierarchyFetcher::fetch`] the
/// first error is returned.
pub async fn list_child_pages<D: PageDirectory>(directory: &D, page_id: &str) -> Result<Vec<ChildEntry>> {
    match list_pages(directory, page_id).await {
        (pages, None) => {
            debug!("Found {} child pages under {}", pages.len(), page_id);
            Ok(pages)
        }
        (_, Some(e)) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::ChildrenPage;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory directory. Each page's children are split into cursor pages.
    #[derive(Default)]
    struct StubDirectory {
        titles: HashMap<String, String>,
        children: HashMap<String, Vec<Vec<ChildEntry>>>,
        fail_title: Vec<String>,
        /// (page id, cursor page index) whose listing fails
        fail_listing: Vec<(String, usize)>,
        /// page ids whose listing hands back the cursor it was given
        stalled: Vec<String>,
        title_calls: Mutex<Vec<String>>,
        list_calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl StubDirectory {
        fn page(mut self, id: &str, title: &str, pages: Vec<Vec<ChildEntry>>) -> Self {
            self.titles.insert(id.to_string(), title.to_string());
            self.children.insert(id.to_string(), pages);
            self
        }

        fn list_calls(&self) -> Vec<(String, Option<String>)> {
            self.list_calls.lock().unwrap().clone()
        }
    }

    impl PageDirectory for StubDirectory {
        async fn retrieve_title(&self, page_id: &str) -> Result<String> {
            self.title_calls.lock().unwrap().push(page_id.to_string());
            if self.fail_title.iter().any(|id| id == page_id) {
                return Err(NotionError::RateLimited { retry_after: None });
            }
            self.titles
                .get(page_id)
                .cloned()
                .ok_or_else(|| NotionError::NotFound(page_id.to_string()))
        }

        async fn list_children(&self, page_id: &str, cursor: Option<&str>) -> Result<ChildrenPage> {
            self.list_calls
                .lock()
                .unwrap()
                .push((page_id.to_string(), cursor.map(str::to_string)));

            let index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            if self.fail_listing.contains(&(page_id.to_string(), index)) {
                return Err(NotionError::Api {
                    status: 502,
                    code: "bad_gateway".to_string(),
                    message: "upstream".to_string(),
                });
            }

            let pages = self.children.get(page_id).cloned().unwrap_or_default();
            let entries = pages.get(index).cloned().unwrap_or_default();
            let next_cursor = if self.stalled.iter().any(|id| id == page_id) {
                Some(cursor.unwrap_or("0").to_string())
            } else {
                (index + 1 < pages.len()).then(|| (index + 1).to_string())
            };
            Ok(ChildrenPage { entries, next_cursor })
        }
    }

    fn titles(node: &PageNode) -> Vec<String> {
        node.children.iter().map(|c| c.display_title().to_string()).collect()
    }

    #[tokio::test]
    async fn test_fetch_follows_cursors_in_order() {
        let directory = StubDirectory::default()
            .page(
                "root",
                "Course",
                vec![
                    vec![ChildEntry::page("a", "A"), ChildEntry::other("p", "paragraph")],
                    vec![ChildEntry::page("b", "B")],
                    vec![ChildEntry::page("c", "C")],
                ],
            )
            .page("a", "A", vec![])
            .page("b", "B", vec![])
            .page("c", "C", vec![]);

        let fetcher = HierarchyFetcher::new(directory);
        let outcome = fetcher.fetch("root").await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.root.title.as_deref(), Some("Course"));
        assert_eq!(titles(&outcome.root), vec!["A", "B", "C"]);
        assert_eq!(outcome.root.url, "https://www.notion.so/root");

        let root_calls: Vec<_> = fetcher
            .directory()
            .list_calls()
            .into_iter()
            .filter(|(id, _)| id == "root")
            .map(|(_, cursor)| cursor)
            .collect();
        assert_eq!(root_calls, vec![None, Some("1".to_string()), Some("2".to_string())]);
    }

    #[tokio::test]
    async fn test_zero_depth_makes_no_calls() {
        let directory = StubDirectory::default().page("root", "Course", vec![vec![ChildEntry::page("a", "A")]]);

        let fetcher = HierarchyFetcher::new(directory).with_max_depth(Some(0));
        let outcome = fetcher.fetch("root").await;

        assert!(outcome.root.children.is_empty());
        assert_eq!(outcome.root.title.as_deref(), Some(MAX_DEPTH_TITLE));
        assert!(fetcher.directory().list_calls().is_empty());
        assert!(fetcher.directory().title_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_depth_budget_caps_tree() {
        let directory = StubDirectory::default()
            .page("root", "Root", vec![vec![ChildEntry::page("a", "A")]])
            .page("a", "A", vec![vec![ChildEntry::page("a1", "A1")]])
            .page("a1", "A1", vec![vec![ChildEntry::page("a2", "A2")]]);

        let fetcher = HierarchyFetcher::new(directory).with_max_depth(Some(2));
        let outcome = fetcher.fetch("root").await;

        let a = &outcome.root.children[0];
        assert_eq!(a.title.as_deref(), Some("A"));
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].title.as_deref(), Some(MAX_DEPTH_TITLE));
        assert!(a.children[0].children.is_empty());
        assert!(outcome.is_complete());
        assert!(!fetcher.directory().list_calls().iter().any(|(id, _)| id == "a1"));
    }

    #[tokio::test]
    async fn test_unbounded_depth_reaches_bottom() {
        let mut directory = StubDirectory::default();
        for level in 0..6 {
            let id = format!("n{}", level);
            let next = vec![vec![ChildEntry::page(format!("n{}", level + 1), "x")]];
            directory = directory.page(&id, &id, next);
        }
        directory = directory.page("n6", "n6", vec![]);

        let outcome = HierarchyFetcher::new(directory).with_max_depth(None).fetch("n0").await;

        assert_eq!(outcome.root.depth(), 7);
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn test_title_failure_keeps_siblings() {
        let mut directory = StubDirectory::default()
            .page(
                "root",
                "Root",
                vec![vec![ChildEntry::page("a", "A"), ChildEntry::page("b", "B")]],
            )
            .page("a", "A", vec![vec![ChildEntry::page("a1", "A1")]])
            .page("b", "B", vec![vec![ChildEntry::page("b1", "B1")]])
            .page("b1", "B1", vec![]);
        directory.fail_title.push("a".to_string());

        let fetcher = HierarchyFetcher::new(directory);
        let outcome = fetcher.fetch("root").await;

        assert!(!outcome.is_complete());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].page_id, "a");
        assert_eq!(outcome.failures[0].stage, FetchStage::Title);

        let a = &outcome.root.children[0];
        assert_eq!(a.title, None);
        assert!(a.children.is_empty());
        assert_eq!(a.display_title(), "title unknown");

        let b = &outcome.root.children[1];
        assert_eq!(titles(b), vec!["B1"]);
        assert!(!fetcher.directory().list_calls().iter().any(|(id, _)| id == "a"));
    }

    #[tokio::test]
    async fn test_listing_failure_keeps_earlier_pages() {
        let mut directory = StubDirectory::default()
            .page(
                "root",
                "Root",
                vec![
                    vec![ChildEntry::page("a", "A")],
                    vec![ChildEntry::page("b", "B")],
                ],
            )
            .page("a", "A", vec![]);
        directory.fail_listing.push(("root".to_string(), 1));

        let outcome = HierarchyFetcher::new(directory).fetch("root").await;

        assert_eq!(titles(&outcome.root), vec!["A"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].stage, FetchStage::Children);
        assert!(outcome.failures[0].message.contains("bad_gateway"));
    }

    #[tokio::test]
    async fn test_root_failure_returns_bare_node() {
        let directory = StubDirectory::default();

        let outcome = HierarchyFetcher::new(directory).fetch("ghost").await;

        assert_eq!(outcome.root.id, "ghost");
        assert_eq!(outcome.root.title, None);
        assert!(outcome.root.children.is_empty());
        assert_eq!(outcome.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_progress_callback_counts_expanded_pages() {
        let directory = StubDirectory::default()
            .page("root", "Root", vec![vec![ChildEntry::page("a", "A"), ChildEntry::page("b", "B")]])
            .page("a", "A", vec![])
            .page("b", "B", vec![]);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let fetcher = HierarchyFetcher::new(directory).with_progress_callback(Arc::new(move |count, _title| {
            seen_clone.store(count, Ordering::SeqCst);
        }));
        fetcher.fetch("root").await;

        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_list_child_pages_filters_and_propagates() {
        let mut directory = StubDirectory::default().page(
            "root",
            "Root",
            vec![
                vec![ChildEntry::other("x", "heading_1"), ChildEntry::page("a", "A")],
                vec![ChildEntry::page("b", "B")],
            ],
        );

        let pages = list_child_pages(&directory, "root").await.unwrap();
        assert_eq!(pages, vec![ChildEntry::page("a", "A"), ChildEntry::page("b", "B")]);

        directory.fail_listing.push(("root".to_string(), 1));
        assert!(list_child_pages(&directory, "root").await.is_err());
    }

    #[tokio::test]
    async fn test_repeated_cursor_ends_listing() {
        let mut directory = StubDirectory::default().page("root", "Root", vec![vec![ChildEntry::page("a", "A")]]);
        directory.stalled.push("root".to_string());

        let err = list_child_pages(&directory, "root").await.unwrap_err();
        assert!(matches!(err, NotionError::StalledCursor { ref cursor, .. } if cursor == "0"));
        assert_eq!(
            directory.list_calls(),
            vec![("root".to_string(), None), ("root".to_string(), Some("0".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_repeated_cursor_is_recorded_as_failure() {
        let mut directory = StubDirectory::default().page("root", "Root", vec![vec![ChildEntry::page("a", "A")]]);
        directory.stalled.push("root".to_string());

        let fetcher = HierarchyFetcher::new(directory).with_max_depth(Some(1));
        let outcome = fetcher.fetch("root").await;

        assert_eq!(outcome.root.title.as_deref(), Some("Root"));
        assert!(!outcome.root.children.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].stage, FetchStage::Children);
        assert!(outcome.failures[0].message.contains("repeated cursor"));
        assert_eq!(fetcher.directory().list_calls().len(), 2);
    }
}
