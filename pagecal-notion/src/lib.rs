pub mod client;
pub mod directory;
pub mod error;
pub mod fetcher;
pub mod id;
pub mod result;

pub use client::NotionClient;
pub use directory::{ChildEntry, ChildKind, ChildrenPage, PageDirectory};
pub use error::NotionError;
pub use fetcher::{HierarchyFetcher, ProgressCallback, list_child_pages};
pub use id::{normalize_page_id, page_url};
pub use result::{FetchFailure, FetchOutcome, FetchStage, PageNode};
