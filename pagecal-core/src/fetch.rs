use indicatif::{ProgressBar, ProgressStyle};
use pagecal_notion::{FetchOutcome, HierarchyFetcher, PageDirectory, ProgressCallback};
use std::sync::Arc;
use std::time::Duration;

/// Options for a hierarchy fetch
pub struct FetchOptions {
    pub page_id: String,
    /// `None` walks the whole tree.
    pub max_depth: Option<usize>,
    pub show_progress: bool,
}

/// Fetch the page tree under `options.page_id`, showing a spinner if asked.
pub async fn execute_fetch<D: PageDirectory>(directory: D, options: FetchOptions) -> FetchOutcome {
    let FetchOptions {
        page_id,
        max_depth,
        show_progress,
    } = options;

    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Fetching page hierarchy...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut fetcher = HierarchyFetcher::new(directory).with_max_depth(max_depth);

    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        let callback: ProgressCallback = Arc::new(move |count: usize, title: String| {
            pb_clone.set_message(format!("Fetching... {} pages ({})", count, title));
        });
        fetcher = fetcher.with_progress_callback(callback);
    }

    let outcome = fetcher.fetch(&page_id).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Fetch complete! {} pages, {} failures",
            outcome.root.page_count(),
            outcome.failures.len()
        ));
    }

    outcome
}
