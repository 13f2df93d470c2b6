use crate::schedule::CalendarEvent;
use pagecal_notion::{FetchOutcome, FetchStage, PageNode};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

fn push_tree(report: &mut String, node: &PageNode, prefix: &str, last: bool, is_root: bool) {
    let (branch, next_prefix) = if is_root {
        (String::new(), String::new())
    } else if last {
        (format!("{}└── ", prefix), format!("{}    ", prefix))
    } else {
        (format!("{}├── ", prefix), format!("{}│   ", prefix))
    };

    report.push_str(&format!("  {}{} \x1b[90m{}\x1b[0m\n", branch, node.display_title(), node.url));

    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        push_tree(report, child, &next_prefix, i + 1 == count, false);
    }
}

/// Generate a text report of a fetched hierarchy
pub fn generate_hierarchy_report(outcome: &FetchOutcome) -> String {
    let root = &outcome.root;

    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Root: {}\n", root.display_title()));
    report.push_str(&format!("  Pages found: {}\n", root.page_count()));
    report.push_str(&format!("  Leaf pages: {}\n", root.leaf_count()));
    report.push_str(&format!("  Depth: {}\n", root.depth()));
    report.push_str(&format!("  Failures: {}\n", outcome.failures.len()));
    report.push_str(&format!("\n{}\n\n", RULE));

    report.push_str("## Pages\n");
    push_tree(&mut report, root, "", true, true);

    if !outcome.is_complete() {
        report.push_str("\n## Failures\n");
        for failure in &outcome.failures {
            let stage = match failure.stage {
                FetchStage::Title => "title",
                FetchStage::Children => "children",
            };
            report.push_str(&format!(
                "  \x1b[33m{}\x1b[0m {} {}\n",
                stage, failure.page_id, failure.message
            ));
        }
    }

    report
}

/// Generate a text report of scheduled events
pub fn generate_schedule_report(events: &[CalendarEvent], dropped: usize) -> String {
    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("\n\n# Schedule:\n");
    report.push_str(&format!("  Events: {}\n", events.len()));
    if let (Some(first), Some(last)) = (events.first(), events.last()) {
        report.push_str(&format!(
            "  From {} to {}\n",
            first.start.format("%Y-%m-%d"),
            last.start.format("%Y-%m-%d")
        ));
    }
    if dropped > 0 {
        report.push_str(&format!("  Unscheduled trailing pages: {}\n", dropped));
    }
    report.push('\n');

    for event in events {
        report.push_str(&format!(
            "  \x1b[32m{}\x1b[0m {}\n",
            event.start.format("%a %Y-%m-%d %H:%M"),
            event.summary
        ));
    }

    report
}
