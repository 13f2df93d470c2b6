use anyhow::{Context, bail};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::ArgMatches;
use colored::Colorize;
use pagecal_core::fetch::{FetchOptions, execute_fetch};
use pagecal_core::ics::write_calendar;
use pagecal_core::paths::flatten;
use pagecal_core::report::{generate_hierarchy_report, generate_schedule_report};
use pagecal_core::schedule::{ScheduleOptions, batch_and_schedule, dropped_paths};
use pagecal_core::store::{load_hierarchy, save_hierarchy, save_paths};
use pagecal_notion::{ChildEntry, FetchOutcome, NotionClient, list_child_pages, normalize_page_id};
use std::path::PathBuf;
use tracing::info;

/// Credentials and endpoint shared by every subcommand that talks to Notion.
#[derive(Debug, Clone)]
pub struct Connection {
    pub token: Option<String>,
    pub api_url: String,
}

impl Connection {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            token: matches.get_one::<String>("token").cloned(),
            api_url: matches
                .get_one::<String>("api-url")
                .cloned()
                .unwrap_or_else(|| pagecal_notion::client::DEFAULT_API_URL.to_string()),
        }
    }

    pub fn client(&self) -> anyhow::Result<NotionClient> {
        let Some(token) = self.token.as_deref().filter(|t| !t.trim().is_empty()) else {
            bail!("No Notion token: pass --token or set NOTION_API_KEY");
        };
        let client = NotionClient::new(token)
            .context("Failed to create Notion client")?
            .with_base_url(&self.api_url)?;
        Ok(client)
    }
}

// Argument parsers

pub fn parse_page_id(value: &str) -> Result<String, String> {
    normalize_page_id(value).map_err(|e| e.to_string())
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("'{}' is not a time of day (expected HH:MM)", value))
}

pub fn parse_start_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date (expected YYYY-MM-DD)", value.trim()))
}

pub fn resolve_depth(depth: Option<usize>, unbounded: bool) -> Option<usize> {
    if unbounded { None } else { depth }
}

pub fn expand_output_path(value: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(value).as_ref())
}

fn depth_from(sub_matches: &ArgMatches) -> Option<usize> {
    resolve_depth(
        sub_matches.get_one::<usize>("depth").copied(),
        sub_matches.get_flag("unbounded"),
    )
}

fn report_failures(outcome: &FetchOutcome) {
    if !outcome.is_complete() {
        eprintln!(
            "{} {} page lookup(s) failed; the tree is partial",
            "⚠".yellow().bold(),
            outcome.failures.len()
        );
    }
}

async fn fetch_outcome(connection: &Connection, page_id: &str, max_depth: Option<usize>, quiet: bool) -> anyhow::Result<FetchOutcome> {
    let client = connection.client()?;
    let options = FetchOptions {
        page_id: page_id.to_string(),
        max_depth,
        show_progress: !quiet,
    };
    let outcome = execute_fetch(client, options).await;

    if let Some(failure) = outcome.root_failure() {
        bail!("Could not read root page {}: {}", page_id, failure.message);
    }
    Ok(outcome)
}

pub async fn handle_fetch(connection: &Connection, sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let page_id = sub_matches
        .get_one::<String>("page")
        .context("--page is required")?;
    let max_depth = depth_from(sub_matches);

    let outcome = fetch_outcome(connection, page_id, max_depth, quiet).await?;
    report_failures(&outcome);

    if let Some(output) = sub_matches.get_one::<String>("output") {
        let path = expand_output_path(output);
        save_hierarchy(&path, &outcome)?;
        println!("{} Hierarchy saved to {}", "✓".green().bold(), path.display().to_string().bright_white());
    }

    if !quiet {
        print!("{}", generate_hierarchy_report(&outcome));
    }
    Ok(())
}

/// Direct child pages of `page_id`, in the order Notion lists them.
pub async fn child_pages(connection: &Connection, page_id: &str) -> anyhow::Result<Vec<ChildEntry>> {
    let client = connection.client()?;
    list_child_pages(&client, page_id)
        .await
        .with_context(|| format!("Failed to list children of {}", page_id))
}

pub async fn handle_children(connection: &Connection, sub_matches: &ArgMatches) -> anyhow::Result<()> {
    let page_id = sub_matches
        .get_one::<String>("page")
        .context("--page is required")?;

    let children = child_pages(connection, page_id).await?;

    for child in &children {
        println!(
            "{} {}  {}",
            "•".cyan(),
            child.title.as_deref().unwrap_or("title unknown").bright_white(),
            pagecal_notion::page_url(&child.id).bright_black()
        );
    }
    println!("\n{} child page(s)", children.len());
    Ok(())
}

pub async fn handle_schedule(connection: &Connection, sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let outcome = if let Some(hierarchy) = sub_matches.get_one::<PathBuf>("hierarchy") {
        load_hierarchy(hierarchy)?
    } else {
        let page_id = sub_matches
            .get_one::<String>("page")
            .context("Either --page or --hierarchy must be provided")?;
        fetch_outcome(connection, page_id, depth_from(sub_matches), quiet).await?
    };
    report_failures(&outcome);

    let paths = flatten(&outcome.root);
    info!("Flattened hierarchy into {} leaf paths", paths.len());

    if let Some(paths_out) = sub_matches.get_one::<String>("paths-out") {
        save_paths(expand_output_path(paths_out), &paths)?;
    }

    let start_date = sub_matches
        .get_one::<NaiveDate>("start")
        .copied()
        .unwrap_or_else(|| Local::now().date_naive());
    let daily_start = sub_matches
        .get_one::<NaiveTime>("time")
        .copied()
        .context("--time has a default")?;
    let label = sub_matches
        .get_one::<String>("label")
        .cloned()
        .unwrap_or_else(|| outcome.root.display_title().to_string());

    let options = ScheduleOptions::new(start_date, daily_start).with_label(label);
    let events = batch_and_schedule(&paths, &options);

    let output = expand_output_path(
        sub_matches
            .get_one::<String>("output")
            .context("--output is required")?,
    );
    write_calendar(&output, &events).with_context(|| format!("Failed to write calendar {}", output.display()))?;

    if !quiet {
        print!("{}", generate_schedule_report(&events, dropped_paths(paths.len())));
    }
    println!(
        "{} {} event(s) written to {}",
        "✓".green().bold(),
        events.len(),
        output.display().to_string().bright_white()
    );
    Ok(())
}
