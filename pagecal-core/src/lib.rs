use colored::Colorize;

pub mod error;
pub mod fetch;
pub mod ics;
pub mod paths;
pub mod report;
pub mod schedule;
pub mod store;

pub use error::{CoreError, Result};

pub fn print_banner() {
    println!(
        "{} {}",
        "pagecal".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!("{}", "Notion page trees -> weekday study calendars".bright_black());
    println!();
}
