use colored::Colorize;
use pagecal::commands::command_argument_builder;
use pagecal::handlers::{Connection, handle_children, handle_fetch, handle_schedule};
use pagecal_core::print_banner;
use tracing::Level;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Logs go to stderr so they never mix with report output
    let level = match chosen_command.get_count("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    if !quiet {
        print_banner();
    }

    let connection = Connection::from_matches(&chosen_command);

    let result = match chosen_command.subcommand() {
        Some(("fetch", sub)) => handle_fetch(&connection, sub, quiet).await,
        Some(("children", sub)) => handle_children(&connection, sub).await,
        Some(("schedule", sub)) => handle_schedule(&connection, sub, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
