use crate::handlers::{parse_page_id, parse_start_date, parse_time_of_day};
use clap::{ArgGroup, arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn page_arg(required: bool) -> clap::Arg {
    arg!(-p --"page" <PAGE>)
        .required(required)
        .help("Root page id, dashed id or Notion page link")
        .value_parser(parse_page_id)
}

fn depth_args() -> [clap::Arg; 2] {
    [
        arg!(-d --"depth" <LEVELS>)
            .required(false)
            .help("How many levels of pages to expand below the root")
            .value_parser(clap::value_parser!(usize))
            .default_value("3")
            .conflicts_with("unbounded"),
        arg!(--"unbounded")
            .required(false)
            .help("Expand the whole tree regardless of depth")
            .action(clap::ArgAction::SetTrue),
    ]
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("pagecal")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("pagecal")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug)")
                .required(false)
                .action(clap::ArgAction::Count),
        )
        .arg(
            arg!(--"token" <TOKEN>)
                .required(false)
                .help("Notion integration token")
                .env("NOTION_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            arg!(--"api-url" <URL>)
                .required(false)
                .help("Base url of the Notion API")
                .default_value(pagecal_notion::client::DEFAULT_API_URL),
        )
        .subcommand_required(true)
        .subcommand(
            command!("fetch")
                .about("Fetch the page hierarchy under a root page")
                .arg(page_arg(true))
                .args(depth_args())
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the hierarchy as JSON"),
                ),
        )
        .subcommand(
            command!("children")
                .about("List the direct child pages of a page")
                .arg(page_arg(true)),
        )
        .subcommand(
            command!("schedule")
                .about(
                    "Turn the leaf pages under a root page into a weekday calendar, three pages \
                per day.",
                )
                .arg(page_arg(false))
                .arg(
                    arg!(-H --"hierarchy" <PATH>)
                        .required(false)
                        .help("Use a hierarchy saved by `pagecal fetch` instead of fetching")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .group(
                    ArgGroup::new("source")
                        .args(["page", "hierarchy"])
                        .required(true),
                )
                .args(depth_args().map(|arg| arg.conflicts_with("hierarchy")))
                .arg(
                    arg!(-s --"start" <DATE>)
                        .required(false)
                        .help("First day of the schedule, YYYY-MM-DD (default: today)")
                        .value_parser(parse_start_date),
                )
                .arg(
                    arg!(-t --"time" <HH_MM>)
                        .required(false)
                        .help("Daily start time")
                        .value_parser(parse_time_of_day)
                        .default_value("07:30"),
                )
                .arg(
                    arg!(-l --"label" <TEXT>)
                        .required(false)
                        .help("Course name used in event summaries (default: root page title)"),
                )
                .arg(
                    arg!(--"paths-out" <PATH>)
                        .required(false)
                        .help("Also save the flattened leaf paths as JSON"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(true)
                        .help("Where to write the .ics file"),
                ),
        )
}
