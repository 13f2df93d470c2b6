use chrono::{NaiveDate, NaiveTime};
use pagecal::commands::command_argument_builder;
use pagecal::handlers::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_parse_time_of_day() {
    assert_eq!(parse_time_of_day("07:30"), Ok(NaiveTime::from_hms_opt(7, 30, 0).unwrap()));
    assert_eq!(parse_time_of_day("20:30:15"), Ok(NaiveTime::from_hms_opt(20, 30, 15).unwrap()));
    assert!(parse_time_of_day("7.30am").is_err());
    assert!(parse_time_of_day("25:00").is_err());
}

#[test]
fn test_parse_start_date() {
    assert_eq!(parse_start_date("2024-08-22"), Ok(NaiveDate::from_ymd_opt(2024, 8, 22).unwrap()));
    assert!(parse_start_date("22/08/2024").unwrap_err().contains("YYYY-MM-DD"));
}

#[test]
fn test_parse_page_id() {
    assert_eq!(
        parse_page_id("58d69660f4e34637be707a96a651f130").unwrap(),
        "58d69660-f4e3-4637-be70-7a96a651f130"
    );
    assert!(parse_page_id("hello").is_err());
}

#[test]
fn test_resolve_depth() {
    assert_eq!(resolve_depth(Some(3), false), Some(3));
    assert_eq!(resolve_depth(Some(3), true), None);
}

#[test]
fn test_expand_output_path_keeps_relative() {
    assert_eq!(expand_output_path("ics_files/out.ics"), PathBuf::from("ics_files/out.ics"));
}

#[test]
fn test_cli_requires_a_source_for_schedule() {
    let result = command_argument_builder().try_get_matches_from(["pagecal", "schedule", "-o", "out.ics"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_depth_with_unbounded() {
    let result = command_argument_builder().try_get_matches_from([
        "pagecal",
        "fetch",
        "--page",
        "58d69660f4e34637be707a96a651f130",
        "--depth",
        "2",
        "--unbounded",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_depth_with_saved_hierarchy() {
    for depth_args in [vec!["--depth", "2"], vec!["--unbounded"]] {
        let mut argv = vec!["pagecal", "schedule", "--hierarchy", "page_info.json", "-o", "out.ics"];
        argv.extend(depth_args);
        let result = command_argument_builder().try_get_matches_from(argv);
        assert!(result.is_err());
    }

    let result = command_argument_builder().try_get_matches_from([
        "pagecal",
        "schedule",
        "--hierarchy",
        "page_info.json",
        "-o",
        "out.ics",
    ]);
    assert!(result.is_ok());
}

#[test]
fn test_connection_without_token_fails() {
    let matches = command_argument_builder()
        .try_get_matches_from(["pagecal", "--token", "", "children", "--page", "58d69660f4e34637be707a96a651f130"])
        .unwrap();
    let connection = Connection::from_matches(&matches);
    let err = connection.client().unwrap_err();
    assert!(err.to_string().contains("NOTION_API_KEY"));
}

#[tokio::test]
async fn test_schedule_from_saved_hierarchy() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let hierarchy = dir.path().join("page_info.json");
    let output = dir.path().join("ics_files").join("course.ics");
    let paths_out = dir.path().join("paths.json");

    std::fs::write(
        &hierarchy,
        r#"{"id": "r", "title": "R", "url": "", "children": [
            {"id": "a", "title": "A", "url": "u1", "children": []},
            {"id": "b", "title": "B", "url": "u2", "children": []},
            {"id": "c", "title": "C", "url": "u3", "children": []},
            {"id": "d", "title": "D", "url": "u4", "children": []}
        ]}"#,
    )?;

    let matches = command_argument_builder().try_get_matches_from([
        "pagecal".to_string(),
        "-q".to_string(),
        "schedule".to_string(),
        "--hierarchy".to_string(),
        hierarchy.display().to_string(),
        "--start".to_string(),
        "2024-08-24".to_string(),
        "--time".to_string(),
        "08:00".to_string(),
        "--paths-out".to_string(),
        paths_out.display().to_string(),
        "-o".to_string(),
        output.display().to_string(),
    ])?;
    let connection = Connection::from_matches(&matches);
    let (_, sub) = matches.subcommand().ok_or("missing subcommand")?;

    handle_schedule(&connection, sub, true).await?;

    let calendar = std::fs::read_to_string(&output)?;
    assert_eq!(calendar.matches("BEGIN:VEVENT").count(), 1);
    assert!(calendar.contains("DTSTART:20240826T080000"));
    assert!(calendar.contains("SUMMARY:[2024-08-26 morning reminder] R"));

    let paths: Vec<Vec<String>> = serde_json::from_str(&std::fs::read_to_string(&paths_out)?)?;
    assert_eq!(paths.len(), 4);
    assert_eq!(paths[3], vec!["R", "", "D", "u4"]);
    Ok(())
}

