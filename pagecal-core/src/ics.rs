//! Calendar file output.
//!
//! Events are mapped onto `ical`'s component model and rendered with its
//! emitter. Times are written as floating local times, the way a desk
//! calendar reminder is meant to be read.

use crate::error::{CoreError, Result};
use crate::schedule::CalendarEvent;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use ical::generator::Emitter;
use ical::parser::ical::component::{IcalAlarm, IcalCalendar, IcalEvent};
use ical::property::Property;
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

pub const PRODID: &str = "-//pagecal//Notion study planner//EN";

fn property(name: &str, value: impl Into<String>) -> Property {
    Property {
        name: name.to_string(),
        params: None,
        value: Some(value.into()),
    }
}

/// Escape a TEXT value (RFC 5545 section 3.3.11).
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_local(time: &NaiveDateTime) -> String {
    time.format("%Y%m%dT%H%M%S").to_string()
}

/// Render a trigger offset as a DURATION value, e.g. `-PT5M`.
pub fn format_trigger(offset: Duration) -> String {
    let sign = if offset < Duration::zero() { "-" } else { "" };
    let seconds = offset.num_seconds().abs();
    if seconds % 60 == 0 {
        format!("{}PT{}M", sign, seconds / 60)
    } else {
        format!("{}PT{}S", sign, seconds)
    }
}

fn to_ical_event(event: &CalendarEvent, stamp: &str) -> IcalEvent {
    let mut alarm = IcalAlarm::new();
    alarm.properties.push(property("ACTION", "DISPLAY"));
    alarm.properties.push(property("DESCRIPTION", escape_text(&event.alarm.description)));
    alarm.properties.push(property("TRIGGER", format_trigger(event.alarm.trigger)));

    let mut ical_event = IcalEvent::new();
    ical_event.properties.push(property("UID", format!("{}@pagecal", Uuid::new_v4())));
    ical_event.properties.push(property("DTSTAMP", stamp));
    ical_event.properties.push(property("DTSTART", format_local(&event.start)));
    ical_event.properties.push(property("DTEND", format_local(&event.end)));
    ical_event.properties.push(property("SUMMARY", escape_text(&event.summary)));
    ical_event.properties.push(property("DESCRIPTION", escape_text(&event.description)));
    ical_event.alarms.push(alarm);
    ical_event
}

pub fn build_calendar(events: &[CalendarEvent], stamp: DateTime<Utc>) -> IcalCalendar {
    let stamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    let mut calendar = IcalCalendar::new();
    calendar.properties.push(property("VERSION", "2.0"));
    calendar.properties.push(property("PRODID", PRODID));
    calendar.properties.push(property("CALSCALE", "GREGORIAN"));
    calendar.events = events.iter().map(|e| to_ical_event(e, &stamp)).collect();
    calendar
}

/// Longest content line in octets, CRLF excluded (RFC 5545 section 3.1).
pub const MAX_LINE_OCTETS: usize = 75;

/// Refold emitter output so no line exceeds [`MAX_LINE_OCTETS`].
///
/// `ical` folds every 75 characters, which lets a line of CJK text run to
/// three times the limit. Folds only ever land on character boundaries.
pub fn fold_lines(text: &str) -> String {
    let unfolded = text.replace("\r\n ", "");
    let mut folded = String::with_capacity(unfolded.len() + unfolded.len() / 24);

    for line in unfolded.split_terminator("\r\n") {
        let mut width = 0;
        for c in line.chars() {
            if width + c.len_utf8() > MAX_LINE_OCTETS {
                folded.push_str("\r\n ");
                width = 1;
            }
            folded.push(c);
            width += c.len_utf8();
        }
        folded.push_str("\r\n");
    }
    folded
}

pub fn render_calendar(events: &[CalendarEvent]) -> String {
    fold_lines(&build_calendar(events, Utc::now()).generate())
}

/// Write `events` to `path` as a single calendar, replacing any existing file.
pub fn write_calendar<P: AsRef<Path>>(path: P, events: &[CalendarEvent]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| CoreError::write(parent, e))?;
    }

    fs::write(path, render_calendar(events)).map_err(|e| CoreError::write(path, e))?;
    info!("Wrote {} events to {}", events.len(), path.display());
    Ok(())
}
