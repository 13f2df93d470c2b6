use crate::paths::LeafPath;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use tracing::debug;

/// Number of leaf paths covered by one calendar event.
pub const BATCH_SIZE: usize = 3;

#[derive(Debug, Clone)]
pub struct ScheduleOptions {
    pub start_date: NaiveDate,
    pub daily_start: NaiveTime,
    pub duration: Duration,
    /// How long before the start the alarm fires.
    pub alarm_lead: Duration,
    /// Course name shown in every event summary.
    pub label: String,
}

impl ScheduleOptions {
    pub fn new(start_date: NaiveDate, daily_start: NaiveTime) -> Self {
        Self {
            start_date,
            daily_start,
            duration: Duration::minutes(30),
            alarm_lead: Duration::minutes(5),
            label: "Course".to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAlarm {
    pub description: String,
    /// Signed offset from the event start; negative fires before it.
    pub trigger: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub alarm: EventAlarm,
}

impl CalendarEvent {
    pub fn alarm_time(&self) -> NaiveDateTime {
        self.start + self.alarm.trigger
    }
}

/// Saturday and Sunday roll forward to the following Monday.
pub fn next_weekday(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

fn task_line(n: usize, path: &LeafPath) -> String {
    let chain = path.titles().collect::<Vec<_>>().join("》《");
    format!("Task {}: 《{}》 -> visit page: [click]({})", n, chain, path.leaf().url)
}

fn build_event(batch: &[LeafPath], date: NaiveDate, options: &ScheduleOptions) -> CalendarEvent {
    let start = date.and_time(options.daily_start);
    let day = date.format("%Y-%m-%d");

    let description = batch
        .iter()
        .enumerate()
        .map(|(i, path)| task_line(i + 1, path))
        .collect::<Vec<_>>()
        .join("\n");

    CalendarEvent {
        summary: format!("[{} morning reminder] {}", day, options.label),
        description,
        start,
        end: start + options.duration,
        alarm: EventAlarm {
            description: format!("[{} morning reminder] {} study", day, batch[0].root().title),
            trigger: -options.alarm_lead,
        },
    }
}

/// Group `paths` into batches of [`BATCH_SIZE`] and give each batch its own weekday.
///
/// A trailing remainder of one or two paths gets no event. Batch `k` lands on
/// the `k`-th weekday counting from `start_date` (itself rolled forward when
/// it falls on a weekend).
pub fn batch_and_schedule(paths: &[LeafPath], options: &ScheduleOptions) -> Vec<CalendarEvent> {
    let mut date = options.start_date;
    let mut events = Vec::with_capacity(paths.len() / BATCH_SIZE);

    for batch in paths.chunks_exact(BATCH_SIZE) {
        date = next_weekday(date);
        let event = build_event(batch, date, options);
        debug!("Scheduled {} at {}", event.summary, event.start);
        events.push(event);
        date += Duration::days(1);
    }

    let dropped = dropped_paths(paths.len());
    if dropped > 0 {
        debug!("{} trailing path(s) left unscheduled", dropped);
    }

    events
}

/// How many trailing paths [`batch_and_schedule`] leaves out.
pub fn dropped_paths(total: usize) -> usize {
    total % BATCH_SIZE
}
