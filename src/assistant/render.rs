use super::parser::PendingEvent;
use crate::components::google_calendar::models::CalendarEvent;
use crate::components::google_calendar::time::{event_end, event_start, is_all_day};
use crate::utils::time::{format_end_time, format_start};
use chrono_tz::Tz;
use rust_i18n::t;

/// Greeting printed when the console starts
pub fn greeting() -> String {
    t!("greeting").to_string()
}

/// One-line hint shown when a command is not understood
pub fn help() -> String {
    t!("help").to_string()
}

/// Render a list of events for the console
pub fn agenda(events: &[CalendarEvent], tz: Tz) -> String {
    if events.is_empty() {
        return t!("agenda_empty").to_string();
    }

    let mut output = t!("agenda_header").to_string();
    for event in events {
        output.push('\n');
        output.push_str(&event_line(event, tz));
    }
    output
}

fn event_line(event: &CalendarEvent, tz: Tz) -> String {
    let untitled = t!("agenda_untitled");
    let title = event.summary.as_deref().unwrap_or(&untitled);

    if is_all_day(event) {
        return t!("agenda_all_day_line", title = title).to_string();
    }

    match (event_start(event, tz), event_end(event, tz)) {
        (Ok(Some(start)), Ok(Some(end))) => t!(
            "agenda_line",
            start = format_start(&start),
            end = format_end_time(&end),
            title = title
        )
        .to_string(),
        // Keep the event visible even when its dates do not parse
        _ => format!("- {}", title),
    }
}

/// Render the confirmation summary shown before creating an event
pub fn event_summary(event: &PendingEvent, default_duration_min: i64) -> String {
    let missing = t!("field_missing");
    let title = event.title.as_deref().unwrap_or(&missing);
    let location = event.location.as_deref().unwrap_or(&missing);
    let start = match &event.start {
        Some(start) => format!("{} {}", format_start(start), start.timezone().name()),
        None => missing.to_string(),
    };
    let duration = event.duration_min.unwrap_or(default_duration_min);

    t!(
        "event_summary",
        title = title,
        start = start,
        duration = duration,
        location = location
    )
    .to_string()
}
