use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;

/// Get midnight at the start of the given date in the given timezone
pub fn day_start(date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    match tz.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(dt) => Some(dt),
        chrono::LocalResult::Ambiguous(dt, _) => Some(dt),
        chrono::LocalResult::None => None,
    }
}

/// Get the [start, end) range covering one full day
pub fn day_range(date: NaiveDate, tz: Tz) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let start = day_start(date, tz)?;
    let next_day = date.checked_add_signed(Duration::days(1))?;
    let end = day_start(next_day, tz)?;
    Some((start, end))
}

/// Get the rolling seven-day range starting at today's midnight
pub fn week_range(now: &DateTime<Tz>) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let tz = now.timezone();
    let today = now.date_naive();
    let start = day_start(today, tz)?;
    let end_day = today.checked_add_signed(Duration::days(7))?;
    let end = day_start(end_day, tz)?;
    Some((start, end))
}

/// Format an event start for console display (dd/mm HH:MM)
pub fn format_start(dt: &DateTime<Tz>) -> String {
    dt.format("%d/%m %H:%M").to_string()
}

/// Format an event end for console display (HH:MM)
pub fn format_end_time(dt: &DateTime<Tz>) -> String {
    dt.format("%H:%M").to_string()
}
