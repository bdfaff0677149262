use super::models::CalendarEvent;
use crate::error::{google_calendar_error, AssistantResult};
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;

/// Get event start time as a DateTime in the given timezone
pub fn event_start(event: &CalendarEvent, tz: Tz) -> AssistantResult<Option<DateTime<Tz>>> {
    parse_event_time(event.start_date_time.as_deref(), event.start_date.as_deref(), tz)
}

/// Get event end time as a DateTime in the given timezone
pub fn event_end(event: &CalendarEvent, tz: Tz) -> AssistantResult<Option<DateTime<Tz>>> {
    parse_event_time(event.end_date_time.as_deref(), event.end_date.as_deref(), tz)
}

/// Whether the event is an all-day entry (date without a time)
pub fn is_all_day(event: &CalendarEvent) -> bool {
    event.start_date_time.is_none() && event.start_date.is_some()
}

fn parse_event_time(
    date_time: Option<&str>,
    date: Option<&str>,
    tz: Tz,
) -> AssistantResult<Option<DateTime<Tz>>> {
    if let Some(date_time) = date_time {
        let dt = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| google_calendar_error(&format!("Failed to parse datetime: {}", e)))?;
        Ok(Some(dt.with_timezone(&tz)))
    } else if let Some(date) = date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| google_calendar_error(&format!("Failed to parse date: {}", e)))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| google_calendar_error("Failed to create datetime"))?;
        let local_dt = match tz.from_local_datetime(&midnight) {
            chrono::LocalResult::Single(dt) => dt,
            chrono::LocalResult::Ambiguous(dt, _) => dt,
            chrono::LocalResult::None => {
                return Err(google_calendar_error("Invalid local time"));
            }
        };
        Ok(Some(local_dt))
    } else {
        Ok(None)
    }
}
