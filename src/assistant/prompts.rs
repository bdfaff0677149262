use super::dates::{normalize, parse_datetime_es};
use super::parser::PendingEvent;
use crate::error::{prompt_error, AssistantResult};
use chrono::DateTime;
use chrono_tz::Tz;
use inquire::{InquireError, Text};
use rust_i18n::t;

/// Read one line from the console, empty input and Ctrl-C count as no answer
pub fn ask(message: &str) -> AssistantResult<Option<String>> {
    Ok(read_prompt(Text::new(message))?.filter(|answer| !answer.is_empty()))
}

fn ask_with_default(message: &str, default: Option<&str>) -> AssistantResult<Option<String>> {
    let mut prompt = Text::new(message);
    if let Some(default) = default {
        prompt = prompt.with_default(default);
    }
    Ok(read_prompt(prompt)?.filter(|answer| !answer.is_empty()))
}

fn read_prompt(prompt: Text<'_, '_>) -> AssistantResult<Option<String>> {
    match prompt.prompt() {
        Ok(answer) => Ok(Some(answer.trim().to_string())),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(prompt_error(&format!("Console prompt failed: {}", e))),
    }
}

/// Ask for the event date and time until it parses or the user gives up
pub fn ask_datetime(now: DateTime<Tz>) -> AssistantResult<Option<DateTime<Tz>>> {
    loop {
        let Some(answer) = ask(&t!("prompt_when"))? else {
            return Ok(None);
        };
        if let Some(parsed) = parse_datetime_es(&answer, now) {
            return Ok(Some(parsed));
        }
        println!("{}", t!("prompt_when_retry"));
    }
}

/// Ask for the duration in minutes, invalid input falls back to the default
pub fn ask_duration(default_min: i64) -> AssistantResult<Option<i64>> {
    let Some(answer) = ask(&t!("prompt_duration", default = default_min))? else {
        return Ok(None);
    };
    Ok(answer
        .parse::<i64>()
        .ok()
        .filter(|minutes| *minutes > 0))
}

/// Yes/no confirmation, anything starting with "s" counts as yes
pub fn confirm(message: &str) -> AssistantResult<bool> {
    let Some(answer) = ask(message)? else {
        return Ok(false);
    };
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    normalize(answer).starts_with('s')
}

/// Ask for any missing essential fields of a pending event
pub fn complete_event(
    event: &mut PendingEvent,
    now: DateTime<Tz>,
    default_duration_min: i64,
) -> AssistantResult<()> {
    if event.start.is_none() {
        event.start = ask_datetime(now)?;
    }
    if event.title.is_none() {
        event.title = ask(&t!("prompt_title"))?;
    }
    if event.location.is_none() {
        event.location = ask(&t!("prompt_location"))?;
    }
    if event.duration_min.is_none() {
        event.duration_min = ask_duration(default_duration_min)?;
    }
    Ok(())
}

/// Ask for the email recipient, offering the configured one as default
pub fn ask_email_recipient(default: Option<&str>) -> AssistantResult<Option<String>> {
    ask_with_default(&t!("prompt_email_to"), default)
}

pub fn ask_email_subject() -> AssistantResult<Option<String>> {
    ask(&t!("prompt_email_subject"))
}

pub fn ask_email_body() -> AssistantResult<Option<String>> {
    ask(&t!("prompt_email_body"))
}
