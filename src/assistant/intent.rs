use super::dates::{normalize, parse_datetime_es, strip_morning_phrases};
use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

/// What the user wants the assistant to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Create a calendar event from the command
    Create,
    /// Show today's agenda
    ListToday,
    /// Show tomorrow's agenda
    ListTomorrow,
    /// Show the coming week's agenda
    ListWeek,
    /// Show the agenda for a specific date
    ListDate(NaiveDate),
    /// Compose and send an email
    SendEmail,
    /// Could not tell what the user wants
    Unknown,
}

/// Verbs that signal the user wants to schedule something
const SCHEDULE_WORDS: &[&str] = &[
    "agenda",
    "agendar",
    "programa",
    "programar",
    "crea",
    "crear",
    "pon",
    "poner",
    "haz",
    "hacer",
    "calendariza",
    "calendarizar",
];

/// Phrases that signal the user wants to see their agenda
const LIST_PHRASES: &[&str] = &[
    "que tareas tengo",
    "que debo hacer",
    "mi agenda",
    "ver agenda",
    "que hay",
    "listar",
    "lista",
];

const SEND_VERBS: &[&str] = &["envia", "manda", "escribe"];
const MAIL_WORDS: &[&str] = &["correo", "email", "mail"];

lazy_static! {
    /// Loose time-looking pattern used as a last resort to treat input as scheduling
    static ref RE_TIME_HINT: Regex =
        Regex::new(r"\d{1,2}[:.]\d{2}|\d{1,2}\s*(?:am|pm)\b|\ba\s+las?\s+\d{1,2}\b|\d{1,2}/\d{1,2}")
            .unwrap();
    /// Bare agenda query such as "agenda hoy" or "agenda de manana"
    static ref RE_AGENDA_QUERY: Regex =
        Regex::new(r"^agenda\s+(?:de\s+|para\s+)?(?:hoy|manana|pasado manana)$").unwrap();
}

/// Detect what the user wants from one console command
pub fn detect_intent(text: &str, now: DateTime<Tz>) -> Intent {
    let t = normalize(text.trim());

    if is_list_query(&t) {
        return refine_list(&t, now);
    }
    if has_any_word(&t, SCHEDULE_WORDS) {
        return Intent::Create;
    }
    if has_any_word(&t, SEND_VERBS) && has_any_word(&t, MAIL_WORDS) {
        return Intent::SendEmail;
    }
    if RE_TIME_HINT.is_match(&t) {
        return Intent::Create;
    }
    Intent::Unknown
}

fn is_list_query(t: &str) -> bool {
    LIST_PHRASES.iter().any(|phrase| t.contains(phrase)) || RE_AGENDA_QUERY.is_match(t)
}

/// Token-prefix match so "agéndame" still counts as "agenda"
fn has_any_word(t: &str, words: &[&str]) -> bool {
    t.split_whitespace().any(|token| {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        words.iter().any(|word| token.starts_with(word))
    })
}

/// Narrow a listing query down to a concrete date range
fn refine_list(t: &str, now: DateTime<Tz>) -> Intent {
    let scan = strip_morning_phrases(t);

    if scan.contains("pasado manana") {
        if let Some(date) = now.date_naive().checked_add_signed(Duration::days(2)) {
            return Intent::ListDate(date);
        }
    }
    if scan.contains("hoy") {
        return Intent::ListToday;
    }
    if scan.contains("manana") {
        return Intent::ListTomorrow;
    }
    if scan.contains("semana") {
        return Intent::ListWeek;
    }
    if let Some(parsed) = parse_datetime_es(t, now) {
        return Intent::ListDate(parsed.date_naive());
    }
    Intent::ListToday
}
