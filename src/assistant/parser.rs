use super::dates::parse_datetime_es;
use chrono::DateTime;
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

/// Maximum length of a title taken from the raw command
const FALLBACK_TITLE_CHARS: usize = 30;

/// A partially specified event gathered from one console command
#[derive(Debug, Clone, Default)]
pub struct PendingEvent {
    pub title: Option<String>,
    pub start: Option<DateTime<Tz>>,
    pub location: Option<String>,
    pub duration_min: Option<i64>,
}

/// Words that end a captured title or location fragment
const CLAUSE_WORDS: &str = r"por\b|durante\b|a\s+las?\b|desde\b|hasta\b|hoy\b|(?:pasado\s+)?(?:mañana|manana)\b|el\s+\d|(?:el\s+|este\s+|pr[oó]ximo\s+)?(?:lunes|martes|mi[eé]rcoles|jueves|viernes|s[aá]bado|domingo)\b|al?\s+mediod[ií]a\b|a\s+(?:la\s+)?medianoche\b|en\s+punto\b";

lazy_static! {
    static ref RE_TITLE_KEY: Regex = Regex::new(r"(?i)\b(?:con|para|sobre)\s+").unwrap();
    static ref RE_TITLE_CUT: Regex =
        Regex::new(&format!(r"(?i)(?:^|\s+)(?:{}|en\s+)", CLAUSE_WORDS)).unwrap();
    static ref RE_EN: Regex = Regex::new(r"(?i)\ben\s+").unwrap();
    static ref RE_LOCATION_CUT: Regex = Regex::new(&format!(
        r"(?i)(?:^|\s+)(?:{}|con\s+|para\s+|sobre\s+)",
        CLAUSE_WORDS
    ))
    .unwrap();
    /// Fragments after "en" that are times or durations, not places
    static ref RE_LOCATION_SKIP: Regex = Regex::new(
        r"(?i)^(?:\d+\s*(?:min|minutos?|horas?|d[ií]as?|semanas?)\b|una?\s+(?:minuto|hora|d[ií]a|semana)\b|media\s+hora\b|la\s+(?:mañana|manana|tarde|noche|madrugada)\b|punto\b)"
    )
    .unwrap();
    static ref RE_DURATION_MIN: Regex = Regex::new(r"(?i)\b(\d{1,3})\s*min").unwrap();
    static ref RE_DURATION_HOUR_HALF: Regex =
        Regex::new(r"(?i)\b(\d{1,2})\s*horas?\s+y\s+media\b").unwrap();
    static ref RE_DURATION_HOUR: Regex = Regex::new(r"(?i)\b(\d{1,2})\s*horas?\b").unwrap();
    static ref RE_MEDIA_HORA: Regex = Regex::new(r"(?i)\bmedia\s+hora\b").unwrap();
}

/// Extract event details from one natural-language command
pub fn parse_event(text: &str, now: DateTime<Tz>) -> PendingEvent {
    let start = parse_datetime_es(text, now);
    let title = extract_title(text).or_else(|| fallback_title(text));
    let location = extract_location(text);
    let duration_min = extract_duration(text);

    PendingEvent {
        title,
        start,
        location,
        duration_min,
    }
}

/// Title after "con", "para" or "sobre", trimmed at the next clause
fn extract_title(text: &str) -> Option<String> {
    for key in RE_TITLE_KEY.find_iter(text) {
        let candidate = &text[key.end()..];
        let title = cut_clause(candidate, &RE_TITLE_CUT);
        if !title.is_empty() {
            return Some(title);
        }
    }
    None
}

/// First characters of the raw command, used when no title keyword matched
fn fallback_title(text: &str) -> Option<String> {
    let title: String = text.trim().chars().take(FALLBACK_TITLE_CHARS).collect();
    let title = title.trim().to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Place after "en", skipping fragments that are really times or durations
fn extract_location(text: &str) -> Option<String> {
    for key in RE_EN.find_iter(text) {
        let rest = &text[key.end()..];
        let rest = rest.split(['.', ',', ';', '\n']).next().unwrap_or("");
        if RE_LOCATION_SKIP.is_match(rest) {
            continue;
        }
        let location = cut_clause(rest, &RE_LOCATION_CUT);
        if !location.is_empty() {
            return Some(location);
        }
    }
    None
}

/// Duration in minutes from "45 min", "2 horas" or "media hora"
fn extract_duration(text: &str) -> Option<i64> {
    if let Some(caps) = RE_DURATION_MIN.captures(text) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = RE_DURATION_HOUR_HALF.captures(text) {
        let hours: i64 = caps[1].parse().ok()?;
        return Some(hours * 60 + 30);
    }
    if let Some(caps) = RE_DURATION_HOUR.captures(text) {
        let hours: i64 = caps[1].parse().ok()?;
        return Some(hours * 60);
    }
    if RE_MEDIA_HORA.is_match(text) {
        return Some(30);
    }
    None
}

fn cut_clause(text: &str, cut: &Regex) -> String {
    let cut_at = cut.find(text).map(|m| m.start()).unwrap_or(text.len());
    text[..cut_at]
        .trim()
        .trim_end_matches(['.', ',', ';', '!', '?'])
        .trim()
        .to_string()
}
