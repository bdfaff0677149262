use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_RELATIVE: Regex =
        Regex::new(r"\b(?:en|dentro de)\s+(\d{1,3})\s+(minutos?|min|horas?|dias?|semanas?)\b")
            .unwrap();
    static ref RE_RELATIVE_ONE: Regex =
        Regex::new(r"\b(?:en|dentro de)\s+una?\s+(minuto|hora|dia|semana)\b").unwrap();
    static ref RE_RELATIVE_HALF_HOUR: Regex =
        Regex::new(r"\b(?:en|dentro de)\s+media\s+hora\b").unwrap();
    static ref RE_TIME_HM: Regex =
        Regex::new(r"\b(\d{1,2})[:.](\d{2})(?:\s*(am|pm))?\b").unwrap();
    static ref RE_TIME_H_AMPM: Regex = Regex::new(r"\b(\d{1,2})\s*(am|pm)\b").unwrap();
    static ref RE_TIME_H_DAYPART: Regex =
        Regex::new(r"\b(\d{1,2})\s+de\s+la\s+(?:manana|tarde|noche|madrugada)\b").unwrap();
    static ref RE_TIME_A_LAS: Regex = Regex::new(r"\ba\s+las?\s+(\d{1,2})\b").unwrap();
    static ref RE_DAYPART: Regex =
        Regex::new(r"\bde\s+la\s+(manana|tarde|noche|madrugada)\b").unwrap();
    static ref RE_MORNING_PHRASE: Regex =
        Regex::new(r"\b(?:de|por|en)\s+la\s+(?:manana|madrugada)\b").unwrap();
    static ref RE_PASADO_MANANA: Regex = Regex::new(r"\bpasado\s+manana\b").unwrap();
    static ref RE_MANANA: Regex = Regex::new(r"\bmanana\b").unwrap();
    static ref RE_HOY: Regex = Regex::new(r"\bhoy\b").unwrap();
    static ref RE_WEEKDAY: Regex =
        Regex::new(r"\b(lunes|martes|miercoles|jueves|viernes|sabado|domingo)\b").unwrap();
    static ref RE_NUMERIC_DATE: Regex =
        Regex::new(r"\b(\d{1,2})[/-](\d{1,2})(?:[/-](\d{2,4}))?\b").unwrap();
    static ref RE_MONTH_DATE: Regex = Regex::new(
        r"\b(\d{1,2})\s+de\s+(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre)(?:\s+(?:de|del)\s+(\d{4}))?\b"
    )
    .unwrap();
}

/// Lowercase and strip accents so "miércoles" and "miercoles" match alike
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase().replace("a.m.", "am").replace("p.m.", "pm");
    lowered
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ü' => 'u',
            'ñ' => 'n',
            _ => c,
        })
        .collect()
}

/// Remove "de la mañana" and friends so "mañana" only counts as tomorrow
pub(crate) fn strip_morning_phrases(text: &str) -> String {
    RE_MORNING_PHRASE.replace_all(text, " ").into_owned()
}

/// Parse a Spanish date/time expression relative to `now`
pub fn parse_datetime_es(text: &str, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let norm = normalize(text);
    let tz = now.timezone();

    if let Some(parsed) = parse_relative(&norm, now) {
        return Some(parsed);
    }

    let time = extract_time(&norm);
    let scan = strip_morning_phrases(&norm);
    let date = extract_date(&scan, now, time);

    match (date, time) {
        (Some(date), Some(time)) => resolve_local(date, time, tz),
        (Some(date), None) => resolve_local(date, NaiveTime::MIN, tz),
        (None, Some(time)) => {
            // A bare time means today, or tomorrow once it has passed
            let today = now.date_naive();
            let candidate = resolve_local(today, time, tz)?;
            if candidate > now {
                Some(candidate)
            } else {
                resolve_local(today.succ_opt()?, time, tz)
            }
        }
        (None, None) => None,
    }
}

/// Handle "en 45 minutos", "dentro de 2 horas" and similar offsets
fn parse_relative(norm: &str, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    if let Some(caps) = RE_RELATIVE.captures(norm) {
        let quantity: i64 = caps[1].parse().ok()?;
        return relative_from(now, quantity, &caps[2]);
    }
    if let Some(caps) = RE_RELATIVE_ONE.captures(norm) {
        return relative_from(now, 1, &caps[1]);
    }
    if RE_RELATIVE_HALF_HOUR.is_match(norm) {
        return relative_from(now, 30, "min");
    }
    None
}

fn relative_from(now: DateTime<Tz>, quantity: i64, unit: &str) -> Option<DateTime<Tz>> {
    let delta = if unit.starts_with("min") {
        Duration::minutes(quantity)
    } else if unit.starts_with("hora") {
        Duration::hours(quantity)
    } else if unit.starts_with("dia") {
        Duration::days(quantity)
    } else {
        Duration::weeks(quantity)
    };

    now.checked_add_signed(delta)
}

fn extract_time(norm: &str) -> Option<NaiveTime> {
    if norm.contains("mediodia") {
        return NaiveTime::from_hms_opt(12, 0, 0);
    }
    if norm.contains("medianoche") {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }

    if let Some(caps) = RE_TIME_HM.captures(norm) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        let meridiem = caps.get(3).map(|m| m.as_str());
        return build_time(hour, minute, meridiem, norm);
    }
    if let Some(caps) = RE_TIME_H_AMPM.captures(norm) {
        let hour: u32 = caps[1].parse().ok()?;
        return build_time(hour, 0, Some(&caps[2]), norm);
    }
    if let Some(caps) = RE_TIME_H_DAYPART.captures(norm) {
        let hour: u32 = caps[1].parse().ok()?;
        return build_time(hour, 0, None, norm);
    }
    if let Some(caps) = RE_TIME_A_LAS.captures(norm) {
        let hour: u32 = caps[1].parse().ok()?;
        return build_time(hour, 0, None, norm);
    }

    None
}

/// Apply am/pm or "de la tarde" style qualifiers to a raw hour
fn build_time(hour: u32, minute: u32, meridiem: Option<&str>, norm: &str) -> Option<NaiveTime> {
    let mut hour = hour;

    match meridiem {
        Some("pm") if hour < 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        Some(_) => {}
        None => {
            if let Some(caps) = RE_DAYPART.captures(norm) {
                match &caps[1] {
                    "tarde" | "noche" if hour < 12 => hour += 12,
                    "noche" | "madrugada" if hour == 12 => hour = 0,
                    _ => {}
                }
            }
        }
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn extract_date(scan: &str, now: DateTime<Tz>, time: Option<NaiveTime>) -> Option<NaiveDate> {
    let today = now.date_naive();

    if RE_PASADO_MANANA.is_match(scan) {
        return today.checked_add_signed(Duration::days(2));
    }
    if RE_MANANA.is_match(scan) {
        return today.succ_opt();
    }
    if RE_HOY.is_match(scan) {
        return Some(today);
    }

    if let Some(caps) = RE_WEEKDAY.captures(scan) {
        let target = weekday_from_name(&caps[1])?;
        let mut days_ahead = (target.num_days_from_monday() as i64
            - today.weekday().num_days_from_monday() as i64)
            .rem_euclid(7);
        if days_ahead == 0 {
            // The same weekday counts as today only while the given time is still ahead
            let still_today = time.map(|t| t > now.time()).unwrap_or(false);
            if !still_today {
                days_ahead = 7;
            }
        }
        return today.checked_add_signed(Duration::days(days_ahead));
    }

    if let Some(caps) = RE_NUMERIC_DATE.captures(scan) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: Option<i32> = match caps.get(3) {
            Some(y) => Some(y.as_str().parse().ok()?),
            None => None,
        };
        return resolve_dmy(day, month, year, today);
    }

    if let Some(caps) = RE_MONTH_DATE.captures(scan) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year: Option<i32> = match caps.get(3) {
            Some(y) => Some(y.as_str().parse().ok()?),
            None => None,
        };
        return resolve_dmy(day, month, year, today);
    }

    None
}

/// Build a date from day/month, rolling to next year when it already passed
fn resolve_dmy(day: u32, month: u32, year: Option<i32>, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(year) => {
            let year = if year < 100 { 2000 + year } else { year };
            NaiveDate::from_ymd_opt(year, month, day)
        }
        None => {
            let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
            if date < today {
                NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            } else {
                Some(date)
            }
        }
    }
}

fn resolve_local(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        chrono::LocalResult::Single(dt) => Some(dt),
        chrono::LocalResult::Ambiguous(dt, _) => Some(dt),
        chrono::LocalResult::None => None,
    }
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "lunes" => Some(Weekday::Mon),
        "martes" => Some(Weekday::Tue),
        "miercoles" => Some(Weekday::Wed),
        "jueves" => Some(Weekday::Thu),
        "viernes" => Some(Weekday::Fri),
        "sabado" => Some(Weekday::Sat),
        "domingo" => Some(Weekday::Sun),
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    match name {
        "enero" => Some(1),
        "febrero" => Some(2),
        "marzo" => Some(3),
        "abril" => Some(4),
        "mayo" => Some(5),
        "junio" => Some(6),
        "julio" => Some(7),
        "agosto" => Some(8),
        "septiembre" | "setiembre" => Some(9),
        "octubre" => Some(10),
        "noviembre" => Some(11),
        "diciembre" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Guatemala;
    use chrono_tz::Tz;

    /// Friday, 2024-03-15 at 10:00 AM in Guatemala
    fn now() -> DateTime<Tz> {
        Guatemala.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn formatted(text: &str) -> String {
        parse_datetime_es(text, now())
            .unwrap()
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    #[test]
    fn test_relative_day_words() {
        assert_eq!(formatted("hoy"), "2024-03-15 00:00");
        assert_eq!(formatted("mañana"), "2024-03-16 00:00");
        assert_eq!(formatted("pasado mañana"), "2024-03-17 00:00");
    }

    #[test]
    fn test_weekdays_resolve_to_next_occurrence() {
        assert_eq!(formatted("el lunes"), "2024-03-18 00:00");
        assert_eq!(formatted("miércoles"), "2024-03-20 00:00");
        assert_eq!(formatted("el sábado"), "2024-03-16 00:00");

        // Today is Friday, a bare "viernes" means next week
        assert_eq!(formatted("viernes"), "2024-03-22 00:00");
    }

    #[test]
    fn test_same_weekday_with_time() {
        // 3pm is still ahead of 10:00, so this Friday counts
        assert_eq!(formatted("viernes a las 3pm"), "2024-03-15 15:00");
        // 9am already passed, so roll to next Friday
        assert_eq!(formatted("viernes a las 9am"), "2024-03-22 09:00");
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(formatted("el 12/09"), "2024-09-12 00:00");
        assert_eq!(formatted("25/12/2025"), "2025-12-25 00:00");
        assert_eq!(formatted("12-09"), "2024-09-12 00:00");

        // Already passed this year, rolls to the next one
        assert_eq!(formatted("el 3/1"), "2025-01-03 00:00");
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(formatted("el 15 de septiembre"), "2024-09-15 00:00");
        assert_eq!(formatted("el 1 de enero de 2026"), "2026-01-01 00:00");

        // Already passed this year, rolls to the next one
        assert_eq!(formatted("el 3 de marzo"), "2025-03-03 00:00");
    }

    #[test]
    fn test_bare_times() {
        assert_eq!(formatted("a las 15:30"), "2024-03-15 15:30");
        assert_eq!(formatted("3pm"), "2024-03-15 15:00");
        assert_eq!(formatted("a las 9 de la noche"), "2024-03-15 21:00");
        assert_eq!(formatted("9 de la noche"), "2024-03-15 21:00");

        // 8:00 already passed, so it means tomorrow morning
        assert_eq!(formatted("a las 8"), "2024-03-16 08:00");
        assert_eq!(formatted("a las 9 de la mañana"), "2024-03-16 09:00");
    }

    #[test]
    fn test_date_with_time() {
        assert_eq!(formatted("mañana a las 3pm"), "2024-03-16 15:00");
        assert_eq!(formatted("mañana 3.30pm"), "2024-03-16 15:30");
        assert_eq!(formatted("el 12/09 a las 14:30"), "2024-09-12 14:30");
        assert_eq!(formatted("el lunes a las 9 de la mañana"), "2024-03-18 09:00");
    }

    #[test]
    fn test_relative_offsets() {
        assert_eq!(formatted("en 45 minutos"), "2024-03-15 10:45");
        assert_eq!(formatted("en 2 horas"), "2024-03-15 12:00");
        assert_eq!(formatted("dentro de 3 dias"), "2024-03-18 10:00");
        assert_eq!(formatted("en una hora"), "2024-03-15 11:00");
        assert_eq!(formatted("en media hora"), "2024-03-15 10:30");
        assert_eq!(formatted("en 1 semana"), "2024-03-22 10:00");
    }

    #[test]
    fn test_mediodia_and_medianoche() {
        assert_eq!(formatted("mañana al mediodía"), "2024-03-16 12:00");
        // Midnight already passed today, so it means tonight
        assert_eq!(formatted("a medianoche"), "2024-03-16 00:00");
    }

    #[test]
    fn test_unparseable_text() {
        assert!(parse_datetime_es("hola, ¿qué tal?", now()).is_none());
        assert!(parse_datetime_es("", now()).is_none());
    }

    #[test]
    fn test_normalize_folds_accents() {
        assert_eq!(normalize("Miércoles"), "miercoles");
        assert_eq!(normalize("MAÑANA"), "manana");
        assert_eq!(normalize("3 P.M."), "3 pm");
    }
}
