//! Date resolution against a reference day
//!
//! Messages rarely carry a year. A bare month/day resolves to its next
//! occurrence on or after the reference date; an end date that would fall
//! before its start rolls over into the following year.

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static YMD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\s*$").unwrap());

/// Format a date as ISO `YYYY-MM-DD`
pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse `2025-10-01`, `2025/10/1` or `2025.10.01`
pub fn parse_ymd(text: &str) -> Option<NaiveDate> {
    let caps = YMD_PATTERN.captures(text)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Next occurrence of `month`/`day` on or after `today`
///
/// Returns `None` for impossible combinations such as 2/30. Feb 29 resolves
/// to the next leap year within four years.
pub fn resolve_month_day(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    (today.year()..=today.year() + 4)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|date| *date >= today)
}

/// Resolve the end of a range given its already-resolved start
pub fn resolve_end(start: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let same_year = NaiveDate::from_ymd_opt(start.year(), month, day);
    match same_year {
        Some(end) if end >= start => Some(end),
        _ => NaiveDate::from_ymd_opt(start.year() + 1, month, day),
    }
}

/// Add a number of nights to a check-in date
pub fn add_nights(start: NaiveDate, nights: i64) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::days(nights))
}

/// Month number for an English month name or abbreviation
pub fn month_from_english(name: &str) -> Option<u32> {
    let lower = name.trim().trim_end_matches('.').to_ascii_lowercase();
    let month = match lower.as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// Day offset for a relative day word (`今天`, `明天`, `tomorrow`, ...)
pub fn relative_day_offset(word: &str) -> Option<i64> {
    match word.trim().to_lowercase().as_str() {
        "今天" | "今晚" | "today" | "tonight" => Some(0),
        "明天" | "明晚" | "tomorrow" => Some(1),
        "后天" | "day after tomorrow" | "the day after tomorrow" => Some(2),
        "大后天" => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_day_same_year() {
        let today = date(2025, 9, 15);
        assert_eq!(resolve_month_day(10, 1, today), Some(date(2025, 10, 1)));
        assert_eq!(resolve_month_day(9, 15, today), Some(date(2025, 9, 15)));
    }

    #[test]
    fn test_month_day_rolls_to_next_year() {
        let today = date(2025, 11, 20);
        assert_eq!(resolve_month_day(1, 5, today), Some(date(2026, 1, 5)));
    }

    #[test]
    fn test_invalid_month_day() {
        assert_eq!(resolve_month_day(2, 30, date(2025, 1, 1)), None);
        assert_eq!(resolve_month_day(13, 1, date(2025, 1, 1)), None);
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(resolve_month_day(2, 29, date(2025, 3, 1)), Some(date(2028, 2, 29)));
    }

    #[test]
    fn test_end_rolls_over_year_boundary() {
        let start = date(2025, 12, 30);
        assert_eq!(resolve_end(start, 1, 2), Some(date(2026, 1, 2)));
        assert_eq!(resolve_end(start, 12, 31), Some(date(2025, 12, 31)));
    }

    #[test]
    fn test_parse_ymd_separators() {
        assert_eq!(parse_ymd("2025-10-01"), Some(date(2025, 10, 1)));
        assert_eq!(parse_ymd("2025/10/1"), Some(date(2025, 10, 1)));
        assert_eq!(parse_ymd("2025.02.30"), None);
    }

    #[test]
    fn test_english_months_and_relative_words() {
        assert_eq!(month_from_english("Oct"), Some(10));
        assert_eq!(month_from_english("september"), Some(9));
        assert_eq!(month_from_english("sept."), Some(9));
        assert_eq!(month_from_english("smarch"), None);

        assert_eq!(relative_day_offset("明天"), Some(1));
        assert_eq!(relative_day_offset("Tomorrow"), Some(1));
        assert_eq!(relative_day_offset("昨天"), None);
    }

    #[test]
    fn test_add_nights() {
        assert_eq!(add_nights(date(2025, 10, 30), 3), Some(date(2025, 11, 2)));
    }
}
