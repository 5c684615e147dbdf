//! Lenient payment date parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats seen across sheet revisions, tried in order. Timestamp formats
/// come first because form submissions dominate the primary sheet.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Parse a raw date cell to a calendar date.
///
/// Returns `None` for anything unparseable; payment rows without a usable
/// date are silently dropped by the index builder, never an error.
pub fn parse_payment_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_common_sheet_formats() {
        assert_eq!(parse_payment_date("2025-01-15"), Some(d(2025, 1, 15)));
        assert_eq!(parse_payment_date("1/15/2025 10:33:21"), Some(d(2025, 1, 15)));
        assert_eq!(parse_payment_date("07/01/2024"), Some(d(2024, 7, 1)));
        assert_eq!(
            parse_payment_date("2025-01-15T12:00:00Z"),
            Some(d(2025, 1, 15))
        );
    }

    #[test]
    fn garbage_degrades_to_none() {
        assert_eq!(parse_payment_date(""), None);
        assert_eq!(parse_payment_date("pending"), None);
        assert_eq!(parse_payment_date("2025-13-40"), None);
    }
}
