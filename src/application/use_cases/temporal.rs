// ============================================================
// FLEXIBLE TEMPORAL AND NUMERIC PARSING
// ============================================================
// Predicates shared by type inference and the time-series builder

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::table::Cell;

/// `part1-part2-year` or `part1/part2/year` with a four digit year.
static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2})[/-](\d{1,2})[/-](\d{4})\s*$").unwrap());

/// Anything carrying a `:MM` part looks like a clock time.
static CLOCK_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r":\d{2}").unwrap());

/// `H:M[:S[.fff]]` with an optional meridiem.
static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?\s*(am|pm|a\.m\.|p\.m\.)?\s*$")
        .unwrap()
});

/// Optional sign, digits, optional decimal fraction.
static NUMERIC_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d+(?:\.\d+)?$").unwrap());

const EPOCH_YEAR: i32 = 1970;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a %b %d %Y",
];

/// Calendar formats chrono understands directly.
fn parse_native_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d);
        }
    }

    None
}

/// `12-05-2023`, `25/12/2023`: a part above 12 is the day, otherwise
/// the first part is the month.
fn parse_day_month_year(s: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTH_YEAR.captures(s)?;
    let part1: u32 = caps[1].parse().ok()?;
    let part2: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    let (month, day) = if part1 > 12 {
        (part2, part1)
    } else {
        (part1, part2)
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a calendar date from free text.
///
/// Native formats are tried first. A native result in the epoch year is
/// rejected when the input looks like a clock time, then the
/// day/month/year fallback runs.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_native_date(s) {
        if !(date.year() == EPOCH_YEAR && CLOCK_PART.is_match(s)) {
            return Some(date);
        }
    }

    parse_day_month_year(s)
}

/// Parse a time of day such as `9:47:41 AM`, `15:30` or `15:30:10`.
pub fn parse_flexible_time(raw: &str) -> Option<NaiveTime> {
    let caps = TIME_OF_DAY.captures(raw)?;

    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let second: u32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    if let Some(meridiem) = caps.get(5) {
        if hour == 0 || hour > 12 {
            return None;
        }
        let pm = meridiem.as_str().to_ascii_lowercase().starts_with('p');
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Date interpretation of a cell. Only text carries dates.
pub fn cell_date(cell: &Cell) -> Option<NaiveDate> {
    cell.as_str().and_then(parse_flexible_date)
}

/// Time-of-day interpretation of a cell. Only text carries times.
pub fn cell_time(cell: &Cell) -> Option<NaiveTime> {
    cell.as_str().and_then(parse_flexible_time)
}

/// Strict numeric reading used by type inference and the time series:
/// a finite Number, or text that is a plain signed decimal literal.
pub fn numeric_literal(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => {
            let trimmed = s.trim();
            if NUMERIC_LITERAL.is_match(trimmed) {
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Merge a calendar date with a time of day, whole seconds only.
pub fn combine(date: NaiveDate, time: NaiveTime) -> Option<NaiveDateTime> {
    Some(date.and_time(time.with_nanosecond(0)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_native_dates() {
        assert_eq!(parse_flexible_date("2023-01-01"), ymd(2023, 1, 1));
        assert_eq!(parse_flexible_date("2023/05/12"), ymd(2023, 5, 12));
        assert_eq!(parse_flexible_date("2023-05-12T08:30:00Z"), ymd(2023, 5, 12));
        assert_eq!(parse_flexible_date("2023-05-12 08:30"), ymd(2023, 5, 12));
        assert_eq!(parse_flexible_date("March 3, 2024"), ymd(2024, 3, 3));
    }

    #[test]
    fn test_day_month_fallback() {
        // A part above 12 must be the day
        assert_eq!(parse_flexible_date("25/12/2023"), ymd(2023, 12, 25));
        assert_eq!(parse_flexible_date("12-25-2023"), ymd(2023, 12, 25));
        // Ambiguous defaults to month first
        assert_eq!(parse_flexible_date("05-06-2023"), ymd(2023, 5, 6));
        // No roll-over into the next month
        assert_eq!(parse_flexible_date("31/02/2023"), None);
    }

    #[test]
    fn test_non_dates() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("10:00:00"), None);
        assert_eq!(parse_flexible_date("hello"), None);
        assert_eq!(parse_flexible_date("42"), None);
        // Epoch-year result for a clock-looking string is rejected
        assert_eq!(parse_flexible_date("1970-01-01 10:00"), None);
        assert_eq!(parse_flexible_date("1970-01-01"), ymd(1970, 1, 1));
    }

    #[test]
    fn test_times() {
        assert_eq!(parse_flexible_time("15:30"), NaiveTime::from_hms_opt(15, 30, 0));
        assert_eq!(parse_flexible_time("15:30:10"), NaiveTime::from_hms_opt(15, 30, 10));
        assert_eq!(parse_flexible_time("9:47:41 AM"), NaiveTime::from_hms_opt(9, 47, 41));
        assert_eq!(parse_flexible_time("9:47 pm"), NaiveTime::from_hms_opt(21, 47, 0));
        assert_eq!(parse_flexible_time("12:05 AM"), NaiveTime::from_hms_opt(0, 5, 0));
        assert_eq!(parse_flexible_time("12:05 PM"), NaiveTime::from_hms_opt(12, 5, 0));
        assert_eq!(parse_flexible_time("25:00"), None);
        assert_eq!(parse_flexible_time("13:00 PM"), None);
        assert_eq!(parse_flexible_time("2023-01-01"), None);
        assert_eq!(parse_flexible_time(""), None);
    }

    #[test]
    fn test_numeric_literal() {
        assert_eq!(numeric_literal(&Cell::Number(2.0)), Some(2.0));
        assert_eq!(numeric_literal(&Cell::text(" -3.5 ")), Some(-3.5));
        assert_eq!(numeric_literal(&Cell::text("+7")), Some(7.0));
        assert_eq!(numeric_literal(&Cell::text("1e3")), None);
        assert_eq!(numeric_literal(&Cell::text(".5")), None);
        assert_eq!(numeric_literal(&Cell::text("x")), None);
        assert_eq!(numeric_literal(&Cell::Null), None);
    }

    #[test]
    fn test_only_text_cells_carry_dates_and_times() {
        assert_eq!(cell_date(&Cell::Number(20230101.0)), None);
        assert_eq!(cell_time(&Cell::Number(10.0)), None);
        assert!(cell_date(&Cell::text("2023-01-01")).is_some());
        assert!(cell_time(&Cell::text("10:00")).is_some());
    }

    #[test]
    fn test_combine_drops_fractional_seconds() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let time = NaiveTime::from_hms_milli_opt(9, 0, 1, 500).unwrap();
        let combined = combine(date, time).unwrap();
        assert_eq!(combined.to_string(), "2023-01-02 09:00:01");
    }
}
