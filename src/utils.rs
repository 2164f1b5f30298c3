//! Date derivation and small string helpers.
//!
//! - [`ArchiveDate`] decides which calendar day a run archives
//! - [`parse_iso_date`] validates `YYYY-MM-DD` command-line input
//! - [`truncate_for_log`] keeps HTML previews in log lines short

use chrono::{DateTime, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Which day a scrape run archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveDate {
    /// A date supplied by the caller.
    Explicit(NaiveDate),
    /// "Today" in `tz`, moved back `years` calendar years.
    YearsAgo { years: u32, tz: Tz },
}

impl ArchiveDate {
    /// Resolve against the current time.
    pub fn resolve(&self) -> Option<NaiveDate> {
        self.resolve_at(Utc::now())
    }

    /// Resolve against `now`.
    ///
    /// The offset is calendar arithmetic: the local date in `tz` minus
    /// `years * 12` months. A Feb 29 that lands in a non-leap year clamps to
    /// Feb 28. Returns `None` only when the result leaves chrono's range.
    pub fn resolve_at(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        match *self {
            ArchiveDate::Explicit(date) => Some(date),
            ArchiveDate::YearsAgo { years, tz } => {
                let today = now.with_timezone(&tz).date_naive();
                let past = today.checked_sub_months(Months::new(years.checked_mul(12)?));
                debug!(%today, ?past, years, timezone = %tz, "Resolved archive date");
                past
            }
        }
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// Used as a clap `value_parser`, hence the `String` error.
///
/// # Errors
///
/// Returns a message naming the input when it is not a real date in that
/// exact format (e.g. `2013-02-30` or `2013/01/02`).
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date {s:?} (expected YYYY-MM-DD): {e}"))
}

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` bytes are cut at the nearest character boundary
/// at or below `max`, with the number of dropped bytes appended.
///
/// # Arguments
///
/// * `s` - The text to shorten
/// * `max` - Byte budget for the kept prefix
///
/// # Returns
///
/// `s` unchanged if it fits, otherwise the prefix followed by `…(+N bytes)`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_explicit_date_is_returned_unchanged() {
        let date = NaiveDate::from_ymd_opt(2013, 1, 2).unwrap();
        assert_eq!(ArchiveDate::Explicit(date).resolve(), Some(date));
    }

    #[test]
    fn test_years_ago_uses_named_timezone_date() {
        // 20:30 UTC on Oct 18 is already Oct 19 in Karachi (UTC+5).
        let now = Utc.with_ymd_and_hms(2025, 10, 18, 20, 30, 0).unwrap();
        let date = ArchiveDate::YearsAgo {
            years: 12,
            tz: chrono_tz::Asia::Karachi,
        }
        .resolve_at(now);
        assert_eq!(date, NaiveDate::from_ymd_opt(2013, 10, 19));
    }

    #[test]
    fn test_years_ago_in_utc_keeps_utc_date() {
        let now = Utc.with_ymd_and_hms(2025, 10, 18, 20, 30, 0).unwrap();
        let date = ArchiveDate::YearsAgo {
            years: 12,
            tz: chrono_tz::UTC,
        }
        .resolve_at(now);
        assert_eq!(date, NaiveDate::from_ymd_opt(2013, 10, 18));
    }

    #[test]
    fn test_years_ago_clamps_leap_day() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        let date = ArchiveDate::YearsAgo {
            years: 1,
            tz: chrono_tz::UTC,
        }
        .resolve_at(now);
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 2, 28));
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2013-01-02"),
            Ok(NaiveDate::from_ymd_opt(2013, 1, 2).unwrap())
        );
        assert!(parse_iso_date("2013-13-02").is_err());
        assert!(parse_iso_date("02/01/2013").is_err());
        assert!(parse_iso_date("").is_err());
    }

    #[test]
    fn test_parse_iso_date_error_names_input() {
        let err = parse_iso_date("2013-02-30").unwrap_err();
        assert!(err.contains("\"2013-02-30\""), "{err}");
        assert!(err.contains("YYYY-MM-DD"), "{err}");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // 'é' is two bytes; cutting at 1 would split it.
        let result = truncate_for_log("éé", 1);
        assert_eq!(result, "…(+4 bytes)");
    }
}
