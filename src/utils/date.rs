//! Calendar helpers without a date/time dependency.

use std::time::{SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: u64 = 86_400;

/// Current year in UTC.
pub fn current_year() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    year_from_unix_days(secs / SECONDS_PER_DAY)
}

/// Gregorian year for a count of days since 1970-01-01.
///
/// Civil-from-days conversion over 400-year eras; only the year is kept.
#[allow(clippy::cast_possible_wrap)] // days since epoch fit in i64
pub fn year_from_unix_days(days: u64) -> i64 {
    let z = days as i64 + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400;
    if month <= 2 { year + 1 } else { year }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch() {
        assert_eq!(year_from_unix_days(0), 1970);
    }

    #[test]
    fn test_year_boundaries() {
        // 2000-01-01 is day 10957, 1999-12-31 the day before
        assert_eq!(year_from_unix_days(10_957), 2000);
        assert_eq!(year_from_unix_days(10_956), 1999);
        // 2024-02-29 (leap day) is day 19782
        assert_eq!(year_from_unix_days(19_782), 2024);
        // 2025-01-01 is day 20089
        assert_eq!(year_from_unix_days(20_089), 2025);
        assert_eq!(year_from_unix_days(20_088), 2024);
    }

    #[test]
    fn test_current_year_is_plausible() {
        assert!(current_year() >= 2024);
    }
}
