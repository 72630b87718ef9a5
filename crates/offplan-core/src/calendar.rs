//! Calendar-month arithmetic for the schedule engine.
//!
//! Dates are plain `NaiveDate` values with no timezone. Months are compared
//! by year and month only; the day of month never matters for matching.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::OffplanError;
use crate::OffplanResult;

/// Add `months` calendar months, clamping the day to the target month's end
/// (31 Jan + 1 month = 28/29 Feb).
pub fn add_months(date: NaiveDate, months: u32) -> OffplanResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| OffplanError::DateError(format!("{date} + {months} months is out of range")))
}

/// Absolute month index (`year * 12 + month0`), used for ordering and
/// same-month comparisons.
pub fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    month_index(a) == month_index(b)
}

/// Whole calendar months from `from` to `to` (negative if `to` is earlier).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    month_index(to) - month_index(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(d(2024, 1, 31), 1).unwrap(), d(2024, 2, 29));
        assert_eq!(add_months(d(2023, 1, 31), 1).unwrap(), d(2023, 2, 28));
        assert_eq!(add_months(d(2024, 11, 15), 3).unwrap(), d(2025, 2, 15));
    }

    #[test]
    fn test_same_month_ignores_day() {
        assert!(same_month(d(2025, 6, 1), d(2025, 6, 30)));
        assert!(!same_month(d(2025, 6, 30), d(2025, 7, 1)));
        assert!(!same_month(d(2024, 6, 1), d(2025, 6, 1)));
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(d(2025, 1, 20), d(2027, 1, 1)), 24);
        assert_eq!(months_between(d(2025, 3, 1), d(2025, 1, 1)), -2);
    }
}
