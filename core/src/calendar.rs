//! Calendar arithmetic shared by trends, timelines and the assembler.
//!
//! There is no ambient "now": every caller passes its as-of date explicitly.

use chrono::{Datelike, Duration, NaiveDate};

/// Whole calendar months from `epoch` to `date`; the day of month is ignored.
/// Dates before the epoch saturate to zero.
pub fn months_since(epoch: NaiveDate, date: NaiveDate) -> u32 {
    let months = (date.year() - epoch.year()) * 12 + date.month() as i32 - epoch.month() as i32;
    months.max(0) as u32
}

/// Whole calendar quarters from `epoch` to `date`. Saturates like `months_since`.
pub fn quarters_since(epoch: NaiveDate, date: NaiveDate) -> u32 {
    let quarters = (date.year() - epoch.year()) * 4 + quarter_of(date) as i32
        - quarter_of(epoch) as i32;
    quarters.max(0) as u32
}

/// Calendar quarter 1..=4.
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Reporting label, e.g. "2024-Q3".
pub fn fiscal_quarter(date: NaiveDate) -> String {
    format!("{}-Q{}", date.year(), quarter_of(date))
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// `add_days` that reports `None` past the calendar's range.
pub fn checked_add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// `to - from` in whole days (negative when `to` precedes `from`).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn months_ignore_day_of_month() {
        let epoch = d(2023, 1, 1);
        assert_eq!(months_since(epoch, d(2023, 1, 31)), 0);
        assert_eq!(months_since(epoch, d(2023, 2, 1)), 1);
        assert_eq!(months_since(epoch, d(2025, 9, 13)), 32);
    }

    #[test]
    fn dates_before_epoch_saturate() {
        assert_eq!(months_since(d(2023, 1, 1), d(2022, 6, 1)), 0);
        assert_eq!(quarters_since(d(2023, 1, 1), d(2022, 6, 1)), 0);
    }

    #[test]
    fn fiscal_quarter_labels() {
        assert_eq!(fiscal_quarter(d(2024, 3, 31)), "2024-Q1");
        assert_eq!(fiscal_quarter(d(2024, 7, 1)), "2024-Q3");
        assert_eq!(fiscal_quarter(d(2025, 12, 31)), "2025-Q4");
        assert_eq!(quarters_since(d(2023, 1, 1), d(2024, 7, 1)), 6);
    }

    #[test]
    fn day_arithmetic() {
        let start = d(2024, 1, 1);
        assert_eq!(add_days(start, 280), d(2024, 10, 7));
        assert_eq!(days_between(start, d(2024, 10, 7)), 280);
        assert_eq!(checked_add_days(start, 280), Some(d(2024, 10, 7)));
        assert_eq!(checked_add_days(NaiveDate::MAX, 1), None);
    }
}
