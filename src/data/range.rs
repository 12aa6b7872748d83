//! Time Range Module
//! Day-number conversions and the brushed time interval shared by all views.

use chrono::{Datelike, NaiveDate};

/// `NaiveDate::num_days_from_ce()` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Date format used for labels and for the `day` field of the input data.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Days since 1970-01-01 for a calendar date.
pub fn day_number(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Inverse of [`day_number`].
pub fn date_from_day(day: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(day.checked_add(EPOCH_DAYS_FROM_CE)?)
}

/// Format a continuous day coordinate as the date of the day containing it.
pub fn format_day(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    date_from_day(value.floor() as i32)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// A selected interval on the time axis, in continuous day coordinates.
///
/// The brush works in plot space, so bounds are usually fractional. A day is
/// part of the range when its midnight falls inside `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Create a range, swapping the bounds if given in reverse.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Range covering whole days `first..=last`.
    pub fn from_days(first: i32, last: i32) -> Self {
        Self::new(first as f64, last as f64)
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Inclusive integer day bounds. `lo > hi` when no midnight is covered.
    pub fn day_bounds(&self) -> (i32, i32) {
        (self.start.ceil() as i32, self.end.floor() as i32)
    }

    pub fn start_label(&self) -> String {
        format_day(self.start)
    }

    pub fn end_label(&self) -> String {
        format_day(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_number_epoch() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(day_number(epoch), 0);

        let d = NaiveDate::from_ymd_opt(2015, 3, 1).unwrap();
        let n = day_number(d);
        assert_eq!(date_from_day(n), Some(d));
        assert_eq!(day_number(NaiveDate::from_ymd_opt(2015, 3, 2).unwrap()), n + 1);
    }

    #[test]
    fn test_range_normalises_bounds() {
        let r = TimeRange::new(12.5, 3.0);
        assert_eq!(r.start, 3.0);
        assert_eq!(r.end, 12.5);
        assert_eq!(r.width(), 9.5);
    }

    #[test]
    fn test_day_bounds_are_inclusive_midnights() {
        let r = TimeRange::new(100.0, 103.0);
        assert_eq!(r.day_bounds(), (100, 103));

        let r = TimeRange::new(100.3, 102.9);
        assert_eq!(r.day_bounds(), (101, 102));
    }

    #[test]
    fn test_narrow_range_covers_no_day() {
        let r = TimeRange::new(100.2, 100.8);
        let (lo, hi) = r.day_bounds();
        assert!(lo > hi);
    }

    #[test]
    fn test_labels_use_containing_day() {
        let day = day_number(NaiveDate::from_ymd_opt(2015, 1, 10).unwrap()) as f64;
        let r = TimeRange::new(day + 0.4, day + 2.7);
        assert_eq!(r.start_label(), "2015-01-10");
        assert_eq!(r.end_label(), "2015-01-12");
        assert_eq!(format_day(f64::NAN), "");
    }
}
