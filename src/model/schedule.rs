//! Schedule types: the calendar span of a run and the per-day plan.

use jiff::{
    ToSpan, Zoned,
    civil::{Date, Weekday},
};

/// Errors building a date range.
#[derive(Debug, thiserror::Error)]
pub enum DateRangeError {
    #[error("start date {start} is after end date {end}")]
    Inverted { start: Date, end: Date },

    #[error("invalid date range: {0}")]
    Date(#[from] jiff::Error),
}

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Creates a range covering `start..=end`.
    pub fn new(start: Date, end: Date) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// The last `days` days, ending today (local time).
    pub fn last_days(days: u16) -> Result<Self, DateRangeError> {
        Self::ending_at(Zoned::now().date(), days)
    }

    /// The `days` days before `end`, plus `end` itself.
    pub fn ending_at(end: Date, days: u16) -> Result<Self, DateRangeError> {
        let start = end.checked_sub(i64::from(days).days())?;
        Self::new(start, end)
    }

    /// January 1 through December 31 of `year`.
    pub fn year(year: i16) -> Result<Self, DateRangeError> {
        let start = Date::new(year, 1, 1)?;
        let end = Date::new(year, 12, 31)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    /// Number of calendar days in the range, both ends included.
    pub fn days(&self) -> usize {
        self.iter().count()
    }

    /// Every day in the range, in order.
    pub fn iter(&self) -> impl Iterator<Item = Date> + use<> {
        let end = self.end;
        self.start
            .series(1.day())
            .take_while(move |date| *date <= end)
    }

    /// Human-readable label, e.g. `2024-01-01 to 2024-01-31`.
    pub fn label(&self) -> String {
        format!("{} to {}", self.start, self.end)
    }
}

/// One planned batch of commits on a single day.
///
/// A day can carry at most two entries: the regular one and a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub date: Date,
    pub commit_count: u32,
    pub is_burst: bool,
}

/// Saturdays and Sundays get lighter activity.
pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    #[test]
    fn range_counts_both_ends() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 5)).unwrap();

        assert_eq!(range.days(), 5);
        assert_eq!(range.iter().next(), Some(date(2024, 1, 1)));
        assert_eq!(range.iter().last(), Some(date(2024, 1, 5)));
    }

    #[test]
    fn single_day_range() {
        let range = DateRange::new(date(2024, 2, 29), date(2024, 2, 29)).unwrap();
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn inverted_range_fails() {
        let err = DateRange::new(date(2024, 1, 5), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, DateRangeError::Inverted { .. }));
    }

    #[test]
    fn year_range_covers_leap_year() {
        let range = DateRange::year(2024).unwrap();
        assert_eq!(range.days(), 366);
        assert_eq!(range.label(), "2024-01-01 to 2024-12-31");
    }

    #[test]
    fn ending_at_includes_today() {
        let range = DateRange::ending_at(date(2024, 3, 31), 30).unwrap();
        assert_eq!(range.start(), date(2024, 3, 1));
        assert_eq!(range.days(), 31);
    }

    #[test]
    fn weekend_detection() {
        // 2024-01-06 was a Saturday.
        assert!(is_weekend(date(2024, 1, 6)));
        assert!(is_weekend(date(2024, 1, 7)));
        assert!(!is_weekend(date(2024, 1, 8)));
    }
}
