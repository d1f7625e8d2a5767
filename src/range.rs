use std::fmt;

use crate::CalendarDate;

/// Inclusive `[min, max]` window of selectable days.
///
/// Days outside the window are rendered disabled; navigation itself is never
/// restricted by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    min: CalendarDate,
    max: CalendarDate,
}

/// Error type for date range operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Lower bound is after upper bound.
    #[error("Invalid date range: min ({min}) is after max ({max})")]
    InvalidRange {
        min: CalendarDate,
        max: CalendarDate,
    },
}

impl DateRange {
    /// Creates a new range with validation.
    ///
    /// # Errors
    /// Returns `RangeError::InvalidRange` if min > max.
    pub fn new(min: CalendarDate, max: CalendarDate) -> Result<Self, RangeError> {
        if min > max {
            return Err(RangeError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Every representable day, `0001-01-01` through `9999-12-31`
    pub const fn full() -> Self {
        Self {
            min: CalendarDate::MIN,
            max: CalendarDate::MAX,
        }
    }

    pub const fn min(&self) -> CalendarDate {
        self.min
    }

    pub const fn max(&self) -> CalendarDate {
        self.max
    }

    pub fn contains(&self, date: &CalendarDate) -> bool {
        is_within_range(date, &self.min, &self.max)
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Inclusive bounds check: `min <= date <= max`.
///
/// `CalendarDate` orders exactly like its canonical `YYYY-MM-DD` string, so
/// this agrees with a lexicographic comparison of the formatted dates.
pub fn is_within_range(date: &CalendarDate, min: &CalendarDate, max: &CalendarDate) -> bool {
    min <= date && date <= max
}
