//! Calendar date math and carousel navigation state for swipeable month/week
//! calendar widgets.
//!
//! The crate produces data, not pixels: [`build_month_grid`] and
//! [`build_week_grid`] turn an anchor date into rows of [`DayCell`]s, the
//! [`Navigator`] keeps the anchor and a 3-slot carousel index in step, and
//! [`Calendar`] wires both to a [`CalendarConfig`] the way an embedding UI
//! component would.

mod calendar;
mod config;
mod consts;
mod format;
mod grid;
mod navigator;
mod prelude;
mod range;
mod types;

pub use calendar::{Calendar, DayClickHandler, Header, PickerFields, PickerState, Slot};
pub use config::{CalendarConfig, CalendarOptions, ConfigError};
pub use consts::*;
pub use format::DateFormat;
pub use grid::{
    DayCell, GridContext, Mark, Payload, build_month_grid, build_week_grid, weekday_labels,
};
pub use navigator::{
    Direction, Navigator, RotationIndex, SwiperChange, SwiperSource, ViewMode, ViewState,
};
pub use range::{DateRange, RangeError, is_within_range};
pub use types::{Day, Month, Weekday, Year, days_in_month, is_leap_year};

use crate::prelude::*;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::str::FromStr;

/// A concrete day in the proleptic Gregorian calendar.
///
/// Immutable: every arithmetic operation returns a new value. Displays in the
/// canonical `YYYY-MM-DD` form, whose lexicographic order matches the derived
/// chronological `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{year}-{month}-{day}")]
pub struct CalendarDate {
    year: Year,
    month: Month,
    day: Day,
    // Same day as the fields above; arithmetic and weekdays go through chrono
    naive: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be {}-{})", "_0", MIN_YEAR, MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { year: u16, month: u8, day: u8 },
    #[display(fmt = "Invalid weekday: {_0} (must be 0-6)")]
    InvalidWeekday(u8),
    #[display(fmt = "Date outside supported calendar range (year {_0})")]
    OutOfRange(i64),
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}

impl CalendarDate {
    /// `0001-01-01`, the first representable day
    pub const MIN: Self = match NaiveDate::from_ymd_opt(1, 1, 1) {
        Some(naive) => Self {
            year: Year::MIN,
            month: Month::JANUARY,
            day: Day::first(),
            naive,
        },
        None => panic!("0001-01-01 is a valid date"),
    };

    /// `9999-12-31`, the last representable day
    pub const MAX: Self = match NaiveDate::from_ymd_opt(9999, 12, 31) {
        Some(naive) => Self {
            year: Year::MAX,
            month: Month::DECEMBER,
            day: Day::last_of(Year::MAX, Month::DECEMBER),
            naive,
        },
        None => panic!("9999-12-31 is a valid date"),
    };

    /// Creates a date from raw components, validating each.
    ///
    /// # Errors
    /// Returns the `ParseError` variant naming the first invalid component.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        let year = Year::new(year)?;
        let month = Month::new(month)?;
        let day = Day::new(day, year, month)?;
        Self::from_parts(year, month, day)
    }

    /// Creates a date from already-validated parts
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDay` if `day` was validated against another month.
    pub fn from_parts(year: Year, month: Month, day: Day) -> Result<Self, ParseError> {
        let naive = NaiveDate::from_ymd_opt(
            i32::from(year.get()),
            u32::from(month.get()),
            u32::from(day.get()),
        )
        .ok_or(ParseError::InvalidDay {
            year: year.get(),
            month: month.get(),
            day: day.get(),
        })?;
        Ok(Self {
            year,
            month,
            day,
            naive,
        })
    }

    /// Builds a date from components that may overflow their natural range.
    ///
    /// Months roll the year over (`month = 13` is January of the next year,
    /// `month = 0` is December of the previous one) and days roll the month
    /// over (`day = 0` is the last day of the previous month).
    ///
    /// # Errors
    /// Returns `ParseError::OutOfRange` if the normalized date leaves years `1..=9999`.
    pub fn from_ymd_normalized(year: i32, month: i32, day: i32) -> Result<Self, ParseError> {
        let months = i64::from(year) * 12 + i64::from(month) - 1;
        let year = months.div_euclid(12);
        let out_of_range = || ParseError::OutOfRange(year);

        let first = i32::try_from(year)
            .ok()
            .zip(u32::try_from(months.rem_euclid(12) + 1).ok())
            .and_then(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1))
            .ok_or_else(out_of_range)?;
        let naive = shift_days(first, i64::from(day) - 1).ok_or_else(out_of_range)?;
        Self::try_from(naive)
    }

    /// Today's date on the local clock.
    ///
    /// # Errors
    /// Returns `ParseError::OutOfRange` if the system clock is outside years `1..=9999`.
    pub fn today() -> Result<Self, ParseError> {
        Self::try_from(chrono::Local::now().date_naive())
    }

    pub const fn year(&self) -> u16 {
        self.year.get()
    }

    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    pub const fn year_typed(&self) -> Year {
        self.year
    }

    pub const fn month_typed(&self) -> Month {
        self.month
    }

    pub const fn day_typed(&self) -> Day {
        self.day
    }

    /// Day of the week, 0 = Sunday
    pub fn weekday(&self) -> Weekday {
        self.naive.weekday().into()
    }

    /// # Errors
    /// Returns `ParseError::OutOfRange` if the result leaves years `1..=9999`.
    pub fn add_days(&self, days: i64) -> Result<Self, ParseError> {
        shift_days(self.naive, days)
            .ok_or(ParseError::OutOfRange(i64::from(self.year())))
            .and_then(Self::try_from)
    }

    /// Moves by whole months, placing the result on `preferred_day` clamped to
    /// the length of the target month.
    ///
    /// # Errors
    /// Returns `ParseError::OutOfRange` if the result leaves years `1..=9999`.
    pub fn add_months(&self, months: i32, preferred_day: u8) -> Result<Self, ParseError> {
        let step = Months::new(months.unsigned_abs());
        let shifted = if months < 0 {
            self.naive.checked_sub_months(step)
        } else {
            self.naive.checked_add_months(step)
        }
        .ok_or(ParseError::OutOfRange(i64::from(self.year())))?;

        // chrono already clamps to the end of the target month
        let target = Self::try_from(shifted)?;
        let last = days_in_month(target.year(), target.month());
        let day = Day::new(preferred_day.clamp(MIN_DAY, last), target.year, target.month)?;
        Self::from_parts(target.year, target.month, day)
    }

    /// # Errors
    /// Propagates [`CalendarDate::from_parts`], which accepts every day 1.
    pub fn first_of_month(&self) -> Result<Self, ParseError> {
        Self::from_parts(self.year, self.month, Day::first())
    }

    /// # Errors
    /// Propagates [`CalendarDate::from_parts`], which accepts every month's last day.
    pub fn last_of_month(&self) -> Result<Self, ParseError> {
        Self::from_parts(self.year, self.month, Day::last_of(self.year, self.month))
    }

    pub fn same_month(&self, other: &Self) -> bool {
        self.year == other.year && self.month == other.month
    }

    /// Helper to parse u16 with better error messages
    fn parse_u16(s: &str) -> Result<u16, ParseError> {
        s.parse::<u16>()
            .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
    }

    /// Helper to parse u8 with better error messages
    fn parse_u8(s: &str) -> Result<u8, ParseError> {
        s.parse::<u8>()
            .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
    }
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let step = Days::new(days.unsigned_abs());
    if days < 0 {
        date.checked_sub_days(step)
    } else {
        date.checked_add_days(step)
    }
}

impl FromStr for CalendarDate {
    type Err = ParseError;

    /// Parses the canonical `YYYY-MM-DD` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let parts: Vec<&str> = trimmed.split(DATE_SEPARATOR).map(str::trim).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(ParseError::InvalidFormat(format!(
                "Expected YYYY{DATE_SEPARATOR}MM{DATE_SEPARATOR}DD, found {trimmed}"
            )));
        };

        let year = Self::parse_u16(year)?;
        let month = Self::parse_u8(month)?;
        let day = Self::parse_u8(day)?;
        Self::new(year, month, day)
    }
}

impl TryFrom<NaiveDate> for CalendarDate {
    type Error = ParseError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        let out_of_range = || ParseError::OutOfRange(i64::from(value.year()));

        let year = u16::try_from(value.year())
            .ok()
            .and_then(|year| Year::new(year).ok())
            .ok_or_else(out_of_range)?;
        let month = u8::try_from(value.month())
            .map_err(|_| out_of_range())
            .and_then(Month::new)?;
        let day = u8::try_from(value.day())
            .map_err(|_| out_of_range())
            .and_then(|day| Day::new(day, year, month))?;
        Ok(Self {
            year,
            month,
            day,
            naive: value,
        })
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(value: CalendarDate) -> Self {
        value.naive
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
