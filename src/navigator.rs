//! Anchor date plus a 3-slot carousel pointer, stepped in lock-step.
//!
//! A circular carousel with three slots can scroll forever in either
//! direction: the slot after the current one is always "next" and the one
//! before it "previous", so the slot list never grows.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::prelude::*;
use crate::{
    CAROUSEL_SLOTS, CalendarDate, DAYS_PER_WEEK, DayCell, GridContext, ParseError, Weekday,
    build_month_grid, build_week_grid,
};

/// Which period a grid covers
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "week")]
    Week,
}

/// Slot pointer into the 3-slot carousel, always `0..=2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Into)]
#[display(fmt = "{_0}")]
pub struct RotationIndex(u8);

impl RotationIndex {
    /// Carousels start on the middle slot
    pub const MIDDLE: Self = Self(1);

    /// # Errors
    /// Returns `ParseError::InvalidFormat` if `value` is not a slot index.
    pub fn new(value: u8) -> Result<Self, ParseError> {
        if value >= CAROUSEL_SLOTS {
            return Err(ParseError::InvalidFormat(format!(
                "Carousel slot {value} (must be 0-{})",
                CAROUSEL_SLOTS - 1
            )));
        }
        Ok(Self(value))
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self((self.0 + 1) % CAROUSEL_SLOTS)
    }

    pub const fn previous(self) -> Self {
        Self((self.0 + CAROUSEL_SLOTS - 1) % CAROUSEL_SLOTS)
    }
}

impl Default for RotationIndex {
    fn default() -> Self {
        Self::MIDDLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Direction {
    #[display(fmt = "next")]
    Next,
    #[display(fmt = "previous")]
    Previous,
}

/// What caused a carousel slot change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwiperSource {
    /// A user gesture
    Touch,
    Autoplay,
    /// Set by us through the `current` binding
    #[default]
    #[serde(rename = "")]
    Programmatic,
}

/// Slot change reported by the host carousel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiperChange {
    pub current: u8,
    #[serde(default)]
    pub source: SwiperSource,
}

/// Snapshot of what is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewState {
    anchor: CalendarDate,
    rotation_index: RotationIndex,
    view_mode: ViewMode,
}

impl ViewState {
    pub const fn anchor(&self) -> CalendarDate {
        self.anchor
    }

    pub const fn rotation_index(&self) -> RotationIndex {
        self.rotation_index
    }

    pub const fn view_mode(&self) -> ViewMode {
        self.view_mode
    }
}

/// Owns the [`ViewState`] and is the only thing that changes it.
///
/// Navigation ignores any min/max window; bounds only disable cells. A step
/// that would leave years `1..=9999` is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    state: ViewState,
    // Day-of-month month steps aim for, so Jan 31 -> Feb 29 -> Jan 31 round-trips
    pinned_day: u8,
}

impl Navigator {
    pub const fn new(anchor: CalendarDate, view_mode: ViewMode) -> Self {
        Self {
            state: ViewState {
                anchor,
                rotation_index: RotationIndex::MIDDLE,
                view_mode,
            },
            pinned_day: anchor.day(),
        }
    }

    pub const fn state(&self) -> ViewState {
        self.state
    }

    pub const fn anchor(&self) -> CalendarDate {
        self.state.anchor
    }

    pub const fn rotation_index(&self) -> RotationIndex {
        self.state.rotation_index
    }

    pub const fn view_mode(&self) -> ViewMode {
        self.state.view_mode
    }

    /// One month or one week forward; the carousel advances one slot.
    pub fn go_next(&mut self) -> bool {
        self.step(Direction::Next)
    }

    /// One month or one week back; the carousel retreats one slot.
    pub fn go_previous(&mut self) -> bool {
        self.step(Direction::Previous)
    }

    /// Moves anchor and rotation together. Returns false, leaving both
    /// untouched, when the step would leave the calendar.
    pub fn step(&mut self, direction: Direction) -> bool {
        let anchor = match self.shifted_anchor(direction) {
            Ok(anchor) => anchor,
            Err(err) => {
                warn!(%direction, anchor = %self.state.anchor, %err, "navigation past calendar edge ignored");
                return false;
            }
        };

        if self.state.view_mode == ViewMode::Week {
            self.pinned_day = anchor.day();
        }
        self.state.anchor = anchor;
        self.state.rotation_index = match direction {
            Direction::Next => self.state.rotation_index.next(),
            Direction::Previous => self.state.rotation_index.previous(),
        };
        debug!(
            %direction,
            anchor = %self.state.anchor,
            rotation = %self.state.rotation_index,
            "navigated"
        );
        true
    }

    /// Discontinuous jump, e.g. from a date picker. The carousel stays put.
    pub fn jump_to(&mut self, target: CalendarDate) {
        self.state.anchor = target;
        self.pinned_day = target.day();
        debug!(anchor = %target, "jumped");
    }

    /// Interprets a slot change reported by a gesture: landing on the slot
    /// after ours is a step forward, anything else a step back.
    ///
    /// Returns `None` if the step fell off the calendar edge; the host
    /// carousel should then be moved back to [`Navigator::rotation_index`].
    pub fn on_external_swipe(&mut self, observed_index: u8) -> Option<Direction> {
        let direction = if observed_index == self.state.rotation_index.next().get() {
            Direction::Next
        } else {
            Direction::Previous
        };
        self.step(direction).then_some(direction)
    }

    /// Grid for the current anchor and view mode.
    ///
    /// # Errors
    /// Returns `ParseError::OutOfRange` if padding would leave years `1..=9999`.
    pub fn grid(&self, start: Weekday, ctx: &GridContext) -> Result<Vec<DayCell>, ParseError> {
        let anchor = self.state.anchor;
        let (year, month, day) = (
            i32::from(anchor.year()),
            i32::from(anchor.month()),
            i32::from(anchor.day()),
        );
        match self.state.view_mode {
            ViewMode::Month => build_month_grid(year, month, start, ctx),
            ViewMode::Week => build_week_grid(year, month, day, start, ctx),
        }
    }

    fn shifted_anchor(&self, direction: Direction) -> Result<CalendarDate, ParseError> {
        let sign = match direction {
            Direction::Next => 1,
            Direction::Previous => -1,
        };
        match self.state.view_mode {
            ViewMode::Month => self.state.anchor.add_months(sign, self.pinned_day),
            ViewMode::Week => self
                .state
                .anchor
                .add_days(i64::from(sign) * i64::from(DAYS_PER_WEEK)),
        }
    }
}
