use serde::{Deserialize, Serialize};

use crate::{
    CalendarDate, DEFAULT_FORMAT, DEFAULT_MAX_DATE, DEFAULT_MIN_DATE, DEFAULT_START_WEEKDAY,
    DateFormat, DateRange, Mark, ParseError, RangeError, ViewMode, Weekday,
};

/// Options as an embedding application supplies them.
///
/// Dates are strings in `format`; marks and extra info use canonical
/// `YYYY-MM-DD` dates. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarConfig {
    pub view: ViewMode,
    pub start_week_day: u8,
    pub format: String,
    pub min_date: String,
    pub max_date: String,
    pub selected_date: Option<String>,
    /// Initial anchor, today if unset
    pub current_view: Option<String>,
    pub marks: Vec<Mark>,
    pub extra_info: Vec<Mark>,
    /// Three-slot carousel, or a single static grid when false
    pub is_swiper: bool,
    pub hide_controller: bool,
    pub hide_arrow: bool,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            view: ViewMode::Month,
            start_week_day: DEFAULT_START_WEEKDAY,
            format: DEFAULT_FORMAT.to_owned(),
            min_date: DEFAULT_MIN_DATE.to_owned(),
            max_date: DEFAULT_MAX_DATE.to_owned(),
            selected_date: None,
            current_view: None,
            marks: Vec::new(),
            extra_info: Vec::new(),
            is_swiper: true,
            hide_controller: false,
            hide_arrow: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {option} {value:?}: {source}")]
    InvalidDate {
        option: &'static str,
        value: String,
        source: ParseError,
    },

    #[error("Unsupported format pattern: {0}")]
    InvalidFormat(#[source] ParseError),

    #[error("Invalid startWeekDay: {0}")]
    InvalidStartWeekday(#[source] ParseError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("System clock outside the supported calendar: {0}")]
    Clock(#[source] ParseError),
}

/// A [`CalendarConfig`] with every string parsed and checked.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarOptions {
    pub view: ViewMode,
    pub start_weekday: Weekday,
    pub format: DateFormat,
    pub range: DateRange,
    pub selected_date: Option<CalendarDate>,
    pub current_view: Option<CalendarDate>,
    pub marks: Vec<Mark>,
    pub extra_info: Vec<Mark>,
    pub is_swiper: bool,
    pub hide_controller: bool,
    pub hide_arrow: bool,
}

impl CalendarConfig {
    /// Parses every option, failing on the first malformed one.
    ///
    /// # Errors
    /// Returns `ConfigError` naming the offending option.
    pub fn validate(&self) -> Result<CalendarOptions, ConfigError> {
        let format = DateFormat::new(&self.format).map_err(ConfigError::InvalidFormat)?;
        let start_weekday =
            Weekday::new(self.start_week_day).map_err(ConfigError::InvalidStartWeekday)?;

        let parse = |option: &'static str, value: &str| {
            format
                .parse(value)
                .map_err(|source| ConfigError::InvalidDate {
                    option,
                    value: value.to_owned(),
                    source,
                })
        };
        let parse_opt = |option: &'static str, value: Option<&str>| {
            value.map(|v| parse(option, v)).transpose()
        };

        let range = DateRange::new(
            parse("minDate", &self.min_date)?,
            parse("maxDate", &self.max_date)?,
        )?;
        let selected_date = parse_opt("selectedDate", self.selected_date.as_deref())?;
        let current_view = parse_opt("currentView", self.current_view.as_deref())?;

        Ok(CalendarOptions {
            view: self.view,
            start_weekday,
            format,
            range,
            selected_date,
            current_view,
            marks: self.marks.clone(),
            extra_info: self.extra_info.clone(),
            is_swiper: self.is_swiper,
            hide_controller: self.hide_controller,
            hide_arrow: self.hide_arrow,
        })
    }
}

impl TryFrom<&CalendarConfig> for CalendarOptions {
    type Error = ConfigError;

    fn try_from(config: &CalendarConfig) -> Result<Self, Self::Error> {
        config.validate()
    }
}
