//! The calendar component handle: configuration, navigation and the data a
//! renderer needs for the header, weekday row and carousel slots.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::prelude::*;
use crate::{
    CAROUSEL_SLOTS, CalendarConfig, CalendarDate, CalendarOptions, ConfigError, DateFormat,
    DayCell, Direction, GridContext, Navigator, ParseError, SwiperChange, SwiperSource, ViewMode,
    ViewState, WEEK_TEXT_SEPARATOR, weekday_labels,
};

/// Callback fired when an enabled day is clicked
pub type DayClickHandler = Box<dyn FnMut(&DayCell)>;
type PickerTextGenerator = Box<dyn Fn(&str) -> String>;

/// Granularity of the native date picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerFields {
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "day")]
    Day,
}

/// Picker trigger label plus the values handed to the native picker.
///
/// `text` follows the configured format; `value`, `start` and `end` are ISO
/// (`YYYY-MM` or `YYYY-MM-DD`), which is what native pickers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerState {
    pub text: String,
    pub value: String,
    pub fields: PickerFields,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub show_arrows: bool,
    pub picker: PickerState,
}

/// One carousel slot. Only the slot under the rotation index carries days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub index: u8,
    pub days: Option<Vec<DayCell>>,
}

pub struct Calendar {
    options: CalendarOptions,
    navigator: Navigator,
    today: CalendarDate,
    on_day_click: Option<DayClickHandler>,
    picker_text_generator: Option<PickerTextGenerator>,
}

impl Calendar {
    /// Builds a calendar anchored on `currentView`, or today on the local clock.
    ///
    /// # Errors
    /// Returns `ConfigError` for malformed options or an unusable system clock.
    pub fn new(config: &CalendarConfig) -> Result<Self, ConfigError> {
        let today = CalendarDate::today().map_err(ConfigError::Clock)?;
        Self::with_today(config, today)
    }

    /// Like [`Calendar::new`] with an explicit notion of today.
    ///
    /// # Errors
    /// Returns `ConfigError` for malformed options.
    pub fn with_today(config: &CalendarConfig, today: CalendarDate) -> Result<Self, ConfigError> {
        Ok(Self::from_options(config.validate()?, today))
    }

    pub fn from_options(options: CalendarOptions, today: CalendarDate) -> Self {
        let anchor = options.current_view.unwrap_or(today);
        debug!(%anchor, view = %options.view, "calendar created");
        Self {
            navigator: Navigator::new(anchor, options.view),
            options,
            today,
            on_day_click: None,
            picker_text_generator: None,
        }
    }

    pub const fn options(&self) -> &CalendarOptions {
        &self.options
    }

    pub const fn state(&self) -> ViewState {
        self.navigator.state()
    }

    pub const fn anchor(&self) -> CalendarDate {
        self.navigator.anchor()
    }

    pub const fn today(&self) -> CalendarDate {
        self.today
    }

    pub fn go_next(&mut self) -> bool {
        self.navigator.go_next()
    }

    pub fn go_previous(&mut self) -> bool {
        self.navigator.go_previous()
    }

    /// Handles a carousel slot change. Only user gestures navigate; changes
    /// we caused by moving `current` ourselves are echoes and are ignored.
    ///
    /// Returns the step taken, or `None` if nothing moved.
    pub fn on_swiper_change(&mut self, change: SwiperChange) -> Option<Direction> {
        if change.source != SwiperSource::Touch {
            debug!(current = change.current, source = ?change.source, "swiper change ignored");
            return None;
        }
        self.navigator.on_external_swipe(change.current)
    }

    /// Jumps to the date chosen in the native picker.
    ///
    /// Accepts the picker's own `YYYY-MM-DD` / `YYYY-MM` output as well as
    /// either form of the configured format. Anything else is rejected and the
    /// anchor is left alone.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidDate` if `value` is not a recognizable date.
    pub fn on_picker_change(&mut self, value: &str) -> Result<(), ConfigError> {
        let iso = DateFormat::iso();
        let format = &self.options.format;
        let target = format
            .parse(value)
            .or_else(|_| iso.parse(value))
            .or_else(|_| format.parse_month(value))
            .or_else(|_| iso.parse_month(value));

        match target {
            Ok(target) => {
                self.navigator.jump_to(target);
                Ok(())
            }
            Err(source) => {
                warn!(value, %source, "rejected picker value");
                Err(ConfigError::InvalidDate {
                    option: "picker",
                    value: value.to_owned(),
                    source,
                })
            }
        }
    }

    pub fn set_selected_date(&mut self, selected: Option<CalendarDate>) {
        self.options.selected_date = selected;
    }

    pub fn set_on_day_click(&mut self, handler: impl FnMut(&DayCell) + 'static) {
        self.on_day_click = Some(Box::new(handler));
    }

    pub fn set_picker_text_generator(&mut self, generator: impl Fn(&str) -> String + 'static) {
        self.picker_text_generator = Some(Box::new(generator));
    }

    /// Forwards a click to the day-click callback. Disabled days don't fire.
    pub fn click_day(&mut self, cell: &DayCell) -> bool {
        if cell.is_disabled {
            return false;
        }
        match self.on_day_click.as_mut() {
            Some(handler) => {
                handler(cell);
                true
            }
            None => false,
        }
    }

    pub fn grid_context(&self) -> GridContext {
        GridContext {
            today: Some(self.today),
            selected: self.options.selected_date,
            range: self.options.range,
            marks: self.options.marks.clone(),
            extra_info: self.options.extra_info.clone(),
        }
    }

    /// Cells for the period currently on screen.
    ///
    /// # Errors
    /// Returns `ParseError::OutOfRange` at the very edges of the calendar.
    pub fn days(&self) -> Result<Vec<DayCell>, ParseError> {
        self.navigator
            .grid(self.options.start_weekday, &self.grid_context())
    }

    /// Carousel contents: three slots with days only under the rotation
    /// index, or one static slot when the carousel is off.
    ///
    /// # Errors
    /// Returns `ParseError::OutOfRange` at the very edges of the calendar.
    pub fn slots(&self) -> Result<Vec<Slot>, ParseError> {
        let days = self.days()?;
        if !self.options.is_swiper {
            return Ok(vec![Slot {
                index: 0,
                days: Some(days),
            }]);
        }

        let current = self.navigator.rotation_index().get();
        Ok((0..CAROUSEL_SLOTS)
            .map(|index| Slot {
                index,
                days: (index == current).then(|| days.clone()),
            })
            .collect())
    }

    pub fn weekday_labels(&self) -> [&'static str; 7] {
        weekday_labels(self.options.start_weekday)
    }

    /// Header bar contents, `None` when the controller is hidden.
    ///
    /// # Errors
    /// Returns `ParseError::OutOfRange` at the very edges of the calendar.
    pub fn header(&self) -> Result<Option<Header>, ParseError> {
        if self.options.hide_controller {
            return Ok(None);
        }
        Ok(Some(Header {
            show_arrows: !self.options.hide_arrow,
            picker: self.picker()?,
        }))
    }

    /// # Errors
    /// Returns `ParseError::OutOfRange` at the very edges of the calendar.
    pub fn picker(&self) -> Result<PickerState, ParseError> {
        let format = &self.options.format;
        let iso = DateFormat::iso();
        let (text, value, fields) = match self.navigator.view_mode() {
            ViewMode::Month => (
                format.format_month(&self.anchor()),
                iso.format_month(&self.anchor()),
                PickerFields::Month,
            ),
            ViewMode::Week => {
                let days = self.days()?;
                let (first, last) = match (days.first(), days.last()) {
                    (Some(first), Some(last)) => (first.date, last.date),
                    _ => (self.anchor(), self.anchor()),
                };
                let text = format!(
                    "{}{WEEK_TEXT_SEPARATOR}{}",
                    format.format(&first),
                    format.format(&last)
                );
                (text, iso.format(&first), PickerFields::Day)
            }
        };

        let text = match &self.picker_text_generator {
            Some(generate) => generate(&text),
            None => text,
        };

        Ok(PickerState {
            text,
            value,
            fields,
            start: iso.format(&self.options.range.min()),
            end: iso.format(&self.options.range.max()),
        })
    }
}

impl fmt::Debug for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calendar")
            .field("options", &self.options)
            .field("navigator", &self.navigator)
            .field("today", &self.today)
            .field("on_day_click", &self.on_day_click.is_some())
            .field(
                "picker_text_generator",
                &self.picker_text_generator.is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mark, Weekday};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn calendar(config: serde_json::Value) -> Calendar {
        let config: CalendarConfig = serde_json::from_value(config).unwrap();
        Calendar::with_today(&config, date("2024-02-14")).unwrap()
    }

    fn touch(current: u8) -> SwiperChange {
        SwiperChange {
            current,
            source: SwiperSource::Touch,
        }
    }

    #[test]
    fn test_anchors_on_today_by_default() {
        let cal = calendar(json!({}));
        assert_eq!(cal.anchor(), date("2024-02-14"));
        assert_eq!(cal.state().rotation_index().get(), 1);
        assert_eq!(cal.state().view_mode(), ViewMode::Month);

        let days = cal.days().unwrap();
        assert_eq!(days.len(), 35);
        let today: Vec<_> = days.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date("2024-02-14"));
    }

    #[test]
    fn test_current_view_overrides_today() {
        let cal = calendar(json!({"currentView": "2023-07-04"}));
        assert_eq!(cal.anchor(), date("2023-07-04"));
        assert!(cal.days().unwrap().iter().all(|c| !c.is_today));
    }

    #[test]
    fn test_malformed_current_view_is_rejected() {
        let config = CalendarConfig {
            current_view: Some("2023-7".to_owned()),
            ..CalendarConfig::default()
        };
        assert!(Calendar::with_today(&config, date("2024-02-14")).is_err());
    }

    #[test]
    fn test_arrows_navigate_and_rotate() {
        let mut cal = calendar(json!({"currentView": "2024-12-15"}));
        cal.go_next();
        assert_eq!(cal.anchor(), date("2025-01-15"));
        assert_eq!(cal.state().rotation_index().get(), 2);

        cal.go_previous();
        cal.go_previous();
        assert_eq!(cal.anchor(), date("2024-11-15"));
        assert_eq!(cal.state().rotation_index().get(), 0);
    }

    #[test]
    fn test_swipe_at_calendar_edge_is_not_reported() {
        let mut cal = calendar(json!({"currentView": "9999-12-20"}));
        let before = cal.state();
        assert_eq!(cal.on_swiper_change(touch(2)), None);
        assert_eq!(cal.state(), before);
        assert!(!cal.go_next());
    }

    #[test]
    fn test_only_touch_swipes_navigate() {
        let mut cal = calendar(json!({}));
        let echo = SwiperChange {
            current: 2,
            source: SwiperSource::Programmatic,
        };
        assert_eq!(cal.on_swiper_change(echo), None);
        assert_eq!(cal.anchor(), date("2024-02-14"));

        let autoplay = SwiperChange {
            current: 2,
            source: SwiperSource::Autoplay,
        };
        assert_eq!(cal.on_swiper_change(autoplay), None);

        assert_eq!(cal.on_swiper_change(touch(2)), Some(Direction::Next));
        assert_eq!(cal.anchor(), date("2024-03-14"));
        assert_eq!(cal.on_swiper_change(touch(1)), Some(Direction::Previous));
        assert_eq!(cal.anchor(), date("2024-02-14"));
    }

    #[test]
    fn test_picker_jump_keeps_rotation() {
        let mut cal = calendar(json!({}));
        cal.go_next();
        let rotation = cal.state().rotation_index();

        cal.on_picker_change("2030-06").unwrap();
        assert_eq!(cal.anchor(), date("2030-06-01"));
        assert_eq!(cal.state().rotation_index(), rotation);

        cal.on_picker_change("2031-01-20").unwrap();
        assert_eq!(cal.anchor(), date("2031-01-20"));
    }

    #[test]
    fn test_picker_accepts_configured_format() {
        let mut cal = calendar(json!({
            "format": "DD/MM/YYYY",
            "minDate": "01/01/1970",
            "maxDate": "31/12/2100"
        }));
        cal.on_picker_change("25/12/2024").unwrap();
        assert_eq!(cal.anchor(), date("2024-12-25"));
        cal.on_picker_change("2025-03-02").unwrap();
        assert_eq!(cal.anchor(), date("2025-03-02"));
    }

    #[test]
    fn test_malformed_picker_value_leaves_anchor() {
        let mut cal = calendar(json!({}));
        let before = cal.state();
        let err = cal.on_picker_change("not a date").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDate { option: "picker", .. }));
        assert!(cal.on_picker_change("2024-02-30").is_err());
        assert_eq!(cal.state(), before);
    }

    #[test]
    fn test_month_header() {
        let cal = calendar(json!({}));
        let header = cal.header().unwrap().unwrap();
        assert!(header.show_arrows);
        assert_eq!(header.picker.text, "2024-02");
        assert_eq!(header.picker.value, "2024-02");
        assert_eq!(header.picker.fields, PickerFields::Month);
        assert_eq!(header.picker.start, "1970-01-01");
        assert_eq!(header.picker.end, "2100-12-31");
    }

    #[test]
    fn test_day_first_month_header_round_trips() {
        let mut cal = calendar(json!({
            "format": "DD/MM/YYYY",
            "minDate": "01/01/1970",
            "maxDate": "31/12/2100",
            "currentView": "07/03/2024"
        }));
        let picker = cal.picker().unwrap();
        assert_eq!(picker.text, "03/2024");
        assert_eq!(picker.value, "2024-03");
        assert_eq!(picker.start, "1970-01-01");
        assert_eq!(picker.end, "2100-12-31");

        cal.go_next();
        cal.on_picker_change(&picker.value).unwrap();
        assert_eq!(cal.anchor(), date("2024-03-01"));

        cal.go_next();
        cal.on_picker_change(&picker.text).unwrap();
        assert_eq!(cal.anchor(), date("2024-03-01"));
    }

    #[test]
    fn test_week_header_spans_week() {
        let cal = calendar(json!({"view": "week"}));
        let picker = cal.picker().unwrap();
        assert_eq!(picker.text, "2024-02-12~2024-02-18");
        assert_eq!(picker.value, "2024-02-12");
        assert_eq!(picker.fields, PickerFields::Day);
    }

    #[test]
    fn test_picker_text_generator() {
        let mut cal = calendar(json!({}));
        cal.set_picker_text_generator(|text| format!("< {text} >"));
        assert_eq!(cal.picker().unwrap().text, "< 2024-02 >");
        assert_eq!(cal.picker().unwrap().value, "2024-02");
    }

    #[test]
    fn test_hidden_controller_and_arrows() {
        let cal = calendar(json!({"hideController": true}));
        assert_eq!(cal.header().unwrap(), None);

        let cal = calendar(json!({"hideArrow": true}));
        assert!(!cal.header().unwrap().unwrap().show_arrows);
    }

    #[test]
    fn test_swiper_slots_follow_rotation() {
        let mut cal = calendar(json!({}));
        let slots = cal.slots().unwrap();
        assert_eq!(slots.len(), 3);
        assert!(slots[0].days.is_none());
        assert!(slots[1].days.is_some());
        assert!(slots[2].days.is_none());

        cal.go_next();
        let slots = cal.slots().unwrap();
        assert!(slots[2].days.is_some());
        assert_eq!(
            slots[2].days.as_ref().unwrap()[0].date,
            date("2024-02-26")
        );
    }

    #[test]
    fn test_static_grid_has_single_slot() {
        let cal = calendar(json!({"isSwiper": false, "view": "week"}));
        let slots = cal.slots().unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].days.as_ref().unwrap().len(), 7);
    }

    #[test]
    fn test_weekday_labels_follow_start() {
        assert_eq!(calendar(json!({})).weekday_labels()[0], "Mon");
        assert_eq!(
            calendar(json!({"startWeekDay": 0})).weekday_labels()[0],
            "Sun"
        );
    }

    #[test]
    fn test_day_click_skips_disabled_days() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let mut cal = calendar(json!({"minDate": "2024-02-10", "maxDate": "2024-02-20"}));
        let sink = Rc::clone(&clicked);
        cal.set_on_day_click(move |cell| sink.borrow_mut().push(cell.date));

        let days = cal.days().unwrap();
        let find = |s: &str| days.iter().find(|c| c.date == date(s)).unwrap().clone();

        assert!(cal.click_day(&find("2024-02-14")));
        assert!(!cal.click_day(&find("2024-02-09")));
        assert!(cal.click_day(&find("2024-02-20")));
        assert_eq!(*clicked.borrow(), vec![date("2024-02-14"), date("2024-02-20")]);
    }

    #[test]
    fn test_click_without_handler() {
        let mut cal = calendar(json!({}));
        let days = cal.days().unwrap();
        assert!(!cal.click_day(&days[10]));
    }

    #[test]
    fn test_selection_and_marks_reach_cells() {
        let mut cal = calendar(json!({
            "selectedDate": "2024-02-01",
            "marks": [{"date": "2024-02-03", "payload": "dot"}]
        }));
        let days = cal.days().unwrap();
        let cell = |s: &str| days.iter().find(|c| c.date == date(s)).unwrap();
        assert!(cell("2024-02-01").is_selected);
        assert_eq!(
            cell("2024-02-03").marks,
            vec![Mark::new(date("2024-02-03"), json!("dot"))]
        );

        cal.set_selected_date(Some(date("2024-02-05")));
        let days = cal.days().unwrap();
        assert_eq!(
            days.iter().filter(|c| c.is_selected).map(|c| c.date).collect::<Vec<_>>(),
            vec![date("2024-02-05")]
        );
    }

    #[test]
    fn test_week_view_steps_by_seven_days() {
        let mut cal = calendar(json!({"view": "week", "startWeekDay": 0}));
        assert_eq!(cal.days().unwrap()[0].date.weekday(), Weekday::SUNDAY);
        cal.go_next();
        assert_eq!(cal.anchor(), date("2024-02-21"));
        assert_eq!(cal.days().unwrap()[0].date, date("2024-02-18"));
    }
}
