//! Month and week grids of [`DayCell`]s.
//!
//! Builders are pure: the same anchor, start weekday and [`GridContext`]
//! always produce the same cells, so callers may memoize on those inputs.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{CalendarDate, DAYS_PER_WEEK, DateRange, ParseError, WEEKDAY_LABELS, Weekday};

/// Opaque caller data carried through to the renderer untouched
pub type Payload = serde_json::Value;

/// A caller-supplied annotation for one date, e.g. a dot indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub date: CalendarDate,
    #[serde(default)]
    pub payload: Payload,
}

impl Mark {
    pub const fn new(date: CalendarDate, payload: Payload) -> Self {
        Self { date, payload }
    }
}

/// One day as handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: CalendarDate,
    /// False for padding days borrowed from a neighbouring month
    pub in_current_period: bool,
    pub is_today: bool,
    pub is_selected: bool,
    /// Outside the configured `[min, max]` window
    pub is_disabled: bool,
    pub marks: Vec<Mark>,
    pub extra_info: Vec<Payload>,
}

/// Everything besides the anchor that decides how cells are flagged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridContext {
    pub today: Option<CalendarDate>,
    pub selected: Option<CalendarDate>,
    pub range: DateRange,
    pub marks: Vec<Mark>,
    pub extra_info: Vec<Mark>,
}

impl GridContext {
    fn cell(&self, date: CalendarDate, in_current_period: bool) -> DayCell {
        DayCell {
            date,
            in_current_period,
            is_today: self.today == Some(date),
            is_selected: self.selected == Some(date),
            is_disabled: !self.range.contains(&date),
            marks: self
                .marks
                .iter()
                .filter(|m| m.date == date)
                .cloned()
                .collect(),
            extra_info: self
                .extra_info
                .iter()
                .filter(|m| m.date == date)
                .map(|m| m.payload.clone())
                .collect(),
        }
    }

    fn cells(
        &self,
        first: CalendarDate,
        count: u8,
        in_period: impl Fn(&CalendarDate) -> bool,
    ) -> Result<Vec<DayCell>, ParseError> {
        (0..count)
            .map(|i| -> Result<DayCell, ParseError> {
                let date = first.add_days(i64::from(i))?;
                Ok(self.cell(date, in_period(&date)))
            })
            .collect()
    }
}

/// Builds the grid for one month, padded to whole weeks.
///
/// `month` may overflow: 13 is January of `year + 1`, 0 is December of
/// `year - 1`. Leading cells come from the end of the previous month so the
/// first column is `start`; trailing cells come from the next month until
/// the last row is complete.
///
/// # Errors
/// Returns `ParseError::OutOfRange` if the grid would leave years `1..=9999`.
pub fn build_month_grid(
    year: i32,
    month: i32,
    start: Weekday,
    ctx: &GridContext,
) -> Result<Vec<DayCell>, ParseError> {
    let first = CalendarDate::from_ymd_normalized(year, month, 1)?;
    let last = first.last_of_month()?;

    let lead = first.weekday().offset_from(start);
    let trail = DAYS_PER_WEEK - 1 - last.weekday().offset_from(start);
    let grid_start = first.add_days(-i64::from(lead))?;
    let total = lead + last.day() + trail;

    trace!(%first, lead, trail, "building month grid");
    ctx.cells(grid_start, total, |date| date.same_month(&first))
}

/// Builds the 7-day row containing `(year, month, day)`, starting on `start`.
///
/// Components normalize like [`CalendarDate::from_ymd_normalized`], so
/// `day + 7` past the end of a month lands in the next one.
///
/// # Errors
/// Returns `ParseError::OutOfRange` if the week would leave years `1..=9999`.
pub fn build_week_grid(
    year: i32,
    month: i32,
    day: i32,
    start: Weekday,
    ctx: &GridContext,
) -> Result<Vec<DayCell>, ParseError> {
    let anchor = CalendarDate::from_ymd_normalized(year, month, day)?;
    let offset = anchor.weekday().offset_from(start);
    let week_start = anchor.add_days(-i64::from(offset))?;

    trace!(%anchor, %week_start, "building week grid");
    ctx.cells(week_start, DAYS_PER_WEEK, |_| true)
}

/// Weekday header labels, rotated so index 0 is `start`.
pub fn weekday_labels(start: Weekday) -> [&'static str; 7] {
    std::array::from_fn(|i| WEEKDAY_LABELS[(usize::from(start.get()) + i) % WEEKDAY_LABELS.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn weekday(w: u8) -> Weekday {
        Weekday::new(w).unwrap()
    }

    #[test]
    fn test_february_2024_monday_start() {
        let grid = build_month_grid(2024, 2, Weekday::MONDAY, &GridContext::default()).unwrap();

        assert_eq!(grid.len(), 35);
        assert_eq!(grid[0].date, date("2024-01-29"));
        assert_eq!(grid[0].date.weekday(), Weekday::MONDAY);
        assert_eq!(grid[34].date, date("2024-03-03"));
        assert_eq!(grid[34].date.weekday(), Weekday::SUNDAY);

        let leap_day = grid.iter().find(|c| c.date == date("2024-02-29")).unwrap();
        assert!(leap_day.in_current_period);
        assert!(!grid[0].in_current_period);
        assert!(!grid[34].in_current_period);
    }

    #[test]
    fn test_month_grid_covers_month_exactly_once() {
        let ctx = GridContext::default();
        for year in [1900, 2000, 2023, 2024] {
            for month in 1..=12 {
                for start in 0..7 {
                    let grid = build_month_grid(year, month, weekday(start), &ctx).unwrap();
                    assert_eq!(grid.len() % 7, 0, "{year}-{month} start {start}");
                    assert_eq!(grid[0].date.weekday().get(), start);

                    let in_month: Vec<_> = grid.iter().filter(|c| c.in_current_period).collect();
                    let month_u8 = u8::try_from(month).unwrap();
                    let year_u16 = u16::try_from(year).unwrap();
                    assert_eq!(
                        in_month.len(),
                        usize::from(crate::days_in_month(year_u16, month_u8))
                    );
                    for (i, cell) in in_month.iter().enumerate() {
                        assert_eq!(cell.date.month(), month_u8);
                        assert_eq!(usize::from(cell.date.day()), i + 1);
                    }
                    for pair in grid.windows(2) {
                        assert_eq!(pair[0].date.add_days(1).unwrap(), pair[1].date);
                    }
                }
            }
        }
    }

    #[test]
    fn test_month_normalization() {
        let ctx = GridContext::default();
        let thirteen = build_month_grid(2024, 13, Weekday::SUNDAY, &ctx).unwrap();
        let january = build_month_grid(2025, 1, Weekday::SUNDAY, &ctx).unwrap();
        assert_eq!(thirteen, january);

        let zero = build_month_grid(2024, 0, Weekday::SUNDAY, &ctx).unwrap();
        let december = build_month_grid(2023, 12, Weekday::SUNDAY, &ctx).unwrap();
        assert_eq!(zero, december);
    }

    #[test]
    fn test_month_grid_without_padding() {
        // February 2015 starts on a Sunday and has exactly four weeks
        let grid = build_month_grid(2015, 2, Weekday::SUNDAY, &GridContext::default()).unwrap();
        assert_eq!(grid.len(), 28);
        assert!(grid.iter().all(|c| c.in_current_period));
    }

    #[test]
    fn test_week_grid_properties() {
        let ctx = GridContext::default();
        for day in 1..=31 {
            for start in 0..7 {
                let grid = build_week_grid(2024, 12, day, weekday(start), &ctx).unwrap();
                assert_eq!(grid.len(), 7);
                assert_eq!(grid[0].date.weekday().get(), start);
                for pair in grid.windows(2) {
                    assert_eq!(pair[0].date.add_days(1).unwrap(), pair[1].date);
                }
                let anchor = CalendarDate::new(2024, 12, u8::try_from(day).unwrap()).unwrap();
                assert!(grid.iter().any(|c| c.date == anchor));
            }
        }
    }

    #[test]
    fn test_week_grid_crosses_year() {
        let grid =
            build_week_grid(2024, 12, 31, Weekday::MONDAY, &GridContext::default()).unwrap();
        assert_eq!(grid[0].date, date("2024-12-30"));
        assert_eq!(grid[6].date, date("2025-01-05"));
        assert!(grid.iter().all(|c| c.in_current_period));
    }

    #[test]
    fn test_week_grid_day_overflow() {
        let ctx = GridContext::default();
        let overflow = build_week_grid(2024, 1, 31 + 7, Weekday::MONDAY, &ctx).unwrap();
        let direct = build_week_grid(2024, 2, 7, Weekday::MONDAY, &ctx).unwrap();
        assert_eq!(overflow, direct);

        let underflow = build_week_grid(2024, 3, 1 - 7, Weekday::MONDAY, &ctx).unwrap();
        let direct = build_week_grid(2024, 2, 23, Weekday::MONDAY, &ctx).unwrap();
        assert_eq!(underflow, direct);
    }

    #[test]
    fn test_cell_flags() {
        let ctx = GridContext {
            today: Some(date("2024-02-14")),
            selected: Some(date("2024-02-20")),
            range: DateRange::new(date("2024-02-05"), date("2024-02-25")).unwrap(),
            marks: vec![
                Mark::new(date("2024-02-14"), json!({"dot": "red"})),
                Mark::new(date("2024-02-14"), json!({"dot": "blue"})),
                Mark::new(date("2024-03-30"), json!("outside")),
            ],
            extra_info: vec![Mark::new(date("2024-02-20"), json!("payday"))],
        };
        let grid = build_month_grid(2024, 2, Weekday::MONDAY, &ctx).unwrap();
        let cell = |s: &str| grid.iter().find(|c| c.date == date(s)).unwrap();

        let valentines = cell("2024-02-14");
        assert!(valentines.is_today);
        assert!(!valentines.is_selected);
        assert_eq!(valentines.marks.len(), 2);

        let selected = cell("2024-02-20");
        assert!(selected.is_selected);
        assert!(!selected.is_today);
        assert_eq!(selected.extra_info, vec![json!("payday")]);

        assert!(cell("2024-02-04").is_disabled);
        assert!(!cell("2024-02-05").is_disabled);
        assert!(!cell("2024-02-25").is_disabled);
        assert!(cell("2024-02-26").is_disabled);
        assert!(grid.iter().filter(|c| c.is_today).count() == 1);
    }

    #[test]
    fn test_builders_are_deterministic() {
        let ctx = GridContext {
            selected: Some(date("2024-06-01")),
            ..GridContext::default()
        };
        assert_eq!(
            build_month_grid(2024, 6, Weekday::MONDAY, &ctx).unwrap(),
            build_month_grid(2024, 6, Weekday::MONDAY, &ctx).unwrap()
        );
        assert_eq!(
            build_week_grid(2024, 6, 1, Weekday::SATURDAY, &ctx).unwrap(),
            build_week_grid(2024, 6, 1, Weekday::SATURDAY, &ctx).unwrap()
        );
    }

    #[test]
    fn test_grid_at_calendar_edges() {
        let ctx = GridContext::default();
        // 0001-01-01 is a Monday, so a Monday-first grid needs no padding before it
        assert!(build_month_grid(1, 1, Weekday::MONDAY, &ctx).is_ok());
        assert!(matches!(
            build_month_grid(1, 1, Weekday::SUNDAY, &ctx),
            Err(ParseError::OutOfRange(0))
        ));
        assert!(matches!(
            build_month_grid(9999, 13, Weekday::SUNDAY, &ctx),
            Err(ParseError::OutOfRange(10000))
        ));
    }

    #[test]
    fn test_weekday_labels_rotate() {
        assert_eq!(
            weekday_labels(Weekday::SUNDAY),
            ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
        assert_eq!(
            weekday_labels(Weekday::MONDAY),
            ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        );
        assert_eq!(weekday_labels(Weekday::SATURDAY)[0], "Sat");
        assert_eq!(weekday_labels(Weekday::SATURDAY)[1], "Sun");
    }

    #[test]
    fn test_day_cell_serializes_for_renderer() {
        let ctx = GridContext {
            today: Some(date("2024-01-03")),
            ..GridContext::default()
        };
        let grid = build_week_grid(2024, 1, 3, Weekday::MONDAY, &ctx).unwrap();
        let value = serde_json::to_value(&grid[2]).unwrap();
        assert_eq!(value["date"], json!("2024-01-03"));
        assert_eq!(value["isToday"], json!(true));
        assert_eq!(value["inCurrentPeriod"], json!(true));
        assert_eq!(value["extraInfo"], json!([]));
    }
}
