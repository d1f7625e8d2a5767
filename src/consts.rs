/// Minimum valid year (inclusive)
pub const MIN_YEAR: u16 = 1;
/// Maximum valid year (inclusive)
pub const MAX_YEAR: u16 = 9999;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// First day of month, used for lower bounds
pub const MIN_DAY: u8 = 1;

/// Month number for January
pub const JANUARY: u8 = 1;
/// Month number for February
pub const FEBRUARY: u8 = 2;
/// Month number for December
pub const DECEMBER: u8 = 12;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u8; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: u16 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: u16 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: u16 = 400;

/// Days in a week, and columns in every grid row
pub const DAYS_PER_WEEK: u8 = 7;

/// Slots in the circular carousel
pub const CAROUSEL_SLOTS: u8 = 3;

/// Weekday labels starting from Sunday (weekday 0)
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Date component separator (ISO 8601 format)
pub const DATE_SEPARATOR: char = '-';
/// Separator between the first and last day of a week in picker text
pub const WEEK_TEXT_SEPARATOR: char = '~';

/// Default display format
pub const DEFAULT_FORMAT: &str = "YYYY-MM-DD";
/// Default lower bound for selectable days
pub const DEFAULT_MIN_DATE: &str = "1970-01-01";
/// Default upper bound for selectable days
pub const DEFAULT_MAX_DATE: &str = "2100-12-31";
/// Default first day of the week (Monday)
pub const DEFAULT_START_WEEKDAY: u8 = 1;
