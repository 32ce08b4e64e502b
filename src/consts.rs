/// Characters a day segment needs before it counts towards a full date
pub const DAY_LEN: usize = 2;
/// Characters a month segment needs before it counts towards a full date
pub const MONTH_LEN: usize = 2;
/// Characters a year segment needs before it counts towards a full date
pub const YEAR_LEN: usize = 4;

/// Largest value a day segment may hold
pub const MAX_DAY: i64 = 31;
/// Largest value a month segment may hold
pub const MAX_MONTH: i64 = 12;

/// Highest single digit after which no second day digit can follow
pub const DAY_LEADING_DIGIT_MAX: i64 = 3;
/// Smallest single-digit month that gets zero-padded
pub const MONTH_PAD_FROM: i64 = 2;

/// Segment value a negative day or month is clamped to
pub const CLAMP_NEGATIVE: &str = "01";
/// Substring a day or month segment may never contain
pub const REPEATED_ZERO: &str = "00";

/// Month segment for February
pub const FEBRUARY: &str = "02";
/// Day ceiling applied in February (leap years are not modelled)
pub const FEBRUARY_DAY_CEILING: i64 = 29;
/// Month segments that only have 30 days
pub const THIRTY_DAY_MONTHS: [&str; 4] = ["04", "06", "09", "11"];
/// Day ceiling applied in 30-day months
pub const THIRTY_DAY_CEILING: i64 = 30;

/// How many years back from the current one a typed year may reach
pub const YEAR_LOOKBACK: i32 = 120;
/// Years at or below this are still being typed and are left alone
pub const YEAR_TYPING_THRESHOLD: i64 = 1000;

/// Default segment labels (day, month, year)
pub const DEFAULT_LABELS: [&str; 3] = ["DD", "MM", "YYYY"];

/// Prefix of generated control ids
pub const ID_PREFIX: &str = "date-input";

/// Format of the committed ISO-8601 value (UTC, millisecond precision)
pub const ISO_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
/// Accepted naive date-time inputs, tried in order
pub const ISO_NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
/// Accepted date-only input
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
