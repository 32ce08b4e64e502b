//! Keystroke filtering, per-segment clamps and min-date floors.
//!
//! Everything here is a pure function of segment text. The synchronizer decides
//! when each rule runs and what happens to its result.

use crate::consts::{
    CLAMP_NEGATIVE, DAY_LEADING_DIGIT_MAX, FEBRUARY, FEBRUARY_DAY_CEILING, MAX_DAY, MAX_MONTH,
    MONTH_PAD_FROM, REPEATED_ZERO, THIRTY_DAY_CEILING, THIRTY_DAY_MONTHS, YEAR_LEN, YEAR_LOOKBACK,
    YEAR_TYPING_THRESHOLD,
};
use crate::prelude::*;
use crate::types::{Segment, SegmentedDate};
use chrono::{Datelike, Local, NaiveDate};

/// Parses segment text the way a numeric input reads it.
///
/// The empty string reads as zero. An optional leading `-` followed by ASCII
/// digits is numeric; decimal points, exponents, whitespace and signs elsewhere
/// are not. Values too large for `i64` saturate.
pub fn numeric_value(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return Some(0);
    }
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// True when a keystroke leaves the segment holding a plain integer
pub fn accepts_keystroke(raw: &str) -> bool {
    numeric_value(raw).is_some()
}

/// Result of running raw segment text through its filter and clamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    /// Input is refused; the segment returns to its last known good value
    Rejected,
    /// Input is kept, possibly corrected. `complete` means focus may move on.
    Accepted { value: String, complete: bool },
}

impl Keystroke {
    fn accept(value: impl Into<String>, complete: bool) -> Self {
        Self::Accepted {
            value: value.into(),
            complete,
        }
    }
}

/// Filters and clamps a day keystroke.
///
/// A single digit above 3 cannot be followed by a second digit without passing
/// 31, so it is padded and treated as complete straight away.
pub fn filter_day(raw: &str) -> Keystroke {
    if raw.contains(REPEATED_ZERO) {
        return Keystroke::Rejected;
    }
    let Some(value) = numeric_value(raw) else {
        return Keystroke::Rejected;
    };

    if value > MAX_DAY {
        return Keystroke::accept(MAX_DAY.to_string(), true);
    }
    if value < 0 || raw.starts_with('-') {
        return Keystroke::accept(CLAMP_NEGATIVE, true);
    }
    if value > DAY_LEADING_DIGIT_MAX || raw.len() >= 2 {
        if value < 10 && !raw.contains('0') {
            return Keystroke::accept(format!("0{raw}"), true);
        }
        return Keystroke::accept(raw, true);
    }
    Keystroke::accept(raw, false)
}

/// Filters and clamps a month keystroke.
///
/// Typing over a full month leaves three characters; the middle one is the
/// stale digit and is dropped before the month is checked again.
pub fn filter_month(raw: &str) -> Keystroke {
    if raw.contains(REPEATED_ZERO) {
        return Keystroke::Rejected;
    }
    if numeric_value(raw).is_none() {
        return Keystroke::Rejected;
    }
    if raw.len() > 2 {
        let bytes = raw.as_bytes();
        let truncated: String = [bytes[0] as char, bytes[2] as char].iter().collect();
        return filter_month(&truncated);
    }

    let value = numeric_value(raw).unwrap_or_default();
    let month = if value > MAX_MONTH {
        MAX_MONTH.to_string()
    } else if value < 0 || raw.starts_with('-') {
        CLAMP_NEGATIVE.to_owned()
    } else if (MONTH_PAD_FROM..10).contains(&value) && !raw.contains('0') {
        format!("0{raw}")
    } else {
        raw.to_owned()
    };
    let complete = month.len() == 2;
    Keystroke::Accepted {
        value: month,
        complete,
    }
}

/// Filters a year keystroke. A year may not start with `0`.
pub fn filter_year(raw: &str) -> Keystroke {
    if numeric_value(raw).is_none() {
        return Keystroke::Rejected;
    }
    if raw.starts_with('0') {
        return Keystroke::accept("", false);
    }
    Keystroke::accept(raw, raw.len() >= YEAR_LEN)
}

/// Highest day allowed by the month segment, when the month caps it below 31.
///
/// February always allows 29; leap years are not considered.
pub fn day_ceiling(month: &str) -> Option<i64> {
    if month == FEBRUARY {
        Some(FEBRUARY_DAY_CEILING)
    } else if THIRTY_DAY_MONTHS.contains(&month) {
        Some(THIRTY_DAY_CEILING)
    } else {
        None
    }
}

/// Returns the corrected day when it exceeds what the month allows
pub fn clamp_day_to_month(day: &str, month: &str) -> Option<String> {
    let ceiling = day_ceiling(month)?;
    let value = numeric_value(day)?;
    (value > ceiling).then(|| ceiling.to_string())
}

/// Lower bounds currently installed on each segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Floors {
    pub day: Option<i64>,
    pub month: Option<i64>,
    pub year: Option<i64>,
}

impl Floors {
    pub const fn get(&self, segment: Segment) -> Option<i64> {
        match segment {
            Segment::Day => self.day,
            Segment::Month => self.month,
            Segment::Year => self.year,
        }
    }
}

/// Day floor for the typed year and month.
///
/// The floor is lifted once the date is past the minimum's month.
pub fn day_floor(min: NaiveDate, year: &str, month: &str) -> Option<i64> {
    let year = numeric_value(year).unwrap_or_default();
    let month = numeric_value(month).unwrap_or_default();
    let min_year = i64::from(min.year());
    let min_month = i64::from(min.month());

    if year > min_year || (year == min_year && month > min_month) {
        None
    } else {
        Some(i64::from(min.day()))
    }
}

/// Month floor for the typed year; lifted once the year is past the minimum's.
pub fn month_floor(min: NaiveDate, year: &str) -> Option<i64> {
    let year = numeric_value(year).unwrap_or_default();
    if year > i64::from(min.year()) {
        None
    } else {
        Some(i64::from(min.month()))
    }
}

/// Year floor installed as soon as a minimum date is known
pub fn year_floor(min: NaiveDate) -> i64 {
    i64::from(min.year())
}

/// A segment value the host form should treat as invalid
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum FieldError {
    #[display(fmt = "{segment} {actual} is below the minimum of {min}")]
    BelowMinimum {
        segment: Segment,
        min: i64,
        actual: i64,
    },
}

impl std::error::Error for FieldError {}

/// Checks a segment against its floor.
///
/// Empty or non-numeric text is never below a floor; only typed numbers are.
pub fn check_floor(segment: Segment, value: &str, floor: Option<i64>) -> Result<(), FieldError> {
    let Some(min) = floor else {
        return Ok(());
    };
    if value.is_empty() {
        return Ok(());
    }
    match numeric_value(value) {
        Some(actual) if actual < min => Err(FieldError::BelowMinimum {
            segment,
            min,
            actual,
        }),
        _ => Ok(()),
    }
}

/// Strategy that keeps the year segment inside an acceptable window.
///
/// It receives the raw keystroke text, before the leading-zero rule cleared it,
/// and mutable access to all segments.
pub trait YearBound {
    fn apply(&self, raw: &str, segments: &mut SegmentedDate);
}

impl<F> YearBound for F
where
    F: Fn(&str, &mut SegmentedDate),
{
    fn apply(&self, raw: &str, segments: &mut SegmentedDate) {
        self(raw, segments);
    }
}

/// Clamps years to the window `current - 120 ..= current`.
///
/// Years of four digits or fewer up to 1000 are treated as still being typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultYearBound {
    current_year: i32,
}

impl DefaultYearBound {
    /// Uses the local calendar year
    pub fn new() -> Self {
        Self::with_current_year(Local::now().year())
    }

    pub const fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    pub const fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Earliest year the bound lets through
    pub const fn earliest(&self) -> i32 {
        self.current_year - YEAR_LOOKBACK
    }
}

impl Default for DefaultYearBound {
    fn default() -> Self {
        Self::new()
    }
}

impl YearBound for DefaultYearBound {
    fn apply(&self, raw: &str, segments: &mut SegmentedDate) {
        let Some(value) = numeric_value(raw) else {
            return;
        };
        let current = i64::from(self.current_year);
        let earliest = i64::from(self.earliest());

        if value > current {
            segments.year = current.to_string();
        } else if value < 0 || (value > YEAR_TYPING_THRESHOLD && value < earliest) {
            segments.year = earliest.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(value: &str, complete: bool) -> Keystroke {
        Keystroke::Accepted {
            value: value.to_owned(),
            complete,
        }
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value(""), Some(0));
        assert_eq!(numeric_value("07"), Some(7));
        assert_eq!(numeric_value("-1"), Some(-1));
        assert_eq!(numeric_value("99999999999999999999"), Some(i64::MAX));
        assert_eq!(numeric_value("1.5"), None);
        assert_eq!(numeric_value("1e3"), None);
        assert_eq!(numeric_value("-"), None);
        assert_eq!(numeric_value(" 1"), None);
        assert_eq!(numeric_value("+1"), None);
        assert_eq!(numeric_value("1-"), None);
    }

    #[test]
    fn test_accepts_keystroke() {
        assert!(accepts_keystroke("12"));
        assert!(accepts_keystroke(""));
        assert!(!accepts_keystroke("1."));
        assert!(!accepts_keystroke("e"));
        assert!(!accepts_keystroke("a1"));
    }

    #[test]
    fn test_filter_day_cases() {
        struct TestCase {
            raw: &'static str,
            expected: Keystroke,
            description: &'static str,
        }

        let cases = [
            TestCase {
                raw: "1",
                expected: accepted("1", false),
                description: "leading digit that can grow",
            },
            TestCase {
                raw: "3",
                expected: accepted("3", false),
                description: "3 may still become 30 or 31",
            },
            TestCase {
                raw: "4",
                expected: accepted("04", true),
                description: "4 cannot take a second digit",
            },
            TestCase {
                raw: "15",
                expected: accepted("15", true),
                description: "two digits in range",
            },
            TestCase {
                raw: "07",
                expected: accepted("07", true),
                description: "already padded",
            },
            TestCase {
                raw: "32",
                expected: accepted("31", true),
                description: "above 31",
            },
            TestCase {
                raw: "99",
                expected: accepted("31", true),
                description: "far above 31",
            },
            TestCase {
                raw: "-1",
                expected: accepted("01", true),
                description: "negative",
            },
            TestCase {
                raw: "-0",
                expected: accepted("01", true),
                description: "negative zero",
            },
            TestCase {
                raw: "00",
                expected: Keystroke::Rejected,
                description: "repeated zero",
            },
            TestCase {
                raw: "1.",
                expected: Keystroke::Rejected,
                description: "decimal point",
            },
            TestCase {
                raw: "",
                expected: accepted("", false),
                description: "cleared",
            },
            TestCase {
                raw: "0",
                expected: accepted("0", false),
                description: "single zero waits for a second digit",
            },
        ];

        for case in &cases {
            assert_eq!(
                filter_day(case.raw),
                case.expected,
                "day {:?}: {}",
                case.raw,
                case.description
            );
        }
    }

    #[test]
    fn test_filter_day_never_exceeds_31() {
        for day in 1..=31 {
            let digits = day.to_string();
            let mut last = Keystroke::Rejected;
            for end in 1..=digits.len() {
                last = filter_day(&digits[..end]);
                if let Keystroke::Accepted { value, .. } = &last {
                    assert!(numeric_value(value).unwrap() <= 31);
                }
            }
            if day <= DAY_LEADING_DIGIT_MAX {
                assert_eq!(last, accepted(&digits, false), "day {day}");
            } else {
                assert_eq!(last, accepted(&format!("{day:02}"), true), "day {day}");
            }
        }
    }

    #[test]
    fn test_filter_month_cases() {
        struct TestCase {
            raw: &'static str,
            expected: Keystroke,
            description: &'static str,
        }

        let cases = [
            TestCase {
                raw: "1",
                expected: accepted("1", false),
                description: "may become 10-12",
            },
            TestCase {
                raw: "0",
                expected: accepted("0", false),
                description: "waits for a second digit",
            },
            TestCase {
                raw: "2",
                expected: accepted("02", true),
                description: "padded",
            },
            TestCase {
                raw: "9",
                expected: accepted("09", true),
                description: "padded",
            },
            TestCase {
                raw: "12",
                expected: accepted("12", true),
                description: "upper bound",
            },
            TestCase {
                raw: "13",
                expected: accepted("12", true),
                description: "clamped",
            },
            TestCase {
                raw: "-1",
                expected: accepted("01", true),
                description: "negative",
            },
            TestCase {
                raw: "-0",
                expected: accepted("01", true),
                description: "negative zero",
            },
            TestCase {
                raw: "123",
                expected: accepted("12", true),
                description: "middle digit dropped, 13 clamped",
            },
            TestCase {
                raw: "00",
                expected: Keystroke::Rejected,
                description: "repeated zero",
            },
            TestCase {
                raw: "1e",
                expected: Keystroke::Rejected,
                description: "exponent",
            },
        ];

        for case in &cases {
            assert_eq!(
                filter_month(case.raw),
                case.expected,
                "month {:?}: {}",
                case.raw,
                case.description
            );
        }
    }

    #[test]
    fn test_filter_month_replace_by_typing() {
        // "05" selected and overtyped with "1" at the front leaves "105"
        assert_eq!(filter_month("105"), accepted("12", true));
        // "11" with "0" typed in front leaves "011"
        assert_eq!(filter_month("011"), accepted("01", true));
        // the dropped middle digit can expose a repeated zero
        assert_eq!(filter_month("010"), Keystroke::Rejected);
    }

    #[test]
    fn test_filter_month_always_in_range() {
        for raw in ["1", "01", "2", "10", "11", "12", "13", "19", "99", "-1", "-12", "123"] {
            if let Keystroke::Accepted {
                value,
                complete: true,
            } = filter_month(raw)
            {
                let month = numeric_value(&value).unwrap();
                assert!((1..=12).contains(&month), "{raw} -> {value}");
                assert_eq!(value.len(), 2, "{raw} -> {value}");
            }
        }
    }

    #[test]
    fn test_filter_year() {
        assert_eq!(filter_year("2"), accepted("2", false));
        assert_eq!(filter_year("2024"), accepted("2024", true));
        assert_eq!(filter_year("0"), accepted("", false));
        assert_eq!(filter_year("0199"), accepted("", false));
        assert_eq!(filter_year("20.4"), Keystroke::Rejected);
        assert_eq!(filter_year("abcd"), Keystroke::Rejected);
    }

    #[test]
    fn test_day_ceiling() {
        assert_eq!(day_ceiling("02"), Some(29));
        for month in ["04", "06", "09", "11"] {
            assert_eq!(day_ceiling(month), Some(30), "month {month}");
        }
        for month in ["01", "03", "05", "07", "08", "10", "12", "", "2"] {
            assert_eq!(day_ceiling(month), None, "month {month}");
        }
    }

    #[test]
    fn test_clamp_day_to_month() {
        assert_eq!(clamp_day_to_month("31", "02"), Some("29".to_owned()));
        assert_eq!(clamp_day_to_month("30", "02"), Some("29".to_owned()));
        assert_eq!(clamp_day_to_month("29", "02"), None);
        assert_eq!(clamp_day_to_month("31", "04"), Some("30".to_owned()));
        assert_eq!(clamp_day_to_month("30", "11"), None);
        assert_eq!(clamp_day_to_month("31", "01"), None);
        assert_eq!(clamp_day_to_month("", "02"), None);
    }

    fn min_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()
    }

    #[test]
    fn test_day_floor() {
        let min = min_date();
        assert_eq!(day_floor(min, "2020", "06"), Some(15));
        assert_eq!(day_floor(min, "2020", "05"), Some(15));
        assert_eq!(day_floor(min, "2019", "12"), Some(15));
        assert_eq!(day_floor(min, "2020", "07"), None);
        assert_eq!(day_floor(min, "2021", "01"), None);
    }

    #[test]
    fn test_month_floor() {
        let min = min_date();
        assert_eq!(month_floor(min, "2020"), Some(6));
        assert_eq!(month_floor(min, "2019"), Some(6));
        assert_eq!(month_floor(min, "2021"), None);
        assert_eq!(year_floor(min), 2020);
    }

    #[test]
    fn test_check_floor() {
        assert_eq!(check_floor(Segment::Month, "07", Some(6)), Ok(()));
        assert_eq!(check_floor(Segment::Month, "06", Some(6)), Ok(()));
        assert_eq!(check_floor(Segment::Month, "", Some(6)), Ok(()));
        assert_eq!(check_floor(Segment::Month, "05", None), Ok(()));
        assert_eq!(
            check_floor(Segment::Month, "05", Some(6)),
            Err(FieldError::BelowMinimum {
                segment: Segment::Month,
                min: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_field_error_display() {
        let error = FieldError::BelowMinimum {
            segment: Segment::Day,
            min: 15,
            actual: 3,
        };
        assert_eq!(error.to_string(), "day 3 is below the minimum of 15");
    }

    #[test]
    fn test_default_year_bound_cases() {
        struct TestCase {
            raw: &'static str,
            expected: &'static str,
            description: &'static str,
        }

        let bound = DefaultYearBound::with_current_year(2026);
        let cases = [
            TestCase {
                raw: "2027",
                expected: "2026",
                description: "future year",
            },
            TestCase {
                raw: "1850",
                expected: "1906",
                description: "more than 120 years back",
            },
            TestCase {
                raw: "-5",
                expected: "1906",
                description: "negative",
            },
            TestCase {
                raw: "1990",
                expected: "1990",
                description: "inside window",
            },
            TestCase {
                raw: "199",
                expected: "199",
                description: "still typing",
            },
            TestCase {
                raw: "1000",
                expected: "1000",
                description: "threshold is exclusive",
            },
        ];

        for case in &cases {
            let mut segments = SegmentedDate::new("", "", case.raw);
            bound.apply(case.raw, &mut segments);
            assert_eq!(
                segments.year, case.expected,
                "year {}: {}",
                case.raw, case.description
            );
        }
    }

    #[test]
    fn test_closure_year_bound() {
        let bound = |raw: &str, segments: &mut SegmentedDate| {
            if raw == "1999" {
                segments.year = "2000".to_owned();
            }
        };
        let mut segments = SegmentedDate::new("", "", "1999");
        bound.apply("1999", &mut segments);
        assert_eq!(segments.year, "2000");
    }

    #[test]
    fn test_default_year_bound_earliest() {
        let bound = DefaultYearBound::with_current_year(2026);
        assert_eq!(bound.current_year(), 2026);
        assert_eq!(bound.earliest(), 1906);
    }
}
