//! Segment synchronization and validation for day/month/year date inputs.
//!
//! A date is typed into three text segments. This crate decides what each
//! keystroke does to them: which input is refused, which value is clamped,
//! when focus moves on, how the day follows the month, which segments fall
//! below a minimum date, and when the three segments become one committed date.
//!
//! ```
//! use segmented_date::{DateInput, DateInputConfig, HostContext, Segment};
//!
//! let mut input = DateInput::new(DateInputConfig::default(), HostContext::detached());
//! input.input(Segment::Day, "31");
//! input.input(Segment::Month, "2");
//! assert_eq!(input.segments().day, "29");
//! assert_eq!(input.segments().month, "02");
//! ```

mod config;
mod consts;
mod control;
mod host;
mod prelude;
mod sync;
mod types;
mod validator;

pub use config::{Appearance, Autocomplete, DateInputConfig, Fields};
pub use consts::*;
pub use control::{DateInput, ValueError, format_iso, parse_iso};
pub use host::{
    ClickTarget, DefaultErrorStateMatcher, ErrorStateMatcher, FocusOrigin, HostContext,
    HostControl, ParentForm, StateChanges, Subscription,
};
pub use sync::{Edit, Effect, EngineState, Synchronizer, Transition, assemble, decompose};
pub use types::{Segment, SegmentedDate, TimeOfDay, WriteMode};
pub use validator::{
    DefaultYearBound, FieldError, Floors, Keystroke, YearBound, accepts_keystroke, check_floor,
    clamp_day_to_month, day_ceiling, day_floor, filter_day, filter_month, filter_year,
    month_floor, numeric_value, year_floor,
};
