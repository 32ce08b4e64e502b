//! Propagation rules between the day, month and year segments.
//!
//! The [`Synchronizer`] is a transition function: it takes the current
//! [`EngineState`] and one [`Edit`], and returns the next state together with
//! the [`Effect`]s the host has to carry out (moving focus, re-running
//! validity, committing a value). Silent writes never pass through here.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use tracing::{debug, trace, warn};

use crate::consts::YEAR_LEN;
use crate::types::{Segment, SegmentedDate, TimeOfDay};
use crate::validator::{
    self, DefaultYearBound, Floors, Keystroke, YearBound, clamp_day_to_month, day_floor,
    month_floor, numeric_value, year_floor,
};

/// Everything the engine tracks between two edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineState {
    /// Text currently shown in each segment
    pub segments: SegmentedDate,
    /// Last known good text per segment; rejected keystrokes return here
    pub former: SegmentedDate,
    /// Hour and minute from the last external write
    pub time: TimeOfDay,
    /// Last date committed or picked; this is what the picker shows
    pub assembled: Option<NaiveDateTime>,
    /// Lower bounds derived from the minimum date
    pub floors: Floors,
}

impl EngineState {
    /// True when no segment holds any text
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The full date, when every segment is complete
    pub fn value(&self) -> Option<NaiveDateTime> {
        assemble(&self.segments, self.time)
    }

    /// Checks every segment against its floor
    pub fn field_errors(&self) -> Vec<validator::FieldError> {
        Segment::ALL
            .iter()
            .filter_map(|&segment| {
                validator::check_floor(segment, self.segments.get(segment), self.floors.get(segment))
                    .err()
            })
            .collect()
    }
}

/// A change coming from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// New raw text typed into a segment
    Segment { segment: Segment, raw: String },
    /// A date chosen in the calendar picker
    Picker(NaiveDate),
}

impl Edit {
    pub fn segment(segment: Segment, raw: impl Into<String>) -> Self {
        Self::Segment {
            segment,
            raw: raw.into(),
        }
    }
}

/// Work the host carries out after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The keystroke was refused and the segment restored to its former text
    Rollback(Segment),
    /// Move input focus to this segment
    Focus(Segment),
    /// The floor of this segment changed; its validity must be re-read
    Revalidate(Segment),
    /// A full date was assembled and is the new committed value
    Commit(NaiveDateTime),
}

/// Next state and the effects produced on the way there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: EngineState,
    pub effects: Vec<Effect>,
}

impl Transition {
    /// The committed date, if this transition produced one
    pub fn committed(&self) -> Option<NaiveDateTime> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::Commit(date) => Some(*date),
            _ => None,
        })
    }
}

/// Applies edits to an [`EngineState`]
pub struct Synchronizer {
    min: Option<NaiveDate>,
    year_bound: Box<dyn YearBound>,
}

impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("min", &self.min)
            .finish_non_exhaustive()
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Synchronizer {
    /// Creates a synchronizer with the default year window
    pub fn new(min: Option<NaiveDate>) -> Self {
        Self {
            min,
            year_bound: Box::new(DefaultYearBound::new()),
        }
    }

    /// Replaces the year window rule
    #[must_use]
    pub fn with_year_bound(mut self, year_bound: impl YearBound + 'static) -> Self {
        self.year_bound = Box::new(year_bound);
        self
    }

    pub const fn min(&self) -> Option<NaiveDate> {
        self.min
    }

    pub fn set_min(&mut self, min: Option<NaiveDate>) {
        self.min = min;
    }

    /// Applies one edit and reports what changed
    pub fn update(&self, state: &EngineState, edit: Edit) -> Transition {
        let mut next = state.clone();
        let mut effects = Vec::new();

        match edit {
            Edit::Segment { segment, raw } => {
                trace!(%segment, %raw, "segment edit");
                let accepted = match segment {
                    Segment::Day => Self::edit_day(&mut next, &raw, &mut effects),
                    Segment::Month => self.edit_month(&mut next, &raw, &mut effects),
                    Segment::Year => self.edit_year(&mut next, &raw, &mut effects),
                };
                if accepted || next.segments != state.segments {
                    Self::complete(&mut next, &mut effects);
                }
            }
            Edit::Picker(date) => self.pick(&mut next, date, &mut effects),
        }

        Transition {
            state: next,
            effects,
        }
    }

    /// Recomputes every floor from the minimum date and the current segments
    pub fn refresh_floors(&self, state: &mut EngineState) {
        let Some(min) = self.min else {
            state.floors = Floors::default();
            return;
        };
        state.floors.year = Some(year_floor(min));
        if state.segments.year.len() >= YEAR_LEN {
            state.floors.day = day_floor(min, &state.segments.year, &state.segments.month);
            state.floors.month = month_floor(min, &state.segments.year);
        }
    }

    fn rollback(state: &mut EngineState, segment: Segment, effects: &mut Vec<Effect>) {
        let former = state.former.get(segment).to_owned();
        debug!(%segment, %former, "keystroke rejected");
        state.segments.set(segment, former);
        effects.push(Effect::Rollback(segment));
    }

    fn edit_day(state: &mut EngineState, raw: &str, effects: &mut Vec<Effect>) -> bool {
        let Keystroke::Accepted { value, complete } = validator::filter_day(raw) else {
            Self::rollback(state, Segment::Day, effects);
            return false;
        };
        state.segments.day.clone_from(&value);
        state.former.day = value;
        if complete {
            effects.push(Effect::Focus(Segment::Month));
        }
        true
    }

    fn edit_month(&self, state: &mut EngineState, raw: &str, effects: &mut Vec<Effect>) -> bool {
        let Keystroke::Accepted { value, complete } = validator::filter_month(raw) else {
            Self::rollback(state, Segment::Month, effects);
            return false;
        };
        state.segments.month.clone_from(&value);
        state.former.month.clone_from(&value);
        if complete {
            effects.push(Effect::Focus(Segment::Year));
        }

        if let Some(day) = clamp_day_to_month(&state.segments.day, &value) {
            trace!(%day, month = %value, "day clamped to month length");
            state.segments.day.clone_from(&day);
            state.former.day = day;
        }

        if let Some(min) = self.min {
            if value.len() >= 2 && state.segments.year.len() >= YEAR_LEN {
                state.floors.day = day_floor(min, &state.segments.year, &value);
                effects.push(Effect::Revalidate(Segment::Day));
            }
        }
        true
    }

    fn edit_year(&self, state: &mut EngineState, raw: &str, effects: &mut Vec<Effect>) -> bool {
        let Keystroke::Accepted { value, .. } = validator::filter_year(raw) else {
            Self::rollback(state, Segment::Year, effects);
            return false;
        };
        state.segments.year = value;
        self.year_bound.apply(raw, &mut state.segments);
        state.former.year.clone_from(&state.segments.year);

        if let Some(min) = self.min {
            if state.segments.year.len() >= YEAR_LEN {
                state.floors.day = day_floor(min, &state.segments.year, &state.segments.month);
                state.floors.month = month_floor(min, &state.segments.year);
                effects.push(Effect::Revalidate(Segment::Day));
                effects.push(Effect::Revalidate(Segment::Month));
            }
        }
        true
    }

    fn pick(&self, state: &mut EngineState, date: NaiveDate, effects: &mut Vec<Effect>) {
        debug!(%date, "date picked");
        state.segments = decompose_date(date);
        state.former = state.segments.clone();
        self.refresh_floors(state);
        if self.min.is_some() {
            effects.push(Effect::Revalidate(Segment::Day));
            effects.push(Effect::Revalidate(Segment::Month));
        }
        Self::complete(state, effects);
    }

    fn complete(state: &mut EngineState, effects: &mut Vec<Effect>) {
        if !state.segments.is_complete() {
            return;
        }
        match assemble(&state.segments, state.time) {
            Some(date) => {
                debug!(%date, "date committed");
                state.assembled = Some(date);
                effects.push(Effect::Commit(date));
            }
            None => warn!(segments = ?state.segments, "complete segments do not form a date"),
        }
    }
}

/// Builds the full date from complete segments.
///
/// Out-of-range parts roll over the way a calendar constructor does: day 30 of
/// February becomes the first or second of March.
pub fn assemble(segments: &SegmentedDate, time: TimeOfDay) -> Option<NaiveDateTime> {
    if !segments.is_complete() {
        return None;
    }
    let year = i32::try_from(numeric_value(&segments.year)?).ok()?;
    let month = numeric_value(&segments.month)?;
    let day = numeric_value(&segments.day)?;

    let months = month.checked_sub(1)?;
    let year = year.checked_add(i32::try_from(months.div_euclid(12)).ok()?)?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let date = first.checked_add_signed(Duration::try_days(day.checked_sub(1)?)?)?;
    date.and_hms_opt(time.hour, time.minute, 0)
}

/// Splits a date into zero-padded segments
pub fn decompose_date(date: NaiveDate) -> SegmentedDate {
    SegmentedDate::new(
        format!("{:02}", date.day()),
        format!("{:02}", date.month()),
        format!("{:04}", date.year()),
    )
}

/// Splits a date-time into zero-padded segments and its hour and minute
pub fn decompose(date: NaiveDateTime) -> (SegmentedDate, TimeOfDay) {
    let time = TimeOfDay {
        hour: date.hour(),
        minute: date.minute(),
    };
    (decompose_date(date.date()), time)
}
