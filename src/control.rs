use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::DateInputConfig;
use crate::consts::{ID_PREFIX, ISO_DATE_FORMAT, ISO_NAIVE_FORMATS, ISO_OUTPUT_FORMAT};
use crate::host::{ClickTarget, FocusOrigin, HostContext, StateChanges};
use crate::sync::{Edit, Effect, EngineState, Synchronizer, Transition, decompose};
use crate::types::{Segment, SegmentedDate, TimeOfDay, WriteMode};
use crate::validator::{FieldError, YearBound};

/// Error type for values written by the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The string is not an ISO-8601 date or date-time.
    #[error("Invalid date value: {0}")]
    InvalidDate(String),
}

/// Parses an ISO-8601 date, naive date-time or RFC 3339 timestamp.
///
/// Timestamps with an offset are converted to UTC.
///
/// # Errors
/// Returns `ValueError::InvalidDate` if none of the accepted forms match.
pub fn parse_iso(value: &str) -> Result<NaiveDateTime, ValueError> {
    let trimmed = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(date.naive_utc());
    }
    if let Some(date) = ISO_NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(date);
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| ValueError::InvalidDate(value.to_owned()))
}

/// Formats a committed date the way it is handed to the host
pub fn format_iso(date: NaiveDateTime) -> String {
    date.format(ISO_OUTPUT_FORMAT).to_string()
}

/// A day/month/year date input bound to a host form.
///
/// Keystrokes go through [`DateInput::input`], external values through
/// [`DateInput::write_value`], and picker selections through
/// [`DateInput::select_date`]. Dropping the input completes
/// [`DateInput::state_changes`], so no host listener runs afterwards.
pub struct DateInput {
    id: String,
    config: DateInputConfig,
    sync: Synchronizer,
    state: EngineState,
    host: HostContext,
    on_change: Box<dyn FnMut(Option<String>)>,
    on_touched: Box<dyn FnMut()>,
    state_changes: StateChanges,
    focused: bool,
    focused_segment: Option<Segment>,
    error_state: bool,
    described_by: String,
    placeholder: String,
    required: bool,
    disabled: bool,
    today: NaiveDate,
}

impl DateInput {
    pub fn new(config: DateInputConfig, host: HostContext) -> Self {
        let sync = Synchronizer::new(config.min);
        let mut state = EngineState::default();
        sync.refresh_floors(&mut state);

        Self {
            id: format!("{ID_PREFIX}-{}", Uuid::new_v4()),
            placeholder: config.placeholder.clone().unwrap_or_default(),
            required: config.required,
            disabled: config.disabled,
            config,
            sync,
            state,
            host,
            on_change: Box::new(|_| {}),
            on_touched: Box::new(|| {}),
            state_changes: StateChanges::new(),
            focused: false,
            focused_segment: None,
            error_state: false,
            described_by: String::new(),
            today: Local::now().date_naive(),
        }
    }

    /// Uses an id supplied by the host instead of a generated one
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Replaces the rule that keeps typed years in range
    #[must_use]
    pub fn with_year_bound(mut self, year_bound: impl YearBound + 'static) -> Self {
        self.sync = std::mem::take(&mut self.sync).with_year_bound(year_bound);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn config(&self) -> &DateInputConfig {
        &self.config
    }

    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    pub const fn segments(&self) -> &SegmentedDate {
        &self.state.segments
    }

    pub const fn state_changes(&self) -> &StateChanges {
        &self.state_changes
    }

    // --- value accessor ---

    /// Stores a value coming from the host without running the synchronizer.
    ///
    /// `None` or an empty string clears every segment.
    ///
    /// # Errors
    /// Returns `ValueError::InvalidDate` if the string cannot be parsed; the
    /// current segments are kept.
    pub fn write_value(&mut self, value: Option<&str>) -> Result<(), ValueError> {
        let parsed = match value.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => {
                Some(parse_iso(raw).inspect_err(|err| warn!(%err, "rejected external value"))?)
            }
            None => None,
        };
        let (segments, time) = parsed.map_or_else(
            || (SegmentedDate::default(), TimeOfDay::default()),
            decompose,
        );
        debug!(id = %self.id, ?segments, %time, "external value written");

        if parsed.is_some() && self.state.former.day.is_empty() {
            self.state.former = segments.clone();
        }
        self.state.segments = segments;
        self.state.time = time;
        self.state.assembled = parsed;
        self.sync.refresh_floors(&mut self.state);

        self.state_changes.notify();
        Ok(())
    }

    /// ISO-8601 string of the full date, once every segment is complete
    pub fn read_value(&self) -> Option<String> {
        self.value().map(format_iso)
    }

    /// The full date, once every segment is complete
    pub fn value(&self) -> Option<NaiveDateTime> {
        self.state.value()
    }

    pub fn register_on_change(&mut self, on_change: impl FnMut(Option<String>) + 'static) {
        self.on_change = Box::new(on_change);
    }

    pub fn register_on_touched(&mut self, on_touched: impl FnMut() + 'static) {
        self.on_touched = Box::new(on_touched);
    }

    pub fn set_disabled_state(&mut self, disabled: bool) {
        self.disabled = disabled;
        self.state_changes.notify();
    }

    /// Clears every segment and reports an empty value to the host
    pub fn reset(&mut self) {
        debug!(id = %self.id, "reset");
        self.state.segments.clear();
        self.state.former.clear();
        self.state.time = TimeOfDay::default();
        self.state.assembled = None;
        self.sync.refresh_floors(&mut self.state);

        (self.on_change)(None);
        self.state_changes.notify();
    }

    // --- editing ---

    /// Handles the raw text of a segment after a keystroke.
    ///
    /// Returns the effects that were applied, so the host can move focus.
    pub fn input(&mut self, segment: Segment, raw: &str) -> Vec<Effect> {
        if self.disabled {
            trace!(%segment, "input ignored while disabled");
            return Vec::new();
        }
        let transition = self.sync.update(&self.state, Edit::segment(segment, raw));
        self.apply(transition)
    }

    /// Writes a segment either through the synchronizer or silently
    pub fn set_segment(&mut self, segment: Segment, raw: &str, mode: WriteMode) -> Vec<Effect> {
        match mode {
            WriteMode::Notify => self.input(segment, raw),
            WriteMode::Silent => {
                self.state.segments.set(segment, raw);
                Vec::new()
            }
        }
    }

    /// Handles a date chosen in the calendar picker
    pub fn select_date(&mut self, date: NaiveDate) -> Vec<Effect> {
        if self.disabled {
            trace!(%date, "picker selection ignored while disabled");
            return Vec::new();
        }
        let transition = self.sync.update(&self.state, Edit::Picker(date));
        self.apply(transition)
    }

    /// Date the picker should show: the last committed one, or today
    pub fn picker_date(&self) -> NaiveDate {
        self.state
            .assembled
            .map_or(self.today, |assembled| assembled.date())
    }

    fn apply(&mut self, transition: Transition) -> Vec<Effect> {
        self.state = transition.state;
        for effect in &transition.effects {
            match *effect {
                Effect::Focus(segment) => self.focused_segment = Some(segment),
                Effect::Commit(date) => (self.on_change)(Some(format_iso(date))),
                Effect::Rollback(segment) | Effect::Revalidate(segment) => {
                    trace!(%segment, ?effect, "effect");
                }
            }
        }
        transition.effects
    }

    // --- validity ---

    pub const fn min(&self) -> Option<NaiveDate> {
        self.sync.min()
    }

    /// Installs a new minimum date and recomputes the floors
    pub fn set_min(&mut self, min: NaiveDate) {
        self.config.min = Some(min);
        self.sync.set_min(Some(min));
        self.sync.refresh_floors(&mut self.state);
    }

    /// Segments currently below their floor
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.state.field_errors()
    }

    pub fn invalid(&self) -> bool {
        !self.field_errors().is_empty()
    }

    /// Recomputes the error flag; notifies only when it flips
    pub fn do_check(&mut self) {
        let error_state = {
            let Some(control) = self.host.control.as_ref() else {
                return;
            };
            self.host.is_error_state()
                && (!control.has_value() || control.touched() || !self.focused)
        };

        if error_state != self.error_state {
            debug!(id = %self.id, error_state, "error state changed");
            self.error_state = error_state;
            self.state_changes.notify();
        }
    }

    pub const fn error_state(&self) -> bool {
        self.error_state
    }

    // --- form-field properties ---

    /// True when no segment holds any text
    pub fn empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn should_label_float(&self) -> bool {
        self.focused || !self.empty()
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    /// Segment that should hold input focus after the last effect
    pub const fn focused_segment(&self) -> Option<Segment> {
        self.focused_segment
    }

    /// Reports a focus change from the host's focus monitor.
    ///
    /// Losing focus marks the control as touched.
    pub fn focus_changed(&mut self, origin: Option<FocusOrigin>) {
        if self.focused && origin.is_none() {
            (self.on_touched)();
            self.focused_segment = None;
        }
        self.focused = origin.is_some();
        self.state_changes.notify();
    }

    /// Moves focus to the first rendered segment when the click missed every input
    pub fn on_container_click(&mut self, target: ClickTarget) -> Option<Segment> {
        match target {
            ClickTarget::Input(_) => None,
            ClickTarget::Container => {
                let segment = self.config.fields.first_shown()?;
                self.focused_segment = Some(segment);
                Some(segment)
            }
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
        self.state_changes.notify();
    }

    pub const fn required(&self) -> bool {
        self.required
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
        self.state_changes.notify();
    }

    pub const fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn described_by(&self) -> &str {
        &self.described_by
    }

    pub fn set_described_by_ids(&mut self, ids: &[&str]) {
        self.described_by = ids.join(" ");
    }
}

impl std::fmt::Debug for DateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateInput")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("focused", &self.focused)
            .field("error_state", &self.error_state)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl Drop for DateInput {
    fn drop(&mut self) {
        trace!(id = %self.id, "date input torn down");
        self.state_changes.complete();
    }
}
