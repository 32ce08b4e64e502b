//! Options recognized by the date input.
//!
//! Only [`DateInputConfig::min`] and [`DateInputConfig::fields`] influence the
//! engine; the rest is carried for the host's rendering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_LABELS;
use crate::prelude::*;
use crate::types::Segment;

/// Form-field appearance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    #[default]
    #[display(fmt = "fill")]
    Fill,
    #[display(fmt = "outline")]
    Outline,
}

/// Browser autocomplete hint for the segment inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Autocomplete {
    #[default]
    #[display(fmt = "on")]
    On,
    #[display(fmt = "off")]
    Off,
}

/// Which segments are rendered. Hidden segments keep their value semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Fields {
    pub day: bool,
    pub month: bool,
    pub year: bool,
}

impl Fields {
    pub const fn shows(&self, segment: Segment) -> bool {
        match segment {
            Segment::Day => self.day,
            Segment::Month => self.month,
            Segment::Year => self.year,
        }
    }

    /// First rendered segment, in day/month/year order
    pub fn first_shown(&self) -> Option<Segment> {
        Segment::ALL.into_iter().find(|&segment| self.shows(segment))
    }
}

impl Default for Fields {
    fn default() -> Self {
        Self {
            day: true,
            month: true,
            year: true,
        }
    }
}

/// Configuration of one date input.
///
/// Every key is optional when deserializing:
///
/// ```
/// # use segmented_date::DateInputConfig;
/// let config: DateInputConfig = serde_json::from_str(r#"{ "min": "2020-06-15" }"#).unwrap();
/// assert_eq!(config.labels, ["DD", "MM", "YYYY"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateInputConfig {
    /// Labels for day, month and year
    pub labels: [String; 3],
    /// Placeholders for day, month and year
    pub placeholders: [String; 3],
    pub fields: Fields,
    pub appearance: Appearance,
    pub autocomplete: Autocomplete,
    /// Earliest acceptable date; drives the segment floors
    pub min: Option<NaiveDate>,
    pub required: bool,
    pub disabled: bool,
    /// Placeholder of the form field as a whole
    pub placeholder: Option<String>,
    pub name: Option<String>,
}

impl Default for DateInputConfig {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS.map(str::to_owned),
            placeholders: Default::default(),
            fields: Fields::default(),
            appearance: Appearance::default(),
            autocomplete: Autocomplete::default(),
            min: None,
            required: false,
            disabled: false,
            placeholder: None,
            name: None,
        }
    }
}

impl DateInputConfig {
    /// Label shown for a segment
    pub fn label(&self, segment: Segment) -> &str {
        &self.labels[Self::index(segment)]
    }

    /// Placeholder shown for a segment
    pub fn segment_placeholder(&self, segment: Segment) -> &str {
        &self.placeholders[Self::index(segment)]
    }

    const fn index(segment: Segment) -> usize {
        match segment {
            Segment::Day => 0,
            Segment::Month => 1,
            Segment::Year => 2,
        }
    }
}
