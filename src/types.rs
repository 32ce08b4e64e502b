use crate::consts::{DAY_LEN, MONTH_LEN, YEAR_LEN};
use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// One of the three independently editable fields of a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    #[display(fmt = "day")]
    Day,
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "year")]
    Year,
}

impl Segment {
    /// All segments in rendering order
    pub const ALL: [Self; 3] = [Self::Day, Self::Month, Self::Year];

    /// Length a segment must reach before it takes part in a full date
    pub const fn complete_len(self) -> usize {
        match self {
            Self::Day => DAY_LEN,
            Self::Month => MONTH_LEN,
            Self::Year => YEAR_LEN,
        }
    }

    /// Segment that receives focus once this one is complete
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Day => Some(Self::Month),
            Self::Month => Some(Self::Year),
            Self::Year => None,
        }
    }
}

/// The three text segments of a date being entered.
///
/// Each segment may be empty or partially typed; nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentedDate {
    pub day: String,
    pub month: String,
    pub year: String,
}

impl SegmentedDate {
    pub fn new(day: impl Into<String>, month: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            month: month.into(),
            year: year.into(),
        }
    }

    /// Returns the text of a segment
    pub fn get(&self, segment: Segment) -> &str {
        match segment {
            Segment::Day => &self.day,
            Segment::Month => &self.month,
            Segment::Year => &self.year,
        }
    }

    /// Replaces the text of a segment
    pub fn set(&mut self, segment: Segment, value: impl Into<String>) {
        let slot = match segment {
            Segment::Day => &mut self.day,
            Segment::Month => &mut self.month,
            Segment::Year => &mut self.year,
        };
        *slot = value.into();
    }

    /// True when every segment is blank
    pub fn is_empty(&self) -> bool {
        self.day.is_empty() && self.month.is_empty() && self.year.is_empty()
    }

    /// True when every segment has reached its full length
    pub fn is_complete(&self) -> bool {
        Segment::ALL
            .iter()
            .all(|&segment| self.get(segment).len() >= segment.complete_len())
    }

    pub fn clear(&mut self) {
        self.day.clear();
        self.month.clear();
        self.year.clear();
    }
}

/// Hour and minute carried alongside the segments.
///
/// They are never edited through a segment; they only come from an external write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{hour:02}:{minute:02}")]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

/// Whether a write runs the synchronizer or just stores the value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WriteMode {
    /// Run the segment's chain and the completion check
    #[default]
    Notify,
    /// Store the value without triggering any downstream work
    Silent,
}
