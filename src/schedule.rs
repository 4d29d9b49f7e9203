use crate::timefmt::PickupTime;
use serde::{Deserialize, Serialize};

/// Recurring pickup entry for one weekday (1=Mon..5=Fri). At most one per
/// (student, weekday); the weekday is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub weekday: u8,
    /// Absent means "no recurring pickup that day".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<PickupTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WeeklySchedule {
    pub fn new(weekday: u8, pickup_time: Option<PickupTime>) -> Self {
        Self {
            weekday,
            pickup_time,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One row of a bulk schedule submission, before normalization. The pickup
/// time is kept as the raw wire string so empty submissions can be told apart
/// from malformed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub weekday: u8,
    #[serde(default)]
    pub pickup_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub fn weekday_name(weekday: u8) -> &'static str {
    match weekday {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        _ => "-",
    }
}
