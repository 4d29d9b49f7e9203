use crate::note::MAX_NOTE_LEN;
use crate::schedule::{ScheduleEntry, WeeklySchedule};
use crate::timefmt::PickupTime;
use std::collections::HashSet;
use std::fmt;

pub const MAX_REASON_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().is_empty() {
        return Err(ValidationError::new("exception reason must not be empty"));
    }
    if reason.chars().count() > MAX_REASON_LEN {
        return Err(ValidationError::new(format!(
            "exception reason exceeds {MAX_REASON_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_note_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::new("note content must not be empty"));
    }
    if content.chars().count() > MAX_NOTE_LEN {
        return Err(ValidationError::new(format!(
            "note content exceeds {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(())
}

/// Normalize a bulk schedule submission: entries without a pickup time are
/// dropped (not stored, not submitted), the rest must carry a parseable time
/// and a unique business weekday. Returns the kept rows and the dropped count.
pub fn normalize_schedule_entries(
    entries: &[ScheduleEntry],
) -> Result<(Vec<WeeklySchedule>, usize), ValidationError> {
    let mut kept = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;
    let mut seen_weekdays = HashSet::new();

    for entry in entries {
        if !(1..=5).contains(&entry.weekday) {
            return Err(ValidationError::new(format!(
                "weekday {} is outside the business week (expected 1-5)",
                entry.weekday
            )));
        }
        if !seen_weekdays.insert(entry.weekday) {
            return Err(ValidationError::new(format!(
                "duplicate schedule entry for weekday {}",
                entry.weekday
            )));
        }
        let time = PickupTime::parse_optional(entry.pickup_time.as_deref())
            .map_err(|err| ValidationError::new(err.to_string()))?;
        match time {
            None => dropped += 1,
            Some(time) => {
                let mut row = WeeklySchedule::new(entry.weekday, Some(time));
                row.notes = entry
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                kept.push(row);
            }
        }
    }

    kept.sort_by_key(|row| row.weekday);
    Ok((kept, dropped))
}

/// Stored rows loaded from disk go through the same weekday/uniqueness checks
/// as fresh submissions.
pub fn validate_stored_schedules(rows: &[WeeklySchedule]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for row in rows {
        if !(1..=5).contains(&row.weekday) {
            return Err(ValidationError::new(format!(
                "stored schedule has weekday {} outside 1-5",
                row.weekday
            )));
        }
        if !seen.insert(row.weekday) {
            return Err(ValidationError::new(format!(
                "stored schedule has duplicate weekday {}",
                row.weekday
            )));
        }
    }
    Ok(())
}
