use crate::exception::PickupException;
use crate::note::DayNote;
use crate::schedule::WeeklySchedule;
use crate::timefmt::PickupTime;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Resolved view of one calendar date. Derived, recomputed on every call,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayData {
    pub date: NaiveDate,
    /// 1=Mon..5=Fri; 0 for Sat/Sun, which never carry a schedule.
    pub weekday: u8,
    pub is_today: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_schedule: Option<WeeklySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<PickupException>,
    pub is_exception: bool,
    pub show_sick: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<PickupTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_notes: Option<String>,
    pub notes: Vec<DayNote>,
}

/// ISO weekday restricted to the business week: 1-5 for Mon-Fri, 0 otherwise.
pub fn business_weekday(date: NaiveDate) -> u8 {
    match date.weekday().number_from_monday() {
        wd @ 1..=5 => wd as u8,
        _ => 0,
    }
}

/// Merge the weekly schedule, date exceptions, sickness flag, and day notes
/// into the effective view of `date`.
///
/// Total and pure: safe on weekends, arbitrary past/future dates, and empty
/// input sets. Precedence for the effective time is sickness suppression,
/// then exception, then weekly schedule, then none. An exception with no
/// pickup time means "explicitly no pickup" and does not fall back to the
/// schedule. Sickness is a live status: it suppresses the time only when
/// `date` is `today`.
pub fn day_data(
    date: NaiveDate,
    today: NaiveDate,
    schedules: &[WeeklySchedule],
    exceptions: &[PickupException],
    is_sick: bool,
    notes: &[DayNote],
) -> DayData {
    let weekday = business_weekday(date);

    let base_schedule = if weekday == 0 {
        None
    } else {
        schedules.iter().find(|s| s.weekday == weekday).cloned()
    };
    let exception = exceptions
        .iter()
        .find(|e| e.exception_date == date)
        .cloned();
    let day_notes: Vec<DayNote> = notes.iter().filter(|n| n.date == date).cloned().collect();

    let is_today = date == today;
    let is_exception = exception.is_some();
    let show_sick = is_sick && is_today;

    let effective_time = if show_sick {
        None
    } else if let Some(exc) = &exception {
        exc.pickup_time
    } else {
        base_schedule.as_ref().and_then(|s| s.pickup_time)
    };

    let effective_notes = exception
        .as_ref()
        .map(|e| e.reason.trim())
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .or_else(|| base_schedule.as_ref().and_then(|s| s.notes.clone()));

    DayData {
        date,
        weekday,
        is_today,
        base_schedule,
        exception,
        is_exception,
        show_sick,
        effective_time,
        effective_notes,
        notes: day_notes,
    }
}
