use crate::timefmt::PickupTime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Date-specific override of one student's pickup. At most one per
/// (student, date); re-creating for an occupied date updates in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupException {
    pub id: i64,
    pub exception_date: NaiveDate,
    /// Absent means "explicitly no pickup this day" — never a fallback to
    /// the weekly schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<PickupTime>,
    /// Displayed note and audit trail.
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PickupException {
    pub fn new(
        id: i64,
        exception_date: NaiveDate,
        pickup_time: Option<PickupTime>,
        reason: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            exception_date,
            pickup_time,
            reason: reason.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
