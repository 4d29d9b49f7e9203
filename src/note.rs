use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MAX_NOTE_LEN: usize = 500;

/// Free-standing date-scoped annotation. Purely additive/display; never
/// affects the resolved pickup time. Multiple notes may share a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayNote {
    pub id: i64,
    pub date: NaiveDate,
    pub content: String,
}

impl DayNote {
    pub fn new(id: i64, date: NaiveDate, content: impl Into<String>) -> Self {
        Self {
            id,
            date,
            content: content.into(),
        }
    }
}
