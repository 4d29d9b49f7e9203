use chrono::{Datelike, Duration, Local, NaiveDate};

pub const BUSINESS_DAYS: usize = 5;

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let from_monday = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(from_monday)
}

/// The five business dates (Mon-Fri) of the week `week_offset` whole weeks
/// from the week containing `today`. Offset 0 is the current week, negative
/// offsets page backwards. Always length 5, chronological, no gaps; any i64
/// offset is valid.
pub fn week_days(today: NaiveDate, week_offset: i64) -> Vec<NaiveDate> {
    let monday = week_start(today) + Duration::weeks(week_offset);
    (0..BUSINESS_DAYS as i64)
        .map(|day| monday + Duration::days(day))
        .collect()
}

/// `week_days` anchored on the local calendar date.
pub fn current_week_days(week_offset: i64) -> Vec<NaiveDate> {
    week_days(Local::now().date_naive(), week_offset)
}
