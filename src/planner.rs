use crate::exception::PickupException;
use crate::note::DayNote;
use crate::resolver::{self, DayData};
use crate::schedule::{ScheduleEntry, WeeklySchedule};
use crate::student::Student;
use crate::timefmt::PickupTime;
use crate::validation::{
    self, ValidationError, normalize_schedule_entries, validate_stored_schedules,
};
use crate::week;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum PlannerError {
    StudentNotFound(i64),
    ExceptionNotFound { student_id: i64, exception_id: i64 },
    NoteNotFound { student_id: i64, note_id: i64 },
    Validation(ValidationError),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::StudentNotFound(id) => write!(f, "student {id} not found"),
            PlannerError::ExceptionNotFound {
                student_id,
                exception_id,
            } => write!(
                f,
                "exception {exception_id} not found for student {student_id}"
            ),
            PlannerError::NoteNotFound {
                student_id,
                note_id,
            } => write!(f, "note {note_id} not found for student {student_id}"),
            PlannerError::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlannerError {}

impl From<ValidationError> for PlannerError {
    fn from(value: ValidationError) -> Self {
        PlannerError::Validation(value)
    }
}

/// Everything the planner holds for one student; also the wire shape of the
/// snapshot fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSnapshot {
    pub student: Student,
    pub schedules: Vec<WeeklySchedule>,
    pub exceptions: Vec<PickupException>,
    pub notes: Vec<DayNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    pub scheduled_count: usize,
    pub exception_count: usize,
    pub no_pickup_count: usize,
    pub sick_today: bool,
}

impl WeekSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("scheduled={}", self.scheduled_count));
        if self.exception_count > 0 {
            parts.push(format!("exceptions={}", self.exception_count));
        }
        if self.no_pickup_count > 0 {
            parts.push(format!("no_pickup={}", self.no_pickup_count));
        }
        if self.sick_today {
            parts.push("sick_today".to_string());
        }
        parts.join(", ")
    }
}

/// One resolved Mon-Fri window for a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekView {
    pub student_id: i64,
    pub week_offset: i64,
    pub week_start: NaiveDate,
    pub days: Vec<DayData>,
    pub summary: WeekSummary,
}

#[derive(Debug, Clone, Default)]
struct StudentRecord {
    student: Student,
    schedules: Vec<WeeklySchedule>,
    exceptions: Vec<PickupException>,
    notes: Vec<DayNote>,
}

/// In-process pickup data store: students keyed by id, each carrying their
/// weekly schedule rows, date exceptions, and day notes. Mutations validate
/// first and touch state only on success, so a failed call leaves the prior
/// state intact.
#[derive(Debug, Default)]
pub struct PickupPlanner {
    records: BTreeMap<i64, StudentRecord>,
    next_student_id: i64,
    next_exception_id: i64,
    next_note_id: i64,
}

impl PickupPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, student_id: i64) -> Result<&StudentRecord, PlannerError> {
        self.records
            .get(&student_id)
            .ok_or(PlannerError::StudentNotFound(student_id))
    }

    fn record_mut(&mut self, student_id: i64) -> Result<&mut StudentRecord, PlannerError> {
        self.records
            .get_mut(&student_id)
            .ok_or(PlannerError::StudentNotFound(student_id))
    }

    // ---- students ----

    pub fn create_student(
        &mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        group: Option<String>,
    ) -> Student {
        self.next_student_id += 1;
        let mut student = Student::new(self.next_student_id, first_name, last_name);
        student.group = group;
        self.records.insert(
            student.id,
            StudentRecord {
                student: student.clone(),
                ..StudentRecord::default()
            },
        );
        student
    }

    /// Insert or replace a student record wholesale, keeping any existing
    /// schedule/exception/note data. Used by persistence loads.
    pub fn upsert_student(&mut self, student: Student) {
        self.next_student_id = self.next_student_id.max(student.id);
        self.records
            .entry(student.id)
            .and_modify(|record| record.student = student.clone())
            .or_insert_with(|| StudentRecord {
                student,
                ..StudentRecord::default()
            });
    }

    pub fn student(&self, student_id: i64) -> Option<&Student> {
        self.records.get(&student_id).map(|r| &r.student)
    }

    pub fn students(&self) -> Vec<Student> {
        self.records.values().map(|r| r.student.clone()).collect()
    }

    pub fn student_count(&self) -> usize {
        self.records.len()
    }

    /// Removes the student and all of their pickup data. Returns false when
    /// the id is unknown.
    pub fn delete_student(&mut self, student_id: i64) -> bool {
        self.records.remove(&student_id).is_some()
    }

    pub fn set_sick(&mut self, student_id: i64, is_sick: bool) -> Result<(), PlannerError> {
        self.record_mut(student_id)?.student.is_sick = is_sick;
        Ok(())
    }

    // ---- weekly schedule ----

    /// Bulk-replace the student's weekly schedule. Entries without a pickup
    /// time are dropped before storing; returns the number dropped.
    pub fn replace_weekly_schedule(
        &mut self,
        student_id: i64,
        entries: &[ScheduleEntry],
    ) -> Result<usize, PlannerError> {
        let (rows, dropped) = normalize_schedule_entries(entries)?;
        self.record_mut(student_id)?.schedules = rows;
        Ok(dropped)
    }

    /// Restore schedule rows from persistence, re-checking the stored
    /// invariants.
    pub fn restore_weekly_schedule(
        &mut self,
        student_id: i64,
        rows: Vec<WeeklySchedule>,
    ) -> Result<(), PlannerError> {
        validate_stored_schedules(&rows)?;
        let record = self.record_mut(student_id)?;
        record.schedules = rows;
        record.schedules.sort_by_key(|r| r.weekday);
        Ok(())
    }

    // ---- exceptions ----

    /// Create-or-update by date: an existing exception for the same date is
    /// updated in place (id and created_at stable), otherwise a new one is
    /// inserted.
    pub fn upsert_exception(
        &mut self,
        student_id: i64,
        exception_date: NaiveDate,
        pickup_time: Option<PickupTime>,
        reason: &str,
    ) -> Result<PickupException, PlannerError> {
        validation::validate_reason(reason)?;
        self.record(student_id)?;

        let existing_id = self
            .exception_for_date(student_id, exception_date)
            .map(|e| e.id);

        if let Some(id) = existing_id {
            let record = self.record_mut(student_id)?;
            let exc = record
                .exceptions
                .iter_mut()
                .find(|e| e.id == id)
                .expect("exception id was just looked up");
            exc.pickup_time = pickup_time;
            exc.reason = reason.trim().to_string();
            exc.updated_at = Utc::now();
            return Ok(exc.clone());
        }

        self.next_exception_id += 1;
        let exception = PickupException::new(
            self.next_exception_id,
            exception_date,
            pickup_time,
            reason.trim(),
        );
        self.record_mut(student_id)?
            .exceptions
            .push(exception.clone());
        Ok(exception)
    }

    /// The exception occupying `date` for this student, if any.
    pub fn exception_for_date(
        &self,
        student_id: i64,
        date: NaiveDate,
    ) -> Option<&PickupException> {
        self.records
            .get(&student_id)?
            .exceptions
            .iter()
            .find(|e| e.exception_date == date)
    }

    pub fn update_exception(
        &mut self,
        student_id: i64,
        exception_id: i64,
        exception_date: NaiveDate,
        pickup_time: Option<PickupTime>,
        reason: &str,
    ) -> Result<PickupException, PlannerError> {
        validation::validate_reason(reason)?;
        let record = self.record_mut(student_id)?;
        let exc = record
            .exceptions
            .iter_mut()
            .find(|e| e.id == exception_id)
            .ok_or(PlannerError::ExceptionNotFound {
                student_id,
                exception_id,
            })?;
        exc.exception_date = exception_date;
        exc.pickup_time = pickup_time;
        exc.reason = reason.trim().to_string();
        exc.updated_at = Utc::now();
        Ok(exc.clone())
    }

    pub fn delete_exception(
        &mut self,
        student_id: i64,
        exception_id: i64,
    ) -> Result<bool, PlannerError> {
        let record = self.record_mut(student_id)?;
        let before = record.exceptions.len();
        record.exceptions.retain(|e| e.id != exception_id);
        Ok(record.exceptions.len() != before)
    }

    /// Restore exceptions from persistence, keeping the id counter ahead of
    /// every stored id. Stored data must honor the one-exception-per-date
    /// rule just like fresh submissions.
    pub fn restore_exception(
        &mut self,
        student_id: i64,
        exception: PickupException,
    ) -> Result<(), PlannerError> {
        validation::validate_reason(&exception.reason)?;
        self.record(student_id)?;
        if self
            .exception_for_date(student_id, exception.exception_date)
            .is_some()
        {
            return Err(ValidationError::new(format!(
                "duplicate stored exception for {}",
                exception.exception_date
            ))
            .into());
        }
        self.next_exception_id = self.next_exception_id.max(exception.id);
        self.record_mut(student_id)?.exceptions.push(exception);
        Ok(())
    }

    // ---- notes ----

    pub fn add_note(
        &mut self,
        student_id: i64,
        date: NaiveDate,
        content: &str,
    ) -> Result<DayNote, PlannerError> {
        validation::validate_note_content(content)?;
        self.record(student_id)?;
        self.next_note_id += 1;
        let note = DayNote::new(self.next_note_id, date, content.trim());
        self.record_mut(student_id)?.notes.push(note.clone());
        Ok(note)
    }

    pub fn update_note(
        &mut self,
        student_id: i64,
        note_id: i64,
        date: NaiveDate,
        content: &str,
    ) -> Result<DayNote, PlannerError> {
        validation::validate_note_content(content)?;
        let record = self.record_mut(student_id)?;
        let note = record
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or(PlannerError::NoteNotFound {
                student_id,
                note_id,
            })?;
        note.date = date;
        note.content = content.trim().to_string();
        Ok(note.clone())
    }

    pub fn delete_note(&mut self, student_id: i64, note_id: i64) -> Result<bool, PlannerError> {
        let record = self.record_mut(student_id)?;
        let before = record.notes.len();
        record.notes.retain(|n| n.id != note_id);
        Ok(record.notes.len() != before)
    }

    pub fn restore_note(&mut self, student_id: i64, note: DayNote) -> Result<(), PlannerError> {
        validation::validate_note_content(&note.content)?;
        self.next_note_id = self.next_note_id.max(note.id);
        self.record_mut(student_id)?.notes.push(note);
        Ok(())
    }

    // ---- views ----

    pub fn snapshot(&self, student_id: i64) -> Result<PickupSnapshot, PlannerError> {
        let record = self.record(student_id)?;
        Ok(PickupSnapshot {
            student: record.student.clone(),
            schedules: record.schedules.clone(),
            exceptions: record.exceptions.clone(),
            notes: record.notes.clone(),
        })
    }

    /// Resolve the Mon-Fri window `week_offset` weeks from the week holding
    /// `today` into per-day effective views.
    pub fn resolve_week(
        &self,
        student_id: i64,
        today: NaiveDate,
        week_offset: i64,
    ) -> Result<WeekView, PlannerError> {
        let record = self.record(student_id)?;
        let dates = week::week_days(today, week_offset);
        let week_start = dates[0];

        let days: Vec<DayData> = dates
            .into_iter()
            .map(|date| {
                resolver::day_data(
                    date,
                    today,
                    &record.schedules,
                    &record.exceptions,
                    record.student.is_sick,
                    &record.notes,
                )
            })
            .collect();

        let summary = WeekSummary {
            scheduled_count: days.iter().filter(|d| d.effective_time.is_some()).count(),
            exception_count: days.iter().filter(|d| d.is_exception).count(),
            no_pickup_count: days.iter().filter(|d| d.effective_time.is_none()).count(),
            sick_today: days.iter().any(|d| d.show_sick),
        };

        Ok(WeekView {
            student_id,
            week_offset,
            week_start,
            days,
            summary,
        })
    }
}
