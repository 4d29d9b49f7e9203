use super::{PersistenceError, PersistenceResult};
use crate::planner::{PickupPlanner, PickupSnapshot};
use crate::schedule::WeeklySchedule;
use crate::student::Student;
use crate::validation::validate_stored_schedules;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct PlannerSnapshot {
    students: Vec<PickupSnapshot>,
}

impl PlannerSnapshot {
    fn from_planner(planner: &PickupPlanner) -> PersistenceResult<Self> {
        let mut students = Vec::with_capacity(planner.student_count());
        for student in planner.students() {
            let snapshot = planner
                .snapshot(student.id)
                .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
            validate_stored_schedules(&snapshot.schedules)?;
            students.push(snapshot);
        }
        Ok(Self { students })
    }

    fn into_planner(self) -> PersistenceResult<PickupPlanner> {
        let mut planner = PickupPlanner::new();
        for snapshot in self.students {
            planner.upsert_student(snapshot.student.clone());
            planner
                .restore_weekly_schedule(snapshot.student.id, snapshot.schedules)
                .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
            for exception in snapshot.exceptions {
                planner
                    .restore_exception(snapshot.student.id, exception)
                    .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
            }
            for note in snapshot.notes {
                planner
                    .restore_note(snapshot.student.id, note)
                    .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
            }
        }
        Ok(planner)
    }
}

pub fn save_planner_to_json<P: AsRef<Path>>(
    planner: &PickupPlanner,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = PlannerSnapshot::from_planner(planner)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_planner_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<PickupPlanner> {
    let file = File::open(path)?;
    let snapshot: PlannerSnapshot = serde_json::from_reader(file)?;
    snapshot.into_planner()
}

/// Flat export row: one weekly schedule entry with enough student columns to
/// recreate the student on import.
#[derive(Debug, Serialize, Deserialize)]
struct ScheduleCsvRecord {
    student_id: i64,
    first_name: String,
    last_name: String,
    group: String,
    weekday: u8,
    pickup_time: String,
    notes: String,
}

impl ScheduleCsvRecord {
    fn from_row(student: &Student, row: &WeeklySchedule) -> Self {
        Self {
            student_id: student.id,
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            group: student.group.clone().unwrap_or_default(),
            weekday: row.weekday,
            pickup_time: row
                .pickup_time
                .map(|t| t.to_string())
                .unwrap_or_default(),
            notes: row.notes.clone().unwrap_or_default(),
        }
    }
}

pub fn save_schedules_to_csv<P: AsRef<Path>>(
    planner: &PickupPlanner,
    path: P,
) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for student in planner.students() {
        let snapshot = planner
            .snapshot(student.id)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        for row in &snapshot.schedules {
            writer.serialize(ScheduleCsvRecord::from_row(&student, row))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Rebuild a planner from a flat schedule CSV. Students are created from the
/// name columns; rows sharing a student_id append to the same weekly
/// schedule.
pub fn load_schedules_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<PickupPlanner> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut planner = PickupPlanner::new();
    let mut pending: Vec<(i64, WeeklySchedule)> = Vec::new();

    for result in reader.deserialize() {
        let record: ScheduleCsvRecord = result?;
        if planner.student(record.student_id).is_none() {
            let mut student = Student::new(record.student_id, record.first_name, record.last_name);
            if !record.group.is_empty() {
                student.group = Some(record.group);
            }
            planner.upsert_student(student);
        }

        // Rows without a time are dropped, same as bulk schedule submissions.
        let pickup_time = match crate::timefmt::PickupTime::parse_optional(Some(&record.pickup_time))
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?
        {
            Some(time) => time,
            None => continue,
        };
        let mut row = WeeklySchedule::new(record.weekday, Some(pickup_time));
        if !record.notes.is_empty() {
            row.notes = Some(record.notes);
        }
        pending.push((record.student_id, row));
    }

    for student in planner.students() {
        let rows: Vec<WeeklySchedule> = pending
            .iter()
            .filter(|(id, _)| *id == student.id)
            .map(|(_, row)| row.clone())
            .collect();
        planner
            .restore_weekly_schedule(student.id, rows)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    }

    Ok(planner)
}
