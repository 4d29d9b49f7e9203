use super::{PersistenceResult, PlannerStore};
use crate::exception::PickupException;
use crate::note::DayNote;
use crate::planner::PickupPlanner;
use crate::schedule::WeeklySchedule;
use crate::student::Student;
use rusqlite::{Connection, params};
use std::sync::Mutex;

pub struct SqlitePlannerStore {
    connection: Mutex<Connection>,
}

impl SqlitePlannerStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY,
                student_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS weekly_schedules (
                student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                weekday INTEGER NOT NULL,
                entry_json TEXT NOT NULL,
                PRIMARY KEY (student_id, weekday)
            );
            CREATE TABLE IF NOT EXISTS exceptions (
                id INTEGER PRIMARY KEY,
                student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                exception_date TEXT NOT NULL,
                exception_json TEXT NOT NULL,
                UNIQUE (student_id, exception_date)
            );
            CREATE TABLE IF NOT EXISTS day_notes (
                id INTEGER PRIMARY KEY,
                student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                note_date TEXT NOT NULL,
                note_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_student(
        tx: &rusqlite::Transaction,
        planner: &PickupPlanner,
        student: &Student,
    ) -> PersistenceResult<()> {
        let student_json = serde_json::to_string(student)?;
        tx.execute(
            "INSERT INTO students (id, student_json) VALUES (?1, ?2)",
            params![student.id, student_json],
        )?;

        let snapshot = planner
            .snapshot(student.id)
            .map_err(|err| super::PersistenceError::InvalidData(err.to_string()))?;

        let mut entry_stmt = tx.prepare(
            "INSERT INTO weekly_schedules (student_id, weekday, entry_json) VALUES (?1, ?2, ?3)",
        )?;
        for row in &snapshot.schedules {
            let json = serde_json::to_string(row)?;
            entry_stmt.execute(params![student.id, row.weekday, json])?;
        }

        let mut exc_stmt = tx.prepare(
            "INSERT INTO exceptions (id, student_id, exception_date, exception_json)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for exception in &snapshot.exceptions {
            let json = serde_json::to_string(exception)?;
            exc_stmt.execute(params![
                exception.id,
                student.id,
                exception.exception_date.to_string(),
                json
            ])?;
        }

        let mut note_stmt = tx.prepare(
            "INSERT INTO day_notes (id, student_id, note_date, note_json) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for note in &snapshot.notes {
            let json = serde_json::to_string(note)?;
            note_stmt.execute(params![note.id, student.id, note.date.to_string(), json])?;
        }

        Ok(())
    }
}

impl PlannerStore for SqlitePlannerStore {
    fn save_planner(&self, planner: &PickupPlanner) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM day_notes", [])?;
        tx.execute("DELETE FROM exceptions", [])?;
        tx.execute("DELETE FROM weekly_schedules", [])?;
        tx.execute("DELETE FROM students", [])?;
        for student in planner.students() {
            Self::save_student(&tx, planner, &student)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_planner(&self) -> PersistenceResult<Option<PickupPlanner>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT student_json FROM students ORDER BY id ASC")?;
        let student_rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut planner = PickupPlanner::new();
        let mut any = false;
        for json in student_rows {
            let student: Student = serde_json::from_str(&json?)?;
            planner.upsert_student(student);
            any = true;
        }
        if !any {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT student_id, entry_json FROM weekly_schedules ORDER BY student_id, weekday",
        )?;
        let entry_rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut schedules: Vec<(i64, WeeklySchedule)> = Vec::new();
        for row in entry_rows {
            let (student_id, json) = row?;
            schedules.push((student_id, serde_json::from_str(&json)?));
        }
        for student in planner.students() {
            let rows: Vec<WeeklySchedule> = schedules
                .iter()
                .filter(|(id, _)| *id == student.id)
                .map(|(_, entry)| entry.clone())
                .collect();
            planner
                .restore_weekly_schedule(student.id, rows)
                .map_err(|err| super::PersistenceError::InvalidData(err.to_string()))?;
        }

        let mut stmt =
            conn.prepare("SELECT student_id, exception_json FROM exceptions ORDER BY id ASC")?;
        let exc_rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in exc_rows {
            let (student_id, json) = row?;
            let exception: PickupException = serde_json::from_str(&json)?;
            planner
                .restore_exception(student_id, exception)
                .map_err(|err| super::PersistenceError::InvalidData(err.to_string()))?;
        }

        let mut stmt = conn.prepare("SELECT student_id, note_json FROM day_notes ORDER BY id ASC")?;
        let note_rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in note_rows {
            let (student_id, json) = row?;
            let note: DayNote = serde_json::from_str(&json)?;
            planner
                .restore_note(student_id, note)
                .map_err(|err| super::PersistenceError::InvalidData(err.to_string()))?;
        }

        Ok(Some(planner))
    }
}
