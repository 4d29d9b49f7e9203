#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use pickup_planner::{
    PickupPlanner, PickupTime, PlannerStore, ScheduleEntry, SqlitePlannerStore,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(s: &str) -> PickupTime {
    s.parse().unwrap()
}

fn entry(weekday: u8, time: &str) -> ScheduleEntry {
    ScheduleEntry {
        weekday,
        pickup_time: Some(time.to_string()),
        notes: None,
    }
}

#[test]
fn sqlite_store_round_trips_the_planner() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlannerStore::new(file.path()).unwrap();

    let mut planner = PickupPlanner::new();
    let anna = planner.create_student("Anna", "Schmidt", Some("Igel".into()));
    planner
        .replace_weekly_schedule(anna.id, &[entry(1, "15:00"), entry(5, "12:30")])
        .unwrap();
    planner
        .upsert_exception(anna.id, d(2026, 8, 17), None, "Keine Abholung")
        .unwrap();
    planner
        .add_note(anna.id, d(2026, 8, 18), "Elternbrief")
        .unwrap();
    planner.set_sick(anna.id, true).unwrap();

    store.save_planner(&planner).expect("save planner");

    let loaded = store
        .load_planner()
        .expect("load planner")
        .expect("planner exists");

    let snapshot = loaded.snapshot(anna.id).unwrap();
    assert!(snapshot.student.is_sick);
    assert_eq!(snapshot.student.group.as_deref(), Some("Igel"));
    assert_eq!(snapshot.schedules.len(), 2);
    assert_eq!(snapshot.schedules[1].pickup_time, Some(t("12:30")));
    assert_eq!(snapshot.exceptions.len(), 1);
    assert_eq!(snapshot.exceptions[0].pickup_time, None);
    assert_eq!(snapshot.notes.len(), 1);
    assert_eq!(snapshot.notes[0].content, "Elternbrief");
}

#[test]
fn empty_store_loads_as_none() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlannerStore::new(file.path()).unwrap();
    assert!(store.load_planner().unwrap().is_none());
}

#[test]
fn save_replaces_previous_contents() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlannerStore::new(file.path()).unwrap();

    let mut planner = PickupPlanner::new();
    planner.create_student("Anna", "Schmidt", None);
    planner.create_student("Ben", "Weber", None);
    store.save_planner(&planner).unwrap();

    let mut smaller = PickupPlanner::new();
    smaller.create_student("Carl", "Mayer", None);
    store.save_planner(&smaller).unwrap();

    let loaded = store.load_planner().unwrap().unwrap();
    assert_eq!(loaded.student_count(), 1);
    assert_eq!(loaded.students()[0].first_name, "Carl");
}

#[test]
fn loaded_planner_resolves_weeks_like_the_original() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlannerStore::new(file.path()).unwrap();

    let mut planner = PickupPlanner::new();
    let anna = planner.create_student("Anna", "Schmidt", None);
    planner
        .replace_weekly_schedule(anna.id, &[entry(1, "15:00")])
        .unwrap();
    planner
        .upsert_exception(anna.id, d(2026, 8, 17), Some(t("14:00")), "Arzttermin")
        .unwrap();
    store.save_planner(&planner).unwrap();

    let loaded = store.load_planner().unwrap().unwrap();
    let today = d(2026, 8, 19);
    let original = planner.resolve_week(anna.id, today, 0).unwrap();
    let restored = loaded.resolve_week(anna.id, today, 0).unwrap();
    assert_eq!(original.days, restored.days);
}
