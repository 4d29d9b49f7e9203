use chrono::NaiveDate;
use pickup_planner::{
    PickupPlanner, PickupTime, ScheduleEntry, load_planner_from_json, load_schedules_from_csv,
    save_planner_to_json, save_schedules_to_csv,
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

fn sample_planner() -> PickupPlanner {
    let mut planner = PickupPlanner::new();
    let anna = planner.create_student("Anna", "Schmidt", Some("Igel".into()));
    let ben = planner.create_student("Ben", "Weber", None);

    planner
        .replace_weekly_schedule(anna.id, &[entry(1, "15:00"), entry(3, "16:00")])
        .unwrap();
    planner
        .replace_weekly_schedule(ben.id, &[entry(2, "14:30")])
        .unwrap();
    planner
        .upsert_exception(anna.id, d(2026, 8, 17), Some(t("14:00")), "Arzttermin")
        .unwrap();
    planner
        .add_note(anna.id, d(2026, 8, 19), "Turnbeutel mitgeben")
        .unwrap();
    planner.set_sick(ben.id, true).unwrap();
    planner
}

#[test]
fn json_round_trip_preserves_everything() {
    let planner = sample_planner();
    let file = NamedTempFile::new().unwrap();
    save_planner_to_json(&planner, file.path()).unwrap();

    let loaded = load_planner_from_json(file.path()).unwrap();
    assert_eq!(loaded.student_count(), 2);

    let anna = loaded.snapshot(1).unwrap();
    assert_eq!(anna.student.full_name(), "Anna Schmidt");
    assert_eq!(anna.schedules.len(), 2);
    assert_eq!(anna.exceptions.len(), 1);
    assert_eq!(anna.exceptions[0].reason, "Arzttermin");
    assert_eq!(anna.exceptions[0].pickup_time, Some(t("14:00")));
    assert_eq!(anna.notes.len(), 1);

    let ben = loaded.snapshot(2).unwrap();
    assert!(ben.student.is_sick);
    assert_eq!(ben.schedules[0].pickup_time, Some(t("14:30")));
}

#[test]
fn loaded_planner_continues_id_sequences() {
    let planner = sample_planner();
    let file = NamedTempFile::new().unwrap();
    save_planner_to_json(&planner, file.path()).unwrap();

    let mut loaded = load_planner_from_json(file.path()).unwrap();
    let carl = loaded.create_student("Carl", "Mayer", None);
    assert_eq!(carl.id, 3);

    let exc = loaded
        .upsert_exception(carl.id, d(2026, 8, 20), None, "Oma holt ab")
        .unwrap();
    assert!(exc.id > 1);
}

#[test]
fn csv_round_trip_preserves_schedule_rows() {
    let planner = sample_planner();
    let file = NamedTempFile::new().unwrap();
    save_schedules_to_csv(&planner, file.path()).unwrap();

    let loaded = load_schedules_from_csv(file.path()).unwrap();
    assert_eq!(loaded.student_count(), 2);

    let anna = loaded.snapshot(1).unwrap();
    assert_eq!(anna.student.first_name, "Anna");
    assert_eq!(anna.student.group.as_deref(), Some("Igel"));
    assert_eq!(anna.schedules.len(), 2);
    assert_eq!(anna.schedules[0].weekday, 1);
    assert_eq!(anna.schedules[0].pickup_time, Some(t("15:00")));

    // CSV carries the weekly schedule only
    assert!(anna.exceptions.is_empty());
    assert!(anna.notes.is_empty());
}

#[test]
fn csv_import_drops_rows_without_a_pickup_time() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        "student_id,first_name,last_name,group,weekday,pickup_time,notes\n\
         1,Anna,Schmidt,Igel,1,15:00,\n\
         1,Anna,Schmidt,Igel,2,,hand-edited row\n",
    )
    .unwrap();

    let loaded = load_schedules_from_csv(file.path()).unwrap();
    let anna = loaded.snapshot(1).unwrap();
    assert_eq!(anna.schedules.len(), 1);
    assert_eq!(anna.schedules[0].weekday, 1);
    assert_eq!(anna.schedules[0].pickup_time, Some(t("15:00")));
}

#[test]
fn duplicate_exception_dates_in_a_tampered_file_fail_to_load() {
    let planner = sample_planner();
    let file = NamedTempFile::new().unwrap();
    save_planner_to_json(&planner, file.path()).unwrap();

    let mut doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
    let exceptions = doc["students"][0]["exceptions"].as_array_mut().unwrap();
    let mut copy = exceptions[0].clone();
    copy["id"] = serde_json::json!(99);
    exceptions.push(copy);
    std::fs::write(file.path(), doc.to_string()).unwrap();

    let err = load_planner_from_json(file.path()).unwrap_err();
    assert!(err.to_string().contains("duplicate stored exception"));
}

#[test]
fn loading_missing_file_surfaces_io_error() {
    let err = load_planner_from_json("/nonexistent/planner.json").unwrap_err();
    assert!(err.to_string().contains("io error"));
}

#[test]
fn corrupt_json_surfaces_serialization_error() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"{ not json").unwrap();
    let err = load_planner_from_json(file.path()).unwrap_err();
    assert!(err.to_string().contains("serialization error"));
}
