pub mod exception;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod note;
pub mod notify;
pub mod persistence;
pub mod planner;
pub mod resolver;
pub mod roles;
pub mod schedule;
pub mod student;
pub mod timefmt;
pub mod validation;
pub mod week;

pub use exception::PickupException;
pub use note::{DayNote, MAX_NOTE_LEN};
pub use notify::{ActiveNotification, Notification, NotificationCenter, NotificationKind};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlannerStore;
pub use persistence::{
    PersistenceError, PlannerStore, load_planner_from_json, load_schedules_from_csv,
    save_planner_to_json, save_schedules_to_csv,
};
pub use planner::{PickupPlanner, PickupSnapshot, PlannerError, WeekSummary, WeekView};
pub use resolver::{DayData, business_weekday, day_data};
pub use roles::Role;
pub use schedule::{ScheduleEntry, WeeklySchedule, weekday_name};
pub use student::Student;
pub use timefmt::{PickupTime, PickupTimeParseError};
pub use validation::{MAX_REASON_LEN, ValidationError, normalize_schedule_entries};
pub use week::{current_week_days, week_days, week_start};
