use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::notify::{ActiveNotification, NotificationCenter, NotificationKind};
use crate::planner::{PickupPlanner, PickupSnapshot, PlannerError, WeekView};
use crate::roles::Role;
use crate::schedule::ScheduleEntry;
use crate::student::Student;
use crate::timefmt::PickupTime;

#[derive(Clone)]
pub struct AppState {
    planner: Arc<RwLock<PickupPlanner>>,
    notifications: Arc<NotificationCenter>,
}

impl AppState {
    pub fn new(planner: PickupPlanner) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
            notifications: Arc::new(NotificationCenter::default()),
        }
    }

    pub fn with_shared(planner: Arc<RwLock<PickupPlanner>>) -> Self {
        Self {
            planner,
            notifications: Arc::new(NotificationCenter::default()),
        }
    }

    fn planner(&self) -> Arc<RwLock<PickupPlanner>> {
        self.planner.clone()
    }

    fn notify_success(&self, message: impl Into<String>) {
        self.notifications
            .publish(NotificationKind::Success, message);
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<PlannerError> for ApiError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::StudentNotFound(_)
            | PlannerError::ExceptionNotFound { .. }
            | PlannerError::NoteNotFound { .. } => ApiError::NotFound(value.to_string()),
            PlannerError::Validation(err) => ApiError::Invalid(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CreateStudentPayload {
    first_name: String,
    last_name: String,
    #[serde(default)]
    group: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SickPayload {
    is_sick: bool,
}

#[derive(Debug, Deserialize)]
struct SchedulePayload {
    entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Serialize)]
struct ScheduleReplaced {
    stored: usize,
    dropped: usize,
}

#[derive(Debug, Deserialize)]
struct ExceptionPayload {
    exception_date: NaiveDate,
    #[serde(default)]
    pickup_time: Option<String>,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct NotePayload {
    note_date: NaiveDate,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WeekQuery {
    #[serde(default)]
    offset: Option<i64>,
    /// Pins "today" for deterministic clients; defaults to the local date.
    #[serde(default)]
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct RoleEntry {
    id: i64,
    name: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/roles", get(list_roles))
        .route("/students", get(list_students).post(create_student))
        .route("/students/:id", get(get_student).delete(delete_student))
        .route("/students/:id/sick", put(set_sick))
        .route("/students/:id/pickup", get(get_pickup_snapshot))
        .route("/students/:id/schedule", put(replace_schedule))
        .route("/students/:id/exceptions", post(create_exception))
        .route(
            "/students/:id/exceptions/:exception_id",
            put(update_exception).delete(delete_exception),
        )
        .route("/students/:id/notes", post(create_note))
        .route(
            "/students/:id/notes/:note_id",
            put(update_note).delete(delete_note),
        )
        .route("/students/:id/week", get(get_week))
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id", axum::routing::delete(dismiss_notification))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, planner: PickupPlanner) -> std::io::Result<()> {
    let state = AppState::new(planner);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "pickup-planner HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_roles() -> Json<Vec<RoleEntry>> {
    let roles = Role::variants()
        .into_iter()
        .map(|(id, role)| RoleEntry {
            id,
            name: role.as_str(),
        })
        .collect();
    Json(roles)
}

async fn list_students(State(state): State<AppState>) -> Json<Vec<Student>> {
    let planner = state.planner();
    let students = {
        let guard = planner.read();
        guard.students()
    };
    Json(students)
}

async fn create_student(
    State(state): State<AppState>,
    Json(payload): Json<CreateStudentPayload>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(ApiError::invalid("student name must not be empty"));
    }
    let planner = state.planner();
    let student = {
        let mut guard = planner.write();
        guard.create_student(
            payload.first_name.trim(),
            payload.last_name.trim(),
            payload.group.as_deref().map(str::trim).filter(|g| !g.is_empty()).map(str::to_string),
        )
    };
    state.notify_success(format!("Student {} created", student.full_name()));
    Ok((StatusCode::CREATED, Json(student)))
}

async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<Student>, ApiError> {
    let planner = state.planner();
    let student = {
        let guard = planner.read();
        guard.student(student_id).cloned()
    };
    match student {
        Some(student) => Ok(Json(student)),
        None => Err(ApiError::not_found(format!(
            "student {student_id} not found"
        ))),
    }
}

async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    let removed = {
        let mut guard = planner.write();
        guard.delete_student(student_id)
    };
    if !removed {
        return Err(ApiError::not_found(format!(
            "student {student_id} not found"
        )));
    }
    state.notify_success(format!("Student {student_id} deleted"));
    Ok(StatusCode::NO_CONTENT)
}

async fn set_sick(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(payload): Json<SickPayload>,
) -> Result<Json<Student>, ApiError> {
    let planner = state.planner();
    {
        let mut guard = planner.write();
        guard.set_sick(student_id, payload.is_sick)?;
    }
    let current = {
        let guard = planner.read();
        guard
            .student(student_id)
            .cloned()
            .ok_or_else(|| ApiError::internal("student not found after update"))?
    };
    state.notify_success(format!(
        "Student {student_id} marked {}",
        if payload.is_sick { "sick" } else { "recovered" }
    ));
    Ok(Json(current))
}

async fn get_pickup_snapshot(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<PickupSnapshot>, ApiError> {
    let planner = state.planner();
    let snapshot = {
        let guard = planner.read();
        guard.snapshot(student_id)?
    };
    Ok(Json(snapshot))
}

async fn replace_schedule(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(payload): Json<SchedulePayload>,
) -> Result<Json<ScheduleReplaced>, ApiError> {
    let planner = state.planner();
    let dropped = {
        let mut guard = planner.write();
        guard.replace_weekly_schedule(student_id, &payload.entries)?
    };
    let stored = {
        let guard = planner.read();
        guard.snapshot(student_id)?.schedules.len()
    };
    state.notify_success("Weekly schedule saved");
    Ok(Json(ScheduleReplaced { stored, dropped }))
}

fn parse_payload_time(raw: Option<&str>) -> Result<Option<PickupTime>, ApiError> {
    PickupTime::parse_optional(raw).map_err(|err| ApiError::invalid(err.to_string()))
}

async fn create_exception(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(payload): Json<ExceptionPayload>,
) -> Result<(StatusCode, Json<crate::exception::PickupException>), ApiError> {
    let pickup_time = parse_payload_time(payload.pickup_time.as_deref())?;
    let planner = state.planner();
    let (exception, created) = {
        let mut guard = planner.write();
        let created = guard
            .exception_for_date(student_id, payload.exception_date)
            .is_none();
        let exception = guard.upsert_exception(
            student_id,
            payload.exception_date,
            pickup_time,
            &payload.reason,
        )?;
        (exception, created)
    };
    state.notify_success(format!("Exception saved for {}", exception.exception_date));
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(exception)))
}

async fn update_exception(
    State(state): State<AppState>,
    Path((student_id, exception_id)): Path<(i64, i64)>,
    Json(payload): Json<ExceptionPayload>,
) -> Result<Json<crate::exception::PickupException>, ApiError> {
    let pickup_time = parse_payload_time(payload.pickup_time.as_deref())?;
    let planner = state.planner();
    let exception = {
        let mut guard = planner.write();
        guard.update_exception(
            student_id,
            exception_id,
            payload.exception_date,
            pickup_time,
            &payload.reason,
        )?
    };
    state.notify_success(format!("Exception updated for {}", exception.exception_date));
    Ok(Json(exception))
}

async fn delete_exception(
    State(state): State<AppState>,
    Path((student_id, exception_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    let removed = {
        let mut guard = planner.write();
        guard.delete_exception(student_id, exception_id)?
    };
    if !removed {
        return Err(ApiError::not_found(format!(
            "exception {exception_id} not found for student {student_id}"
        )));
    }
    state.notify_success("Exception deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn create_note(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(payload): Json<NotePayload>,
) -> Result<(StatusCode, Json<crate::note::DayNote>), ApiError> {
    let planner = state.planner();
    let note = {
        let mut guard = planner.write();
        guard.add_note(student_id, payload.note_date, &payload.content)?
    };
    state.notify_success(format!("Note added for {}", note.date));
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(state): State<AppState>,
    Path((student_id, note_id)): Path<(i64, i64)>,
    Json(payload): Json<NotePayload>,
) -> Result<Json<crate::note::DayNote>, ApiError> {
    let planner = state.planner();
    let note = {
        let mut guard = planner.write();
        guard.update_note(student_id, note_id, payload.note_date, &payload.content)?
    };
    state.notify_success(format!("Note updated for {}", note.date));
    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    Path((student_id, note_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    let removed = {
        let mut guard = planner.write();
        guard.delete_note(student_id, note_id)?
    };
    if !removed {
        return Err(ApiError::not_found(format!(
            "note {note_id} not found for student {student_id}"
        )));
    }
    state.notify_success("Note deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_week(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekView>, ApiError> {
    let today = query.date.unwrap_or_else(|| Local::now().date_naive());
    let offset = query.offset.unwrap_or(0);
    let planner = state.planner();
    let view = {
        let guard = planner.read();
        guard.resolve_week(student_id, today, offset)?
    };
    Ok(Json(view))
}

async fn list_notifications(State(state): State<AppState>) -> Json<Vec<ActiveNotification>> {
    Json(state.notifications.active())
}

async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    if state.notifications.dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("notification {id} not queued")))
    }
}
