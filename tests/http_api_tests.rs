#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use pickup_planner::{PickupPlanner, http_api};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let planner = PickupPlanner::new();
    let state = http_api::AppState::new(planner);
    http_api::router(state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = new_router();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn roles_listing_is_total_and_ordered() {
    let app = new_router();
    let (status, body) = send(&app, "GET", "/roles", None).await;
    assert_eq!(status, StatusCode::OK);
    let roles = body.as_array().unwrap();
    assert_eq!(roles.len(), 4);
    assert_eq!(roles[0]["id"], json!(1));
    assert_eq!(roles[0]["name"], json!("Admin"));
    assert_eq!(roles[3]["name"], json!("Parent"));
}

#[tokio::test]
async fn student_lifecycle_via_http_api() {
    let app = new_router();

    let (status, student) = send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt", "group": "Igel"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(student["id"], json!(1));
    assert_eq!(student["is_sick"], json!(false));

    let (status, fetched) = send(&app, "GET", "/students/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["first_name"], json!("Anna"));

    let (status, _) = send(&app, "DELETE", "/students/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, error) = send(&app, "GET", "/students/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], json!("not_found"));
}

#[tokio::test]
async fn blank_student_name_is_rejected() {
    let app = new_router();
    let (status, error) = send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "  ", "last_name": "Schmidt"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], json!("invalid_request"));
}

#[tokio::test]
async fn schedule_replace_drops_empty_time_entries() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt"})),
    )
    .await;

    let payload = json!({
        "entries": [
            {"weekday": 1, "pickup_time": "14:00"},
            {"weekday": 2, "pickup_time": ""}
        ]
    });
    let (status, result) = send(&app, "PUT", "/students/1/schedule", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["stored"], json!(1));
    assert_eq!(result["dropped"], json!(1));

    let (status, snapshot) = send(&app, "GET", "/students/1/pickup", None).await;
    assert_eq!(status, StatusCode::OK);
    let schedules = snapshot["schedules"].as_array().unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0]["weekday"], json!(1));
    assert_eq!(schedules[0]["pickup_time"], json!("14:00"));
}

#[tokio::test]
async fn invalid_schedule_payload_returns_bad_request() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt"})),
    )
    .await;

    let payload = json!({"entries": [{"weekday": 9, "pickup_time": "14:00"}]});
    let (status, error) = send(&app, "PUT", "/students/1/schedule", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], json!("invalid_request"));
    assert!(
        error["message"]
            .as_str()
            .unwrap_or_default()
            .contains("outside the business week")
    );
}

#[tokio::test]
async fn exception_lifecycle_and_week_resolution() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt"})),
    )
    .await;
    send(
        &app,
        "PUT",
        "/students/1/schedule",
        Some(json!({"entries": [{"weekday": 1, "pickup_time": "15:00"}]})),
    )
    .await;

    // 2026-08-17 is the Monday of the week holding 2026-08-19.
    let (status, exception) = send(
        &app,
        "POST",
        "/students/1/exceptions",
        Some(json!({
            "exception_date": "2026-08-17",
            "pickup_time": "14:00",
            "reason": "Arzttermin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let exception_id = exception["id"].as_i64().unwrap();

    let (status, week) = send(
        &app,
        "GET",
        "/students/1/week?offset=0&date=2026-08-19",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(week["week_start"], json!("2026-08-17"));
    let days = week["days"].as_array().unwrap();
    assert_eq!(days.len(), 5);
    assert_eq!(days[0]["effective_time"], json!("14:00"));
    assert_eq!(days[0]["is_exception"], json!(true));
    assert_eq!(days[0]["effective_notes"], json!("Arzttermin"));
    assert_eq!(days[2]["is_today"], json!(true));

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/students/1/exceptions/{exception_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, week) = send(
        &app,
        "GET",
        "/students/1/week?offset=0&date=2026-08-19",
        None,
    )
    .await;
    let days = week["days"].as_array().unwrap();
    assert_eq!(days[0]["effective_time"], json!("15:00"));
    assert_eq!(days[0]["is_exception"], json!(false));
}

#[tokio::test]
async fn recreating_an_exception_date_reports_an_update() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt"})),
    )
    .await;

    let (status, first) = send(
        &app,
        "POST",
        "/students/1/exceptions",
        Some(json!({
            "exception_date": "2026-08-17",
            "pickup_time": "14:00",
            "reason": "Arzttermin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, second) = send(
        &app,
        "POST",
        "/students/1/exceptions",
        Some(json!({
            "exception_date": "2026-08-17",
            "reason": "Keine Abholung"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["reason"], json!("Keine Abholung"));
}

#[tokio::test]
async fn exception_without_time_shows_no_pickup_in_week() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt"})),
    )
    .await;
    send(
        &app,
        "PUT",
        "/students/1/schedule",
        Some(json!({"entries": [{"weekday": 1, "pickup_time": "15:00"}]})),
    )
    .await;
    send(
        &app,
        "POST",
        "/students/1/exceptions",
        Some(json!({"exception_date": "2026-08-17", "reason": "Keine Abholung"})),
    )
    .await;

    let (_, week) = send(
        &app,
        "GET",
        "/students/1/week?date=2026-08-19",
        None,
    )
    .await;
    let monday = &week["days"][0];
    assert_eq!(monday["is_exception"], json!(true));
    assert!(monday.get("effective_time").is_none() || monday["effective_time"].is_null());
}

#[tokio::test]
async fn sick_flag_suppresses_only_today() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt"})),
    )
    .await;
    send(
        &app,
        "PUT",
        "/students/1/schedule",
        Some(json!({"entries": [
            {"weekday": 1, "pickup_time": "15:00"},
            {"weekday": 3, "pickup_time": "15:00"}
        ]})),
    )
    .await;

    let (status, student) = send(
        &app,
        "PUT",
        "/students/1/sick",
        Some(json!({"is_sick": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(student["is_sick"], json!(true));

    let (_, week) = send(&app, "GET", "/students/1/week?date=2026-08-19", None).await;
    let days = week["days"].as_array().unwrap();
    assert_eq!(days[2]["show_sick"], json!(true));
    assert!(days[2].get("effective_time").map_or(true, Value::is_null));
    assert_eq!(days[0]["show_sick"], json!(false));
    assert_eq!(days[0]["effective_time"], json!("15:00"));
}

#[tokio::test]
async fn note_lifecycle_via_http_api() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt"})),
    )
    .await;

    let (status, note) = send(
        &app,
        "POST",
        "/students/1/notes",
        Some(json!({"note_date": "2026-08-19", "content": "Turnbeutel mitgeben"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let note_id = note["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/students/1/notes/{note_id}"),
        Some(json!({"note_date": "2026-08-20", "content": "Doch am Donnerstag"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["date"], json!("2026-08-20"));

    let (status, _) = send(&app, "DELETE", &format!("/students/1/notes/{note_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, error) = send(&app, "DELETE", &format!("/students/1/notes/{note_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], json!("not_found"));
}

#[tokio::test]
async fn oversized_note_is_rejected_before_storing() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt"})),
    )
    .await;

    let long = "x".repeat(501);
    let (status, error) = send(
        &app,
        "POST",
        "/students/1/notes",
        Some(json!({"note_date": "2026-08-19", "content": long})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], json!("invalid_request"));

    let (_, snapshot) = send(&app, "GET", "/students/1/pickup", None).await;
    assert!(snapshot["notes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn mutations_queue_notifications() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/students",
        Some(json!({"first_name": "Anna", "last_name": "Schmidt"})),
    )
    .await;
    send(
        &app,
        "PUT",
        "/students/1/schedule",
        Some(json!({"entries": [{"weekday": 1, "pickup_time": "15:00"}]})),
    )
    .await;
    send(&app, "PUT", "/students/1/sick", Some(json!({"is_sick": true}))).await;

    let (status, notifications) = send(&app, "GET", "/notifications", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = notifications.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["kind"], json!("success"));
    assert_eq!(list[2]["message"], json!("Student 1 marked sick"));

    let id = list[0]["id"].as_u64().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/notifications/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
