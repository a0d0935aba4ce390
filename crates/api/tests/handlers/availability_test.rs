use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use shiftsync_core::models::{
    availability::{AvailabilityResponse, ToggleShiftResponse},
    day::DayOfWeek,
};
use shiftsync_db::store::ShiftStore;

use crate::test_utils::{Session, TestApp, spawn};

async fn toggle(app: &TestApp, caller: &Session, body: Value) -> axum_test::TestResponse {
    let (name, value) = caller.auth();
    app.server
        .post("/api/toggle-shift")
        .add_header(name, value)
        .json(&body)
        .await
}

/// Owner with a three-shift shop and one invited worker.
async fn staffed_shop(app: &TestApp) -> (Session, Session) {
    let owner = app.owner("owner@example.com").await;
    app.setup_shop(&owner, &["Morning", "Afternoon", "Evening"])
        .await;
    let worker = app.worker("wes@example.com", "Wes").await;
    app.invite(&owner, &worker).await;
    (owner, worker)
}

#[tokio::test]
async fn first_toggle_sets_exactly_one_cell() {
    let app = spawn();
    let (_, worker) = staffed_shop(&app).await;

    let response = toggle(
        &app,
        &worker,
        json!({ "email": "wes@example.com", "day": "Monday", "shift": "Morning" }),
    )
    .await;

    response.assert_status_ok();
    let body: ToggleShiftResponse = response.json();
    assert!(body.success);
    assert_eq!(body.availability.previous, 0);
    assert_eq!(body.availability.current, 1);
    assert_eq!(body.availability.status, "available");
    assert_eq!(body.updated_availability.len(), 7);

    let cells: Vec<u8> = body
        .updated_availability
        .iter()
        .flat_map(|day| day.shifts.clone())
        .collect();
    assert_eq!(cells.len(), 21);
    assert_eq!(cells.iter().filter(|&&c| c == 1).count(), 1);
    assert_eq!(body.updated_availability[0].shifts, vec![1, 0, 0]);
}

#[tokio::test]
async fn double_toggle_restores_original_matrix() {
    let app = spawn();
    let (_, worker) = staffed_shop(&app).await;
    let body = json!({ "email": "wes@example.com", "day": "friday", "shift": "EVENING" });

    toggle(&app, &worker, body.clone()).await.assert_status_ok();
    let response = toggle(&app, &worker, body).await;

    let body: ToggleShiftResponse = response.json();
    assert_eq!(body.availability.previous, 1);
    assert_eq!(body.availability.current, 0);
    assert!(
        body.updated_availability
            .iter()
            .all(|day| day.shifts == vec![0, 0, 0])
    );
}

#[tokio::test]
async fn toggle_persists_full_matrix_with_shift_version() {
    let app = spawn();
    let (_, worker) = staffed_shop(&app).await;

    toggle(
        &app,
        &worker,
        json!({ "email": "wes@example.com", "day": "sunday", "shift": "afternoon" }),
    )
    .await
    .assert_status_ok();

    let stored = app
        .store
        .get_user_by_id(worker.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.shift_availability.len(), 7);
    assert_eq!(stored.shift_availability[6].day, DayOfWeek::Sunday);
    assert_eq!(stored.shift_availability[6].shifts, vec![0, 1, 0]);
    assert_eq!(stored.availability_version, 1);
}

#[rstest]
#[case::missing_email(json!({ "day": "monday", "shift": "morning" }), StatusCode::BAD_REQUEST)]
#[case::blank_shift(json!({ "email": "wes@example.com", "day": "monday", "shift": " " }), StatusCode::BAD_REQUEST)]
#[case::invalid_day(json!({ "email": "wes@example.com", "day": "funday", "shift": "morning" }), StatusCode::BAD_REQUEST)]
#[case::unknown_user(json!({ "email": "nobody@example.com", "day": "monday", "shift": "morning" }), StatusCode::NOT_FOUND)]
#[case::target_is_owner(json!({ "email": "owner@example.com", "day": "monday", "shift": "morning" }), StatusCode::FORBIDDEN)]
#[case::unknown_shift(json!({ "email": "wes@example.com", "day": "monday", "shift": "Night" }), StatusCode::NOT_FOUND)]
#[tokio::test]
async fn toggle_rejects_bad_requests(#[case] body: Value, #[case] expected: StatusCode) {
    let app = spawn();
    let (owner, _) = staffed_shop(&app).await;

    let response = toggle(&app, &owner, body).await;

    response.assert_status(expected);
}

#[tokio::test]
async fn worker_without_owner_is_bad_request() {
    let app = spawn();
    let loner = app.worker("loner@example.com", "Lonely").await;

    let response = toggle(
        &app,
        &loner,
        json!({ "email": "loner@example.com", "day": "monday", "shift": "morning" }),
    )
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn other_worker_cannot_toggle() {
    let app = spawn();
    let (owner, _) = staffed_shop(&app).await;
    let colleague = app.worker("cole@example.com", "Cole").await;
    app.invite(&owner, &colleague).await;

    let response = toggle(
        &app,
        &colleague,
        json!({ "email": "wes@example.com", "day": "monday", "shift": "morning" }),
    )
    .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn owner_can_toggle_their_worker() {
    let app = spawn();
    let (owner, _) = staffed_shop(&app).await;

    let response = toggle(
        &app,
        &owner,
        json!({ "email": "wes@example.com", "day": "tuesday", "shift": "morning" }),
    )
    .await;

    response.assert_status_ok();
    let body: ToggleShiftResponse = response.json();
    assert_eq!(body.user.email, "wes@example.com");
    assert_eq!(body.updated_availability[1].shifts, vec![1, 0, 0]);
}

#[tokio::test]
async fn self_service_update_is_normalised_and_marked_current() {
    let app = spawn();
    let (_, worker) = staffed_shop(&app).await;
    let (name, value) = worker.auth();

    let before: AvailabilityResponse = app
        .server
        .get("/api/workers/me/availability")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert!(before.stale);
    assert_eq!(before.shift_availability.len(), 7);

    let response = app
        .server
        .put("/api/workers/me/availability")
        .add_header(name, value)
        .json(&json!({
            "shift_availability": [{ "day": "wednesday", "shifts": [1] }],
            "max_shifts_per_week": 4,
        }))
        .await;

    response.assert_status_ok();
    let after: AvailabilityResponse = response.json();
    assert!(!after.stale);
    assert_eq!(after.max_shifts_per_week, 4);
    assert_eq!(after.shift_availability[2].shifts, vec![1, 0, 0]);
    assert_eq!(after.shift_availability[0].shifts, vec![0, 0, 0]);
}

#[tokio::test]
async fn changing_shift_list_marks_availability_stale() {
    let app = spawn();
    let (owner, worker) = staffed_shop(&app).await;
    toggle(
        &app,
        &worker,
        json!({ "email": "wes@example.com", "day": "monday", "shift": "morning" }),
    )
    .await
    .assert_status_ok();

    app.setup_shop(&owner, &["Morning", "Afternoon", "Evening", "Night"])
        .await;

    let (name, value) = worker.auth();
    let response: AvailabilityResponse = app
        .server
        .get("/api/workers/me/availability")
        .add_header(name, value)
        .await
        .json();

    assert!(response.stale);
    assert_eq!(response.shift_availability[0].shifts, vec![1, 0, 0, 0]);
}

#[tokio::test]
async fn reordering_shifts_marks_availability_stale() {
    let app = spawn();
    let (owner, worker) = staffed_shop(&app).await;
    let (name, value) = worker.auth();
    app.server
        .put("/api/workers/me/availability")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "shift_availability": [{ "day": "monday", "shifts": [1, 0, 0] }],
            "max_shifts_per_week": 3,
        }))
        .await
        .assert_status_ok();

    app.setup_shop(&owner, &["Evening", "Afternoon", "Morning"])
        .await;

    let response: AvailabilityResponse = app
        .server
        .get("/api/workers/me/availability")
        .add_header(name, value)
        .await
        .json();

    assert!(response.stale);
}

#[tokio::test]
async fn max_shifts_out_of_range_is_rejected() {
    let app = spawn();
    let (_, worker) = staffed_shop(&app).await;
    let (name, value) = worker.auth();

    let response = app
        .server
        .put("/api/workers/me/availability")
        .add_header(name, value)
        .json(&json!({ "shift_availability": [], "max_shifts_per_week": 22 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
