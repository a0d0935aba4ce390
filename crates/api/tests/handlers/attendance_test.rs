use axum::http::StatusCode;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use shiftsync_core::models::attendance::{
    AttendanceQr, AttendanceRecord, MarkAttendanceResponse, QrTokenResponse, derive_token,
};
use shiftsync_db::store::ShiftStore;

use crate::test_utils::{QR_SECRET, Session, TestApp, spawn};

async fn issue(app: &TestApp, owner: &Session) -> QrTokenResponse {
    let (name, value) = owner.auth();
    let response = app
        .server
        .get("/api/attendance/qr")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    response.json()
}

async fn mark(app: &TestApp, worker: &Session, token: &str) -> axum_test::TestResponse {
    let (name, value) = worker.auth();
    app.server
        .post("/api/attendance/qr")
        .add_header(name, value)
        .json(&json!({ "token": token }))
        .await
}

async fn staffed_shop(app: &TestApp) -> (Session, Session) {
    let owner = app.owner("owner@example.com").await;
    app.setup_shop(&owner, &["Morning"]).await;
    let worker = app.worker("wes@example.com", "Wes").await;
    app.invite(&owner, &worker).await;
    (owner, worker)
}

#[tokio::test]
async fn issued_token_is_bound_to_date_and_owner() {
    let app = spawn();
    let (owner, _) = staffed_shop(&app).await;

    let qr = issue(&app, &owner).await;

    let now = Utc::now();
    assert_eq!(
        qr.token,
        derive_token(now.date_naive(), QR_SECRET, owner.user.id)
    );
    assert!(qr.expires_at > now);
    assert!(qr.expires_at <= now + Duration::days(1));
}

#[tokio::test]
async fn worker_marks_attendance_once_per_day() {
    let app = spawn();
    let (owner, worker) = staffed_shop(&app).await;
    let qr = issue(&app, &owner).await;

    let first = mark(&app, &worker, &qr.token).await;
    first.assert_status_ok();
    let body: MarkAttendanceResponse = first.json();
    assert!(body.success);

    let second = mark(&app, &worker, &qr.token).await;
    second.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = second.json();
    assert_eq!(
        error["error"],
        "Validation error: Attendance already marked for today"
    );

    let (name, value) = owner.auth();
    let records: Vec<AttendanceRecord> = app
        .server
        .get("/api/attendance")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].worker_id, worker.user.id);
    assert_eq!(records[0].key(), format!("{}-{}", worker.user.id, Utc::now().format("%Y-%m-%d")));
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let app = spawn();
    let (owner, worker) = staffed_shop(&app).await;
    issue(&app, &owner).await;

    let response = mark(&app, &worker, "deadbeef").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["error"], "Validation error: Invalid or expired QR code");
}

#[tokio::test]
async fn yesterdays_token_is_rejected() {
    let app = spawn();
    let (owner, worker) = staffed_shop(&app).await;
    let yesterday = AttendanceQr::issue(owner.user.id, QR_SECRET, Utc::now() - Duration::days(1));
    app.store.save_attendance_qr(yesterday.clone()).await.unwrap();

    let response = mark(&app, &worker, &yesterday.token).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_from_another_shop_is_rejected() {
    let app = spawn();
    let (_, worker) = staffed_shop(&app).await;
    let other_owner = app.owner("other@example.com").await;
    app.setup_shop(&other_owner, &["Morning"]).await;
    let other_qr = issue(&app, &other_owner).await;

    let response = mark(&app, &worker, &other_qr.token).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn worker_without_owner_cannot_mark() {
    let app = spawn();
    let loner = app.worker("loner@example.com", "Lonely").await;

    let response = mark(&app, &loner, "anything").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_owners_issue_codes() {
    let app = spawn();
    let (_, worker) = staffed_shop(&app).await;
    let (name, value) = worker.auth();

    let response = app
        .server
        .get("/api/attendance/qr")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}
