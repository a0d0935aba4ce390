use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use shiftsync_core::models::{
    shop::Shop,
    user::{InviteWorkerResponse, User},
};

use crate::test_utils::spawn;

#[tokio::test]
async fn upsert_keeps_ids_and_bumps_version_on_rename() {
    let app = spawn();
    let owner = app.owner("owner@example.com").await;

    let created: Shop = serde_json::from_value(app.setup_shop(&owner, &["Open", "Close"]).await)
        .unwrap();
    assert_eq!(created.shift_version, 1);
    assert_eq!(created.shifts[0].id, "shift-0");
    assert_eq!(created.shifts[1].id, "shift-1");

    let renamed: Shop =
        serde_json::from_value(app.setup_shop(&owner, &["Opening", "Closing"]).await).unwrap();
    assert_eq!(renamed.shift_version, 2);
    assert_eq!(renamed.shifts[0].id, "shift-0");
    assert_eq!(renamed.shifts[0].name, "Opening");

    let resaved: Shop =
        serde_json::from_value(app.setup_shop(&owner, &["Opening", "Closing"]).await).unwrap();
    assert_eq!(resaved.shift_version, 2);
}

#[tokio::test]
async fn invalid_shift_is_rejected() {
    let app = spawn();
    let owner = app.owner("owner@example.com").await;
    let (name, value) = owner.auth();

    let response = app
        .server
        .put("/api/shop")
        .add_header(name, value)
        .json(&json!({
            "name": "Cafe",
            "shifts": [{ "name": "Late", "start_time": "25:00", "end_time": "02:00", "max_employees": 1 }],
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn workers_cannot_configure_shops() {
    let app = spawn();
    let worker = app.worker("wes@example.com", "Wes").await;
    let (name, value) = worker.auth();

    let response = app
        .server
        .put("/api/shop")
        .add_header(name, value)
        .json(&json!({ "name": "Cafe", "shifts": [] }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_shop_is_not_found() {
    let app = spawn();
    let owner = app.owner("owner@example.com").await;
    let (name, value) = owner.auth();

    let response = app.server.get("/api/shop").add_header(name, value).await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invite_assigns_owner_and_records_work_type() {
    let app = spawn();
    let owner = app.owner("owner@example.com").await;
    app.setup_shop(&owner, &["Morning"]).await;
    app.worker("barista@example.com", "Bea").await;
    let (name, value) = owner.auth();

    let response = app
        .server
        .post("/api/workers/invite")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "email": "Barista@example.com", "work_type": "Barista" }))
        .await;

    response.assert_status_ok();
    let body: InviteWorkerResponse = response.json();
    assert_eq!(body.worker.owner_id, Some(owner.user.id));
    assert_eq!(body.worker.work_type.as_deref(), Some("Barista"));
    assert_eq!(body.work_types, vec!["Barista".to_string()]);

    let workers: Vec<User> = app
        .server
        .get("/api/workers")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(workers.len(), 1);
    assert_eq!(workers[0].name, "Bea");
}

#[tokio::test]
async fn invite_rejects_workers_of_other_shops() {
    let app = spawn();
    let first = app.owner("first@example.com").await;
    let second = app.owner("second@example.com").await;
    app.setup_shop(&first, &["Morning"]).await;
    app.setup_shop(&second, &["Morning"]).await;
    let worker = app.worker("wes@example.com", "Wes").await;
    app.invite(&first, &worker).await;

    let (name, value) = second.auth();
    let response = app
        .server
        .post("/api/workers/invite")
        .add_header(name, value)
        .json(&json!({ "email": "wes@example.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invite_rejects_unknown_and_owner_accounts() {
    let app = spawn();
    let owner = app.owner("owner@example.com").await;
    app.owner("other@example.com").await;
    app.setup_shop(&owner, &["Morning"]).await;
    let (name, value) = owner.auth();

    app.server
        .post("/api/workers/invite")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "email": "ghost@example.com" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .post("/api/workers/invite")
        .add_header(name, value)
        .json(&json!({ "email": "other@example.com" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
