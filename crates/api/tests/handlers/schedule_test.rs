use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use shiftsync_api::clients::{optimizer::MockScheduleOptimizer, solver::MockScheduleSolver};
use shiftsync_core::{
    errors::ShiftError,
    models::schedule::{
        AutoScheduleResponse, DayPlan, DaySchedule, OptimizeResponse, ScheduleGrid,
        ShiftAssignment, SummaryResponse, WorkerGrid,
    },
};
use shiftsync_db::store::ShiftStore;

use crate::test_utils::{Session, TestApp, sample_schedule, spawn, spawn_with};

/// Owner with a two-shift shop staffed by Ann and Bob.
async fn staffed_shop(app: &TestApp) -> (Session, Session, Session) {
    let owner = app.owner("owner@example.com").await;
    app.setup_shop(&owner, &["Morning", "Evening"]).await;
    let ann = app.worker("ann@example.com", "Ann").await;
    let bob = app.worker("bob@example.com", "Bob").await;
    app.invite(&owner, &ann).await;
    app.invite(&owner, &bob).await;
    (owner, ann, bob)
}

fn solver_returning_sample() -> MockScheduleSolver {
    let mut solver = MockScheduleSolver::new();
    let schedule = sample_schedule();
    solver
        .expect_solve()
        .times(1)
        .returning(move |_| Ok(schedule.clone()));
    solver
}

fn optimizer_replying(grid: WorkerGrid) -> MockScheduleOptimizer {
    let reply = format!("```json\n{}\n```", serde_json::to_string(&grid).unwrap());
    let mut optimizer = MockScheduleOptimizer::new();
    optimizer
        .expect_complete()
        .withf(|prompt| prompt.contains("{\"Ann\":6,\"Bob\":6}"))
        .times(1)
        .returning(move |_| Ok(reply.clone()));
    optimizer
}

fn week_grid(monday_to_saturday: Vec<Vec<String>>) -> WorkerGrid {
    let mut grid = vec![monday_to_saturday; 6];
    grid.push(vec![Vec::new(), Vec::new()]);
    grid
}

async fn run_auto(app: &TestApp, owner: &Session) {
    let (name, value) = owner.auth();
    app.server
        .post("/api/schedule/auto")
        .add_header(name, value)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn auto_schedule_sends_legacy_request_and_saves_result() {
    let mut solver = MockScheduleSolver::new();
    let schedule = sample_schedule();
    solver
        .expect_solve()
        .withf(|request| {
            request.employees == vec!["Ann".to_string(), "Bob".to_string()]
                && request.days == 7
                && request.shifts == 2
                && request.availability.len() == 2 * 7 * 2
                && request.max_shifts.get("Ann") == Some(&10)
                && request.coverage == vec![2, 2]
                && request.holidays == vec![6]
        })
        .times(1)
        .returning(move |_| Ok(schedule.clone()));
    let app = spawn_with(solver, MockScheduleOptimizer::new());
    let (owner, _, _) = staffed_shop(&app).await;
    let (name, value) = owner.auth();

    let response = app
        .server
        .post("/api/schedule/auto")
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: AutoScheduleResponse = response.json();
    assert_eq!(body.schedule, sample_schedule());

    let shop = app.store.get_shop(owner.user.id).await.unwrap().unwrap();
    assert_eq!(shop.current_schedule, Some(sample_schedule()));
    assert_eq!(shop.last_scheduled, Some(body.last_scheduled));
}

#[tokio::test]
async fn solver_failure_is_bad_gateway_and_saves_nothing() {
    let mut solver = MockScheduleSolver::new();
    solver
        .expect_solve()
        .returning(|_| Err(ShiftError::External("No feasible schedule".to_string())));
    let app = spawn_with(solver, MockScheduleOptimizer::new());
    let (owner, _, _) = staffed_shop(&app).await;
    let (name, value) = owner.auth();

    let response = app
        .server
        .post("/api/schedule/auto")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let shop = app.store.get_shop(owner.user.id).await.unwrap().unwrap();
    assert_eq!(shop.current_schedule, None);
}

#[tokio::test]
async fn auto_schedule_without_workers_is_bad_request() {
    let mut solver = MockScheduleSolver::new();
    solver.expect_solve().never();
    let app = spawn_with(solver, MockScheduleOptimizer::new());
    let owner = app.owner("owner@example.com").await;
    app.setup_shop(&owner, &["Morning"]).await;
    let (name, value) = owner.auth();

    let response = app
        .server
        .post("/api/schedule/auto")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn grid_marks_holidays_and_collapses_overflow() {
    let mut solver = MockScheduleSolver::new();
    let mut schedule = sample_schedule();
    schedule[0] = DaySchedule {
        day: 0,
        schedule: DayPlan::Shifts(vec![ShiftAssignment {
            shift: 0,
            workers: vec!["Ann".to_string(), "Bob".to_string(), "Cy".to_string()],
        }]),
    };
    solver
        .expect_solve()
        .returning(move |_| Ok(schedule.clone()));
    let app = spawn_with(solver, MockScheduleOptimizer::new());
    let (owner, ann, _) = staffed_shop(&app).await;
    run_auto(&app, &owner).await;

    // Workers see their owner's schedule.
    let (name, value) = ann.auth();
    let response = app.server.get("/api/schedule").add_header(name, value).await;

    response.assert_status_ok();
    let grid: ScheduleGrid = response.json();
    assert_eq!(grid.days.len(), 7);
    assert_eq!(grid.days[0].cells[0].names, vec!["Ann", "Bob"]);
    assert_eq!(grid.days[0].cells[0].overflow, 1);
    assert_eq!(grid.days[0].cells[1].names, Vec::<String>::new());
    assert!(grid.days[6].holiday);
    assert!(grid.days[6].cells.is_empty());
}

#[tokio::test]
async fn missing_schedule_is_not_found() {
    let app = spawn();
    let (owner, _, _) = staffed_shop(&app).await;
    let (name, value) = owner.auth();

    app.server
        .get("/api/schedule")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .post("/api/schedule/optimize")
        .add_header(name, value)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn optimize_saves_when_counts_are_preserved() {
    let swapped = week_grid(vec![vec!["Bob".to_string()], vec!["Ann".to_string()]]);
    let app = spawn_with(solver_returning_sample(), optimizer_replying(swapped));
    let (owner, _, _) = staffed_shop(&app).await;
    run_auto(&app, &owner).await;
    let (name, value) = owner.auth();

    let response = app
        .server
        .post("/api/schedule/optimize")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "constraints": "Swap morning and evening staff" }))
        .await;

    response.assert_status_ok();
    let body: OptimizeResponse = response.json();
    assert!(body.saved);
    assert!(body.violations.is_empty());
    assert!(body.schedule[6].is_holiday());

    let grid: ScheduleGrid = app
        .server
        .get("/api/schedule")
        .add_query_param("source", "optimized")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(grid.days[0].cells[0].names, vec!["Bob"]);

    let shop = app.store.get_shop(owner.user.id).await.unwrap().unwrap();
    assert_eq!(shop.current_schedule, Some(sample_schedule()));
    assert!(shop.last_optimized.is_some());
}

#[tokio::test]
async fn optimize_with_changed_counts_is_not_saved() {
    let lopsided = week_grid(vec![vec!["Ann".to_string()], vec!["Ann".to_string()]]);
    let app = spawn_with(solver_returning_sample(), optimizer_replying(lopsided));
    let (owner, _, _) = staffed_shop(&app).await;
    run_auto(&app, &owner).await;
    let (name, value) = owner.auth();

    let response = app
        .server
        .post("/api/schedule/optimize")
        .add_header(name, value)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: OptimizeResponse = response.json();
    assert!(!body.saved);
    assert_eq!(body.violations.len(), 2);
    assert_eq!(body.violations[0].worker, "Ann");
    assert_eq!(body.violations[0].expected, 6);
    assert_eq!(body.violations[0].actual, 12);

    let shop = app.store.get_shop(owner.user.id).await.unwrap().unwrap();
    assert_eq!(shop.optimized_schedule, None);
    assert_eq!(shop.last_optimized, None);
}

#[tokio::test]
async fn optimize_with_wrong_shape_is_bad_gateway() {
    let mut optimizer = MockScheduleOptimizer::new();
    optimizer
        .expect_complete()
        .returning(|_| Ok("[[[\"Ann\"]]]".to_string()));
    let app = spawn_with(solver_returning_sample(), optimizer);
    let (owner, _, _) = staffed_shop(&app).await;
    run_auto(&app, &owner).await;
    let (name, value) = owner.auth();

    let response = app
        .server
        .post("/api/schedule/optimize")
        .add_header(name, value)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn worker_summary_defaults_to_self() {
    let app = spawn_with(solver_returning_sample(), MockScheduleOptimizer::new());
    let (owner, ann, _) = staffed_shop(&app).await;
    run_auto(&app, &owner).await;
    let (name, value) = ann.auth();

    let response = app
        .server
        .get("/api/schedule/summary")
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: SummaryResponse = response.json();
    assert_eq!(body.person, "Ann");
    assert_eq!(
        body.summary,
        "Ann:\nD0: S0\nD1: S0\nD2: S0\nD3: S0\nD4: S0\nD5: S0\nDAY 6: HOLIDAY"
    );
}

#[tokio::test]
async fn owner_summary_requires_person() {
    let app = spawn_with(solver_returning_sample(), MockScheduleOptimizer::new());
    let (owner, _, _) = staffed_shop(&app).await;
    run_auto(&app, &owner).await;
    let (name, value) = owner.auth();

    app.server
        .get("/api/schedule/summary")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let body: SummaryResponse = app
        .server
        .get("/api/schedule/summary")
        .add_query_param("person", " bob ")
        .add_header(name, value)
        .await
        .json();
    assert!(body.summary.starts_with("bob:\nD0: S1\n"));
}
