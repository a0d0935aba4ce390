//! # Schedule Handlers
//!
//! Auto-scheduling sends the shop's workers and shifts to the external
//! solver and stores the result as the shop's current schedule. The optimize
//! pass asks the language model to rearrange the current schedule and only
//! saves the answer when every worker still has exactly the same number of
//! shifts.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use shiftsync_core::{
    errors::ShiftError,
    models::{
        schedule::{
            AutoScheduleResponse, DaySchedule, OptimizeRequest, OptimizeResponse, ScheduleGrid,
            ScheduleQuery, ScheduleSource, SummaryQuery, SummaryResponse, flatten, grid_counts,
            person_summary, rebuild, render_grid, shift_counts, verify_counts,
        },
        shop::Shop,
        solver::build_solve_request,
        user::UserType,
    },
};
use tracing::{info, warn};

use crate::{
    ApiState,
    clients::optimizer::{build_prompt, parse_reply},
    handlers::{
        auth::load_user,
        shop::{load_shop, shop_owner_id},
    },
    middleware::{auth::SessionUser, error_handling::AppError},
};

/// Runs the external solver and replaces the shop's current schedule
///
/// # Endpoint
///
/// ```text
/// POST /api/schedule/auto
/// ```
///
/// # Errors
///
/// * `ShiftError::NotFound` - The caller has no shop
/// * `ShiftError::Validation` - The shop has no shifts or no workers
/// * `ShiftError::External` - The solver failed or returned an unusable reply
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn auto_schedule(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
) -> Result<Json<AutoScheduleResponse>, AppError> {
    session.require_owner()?;

    let shop = load_shop(&state, session.id).await?;
    if shop.shifts.is_empty() {
        return Err(ShiftError::Validation(
            "Add at least one shift before generating a schedule".to_string(),
        )
        .into());
    }

    let workers = state.store.list_workers(session.id).await?;
    if workers.is_empty() {
        return Err(ShiftError::Validation(
            "Invite at least one worker before generating a schedule".to_string(),
        )
        .into());
    }

    let request = build_solve_request(&shop, &workers, &state.schedule_policy);
    info!(
        "Requesting schedule for shop {}: {} workers, {} shifts, holidays {:?}",
        shop.owner_id,
        request.employees.len(),
        request.shifts,
        request.holidays
    );

    let schedule = state.solver.solve(&request).await?;
    let now = Utc::now();
    state.store.save_current_schedule(session.id, schedule.clone(), now).await?;

    Ok(Json(AutoScheduleResponse {
        schedule,
        last_scheduled: now,
    }))
}

/// Asks the language model to rebalance the current schedule
///
/// The reply is rebuilt into a schedule (holiday days stay holidays) and
/// compared against the current per-worker shift counts. When any count
/// differs the attempted schedule is returned with status 422 and nothing is
/// saved.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn optimize_schedule(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
    Json(payload): Json<OptimizeRequest>,
) -> Result<(StatusCode, Json<OptimizeResponse>), AppError> {
    session.require_owner()?;

    let shop = load_shop(&state, session.id).await?;
    let current = shop
        .current_schedule
        .clone()
        .ok_or_else(|| ShiftError::NotFound("Generate a schedule before optimizing".to_string()))?;

    let shift_count = shop.shift_count();
    let grid = flatten(&current, shift_count);
    let before = grid_counts(&grid);
    let prompt = build_prompt(&grid, &before, &shop.shifts, payload.constraints.as_deref());

    let reply = state.optimizer.complete(&prompt).await?;
    let attempted = rebuild(&current, parse_reply(&reply)?, shift_count)?;

    let violations = verify_counts(&before, &shift_counts(&attempted));
    if !violations.is_empty() {
        warn!(
            "Discarding optimized schedule for shop {}: {} workers changed shift count",
            shop.owner_id,
            violations.len()
        );
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(OptimizeResponse {
                saved: false,
                schedule: attempted,
                violations,
                message: "Optimized schedule changed shift counts and was not saved".to_string(),
            }),
        ));
    }

    state.store.save_optimized_schedule(session.id, attempted.clone(), Utc::now()).await?;
    info!("Saved optimized schedule for shop {}", shop.owner_id);

    Ok((
        StatusCode::OK,
        Json(OptimizeResponse {
            saved: true,
            schedule: attempted,
            violations: Vec::new(),
            message: "Optimized schedule saved".to_string(),
        }),
    ))
}

/// Loads the shop the caller can see: their own, or their employer's.
async fn visible_shop(state: &ApiState, session: &SessionUser) -> Result<Shop, AppError> {
    let owner_id = match session.user_type {
        UserType::Owner => session.id,
        UserType::Worker => shop_owner_id(&load_user(state, session.id).await?)?,
    };
    load_shop(state, owner_id).await
}

fn stored_schedule(shop: &Shop, source: ScheduleSource) -> Result<&[DaySchedule], AppError> {
    let schedule = match source {
        ScheduleSource::Current => shop.current_schedule.as_deref(),
        ScheduleSource::Optimized => shop.optimized_schedule.as_deref(),
    };
    schedule.ok_or_else(|| {
        AppError(ShiftError::NotFound(match source {
            ScheduleSource::Current => "No schedule has been generated yet".to_string(),
            ScheduleSource::Optimized => "No optimized schedule has been saved yet".to_string(),
        }))
    })
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_schedule(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleGrid>, AppError> {
    let shop = visible_shop(&state, &session).await?;
    let schedule = stored_schedule(&shop, query.source)?;

    let updated_at = match query.source {
        ScheduleSource::Current => shop.last_scheduled,
        ScheduleSource::Optimized => shop.last_optimized,
    };

    Ok(Json(ScheduleGrid {
        source: query.source,
        updated_at,
        days: render_grid(schedule, &shop.shifts),
    }))
}

/// Text summary of one person's week. Workers default to themselves.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_summary(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let person = match (query.person.as_deref().map(str::trim), session.user_type) {
        (Some(person), _) if !person.is_empty() => person.to_string(),
        (_, UserType::Worker) => session.name.clone(),
        (_, UserType::Owner) => {
            return Err(ShiftError::Validation("Query parameter 'person' is required".to_string())
                .into());
        }
    };

    let shop = visible_shop(&state, &session).await?;
    let schedule = stored_schedule(&shop, query.source)?;

    Ok(Json(SummaryResponse {
        summary: person_summary(schedule, &person),
        person,
    }))
}
