//! # Availability Handlers
//!
//! Worker availability is a 7-day matrix with one 0/1 flag per shop shift.
//! Stored matrices are repaired to the shop's current shift count on every
//! read, and every write stores the complete matrix stamped with the shop's
//! `shift_version`.
//!
//! Writes are read-modify-write without any concurrency token: two toggles
//! racing on the same worker both succeed and the later write wins.

use axum::{Json, extract::State};
use std::sync::Arc;
use shiftsync_core::{
    errors::ShiftError,
    models::{
        availability::{
            AvailabilityResponse, ToggleShiftRequest, ToggleShiftResponse, ToggleSummary,
            ToggledUser, UpdateAvailabilityRequest, complete_matrix, toggle_cell,
        },
        day::DayOfWeek,
        schedule::DAYS_PER_WEEK,
        user::normalize_email,
    },
};
use tracing::{debug, info};

use crate::{
    ApiState,
    handlers::{
        auth::load_user,
        shop::{load_shop, shop_owner_id},
    },
    middleware::{auth::SessionUser, error_handling::AppError},
};

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ShiftError::Validation(format!("Missing required field: {}", field)).into());
    }
    Ok(value)
}

/// Flips one availability cell for a worker
///
/// # Endpoint
///
/// ```text
/// POST /api/toggle-shift
/// { "email": "worker@example.com", "day": "Monday", "shift": "Morning" }
/// ```
///
/// Day and shift names are matched case-insensitively. The caller must be
/// the worker or the worker's owner.
///
/// # Errors
///
/// * `ShiftError::Validation` - Missing field, unknown day, or worker without an owner
/// * `ShiftError::NotFound` - Worker, shop or shift not found
/// * `ShiftError::Authorization` - Target is not a worker, or caller may not edit it
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn toggle_shift(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
    Json(payload): Json<ToggleShiftRequest>,
) -> Result<Json<ToggleShiftResponse>, AppError> {
    let email = normalize_email(required(&payload.email, "email")?);
    let day: DayOfWeek = required(&payload.day, "day")?.parse()?;
    let shift_name = required(&payload.shift, "shift")?;

    let worker = state
        .store
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| ShiftError::NotFound(format!("User {} not found", email)))?;

    if !worker.is_worker() {
        return Err(ShiftError::Authorization(format!("User {} is not a worker", email)).into());
    }
    let owner_id = worker.owner_id.ok_or_else(|| {
        ShiftError::Validation(format!("Worker {} has no assigned owner", email))
    })?;

    if session.id != worker.id && session.id != owner_id {
        return Err(ShiftError::Authorization(
            "You can only change your own availability or that of your workers".to_string(),
        )
        .into());
    }

    let shop = load_shop(&state, owner_id).await?;
    let shift_index = shop
        .find_shift_index(shift_name)
        .ok_or_else(|| ShiftError::NotFound(format!("Shift '{}' not found", shift_name)))?;

    let outcome = toggle_cell(
        &worker.shift_availability,
        shop.shift_count(),
        day,
        shift_index,
    )?;
    debug!(
        "Toggling {} {} shift {} for worker {}: {} -> {}",
        day, shift_name, shift_index, worker.id, outcome.previous, outcome.current
    );

    state
        .store
        .update_availability(worker.id, outcome.matrix.clone(), shop.shift_version, None)
        .await?;

    let status = if outcome.current == 1 {
        "available"
    } else {
        "unavailable"
    };
    let shift = &shop.shifts[shift_index];

    Ok(Json(ToggleShiftResponse {
        success: true,
        message: format!("{} is now {} for {} {}", worker.name, status, day, shift.name),
        user: ToggledUser {
            id: worker.id,
            email: worker.email,
            name: worker.name,
        },
        availability: ToggleSummary {
            previous: outcome.previous,
            current: outcome.current,
            status: status.to_string(),
        },
        updated_availability: outcome.matrix,
    }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_my_availability(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
) -> Result<Json<AvailabilityResponse>, AppError> {
    session.require_worker()?;

    let worker = load_user(&state, session.id).await?;
    let shop = load_shop(&state, shop_owner_id(&worker)?).await?;

    Ok(Json(AvailabilityResponse::for_worker(
        &worker,
        shop.shift_count(),
        shop.shift_version,
    )))
}

/// Replaces the caller's whole availability matrix.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn update_my_availability(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    session.require_worker()?;

    let worker = load_user(&state, session.id).await?;
    let shop = load_shop(&state, shop_owner_id(&worker)?).await?;

    let week_capacity = i32::try_from(DAYS_PER_WEEK * shop.shift_count()).unwrap_or(i32::MAX);
    if let Some(max) = payload.max_shifts_per_week {
        if !(0..=week_capacity).contains(&max) {
            return Err(ShiftError::Validation(format!(
                "max_shifts_per_week must be between 0 and {}",
                week_capacity
            ))
            .into());
        }
    }

    let matrix = complete_matrix(&payload.shift_availability, shop.shift_count());
    state
        .store
        .update_availability(
            worker.id,
            matrix,
            shop.shift_version,
            payload.max_shifts_per_week,
        )
        .await?;

    info!("Worker {} replaced their availability", worker.id);
    let updated = load_user(&state, worker.id).await?;

    Ok(Json(AvailabilityResponse::for_worker(
        &updated,
        shop.shift_count(),
        shop.shift_version,
    )))
}
