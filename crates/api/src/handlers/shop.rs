//! # Shop Handlers
//!
//! Owners configure one shop: its name, the ordered list of shifts and the
//! work types offered to invited workers. Availability matrices are indexed
//! by position in the shift list, so any change to the list of shift ids
//! bumps the shop's `shift_version` and marks existing matrices stale.

use axum::{Json, extract::State};
use chrono::Utc;
use std::sync::Arc;
use shiftsync_core::{
    errors::{ShiftError, ShiftResult},
    models::{
        shop::{Shop, UpsertShopRequest, assign_shift_ids},
        user::{InviteWorkerRequest, InviteWorkerResponse, User, UserType, normalize_email},
    },
};
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiState,
    handlers::auth::load_user,
    middleware::{auth::SessionUser, error_handling::AppError},
};

/// Id of the shop a user belongs to: their own for owners, their employer's for workers.
pub(crate) fn shop_owner_id(user: &User) -> ShiftResult<Uuid> {
    match user.user_type {
        UserType::Owner => Ok(user.id),
        UserType::Worker => user.owner_id.ok_or_else(|| {
            ShiftError::Validation("Worker has no assigned owner".to_string())
        }),
    }
}

pub(crate) async fn load_shop(state: &ApiState, owner_id: Uuid) -> Result<Shop, AppError> {
    state
        .store
        .get_shop(owner_id)
        .await?
        .ok_or_else(|| AppError(ShiftError::NotFound("Shop not found".to_string())))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_shop(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
) -> Result<Json<Shop>, AppError> {
    session.require_owner()?;
    Ok(Json(load_shop(&state, session.id).await?))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn upsert_shop(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
    Json(payload): Json<UpsertShopRequest>,
) -> Result<Json<Shop>, AppError> {
    session.require_owner()?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ShiftError::Validation("Shop name is required".to_string()).into());
    }

    let existing = state.store.get_shop(session.id).await?;

    let mut shop = existing.unwrap_or_else(|| Shop::new(session.id, name.clone(), Utc::now()));
    let previous_version = shop.shift_version;

    let shifts = assign_shift_ids(&shop.shifts, payload.shifts)?;
    shop.name = name;
    shop.replace_shifts(shifts);
    if let Some(work_types) = payload.work_types {
        shop.work_types.clear();
        for work_type in &work_types {
            shop.add_work_type(work_type);
        }
    }

    if shop.shift_version != previous_version {
        info!(
            "Shop {} shift list changed, version {} -> {}",
            shop.owner_id, previous_version, shop.shift_version
        );
    }

    let saved = state.store.save_shop(shop).await?;
    Ok(Json(saved))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn list_workers(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
) -> Result<Json<Vec<User>>, AppError> {
    session.require_owner()?;

    let workers = state.store.list_workers(session.id).await?;
    Ok(Json(workers))
}

/// Attaches an existing worker account to the caller's shop.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn invite_worker(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
    Json(payload): Json<InviteWorkerRequest>,
) -> Result<Json<InviteWorkerResponse>, AppError> {
    session.require_owner()?;

    let email = normalize_email(&payload.email);
    if email.is_empty() {
        return Err(ShiftError::Validation("Email is required".to_string()).into());
    }
    let work_type = payload
        .work_type
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty());

    let mut shop = load_shop(&state, session.id).await?;

    let worker = state
        .store
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| ShiftError::NotFound(format!("No account found for {}", email)))?;

    if !worker.is_worker() {
        return Err(ShiftError::Validation(format!("{} is not a worker account", email)).into());
    }
    if worker.owner_id.is_some_and(|owner| owner != session.id) {
        return Err(
            ShiftError::Validation(format!("{} already works for another shop", email)).into(),
        );
    }

    state.store.assign_owner(worker.id, session.id, work_type.clone()).await?;

    if let Some(work_type) = &work_type {
        let before = shop.work_types.len();
        shop.add_work_type(work_type);
        if shop.work_types.len() != before {
            shop = state.store.save_shop(shop).await?;
        }
    }

    info!("Worker {} joined shop {}", worker.id, session.id);
    let worker = load_user(&state, worker.id).await?;

    Ok(Json(InviteWorkerResponse {
        worker,
        work_types: shop.work_types,
    }))
}
