//! # Account Handlers
//!
//! Signup, login and session lookup. Emails are normalised (trimmed and
//! lower-cased) before they are stored or looked up.

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use shiftsync_core::{
    errors::ShiftError,
    models::user::{LoginRequest, LoginResponse, SignupRequest, User, normalize_email},
};
use shiftsync_db::store::NewUser;
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::{self, SessionUser},
        error_handling::AppError,
    },
};

const MIN_PASSWORD_LENGTH: usize = 6;

/// Loads the stored account behind a session.
pub(crate) async fn load_user(state: &ApiState, id: Uuid) -> Result<User, AppError> {
    state
        .store
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| AppError(ShiftError::Authentication("Account no longer exists".to_string())))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn signup(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let email = normalize_email(&payload.email);
    let name = payload.name.trim().to_string();

    if email.is_empty() || !email.contains('@') {
        return Err(ShiftError::Validation("A valid email is required".to_string()).into());
    }
    if name.is_empty() {
        return Err(ShiftError::Validation("Name is required".to_string()).into());
    }
    if payload.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ShiftError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))
        .into());
    }

    let existing = state.store.get_user_by_email(&email).await?;
    if existing.is_some() {
        return Err(
            ShiftError::Validation("An account with this email already exists".to_string()).into(),
        );
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(NewUser {
            email,
            name,
            password_hash,
            user_type: payload.user_type,
        })
        .await?;

    info!("Created {} account {}", user.user_type, user.id);
    let token = state.sessions.issue(&user)?;

    Ok((StatusCode::CREATED, Json(LoginResponse { token, user })))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || AppError(ShiftError::Authentication("Invalid email or password".to_string()));

    let (user, password_hash) = state
        .store
        .get_credentials(&normalize_email(&payload.email))
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&payload.password, &password_hash)? {
        return Err(invalid());
    }

    let token = state.sessions.issue(&user)?;
    Ok(Json(LoginResponse { token, user }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn me(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
) -> Result<Json<User>, AppError> {
    Ok(Json(load_user(&state, session.id).await?))
}
