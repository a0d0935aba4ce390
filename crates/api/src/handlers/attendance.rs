//! # Attendance Handlers
//!
//! Owners display a QR code carrying the day's token; workers scan it to
//! mark themselves present. A worker gets at most one record per UTC day.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use std::sync::Arc;
use shiftsync_core::{
    errors::ShiftError,
    models::attendance::{
        AttendanceQr, AttendanceQuery, AttendanceRecord, MarkAttendanceRequest,
        MarkAttendanceResponse, QrTokenResponse,
    },
};
use tracing::{info, warn};

use crate::{
    ApiState,
    handlers::{auth::load_user, shop::shop_owner_id},
    middleware::{auth::SessionUser, error_handling::AppError},
};

/// Issues (or re-issues) today's token for the caller's shop.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn issue_qr(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
) -> Result<Json<QrTokenResponse>, AppError> {
    session.require_owner()?;

    let qr = AttendanceQr::issue(session.id, &state.qr_secret, Utc::now());
    state.store.save_attendance_qr(qr.clone()).await?;

    info!("Issued attendance QR for owner {} until {}", session.id, qr.expires_at);
    Ok(Json(QrTokenResponse {
        token: qr.token,
        expires_at: qr.expires_at,
    }))
}

/// Redeems a scanned token for the calling worker.
///
/// # Errors
///
/// * `ShiftError::Validation` - No owner assigned, token invalid or expired,
///   or attendance already recorded today
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn mark_attendance(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
    Json(payload): Json<MarkAttendanceRequest>,
) -> Result<Json<MarkAttendanceResponse>, AppError> {
    session.require_worker()?;

    let worker = load_user(&state, session.id).await?;
    let owner_id = shop_owner_id(&worker)?;
    let now = Utc::now();

    let qr = state.store.get_attendance_qr(owner_id).await?;

    let token = payload.token.trim();
    if !qr.is_some_and(|qr| qr.accepts(token, now)) {
        warn!("Worker {} presented an invalid attendance token", worker.id);
        return Err(ShiftError::Validation("Invalid or expired QR code".to_string()).into());
    }

    let record = AttendanceRecord {
        worker_id: worker.id,
        worker_name: worker.name.clone(),
        owner_id,
        date: now.date_naive(),
        token: token.to_string(),
        recorded_at: now,
    };
    let key = record.key();

    let inserted = state.store.record_attendance(record).await?;
    if !inserted {
        return Err(
            ShiftError::Validation("Attendance already marked for today".to_string()).into(),
        );
    }

    info!("Recorded attendance {}", key);
    Ok(Json(MarkAttendanceResponse {
        success: true,
        message: format!("Attendance marked for {}", worker.name),
    }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn list_attendance(
    State(state): State<Arc<ApiState>>,
    session: SessionUser,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    session.require_owner()?;

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let records = state.store.list_attendance(session.id, date).await?;

    Ok(Json(records))
}
