//! # Error Handling Middleware
//!
//! This module maps domain errors to HTTP status codes and JSON error bodies,
//! so every handler reports failures the same way.
//!
//! Server-side failures (`Database`, `Internal`) are logged with their full
//! cause and answered with a fixed message; nothing about the underlying
//! failure leaks to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use shiftsync_core::errors::ShiftError;
use tracing::error;

/// Message returned for every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps `ShiftError` and implements `IntoResponse`, so handlers
/// can return `Result<_, AppError>` and use `?` on domain results.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use shiftsync_api::middleware::error_handling::AppError;
/// use shiftsync_core::errors::ShiftError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(ShiftError::NotFound("Shop not found".to_string()).into());
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub ShiftError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ShiftError::NotFound(_) => StatusCode::NOT_FOUND,
            ShiftError::Validation(_) => StatusCode::BAD_REQUEST,
            ShiftError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ShiftError::Authorization(_) => StatusCode::FORBIDDEN,
            ShiftError::ConstraintViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ShiftError::External(_) => StatusCode::BAD_GATEWAY,
            ShiftError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ShiftError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {:?}", self.0);
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Allows `?` on `ShiftResult` inside handlers.
impl From<ShiftError> for AppError {
    fn from(err: ShiftError) -> Self {
        AppError(err)
    }
}

/// Infrastructure failures surface as database errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ShiftError::Database(err))
    }
}

/// Maps a ShiftError to an HTTP response
pub fn map_error(err: ShiftError) -> Response {
    AppError(err).into_response()
}
