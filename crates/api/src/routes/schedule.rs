use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/schedule", get(handlers::schedule::get_schedule))
        .route("/api/schedule/summary", get(handlers::schedule::get_summary))
        .route("/api/schedule/auto", post(handlers::schedule::auto_schedule))
        .route(
            "/api/schedule/optimize",
            post(handlers::schedule::optimize_schedule),
        )
}
