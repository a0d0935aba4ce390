use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/toggle-shift", post(handlers::availability::toggle_shift))
        .route(
            "/api/workers/me/availability",
            get(handlers::availability::get_my_availability)
                .put(handlers::availability::update_my_availability),
        )
}
