use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/shop",
            get(handlers::shop::get_shop).put(handlers::shop::upsert_shop),
        )
        .route("/api/workers", get(handlers::shop::list_workers))
        .route("/api/workers/invite", post(handlers::shop::invite_worker))
}
