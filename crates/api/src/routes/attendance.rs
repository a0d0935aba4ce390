use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/attendance/qr",
            get(handlers::attendance::issue_qr).post(handlers::attendance::mark_attendance),
        )
        .route("/api/attendance", get(handlers::attendance::list_attendance))
}
