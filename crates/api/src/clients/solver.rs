//! Client for the external scheduling service.
//!
//! The service owns all scheduling computation. This client only ships the
//! request body and hands back whatever schedule the service produced.

use async_trait::async_trait;
use mockall::automock;
use shiftsync_core::{
    errors::{ShiftError, ShiftResult},
    models::{
        schedule::WeekSchedule,
        solver::{SolveRequest, SolveResponse},
    },
};
use tracing::{debug, warn};

#[automock]
#[async_trait]
pub trait ScheduleSolver: Send + Sync {
    async fn solve(&self, request: &SolveRequest) -> ShiftResult<WeekSchedule>;
}

/// Talks to `POST {base_url}/schedule`.
pub struct HttpSolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ScheduleSolver for HttpSolver {
    async fn solve(&self, request: &SolveRequest) -> ShiftResult<WeekSchedule> {
        let url = format!("{}/schedule", self.base_url);
        debug!(
            "Requesting schedule from {}: employees={}, shifts={}",
            url,
            request.employees.len(),
            request.shifts
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ShiftError::External(format!("Scheduling service unreachable: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShiftError::External(format!("Failed to read scheduler reply: {}", e)))?;
        let parsed: Option<SolveResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.message)
                .unwrap_or(body);
            warn!("Scheduling service returned {}: {}", status, message);
            return Err(ShiftError::External(format!(
                "Scheduling service returned {}: {}",
                status, message
            )));
        }

        let parsed = parsed.ok_or_else(|| {
            ShiftError::External("Scheduling service returned malformed JSON".to_string())
        })?;
        if parsed.status.as_deref() == Some("error") {
            return Err(ShiftError::External(
                parsed
                    .message
                    .unwrap_or_else(|| "Scheduling service reported an error".to_string()),
            ));
        }

        parsed.schedule.ok_or_else(|| {
            ShiftError::External("Scheduling service returned no schedule".to_string())
        })
    }
}
