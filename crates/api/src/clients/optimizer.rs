//! Language-model client for the "optimize" pass.
//!
//! The model receives the current schedule as a `[day][shift] -> [names]`
//! grid plus each worker's shift count and is asked to return a rearranged
//! grid of the same shape. Nothing about the reply is trusted: the caller
//! re-checks the shape and the per-worker counts before saving anything.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use serde_json::json;
use shiftsync_core::{
    errors::{ShiftError, ShiftResult},
    models::{schedule::WorkerGrid, shop::Shift},
};
use tracing::debug;

use crate::config::LlmConfig;

#[automock]
#[async_trait]
pub trait ScheduleOptimizer: Send + Sync {
    /// Sends `prompt` and returns the model's raw text reply.
    async fn complete(&self, prompt: &str) -> ShiftResult<String>;
}

/// Google Generative Language `generateContent` client.
pub struct GeminiOptimizer {
    client: reqwest::Client,
    config: LlmConfig,
}

impl GeminiOptimizer {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[async_trait]
impl ScheduleOptimizer for GeminiOptimizer {
    async fn complete(&self, prompt: &str) -> ShiftResult<String> {
        let Some(api_key) = &self.config.api_key else {
            return Err(ShiftError::External(
                "Schedule optimization is not configured".to_string(),
            ));
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        );
        debug!("Requesting schedule optimization from {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": { "responseMimeType": "application/json" }
            }))
            .send()
            .await
            .map_err(|e| ShiftError::External(format!("Language model unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ShiftError::External(format!(
                "Language model returned {}: {}",
                status, text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ShiftError::External(format!("Malformed language model reply: {}", e)))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ShiftError::External(
                "Language model returned an empty reply".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Builds the optimization prompt.
pub fn build_prompt(
    grid: &WorkerGrid,
    counts: &BTreeMap<String, usize>,
    shifts: &[Shift],
    constraints: Option<&str>,
) -> String {
    let shift_lines: Vec<String> = shifts
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "- index {}: {} ({}-{}), at most {} workers",
                i, s.name, s.start_time, s.end_time, s.max_employees
            )
        })
        .collect();

    let constraints = constraints
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("Spread shifts as evenly as possible across the week.");

    format!(
        "You are rebalancing a weekly employee shift schedule.\n\n\
         The schedule is a JSON array of 7 days (index 0 = Monday). Each day is an array \
         with one entry per shift, and each entry is the array of worker names on that shift. \
         A day whose shifts are all empty is a holiday and must stay empty.\n\n\
         Shifts:\n{}\n\n\
         Current schedule:\n{}\n\n\
         Shifts per worker (must stay exactly the same):\n{}\n\n\
         Requested changes:\n{}\n\n\
         Rules:\n\
         1. Every worker must keep exactly the number of shifts listed above.\n\
         2. Never exceed a shift's maximum number of workers.\n\
         3. Do not add workers that are not in the current schedule.\n\
         4. Reply with ONLY the JSON array, same shape as the current schedule, no commentary.",
        shift_lines.join("\n"),
        json!(grid),
        json!(counts),
        constraints
    )
}

/// Extracts the `[day][shift] -> names` grid from a model reply.
///
/// The reply may wrap the array in a Markdown code fence or surround it with
/// prose; the outermost `[ ... ]` is parsed.
pub fn parse_reply(reply: &str) -> ShiftResult<WorkerGrid> {
    let start = reply.find('[');
    let end = reply.rfind(']');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ShiftError::External(
            "Language model reply did not contain a JSON array".to_string(),
        ));
    };
    if end < start {
        return Err(ShiftError::External(
            "Language model reply did not contain a JSON array".to_string(),
        ));
    }

    serde_json::from_str(&reply[start..=end]).map_err(|e| {
        ShiftError::External(format!("Language model reply was not a schedule grid: {}", e))
    })
}
