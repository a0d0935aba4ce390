//! Daily attendance QR tokens.
//!
//! Each owner has at most one live token. It is derived from the UTC date,
//! the server secret and the owner's id, and it expires at the end of the UTC
//! day it was issued on. A worker can only redeem the token of the owner they
//! are assigned to.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hex SHA-256 of `YYYY-MM-DD + secret + owner_id`.
pub fn derive_token(date: NaiveDate, secret: &str, owner_id: Uuid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hasher.update(secret.as_bytes());
    hasher.update(owner_id.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Midnight UTC following `now`.
pub fn end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let next = today.checked_add_days(Days::new(1)).unwrap_or(today);
    next.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceQr {
    pub owner_id: Uuid,
    pub token: String,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AttendanceQr {
    pub fn issue(owner_id: Uuid, secret: &str, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            token: derive_token(now.date_naive(), secret, owner_id),
            generated_at: now,
            expires_at: end_of_day(now),
        }
    }

    /// True when `token` matches and was issued on the same UTC day as `now`.
    pub fn accepts(&self, token: &str, now: DateTime<Utc>) -> bool {
        token == self.token
            && self.generated_at.date_naive() == now.date_naive()
            && now < self.expires_at
    }
}

/// One row per worker per UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub worker_id: Uuid,
    pub worker_name: String,
    pub owner_id: Uuid,
    pub date: NaiveDate,
    pub token: String,
    pub recorded_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Key in the form `<worker_id>-<YYYY-MM-DD>`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.worker_id, self.date.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAttendanceRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAttendanceResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceQuery {
    pub date: Option<NaiveDate>,
}
