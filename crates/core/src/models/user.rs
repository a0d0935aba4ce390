use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ShiftError;
use crate::models::availability::DayAvailability;

/// Default weekly cap given to workers at sign-up.
pub const DEFAULT_MAX_SHIFTS_PER_WEEK: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Owner,
    Worker,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Owner => "owner",
            UserType::Worker => "worker",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(UserType::Owner),
            "worker" => Ok(UserType::Worker),
            other => Err(ShiftError::Validation(format!("Unknown user type: {}", other))),
        }
    }
}

/// A registered account. Owners run a shop; workers belong to at most one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// Owner this worker is assigned to. Lookup only; the worker is not owned by it.
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub shift_availability: Vec<DayAvailability>,
    /// The shop `shift_version` the availability matrix was last written against.
    #[serde(default)]
    pub availability_version: i32,
    pub max_shifts_per_week: i32,
    #[serde(default)]
    pub shift_preferences: Vec<String>,
    pub work_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_owner(&self) -> bool {
        self.user_type == UserType::Owner
    }

    pub fn is_worker(&self) -> bool {
        self.user_type == UserType::Worker
    }
}

/// Lowercases and trims an email so lookups are stable.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteWorkerRequest {
    pub email: String,
    pub work_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteWorkerResponse {
    pub worker: User,
    pub work_types: Vec<String>,
}
