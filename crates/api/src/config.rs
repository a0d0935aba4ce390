//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the ShiftSync API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string, or `memory` for the in-memory store (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `JWT_SECRET`: Secret used to sign session tokens (required)
//! - `SESSION_TTL_HOURS`: Session lifetime in hours (default: 24)
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)
//! - `QR_SECRET_KEY`: Secret mixed into attendance tokens (default: "default-secret")
//! - `SCHEDULER_URL`: Base URL of the scheduling service (default: "http://127.0.0.1:5000")
//! - `SCHEDULER_HOLIDAYS`: Comma-separated day indexes (0 = Monday) sent as holidays (default: "6")
//! - `SCHEDULER_USE_STORED_AVAILABILITY`: Send stored availability instead of "always available" (default: false)
//! - `LLM_API_URL`: Base URL of the language model API
//!   (default: "https://generativelanguage.googleapis.com/v1beta")
//! - `LLM_API_KEY`: API key; optimization is disabled when unset
//! - `LLM_MODEL`: Model name (default: "gemini-1.5-flash")

use eyre::{Result, WrapErr, eyre};
use shiftsync_core::models::{schedule::DAYS_PER_WEEK, solver::SchedulePolicy};
use std::env;
use tracing::Level;

/// Configuration for the ShiftSync API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL connection string, or `memory`
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Secret for signing session tokens
    pub jwt_secret: String,

    /// Session lifetime in hours
    pub session_ttl_hours: i64,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Secret mixed into attendance QR tokens
    pub qr_secret: String,

    /// Base URL of the scheduling service
    pub scheduler_url: String,

    /// How auto-schedule requests are assembled
    pub schedule_policy: SchedulePolicy,

    /// Language model settings
    pub llm: LlmConfig,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is not set
    /// - `API_PORT` cannot be parsed as a u16
    /// - `SCHEDULER_HOLIDAYS` contains something other than day indexes 0-6
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Security settings
        let jwt_secret =
            env::var("JWT_SECRET").wrap_err("JWT_SECRET environment variable must be set")?;
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);
        let qr_secret = env::var("QR_SECRET_KEY").unwrap_or_else(|_| "default-secret".to_string());

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Scheduling service
        let scheduler_url =
            env::var("SCHEDULER_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
        let holidays = parse_holidays(
            &env::var("SCHEDULER_HOLIDAYS").unwrap_or_else(|_| "6".to_string()),
        )?;
        let use_stored_availability = env::var("SCHEDULER_USE_STORED_AVAILABILITY")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        // Language model
        let llm = LlmConfig {
            api_url: env::var("LLM_API_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            api_key: env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
        };

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            jwt_secret,
            session_ttl_hours,
            request_timeout,
            qr_secret,
            scheduler_url,
            schedule_policy: SchedulePolicy {
                use_stored_availability,
                holidays,
            },
            llm,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_log_level(value: &str) -> Level {
    match value {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Parses a comma-separated list of day indexes. An empty string means no holidays.
pub fn parse_holidays(value: &str) -> Result<Vec<usize>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let day: usize = s
                .parse()
                .wrap_err_with(|| format!("Invalid SCHEDULER_HOLIDAYS entry '{}'", s))?;
            if day >= DAYS_PER_WEEK {
                return Err(eyre!("SCHEDULER_HOLIDAYS entry {} is not a day index 0-6", day));
            }
            Ok(day)
        })
        .collect()
}
