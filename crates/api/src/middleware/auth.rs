//! # Authentication Module
//!
//! Password hashing and signed sessions.
//!
//! Passwords are stored as Argon2 PHC strings. Sessions are HS256 JWTs
//! signed with `JWT_SECRET`; handlers receive the caller as a
//! [`SessionUser`], extracted from an `Authorization: Bearer` header or a
//! `session` cookie. The role inside a session is only trusted after the
//! signature and expiry have been checked.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use eyre::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use shiftsync_core::{
    errors::{ShiftError, ShiftResult},
    models::{
        session::SessionClaims,
        user::{User, UserType},
    },
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Name of the cookie that may carry the session token.
pub const SESSION_COOKIE: &str = "session";

/// Hashes a password using the Argon2 algorithm
///
/// A fresh random salt is generated for every call and the result is returned
/// in PHC string format (algorithm, version, parameters, salt and hash).
///
/// # Example
///
/// ```rust
/// let hashed = shiftsync_api::middleware::auth::hash_password("user_password").unwrap();
/// assert!(hashed.starts_with("$argon2"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks `password` against a stored PHC hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| eyre::eyre!("Invalid password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issues a signed token for `user`.
    pub fn issue(&self, user: &User) -> ShiftResult<String> {
        let exp = (Utc::now() + self.ttl).timestamp();
        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            user_type: user.user_type,
            exp: usize::try_from(exp).unwrap_or(0),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ShiftError::Internal(Box::new(e)))
    }

    /// Verifies signature and expiry.
    pub fn verify(&self, token: &str) -> ShiftResult<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected session token: {}", e);
                ShiftError::Authentication("Invalid or expired session".to_string())
            })
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub user_type: UserType,
}

impl SessionUser {
    pub fn require_owner(&self) -> ShiftResult<()> {
        match self.user_type {
            UserType::Owner => Ok(()),
            UserType::Worker => Err(ShiftError::Authorization(
                "Only owners can perform this action".to_string(),
            )),
        }
    }

    pub fn require_worker(&self) -> ShiftResult<()> {
        match self.user_type {
            UserType::Worker => Ok(()),
            UserType::Owner => Err(ShiftError::Authorization(
                "Only workers can perform this action".to_string(),
            )),
        }
    }
}

impl From<SessionClaims> for SessionUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            user_type: claims.user_type,
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then(|| value.to_string())
        })
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| session_cookie(&parts.headers))
            .ok_or_else(|| ShiftError::Authentication("Missing session".to_string()))?;

        Ok(state.sessions.verify(&token)?.into())
    }
}
