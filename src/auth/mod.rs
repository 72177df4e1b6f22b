use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Bearer tokens are valid for 24 hours.
pub const SESSION_TTL_SECONDS: i64 = 86_400;

/// Salted SHA-256 digest, stored as `salt$digest` hex.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::rng().random();
    let salt_hex: String = salt.iter().map(|b| format!("{:02x}", b)).collect();
    let digest = digest_with_salt(&salt_hex, password);
    format!("{}${}", salt_hex, digest)
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt_hex, digest)) => digest_with_salt(salt_hex, password) == digest,
        None => false,
    }
}

fn digest_with_salt(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Create a session row and return its opaque token.
pub async fn issue_session(db: &SqlitePool, user_id: &str) -> Result<String, AppError> {
    let token = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::seconds(SESSION_TTL_SECONDS);

    repository::insert_session(
        db,
        &token,
        user_id,
        &expires_at.to_rfc3339(),
        &now.to_rfc3339(),
    )
    .await?;

    Ok(token)
}

/// The authenticated caller, extracted from the Authorization header.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let now = Utc::now().to_rfc3339();
        let user = repository::find_session_user(&state.db, token, &now)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}
