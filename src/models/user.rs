use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::workflow::RoleView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Role {
    Coordinator,
    Professor,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_digest: String,
    pub full_name: String,
    pub role: Role,
    pub career: Option<String>,
    pub created_at: String,
}

impl User {
    /// A coordinator with no career is the administrator variant.
    pub fn role_view(&self) -> RoleView {
        match (self.role, &self.career) {
            (Role::Professor, _) => RoleView::Professor,
            (Role::Coordinator, Some(career)) if !career.trim().is_empty() => {
                RoleView::Coordinator {
                    career: career.clone(),
                }
            }
            (Role::Coordinator, _) => RoleView::Admin,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub career: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRegisterResponse {
    pub registered: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub career: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub career: Option<String>,
    pub password: Option<String>,
}
