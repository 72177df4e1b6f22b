use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Reference data: an academic term such as "2025-I". Dates are
/// `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AcademicPeriod {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPeriodRequest {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}
