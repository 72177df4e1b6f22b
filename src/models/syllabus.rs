use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::workflow::WorkflowStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Syllabus {
    pub id: String,
    pub faculty: Option<String>,
    pub career: String,
    pub academic_period_id: String,
    pub semester: Option<String>,
    pub credits: i32,
    pub total_hours: i32,
    pub theory_hours: i32,
    pub practice_hours: i32,
    pub training_area: Option<String>,
    pub course_code: String,
    pub course_name: String,
    pub course_type: Option<String>,
    pub prerequisites: Option<String>,
    pub professor_email: Option<String>,
    pub coordinator_username: String,
    pub course_competence: Option<String>,
    pub profile_competence: Option<String>,
    pub previous_competence: Option<String>,
    pub sumilla: Option<String>,
    pub bibliography: Option<String>,
    pub activities: Option<String>,
    pub workflow_status: WorkflowStatus,
    pub created_by: String,
    pub modified_by: Option<String>,
    pub created_at: String,
    pub modified_at: String,
}

/// One of the four fixed units of a syllabus, `UNIDAD I` through
/// `UNIDAD IV`. Owned exclusively by its parent syllabus.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusUnit {
    pub id: String,
    pub syllabus_id: String,
    pub unit_number: i32,
    pub title: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub content: Option<String>,
    pub week1_content: Option<String>,
    pub week2_content: Option<String>,
    pub week3_content: Option<String>,
    pub week4_content: Option<String>,
    pub methodology: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: String,
    pub syllabus_id: String,
    pub name: String,
    pub weight: f64,
    pub consolidation_date: Option<String>,
    pub description: Option<String>,
}

/// Full document: the syllabus row plus its owned collections.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusDetail {
    #[serde(flatten)]
    pub syllabus: Syllabus,
    pub units: Vec<SyllabusUnit>,
    pub evaluations: Vec<Evaluation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSyllabusRequest {
    pub course_name: String,
    pub course_code: String,
    pub academic_period_id: Option<String>,
    pub academic_period: Option<String>,
    pub professor_email: Option<String>,
    pub career: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSyllabusRequest {
    pub faculty: Option<String>,
    pub semester: Option<String>,
    pub credits: Option<i32>,
    pub total_hours: Option<i32>,
    pub theory_hours: Option<i32>,
    pub practice_hours: Option<i32>,
    pub training_area: Option<String>,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub course_type: Option<String>,
    pub prerequisites: Option<String>,
    pub course_competence: Option<String>,
    pub profile_competence: Option<String>,
    pub previous_competence: Option<String>,
    pub sumilla: Option<String>,
    pub bibliography: Option<String>,
    pub activities: Option<String>,
    pub units: Option<Vec<UnitUpdate>>,
    pub evaluations: Option<Vec<EvaluationUpdate>>,
}

/// Unit content update, matched to the stored unit by number.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitUpdate {
    pub unit_number: i32,
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub content: Option<String>,
    pub week1_content: Option<String>,
    pub week2_content: Option<String>,
    pub week3_content: Option<String>,
    pub week4_content: Option<String>,
    pub methodology: Option<String>,
}

/// Evaluation update, matched to the stored evaluation by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationUpdate {
    pub name: String,
    pub weight: Option<f64>,
    pub consolidation_date: Option<String>,
    pub description: Option<String>,
}
