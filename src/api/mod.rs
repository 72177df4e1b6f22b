use axum::Json;
use axum::extract::{Multipart, Path, Query};
use axum::http::header;
use axum::response::Response;
use axum::routing::{delete, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{self, AuthUser, SESSION_TTL_SECONDS};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::SyllabusService;
use crate::state::AppState;
use crate::workflow::{RoleView, WorkflowStatus};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyllabusQueryParams {
    #[serde(default)]
    status: Option<WorkflowStatus>,
    #[serde(default)]
    academic_period_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkImportParams {
    academic_period_id: String,
}

#[derive(Deserialize)]
struct StatusParams {
    status: WorkflowStatus,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/register-batch", post(register_batch))
        .route("/api/users", get(list_users))
        .route("/api/users/professors", get(list_professors))
        .route("/api/users/coordinators", get(list_coordinators))
        .route("/api/users/{id}", put(update_user))
        .route("/api/careers", get(list_careers).post(create_career))
        .route("/api/careers/{id}", delete(delete_career))
        .route(
            "/api/academic-periods",
            get(list_periods).post(create_period),
        )
        .route("/api/academic-periods/{id}", get(get_period))
        .route("/api/syllabi", get(list_syllabi).post(create_syllabus))
        .route(
            "/api/syllabi/{id}",
            get(get_syllabus).put(update_syllabus).delete(delete_syllabus),
        )
        .route("/api/syllabi/{id}/upload-sheet", post(upload_sheet))
        .route("/api/syllabi/create-from-sheet", post(create_from_sheet))
        .route("/api/syllabi/upload-bulk", post(upload_bulk))
        .route("/api/syllabi/{id}/status", post(change_status))
        .route("/api/syllabi/{id}/pdf", get(download_pdf))
        .with_state(state)
}

fn require_admin(user: &User) -> Result<(), AppError> {
    match user.role_view() {
        RoleView::Admin => Ok(()),
        _ => Err(AppError::Forbidden(
            "Administrator access required".to_string(),
        )),
    }
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = repository::find_user_by_username(&state.db, &req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !auth::verify_password(&req.password, &user.password_digest) {
        return Err(AppError::Unauthorized);
    }

    let token = auth::issue_session(&state.db, &user.id).await?;
    info!("user {} logged in", user.username);

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        full_name: user.full_name,
        role: user.role,
        career: user.career,
        expires_in: SESSION_TTL_SECONDS,
    }))
}

async fn register(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    require_admin(&actor)?;
    let user = register_one(&state, req).await?;
    Ok(Json(user))
}

async fn register_batch(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(reqs): Json<Vec<RegisterRequest>>,
) -> Result<Json<BatchRegisterResponse>, AppError> {
    require_admin(&actor)?;

    let mut registered = 0;
    let mut skipped = 0;
    for req in reqs {
        match register_one(&state, req).await {
            Ok(_) => registered += 1,
            Err(AppError::Conflict(_)) => skipped += 1,
            Err(e) => return Err(e),
        }
    }

    info!("batch registration: {} new, {} skipped", registered, skipped);
    Ok(Json(BatchRegisterResponse { registered, skipped }))
}

async fn register_one(state: &AppState, req: RegisterRequest) -> Result<User, AppError> {
    if repository::find_user_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Username already taken: {}",
            req.username
        )));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: req.username,
        password_digest: auth::hash_password(&req.password),
        full_name: req.full_name,
        role: req.role,
        career: req.career.filter(|c| !c.trim().is_empty()),
        created_at: Utc::now().to_rfc3339(),
    };
    repository::insert_user(&state.db, &user).await?;
    Ok(user)
}

async fn list_users(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    require_admin(&actor)?;
    let users = repository::fetch_users(&state.db).await?;
    Ok(Json(users))
}

async fn list_professors(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    let users = repository::fetch_users_by_role(&state.db, Role::Professor).await?;
    Ok(Json(users))
}

async fn list_coordinators(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    require_admin(&actor)?;
    let mut users = repository::fetch_users_by_role(&state.db, Role::Coordinator).await?;
    // Administrator accounts share the coordinator role but carry no career.
    users.retain(|u| u.career.as_deref().is_some_and(|c| !c.trim().is_empty()));
    Ok(Json(users))
}

async fn update_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    require_admin(&actor)?;

    let mut user = repository::find_user_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(full_name) = req.full_name {
        user.full_name = full_name;
    }
    if let Some(career) = req.career {
        user.career = if career.trim().is_empty() {
            None
        } else {
            Some(career)
        };
    }
    if let Some(password) = req.password {
        user.password_digest = auth::hash_password(&password);
    }

    repository::update_user(&state.db, &user).await?;
    Ok(Json(user))
}

async fn list_careers(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
) -> Result<Json<Vec<Career>>, AppError> {
    let careers = repository::fetch_careers(&state.db).await?;
    Ok(Json(careers))
}

async fn create_career(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(req): Json<NewCareerRequest>,
) -> Result<Json<Career>, AppError> {
    require_admin(&actor)?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Career name is required".to_string()));
    }
    if repository::find_career_by_name(&state.db, name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Career already exists: {}",
            name
        )));
    }

    let career = Career {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        created_at: Utc::now().to_rfc3339(),
    };
    repository::insert_career(&state.db, &career).await?;
    Ok(Json(career))
}

async fn delete_career(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    require_admin(&actor)?;

    if repository::delete_career(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn create_period(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(req): Json<NewPeriodRequest>,
) -> Result<Json<AcademicPeriod>, AppError> {
    if actor.role != Role::Coordinator {
        return Err(AppError::Forbidden(
            "Only coordinators can create academic periods".to_string(),
        ));
    }
    if repository::find_period_by_name(&state.db, &req.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Academic period already exists: {}",
            req.name
        )));
    }

    let period = AcademicPeriod {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        start_date: req.start_date,
        end_date: req.end_date,
        created_by: actor.username,
        created_at: Utc::now().to_rfc3339(),
    };
    repository::insert_period(&state.db, &period).await?;
    Ok(Json(period))
}

async fn list_periods(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
) -> Result<Json<Vec<AcademicPeriod>>, AppError> {
    let periods = repository::fetch_periods(&state.db).await?;
    Ok(Json(periods))
}

async fn get_period(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AcademicPeriod>, AppError> {
    let period = repository::find_period_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(period))
}

async fn create_syllabus(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(req): Json<NewSyllabusRequest>,
) -> Result<Json<SyllabusDetail>, AppError> {
    let service = SyllabusService::new(state.db.clone());
    let detail = service.create(&actor, req).await?;
    Ok(Json(detail))
}

async fn list_syllabi(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<SyllabusQueryParams>,
) -> Result<Json<Vec<Syllabus>>, AppError> {
    let service = SyllabusService::new(state.db.clone());
    let syllabi = service
        .list(&actor, params.status, params.academic_period_id.as_deref())
        .await?;
    Ok(Json(syllabi))
}

async fn get_syllabus(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SyllabusDetail>, AppError> {
    let service = SyllabusService::new(state.db.clone());
    let detail = service.detail(&actor, &id).await?;
    Ok(Json(detail))
}

async fn update_syllabus(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateSyllabusRequest>,
) -> Result<Json<SyllabusDetail>, AppError> {
    let service = SyllabusService::new(state.db.clone());
    let detail = service.update_content(&actor, &id, req).await?;
    Ok(Json(detail))
}

async fn delete_syllabus(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let service = SyllabusService::new(state.db.clone());
    service.delete(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_sheet(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<SyllabusDetail>, AppError> {
    let sheet = read_sheet_part(multipart).await?;
    let service = SyllabusService::new(state.db.clone());
    let detail = service.apply_sheet(&actor, &id, &sheet).await?;
    Ok(Json(detail))
}

async fn create_from_sheet(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<SyllabusDetail>, AppError> {
    let mut sheet = None;
    let mut course_name = None;
    let mut course_code = None;
    let mut academic_period_id = None;
    let mut academic_period = None;
    let mut professor_email = None;
    let mut career = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart field: {}", e)))?;

        match name.as_str() {
            "file" => sheet = Some(value),
            "courseName" => course_name = Some(value),
            "courseCode" => course_code = Some(value),
            "academicPeriodId" => academic_period_id = Some(value),
            "academicPeriod" => academic_period = Some(value),
            "professorEmail" => professor_email = Some(value),
            "career" => career = Some(value),
            _ => {}
        }
    }

    let sheet = sheet.ok_or_else(|| AppError::BadRequest("Missing sheet file".to_string()))?;
    let req = NewSyllabusRequest {
        course_name: course_name
            .ok_or_else(|| AppError::BadRequest("courseName is required".to_string()))?,
        course_code: course_code
            .ok_or_else(|| AppError::BadRequest("courseCode is required".to_string()))?,
        academic_period_id,
        academic_period,
        professor_email,
        career,
    };

    let service = SyllabusService::new(state.db.clone());
    let detail = service.create_from_sheet(&actor, req, &sheet).await?;
    Ok(Json(detail))
}

async fn upload_bulk(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<BulkImportParams>,
    multipart: Multipart,
) -> Result<Json<Vec<Syllabus>>, AppError> {
    let sheet = read_sheet_part(multipart).await?;
    let service = SyllabusService::new(state.db.clone());
    let imported = service
        .bulk_import(&actor, &params.academic_period_id, &sheet)
        .await?;
    Ok(Json(imported))
}

async fn change_status(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Query(params): Query<StatusParams>,
) -> Result<Json<Syllabus>, AppError> {
    let service = SyllabusService::new(state.db.clone());
    let syllabus = service.transition(&actor, &id, params.status).await?;
    Ok(Json(syllabus))
}

async fn download_pdf(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let service = SyllabusService::new(state.db.clone());
    let detail = service.detail(&actor, &id).await?;
    let bytes = state.renderer.render(&detail).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=silabo_{}.pdf", id),
        )
        .body(bytes.into())
        .map_err(|_| AppError::InternalServerError)
}

/// Pull the first file part out of a multipart upload as UTF-8 text.
async fn read_sheet_part(mut multipart: Multipart) -> Result<String, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            return field
                .text()
                .await
                .map_err(|_| AppError::BadRequest("Sheet must be UTF-8 text".to_string()));
        }
    }
    Err(AppError::BadRequest("Missing sheet file".to_string()))
}
