use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::import::{SheetRow, parse_sheet};
use crate::models::{
    Evaluation, NewSyllabusRequest, Role, Syllabus, SyllabusDetail, SyllabusUnit,
    UpdateSyllabusRequest, User,
};
use crate::workflow::{self, RoleView, WorkflowStatus};

pub struct SyllabusService {
    db: SqlitePool,
}

impl SyllabusService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a syllabus in CREATED status with the default four units
    /// and the default evaluation template.
    pub async fn create(
        &self,
        actor: &User,
        req: NewSyllabusRequest,
    ) -> Result<SyllabusDetail, AppError> {
        if actor.role != Role::Coordinator {
            return Err(AppError::Forbidden(
                "Only coordinators can create syllabi".to_string(),
            ));
        }

        let period = match (&req.academic_period_id, &req.academic_period) {
            (Some(id), _) => repository::find_period_by_id(&self.db, id)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Academic period not found with id: {}", id))
                })?,
            (None, Some(name)) => repository::find_period_by_name(&self.db, name)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Academic period not found with name: {}", name))
                })?,
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Academic period id or name must be provided".to_string(),
                ));
            }
        };

        if let Some(email) = &req.professor_email {
            self.require_professor(email).await?;
        }

        let career = match actor.role_view() {
            RoleView::Coordinator { career } => career,
            RoleView::Admin => req.career.clone().filter(|c| !c.trim().is_empty()).ok_or_else(
                || {
                    AppError::BadRequest(
                        "An administrator must name the career for the syllabus".to_string(),
                    )
                },
            )?,
            RoleView::Professor => unreachable!("rejected above"),
        };

        let now = Utc::now().to_rfc3339();
        let syllabus = Syllabus {
            id: Uuid::new_v4().to_string(),
            faculty: None,
            career,
            academic_period_id: period.id,
            semester: None,
            credits: 0,
            total_hours: 0,
            theory_hours: 0,
            practice_hours: 0,
            training_area: None,
            course_code: req.course_code,
            course_name: req.course_name,
            course_type: None,
            prerequisites: None,
            professor_email: req.professor_email,
            coordinator_username: actor.username.clone(),
            course_competence: None,
            profile_competence: None,
            previous_competence: None,
            sumilla: None,
            bibliography: None,
            activities: None,
            workflow_status: WorkflowStatus::Created,
            created_by: actor.id.clone(),
            modified_by: None,
            created_at: now.clone(),
            modified_at: now,
        };

        let mut tx = self.db.begin().await?;
        repository::insert_syllabus(&mut *tx, &syllabus).await?;
        let units = default_units(&syllabus.id);
        for unit in &units {
            repository::insert_unit(&mut *tx, unit).await?;
        }
        let evaluations = default_evaluations(&syllabus.id);
        for evaluation in &evaluations {
            repository::insert_evaluation(&mut *tx, evaluation).await?;
        }
        tx.commit().await?;

        info!("created syllabus {} ({})", syllabus.id, syllabus.course_code);

        Ok(SyllabusDetail {
            syllabus,
            units,
            evaluations,
        })
    }

    /// Merge one sheet row of general data into an existing syllabus.
    pub async fn apply_sheet(
        &self,
        actor: &User,
        syllabus_id: &str,
        sheet: &str,
    ) -> Result<SyllabusDetail, AppError> {
        let mut existing = repository::find_syllabus_by_id(&self.db, syllabus_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let rows = parse_sheet(sheet);
        let row = rows
            .first()
            .ok_or_else(|| AppError::BadRequest("No data found in sheet".to_string()))?;

        self.check_career_scope(actor, row)?;

        // The sheet must name the professor the syllabus is assigned to.
        if let (false, Some(assigned)) = (row.professor_email.is_empty(), &existing.professor_email)
        {
            if !row.professor_email.eq_ignore_ascii_case(assigned) {
                return Err(AppError::BadRequest(format!(
                    "Professor email mismatch: sheet has '{}' but syllabus is assigned to '{}'",
                    row.professor_email, assigned
                )));
            }
        }

        existing.faculty = non_empty(&row.faculty);
        existing.career = row.career.clone();
        existing.semester = non_empty(&row.semester);
        existing.credits = row.credits;
        existing.total_hours = row.total_hours;
        existing.theory_hours = row.theory_hours;
        existing.practice_hours = row.practice_hours;
        existing.training_area = non_empty(&row.training_area);
        if !row.course_code.is_empty() {
            existing.course_code = row.course_code.clone();
        }
        if !row.course_name.is_empty() {
            existing.course_name = row.course_name.clone();
        }
        existing.course_type = non_empty(&row.course_type);
        existing.prerequisites = non_empty(&row.prerequisites);
        existing.modified_by = Some(actor.username.clone());
        existing.modified_at = Utc::now().to_rfc3339();

        repository::update_syllabus(&self.db, &existing).await?;

        self.detail_of(existing).await
    }

    /// Two-step saga: create a shell syllabus, then apply the sheet.
    /// If the sheet step fails the shell is deleted best-effort, exactly
    /// once, and the original failure is reported.
    pub async fn create_from_sheet(
        &self,
        actor: &User,
        req: NewSyllabusRequest,
        sheet: &str,
    ) -> Result<SyllabusDetail, AppError> {
        let shell = self.create(actor, req).await?;
        let shell_id = shell.syllabus.id.clone();

        match self.apply_sheet(actor, &shell_id, sheet).await {
            Ok(detail) => Ok(detail),
            Err(err) => {
                match repository::delete_syllabus(&self.db, &shell_id).await {
                    Ok(_) => info!("rolled back shell syllabus {}", shell_id),
                    Err(rollback_err) => {
                        warn!(
                            "failed to roll back shell syllabus {}: {}",
                            shell_id, rollback_err
                        );
                    }
                }
                Err(err)
            }
        }
    }

    /// All-or-nothing bulk import: every row is validated before any
    /// insert, and the inserts run in one transaction.
    pub async fn bulk_import(
        &self,
        actor: &User,
        period_id: &str,
        sheet: &str,
    ) -> Result<Vec<Syllabus>, AppError> {
        if actor.role != Role::Coordinator {
            return Err(AppError::Forbidden(
                "Only coordinators can import syllabi".to_string(),
            ));
        }

        let period = repository::find_period_by_id(&self.db, period_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Academic period not found".to_string()))?;

        let rows = parse_sheet(sheet);
        if rows.is_empty() {
            return Err(AppError::BadRequest("No data found in sheet".to_string()));
        }

        for row in &rows {
            self.check_career_scope(actor, row)?;
        }
        for row in &rows {
            if !row.professor_email.is_empty() {
                self.require_professor(&row.professor_email).await?;
            }
        }

        let now = Utc::now().to_rfc3339();
        let mut imported = Vec::with_capacity(rows.len());
        let mut tx = self.db.begin().await?;

        for row in &rows {
            let syllabus = Syllabus {
                id: Uuid::new_v4().to_string(),
                faculty: non_empty(&row.faculty),
                career: row.career.clone(),
                academic_period_id: period.id.clone(),
                semester: non_empty(&row.semester),
                credits: row.credits,
                total_hours: row.total_hours,
                theory_hours: row.theory_hours,
                practice_hours: row.practice_hours,
                training_area: non_empty(&row.training_area),
                course_code: row.course_code.clone(),
                course_name: row.course_name.clone(),
                course_type: non_empty(&row.course_type),
                prerequisites: non_empty(&row.prerequisites),
                professor_email: non_empty(&row.professor_email),
                coordinator_username: actor.username.clone(),
                course_competence: None,
                profile_competence: None,
                previous_competence: None,
                sumilla: None,
                bibliography: None,
                activities: None,
                workflow_status: WorkflowStatus::Created,
                created_by: actor.id.clone(),
                modified_by: None,
                created_at: now.clone(),
                modified_at: now.clone(),
            };

            repository::insert_syllabus(&mut *tx, &syllabus).await?;
            for unit in default_units(&syllabus.id) {
                repository::insert_unit(&mut *tx, &unit).await?;
            }
            for evaluation in default_evaluations(&syllabus.id) {
                repository::insert_evaluation(&mut *tx, &evaluation).await?;
            }
            imported.push(syllabus);
        }

        tx.commit().await?;

        info!("imported {} syllabi into period {}", imported.len(), period.name);

        Ok(imported)
    }

    /// Syllabi the actor may see, optionally filtered.
    pub async fn list(
        &self,
        actor: &User,
        status: Option<WorkflowStatus>,
        period_id: Option<&str>,
    ) -> Result<Vec<Syllabus>, AppError> {
        let view = actor.role_view();
        let mut syllabi = repository::fetch_syllabi(&self.db).await?;

        syllabi.retain(|s| {
            workflow::can_view(
                &view,
                &actor.username,
                s.professor_email.as_deref(),
                s.workflow_status,
            )
        });
        if let Some(status) = status {
            syllabi.retain(|s| s.workflow_status == status);
        }
        if let Some(period_id) = period_id {
            syllabi.retain(|s| s.academic_period_id == period_id);
        }

        Ok(syllabi)
    }

    /// Full document, if the actor may see it.
    pub async fn detail(&self, actor: &User, id: &str) -> Result<SyllabusDetail, AppError> {
        let syllabus = repository::find_syllabus_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let visible = workflow::can_view(
            &actor.role_view(),
            &actor.username,
            syllabus.professor_email.as_deref(),
            syllabus.workflow_status,
        );
        if !visible {
            return Err(AppError::NotFound);
        }

        self.detail_of(syllabus).await
    }

    /// Content update. Last write wins; there is no version check.
    pub async fn update_content(
        &self,
        actor: &User,
        id: &str,
        req: UpdateSyllabusRequest,
    ) -> Result<SyllabusDetail, AppError> {
        let mut existing = repository::find_syllabus_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let visible = workflow::can_view(
            &actor.role_view(),
            &actor.username,
            existing.professor_email.as_deref(),
            existing.workflow_status,
        );
        if !visible {
            return Err(AppError::NotFound);
        }

        if let Some(faculty) = req.faculty {
            existing.faculty = Some(faculty);
        }
        if let Some(semester) = req.semester {
            existing.semester = Some(semester);
        }
        if let Some(credits) = req.credits {
            existing.credits = credits;
        }
        if let Some(total_hours) = req.total_hours {
            existing.total_hours = total_hours;
        }
        if let Some(theory_hours) = req.theory_hours {
            existing.theory_hours = theory_hours;
        }
        if let Some(practice_hours) = req.practice_hours {
            existing.practice_hours = practice_hours;
        }
        if let Some(training_area) = req.training_area {
            existing.training_area = Some(training_area);
        }
        if let Some(course_code) = req.course_code {
            existing.course_code = course_code;
        }
        if let Some(course_name) = req.course_name {
            existing.course_name = course_name;
        }
        if let Some(course_type) = req.course_type {
            existing.course_type = Some(course_type);
        }
        if let Some(prerequisites) = req.prerequisites {
            existing.prerequisites = Some(prerequisites);
        }
        if let Some(course_competence) = req.course_competence {
            existing.course_competence = Some(course_competence);
        }
        if let Some(profile_competence) = req.profile_competence {
            existing.profile_competence = Some(profile_competence);
        }
        if let Some(previous_competence) = req.previous_competence {
            existing.previous_competence = Some(previous_competence);
        }
        if let Some(sumilla) = req.sumilla {
            existing.sumilla = Some(sumilla);
        }
        if let Some(bibliography) = req.bibliography {
            existing.bibliography = Some(bibliography);
        }
        if let Some(activities) = req.activities {
            existing.activities = Some(activities);
        }
        existing.modified_by = Some(actor.username.clone());
        existing.modified_at = Utc::now().to_rfc3339();

        repository::update_syllabus(&self.db, &existing).await?;

        if let Some(unit_updates) = req.units {
            let stored = repository::fetch_units(&self.db, id).await?;
            for update in unit_updates {
                let Some(mut unit) = stored
                    .iter()
                    .find(|u| u.unit_number == update.unit_number)
                    .cloned()
                else {
                    continue;
                };
                if let Some(title) = update.title {
                    unit.title = title;
                }
                if let Some(start_date) = update.start_date {
                    unit.start_date = Some(start_date);
                }
                if let Some(end_date) = update.end_date {
                    unit.end_date = Some(end_date);
                }
                if let Some(content) = update.content {
                    unit.content = Some(content);
                }
                if let Some(week1) = update.week1_content {
                    unit.week1_content = Some(week1);
                }
                if let Some(week2) = update.week2_content {
                    unit.week2_content = Some(week2);
                }
                if let Some(week3) = update.week3_content {
                    unit.week3_content = Some(week3);
                }
                if let Some(week4) = update.week4_content {
                    unit.week4_content = Some(week4);
                }
                if let Some(methodology) = update.methodology {
                    unit.methodology = Some(methodology);
                }
                repository::update_unit(&self.db, &unit).await?;
            }
        }

        if let Some(evaluation_updates) = req.evaluations {
            let stored = repository::fetch_evaluations(&self.db, id).await?;
            for update in evaluation_updates {
                let Some(mut evaluation) = stored
                    .iter()
                    .find(|e| e.name.eq_ignore_ascii_case(&update.name))
                    .cloned()
                else {
                    continue;
                };
                if let Some(weight) = update.weight {
                    evaluation.weight = weight;
                }
                if let Some(consolidation_date) = update.consolidation_date {
                    evaluation.consolidation_date = Some(consolidation_date);
                }
                if let Some(description) = update.description {
                    evaluation.description = Some(description);
                }
                repository::update_evaluation(&self.db, &evaluation).await?;
            }
        }

        self.detail(actor, id).await
    }

    /// Apply the workflow transition whose result is `target`.
    /// Nothing is written when the transition is denied.
    pub async fn transition(
        &self,
        actor: &User,
        id: &str,
        target: WorkflowStatus,
    ) -> Result<Syllabus, AppError> {
        let mut syllabus = repository::find_syllabus_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let action = workflow::action_for_target(target).ok_or_else(|| {
            AppError::InvalidTransition("CREATED is not a transition target".to_string())
        })?;

        let next = workflow::next_status(&actor.role_view(), syllabus.workflow_status, action)?;

        let now = Utc::now().to_rfc3339();
        repository::update_syllabus_status(&self.db, id, next, &actor.username, &now).await?;

        info!(
            "syllabus {} moved {:?} -> {:?} by {}",
            id, syllabus.workflow_status, next, actor.username
        );

        syllabus.workflow_status = next;
        syllabus.modified_by = Some(actor.username.clone());
        syllabus.modified_at = now;
        Ok(syllabus)
    }

    pub async fn delete(&self, actor: &User, id: &str) -> Result<(), AppError> {
        if actor.role != Role::Coordinator {
            return Err(AppError::Forbidden(
                "Only coordinators can delete syllabi".to_string(),
            ));
        }

        let deleted = repository::delete_syllabus(&self.db, id).await?;
        if !deleted {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn detail_of(&self, syllabus: Syllabus) -> Result<SyllabusDetail, AppError> {
        let units = repository::fetch_units(&self.db, &syllabus.id).await?;
        let evaluations = repository::fetch_evaluations(&self.db, &syllabus.id).await?;
        Ok(SyllabusDetail {
            syllabus,
            units,
            evaluations,
        })
    }

    /// A coordinator with a career may only handle sheets for it.
    fn check_career_scope(&self, actor: &User, row: &SheetRow) -> Result<(), AppError> {
        if let RoleView::Coordinator { career } = actor.role_view() {
            let required = career.trim().to_lowercase();
            let from_sheet = row.career.trim().to_lowercase();
            if required != from_sheet {
                return Err(AppError::Forbidden(format!(
                    "Coordinator of '{}' cannot handle syllabi for career '{}'",
                    career.trim(),
                    row.career.trim()
                )));
            }
        }
        Ok(())
    }

    async fn require_professor(&self, email: &str) -> Result<User, AppError> {
        let user = repository::find_user_by_username(&self.db, email)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Professor not found with email: {}", email))
            })?;
        if user.role != Role::Professor {
            return Err(AppError::BadRequest(format!(
                "User {} is not a professor",
                email
            )));
        }
        Ok(user)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn default_units(syllabus_id: &str) -> Vec<SyllabusUnit> {
    (1..=4)
        .map(|n| SyllabusUnit {
            id: Uuid::new_v4().to_string(),
            syllabus_id: syllabus_id.to_string(),
            unit_number: n,
            title: format!("UNIDAD {}", to_roman(n)),
            start_date: None,
            end_date: None,
            content: None,
            week1_content: None,
            week2_content: None,
            week3_content: None,
            week4_content: None,
            methodology: None,
        })
        .collect()
}

fn default_evaluations(syllabus_id: &str) -> Vec<Evaluation> {
    [
        ("EVIDENCIA 1", 0.10),
        ("EVIDENCIA 2", 0.10),
        ("EXAMEN PARCIAL", 0.30),
        ("EVIDENCIA 3", 0.10),
        ("EVIDENCIA 4", 0.10),
        ("EXAMEN FINAL", 0.30),
    ]
    .into_iter()
    .map(|(name, weight)| Evaluation {
        id: Uuid::new_v4().to_string(),
        syllabus_id: syllabus_id.to_string(),
        name: name.to_string(),
        weight,
        consolidation_date: None,
        description: None,
    })
    .collect()
}

fn to_roman(number: i32) -> String {
    match number {
        1 => "I".to_string(),
        2 => "II".to_string(),
        3 => "III".to_string(),
        4 => "IV".to_string(),
        _ => number.to_string(),
    }
}
