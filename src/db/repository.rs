use sqlx::SqlitePool;

use crate::models::{AcademicPeriod, Career, Evaluation, Role, Syllabus, SyllabusUnit, User};
use crate::workflow::WorkflowStatus;

const SYLLABUS_COLUMNS: &str = "id, faculty, career, academic_period_id, semester, credits, \
    total_hours, theory_hours, practice_hours, training_area, course_code, course_name, \
    course_type, prerequisites, professor_email, coordinator_username, course_competence, \
    profile_competence, previous_competence, sumilla, bibliography, activities, \
    workflow_status, created_by, modified_by, created_at, modified_at";

// ---- users ----

pub async fn insert_user<'e>(
    db: impl sqlx::SqliteExecutor<'e>,
    user: &User,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, username, password_digest, full_name, role, career, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.password_digest)
    .bind(&user.full_name)
    .bind(user.role)
    .bind(&user.career)
    .bind(&user.created_at)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find_user_by_username(
    db: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_digest, full_name, role, career, created_at \
         FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db)
    .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_digest, full_name, role, career, created_at \
         FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_users(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_digest, full_name, role, career, created_at \
         FROM users ORDER BY full_name",
    )
    .fetch_all(db)
    .await
}

pub async fn fetch_users_by_role(db: &SqlitePool, role: Role) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_digest, full_name, role, career, created_at \
         FROM users WHERE role = ? ORDER BY full_name",
    )
    .bind(role)
    .fetch_all(db)
    .await
}

pub async fn update_user(db: &SqlitePool, user: &User) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET password_digest = ?, full_name = ?, career = ? WHERE id = ?",
    )
    .bind(&user.password_digest)
    .bind(&user.full_name)
    .bind(&user.career)
    .bind(&user.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

// ---- sessions ----

pub async fn insert_session(
    db: &SqlitePool,
    token: &str,
    user_id: &str,
    expires_at: &str,
    created_at: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(token)
    .bind(user_id)
    .bind(expires_at)
    .bind(created_at)
    .execute(db)
    .await?;

    Ok(())
}

/// Resolve a bearer token to its user, ignoring expired sessions.
pub async fn find_session_user(
    db: &SqlitePool,
    token: &str,
    now: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.id, u.username, u.password_digest, u.full_name, u.role, u.career, u.created_at \
         FROM users u JOIN sessions s ON s.user_id = u.id \
         WHERE s.token = ? AND s.expires_at > ?",
    )
    .bind(token)
    .bind(now)
    .fetch_optional(db)
    .await
}

// ---- careers ----

pub async fn fetch_careers(db: &SqlitePool) -> Result<Vec<Career>, sqlx::Error> {
    sqlx::query_as::<_, Career>("SELECT id, name, created_at FROM careers ORDER BY name")
        .fetch_all(db)
        .await
}

pub async fn find_career_by_name(
    db: &SqlitePool,
    name: &str,
) -> Result<Option<Career>, sqlx::Error> {
    sqlx::query_as::<_, Career>("SELECT id, name, created_at FROM careers WHERE name = ?")
        .bind(name)
        .fetch_optional(db)
        .await
}

pub async fn insert_career(db: &SqlitePool, career: &Career) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO careers (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&career.id)
        .bind(&career.name)
        .bind(&career.created_at)
        .execute(db)
        .await?;

    Ok(())
}

pub async fn delete_career(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM careers WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn count_careers(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM careers")
        .fetch_one(db)
        .await?;

    Ok(count)
}

// ---- academic periods ----

pub async fn insert_period(db: &SqlitePool, period: &AcademicPeriod) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO academic_periods (id, name, start_date, end_date, created_by, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&period.id)
    .bind(&period.name)
    .bind(&period.start_date)
    .bind(&period.end_date)
    .bind(&period.created_by)
    .bind(&period.created_at)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn fetch_periods(db: &SqlitePool) -> Result<Vec<AcademicPeriod>, sqlx::Error> {
    sqlx::query_as::<_, AcademicPeriod>(
        "SELECT id, name, start_date, end_date, created_by, created_at \
         FROM academic_periods ORDER BY start_date DESC",
    )
    .fetch_all(db)
    .await
}

pub async fn find_period_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<AcademicPeriod>, sqlx::Error> {
    sqlx::query_as::<_, AcademicPeriod>(
        "SELECT id, name, start_date, end_date, created_by, created_at \
         FROM academic_periods WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_period_by_name(
    db: &SqlitePool,
    name: &str,
) -> Result<Option<AcademicPeriod>, sqlx::Error> {
    sqlx::query_as::<_, AcademicPeriod>(
        "SELECT id, name, start_date, end_date, created_by, created_at \
         FROM academic_periods WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(db)
    .await
}

// ---- syllabi ----

pub async fn insert_syllabus<'e>(
    db: impl sqlx::SqliteExecutor<'e>,
    s: &Syllabus,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO syllabi ({SYLLABUS_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );

    sqlx::query(&sql)
        .bind(&s.id)
        .bind(&s.faculty)
        .bind(&s.career)
        .bind(&s.academic_period_id)
        .bind(&s.semester)
        .bind(s.credits)
        .bind(s.total_hours)
        .bind(s.theory_hours)
        .bind(s.practice_hours)
        .bind(&s.training_area)
        .bind(&s.course_code)
        .bind(&s.course_name)
        .bind(&s.course_type)
        .bind(&s.prerequisites)
        .bind(&s.professor_email)
        .bind(&s.coordinator_username)
        .bind(&s.course_competence)
        .bind(&s.profile_competence)
        .bind(&s.previous_competence)
        .bind(&s.sumilla)
        .bind(&s.bibliography)
        .bind(&s.activities)
        .bind(s.workflow_status)
        .bind(&s.created_by)
        .bind(&s.modified_by)
        .bind(&s.created_at)
        .bind(&s.modified_at)
        .execute(db)
        .await?;

    Ok(())
}

pub async fn fetch_syllabi(db: &SqlitePool) -> Result<Vec<Syllabus>, sqlx::Error> {
    let sql = format!("SELECT {SYLLABUS_COLUMNS} FROM syllabi ORDER BY created_at DESC");

    sqlx::query_as::<_, Syllabus>(&sql).fetch_all(db).await
}

pub async fn find_syllabus_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Syllabus>, sqlx::Error> {
    let sql = format!("SELECT {SYLLABUS_COLUMNS} FROM syllabi WHERE id = ?");

    sqlx::query_as::<_, Syllabus>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn update_syllabus(db: &SqlitePool, s: &Syllabus) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE syllabi SET faculty = ?, career = ?, academic_period_id = ?, semester = ?, \
         credits = ?, total_hours = ?, theory_hours = ?, practice_hours = ?, training_area = ?, \
         course_code = ?, course_name = ?, course_type = ?, prerequisites = ?, \
         professor_email = ?, course_competence = ?, profile_competence = ?, \
         previous_competence = ?, sumilla = ?, bibliography = ?, activities = ?, \
         workflow_status = ?, modified_by = ?, modified_at = ? \
         WHERE id = ?",
    )
    .bind(&s.faculty)
    .bind(&s.career)
    .bind(&s.academic_period_id)
    .bind(&s.semester)
    .bind(s.credits)
    .bind(s.total_hours)
    .bind(s.theory_hours)
    .bind(s.practice_hours)
    .bind(&s.training_area)
    .bind(&s.course_code)
    .bind(&s.course_name)
    .bind(&s.course_type)
    .bind(&s.prerequisites)
    .bind(&s.professor_email)
    .bind(&s.course_competence)
    .bind(&s.profile_competence)
    .bind(&s.previous_competence)
    .bind(&s.sumilla)
    .bind(&s.bibliography)
    .bind(&s.activities)
    .bind(s.workflow_status)
    .bind(&s.modified_by)
    .bind(&s.modified_at)
    .bind(&s.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn update_syllabus_status(
    db: &SqlitePool,
    id: &str,
    status: WorkflowStatus,
    modified_by: &str,
    modified_at: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE syllabi SET workflow_status = ?, modified_by = ?, modified_at = ? WHERE id = ?",
    )
    .bind(status)
    .bind(modified_by)
    .bind(modified_at)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

/// Removes the syllabus and its owned units and evaluations.
pub async fn delete_syllabus(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM evaluations WHERE syllabus_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM syllabus_units WHERE syllabus_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM syllabi WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    Ok(result > 0)
}

// ---- units and evaluations ----

pub async fn insert_unit<'e>(
    db: impl sqlx::SqliteExecutor<'e>,
    unit: &SyllabusUnit,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO syllabus_units \
         (id, syllabus_id, unit_number, title, start_date, end_date, content, \
         week1_content, week2_content, week3_content, week4_content, methodology) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&unit.id)
    .bind(&unit.syllabus_id)
    .bind(unit.unit_number)
    .bind(&unit.title)
    .bind(&unit.start_date)
    .bind(&unit.end_date)
    .bind(&unit.content)
    .bind(&unit.week1_content)
    .bind(&unit.week2_content)
    .bind(&unit.week3_content)
    .bind(&unit.week4_content)
    .bind(&unit.methodology)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn fetch_units(
    db: &SqlitePool,
    syllabus_id: &str,
) -> Result<Vec<SyllabusUnit>, sqlx::Error> {
    sqlx::query_as::<_, SyllabusUnit>(
        "SELECT id, syllabus_id, unit_number, title, start_date, end_date, content, \
         week1_content, week2_content, week3_content, week4_content, methodology \
         FROM syllabus_units WHERE syllabus_id = ? ORDER BY unit_number",
    )
    .bind(syllabus_id)
    .fetch_all(db)
    .await
}

pub async fn update_unit(db: &SqlitePool, unit: &SyllabusUnit) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE syllabus_units SET title = ?, start_date = ?, end_date = ?, content = ?, \
         week1_content = ?, week2_content = ?, week3_content = ?, week4_content = ?, \
         methodology = ? WHERE id = ?",
    )
    .bind(&unit.title)
    .bind(&unit.start_date)
    .bind(&unit.end_date)
    .bind(&unit.content)
    .bind(&unit.week1_content)
    .bind(&unit.week2_content)
    .bind(&unit.week3_content)
    .bind(&unit.week4_content)
    .bind(&unit.methodology)
    .bind(&unit.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn insert_evaluation<'e>(
    db: impl sqlx::SqliteExecutor<'e>,
    evaluation: &Evaluation,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO evaluations (id, syllabus_id, name, weight, consolidation_date, description) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&evaluation.id)
    .bind(&evaluation.syllabus_id)
    .bind(&evaluation.name)
    .bind(evaluation.weight)
    .bind(&evaluation.consolidation_date)
    .bind(&evaluation.description)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn fetch_evaluations(
    db: &SqlitePool,
    syllabus_id: &str,
) -> Result<Vec<Evaluation>, sqlx::Error> {
    sqlx::query_as::<_, Evaluation>(
        "SELECT id, syllabus_id, name, weight, consolidation_date, description \
         FROM evaluations WHERE syllabus_id = ? ORDER BY rowid",
    )
    .bind(syllabus_id)
    .fetch_all(db)
    .await
}

pub async fn update_evaluation(
    db: &SqlitePool,
    evaluation: &Evaluation,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE evaluations SET weight = ?, consolidation_date = ?, description = ? WHERE id = ?",
    )
    .bind(evaluation.weight)
    .bind(&evaluation.consolidation_date)
    .bind(&evaluation.description)
    .bind(&evaluation.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}
