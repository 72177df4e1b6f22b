pub mod repository;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::error::AppError;
use crate::models::{Career, Role, User};

const DEFAULT_CAREERS: [&str; 3] = [
    "Ingeniería de Software",
    "Derecho",
    "Arquitectura y Urbanismo",
];

const ADMIN_USERNAME: &str = "admin@ulasalle.edu.pe";

/// Insert the baseline careers and the administrator account when the
/// database is empty. Safe to run on every startup.
pub async fn seed(db: &SqlitePool) -> Result<(), AppError> {
    if repository::count_careers(db).await? == 0 {
        for name in DEFAULT_CAREERS {
            let career = Career {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                created_at: Utc::now().to_rfc3339(),
            };
            repository::insert_career(db, &career).await?;
        }
        info!("seeded {} careers", DEFAULT_CAREERS.len());
    }

    if repository::find_user_by_username(db, ADMIN_USERNAME)
        .await?
        .is_none()
    {
        let admin = User {
            id: Uuid::new_v4().to_string(),
            username: ADMIN_USERNAME.to_string(),
            password_digest: auth::hash_password("admin123"),
            full_name: "Administrador del Sistema".to_string(),
            role: Role::Coordinator,
            career: None,
            created_at: Utc::now().to_rfc3339(),
        };
        repository::insert_user(db, &admin).await?;
        info!("seeded administrator account {}", ADMIN_USERNAME);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> SqlitePool {
        let db = SqlitePool::connect("sqlite::memory:").await.expect("connect");
        sqlx::migrate!("./migrations").run(&db).await.expect("migrate");
        db
    }

    #[tokio::test]
    async fn seed_populates_empty_database() {
        let db = setup().await;
        seed(&db).await.expect("seed");

        assert_eq!(repository::count_careers(&db).await.expect("count"), 3);
        let admin = repository::find_user_by_username(&db, ADMIN_USERNAME)
            .await
            .expect("query")
            .expect("admin exists");
        assert_eq!(admin.role, Role::Coordinator);
        assert!(admin.career.is_none());
        assert!(auth::verify_password("admin123", &admin.password_digest));
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let db = setup().await;
        seed(&db).await.expect("first");
        seed(&db).await.expect("second");

        assert_eq!(repository::count_careers(&db).await.expect("count"), 3);
        assert_eq!(
            repository::fetch_users(&db).await.expect("users").len(),
            1
        );
    }

    #[tokio::test]
    async fn seed_keeps_existing_careers() {
        let db = setup().await;
        let career = Career {
            id: Uuid::new_v4().to_string(),
            name: "Medicina".to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        repository::insert_career(&db, &career).await.expect("insert");

        seed(&db).await.expect("seed");
        assert_eq!(repository::count_careers(&db).await.expect("count"), 1);
    }
}
