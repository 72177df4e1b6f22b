use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sygsy_backend::api::router;
use sygsy_backend::db;
use sygsy_backend::renderer::{HttpPdfRenderer, NoopPdfRenderer, PdfRenderer, RendererConfig};
use sygsy_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sygsy_backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://sygsy.db".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    db::seed(&pool).await?;

    let renderer: Arc<dyn PdfRenderer> = match RendererConfig::new_from_env() {
        Ok(config) => Arc::new(HttpPdfRenderer::new(config)?),
        Err(_) => {
            warn!("RENDERER_URL is not set, PDF downloads will be empty");
            Arc::new(NoopPdfRenderer)
        }
    };

    let state = AppState {
        db: pool.clone(),
        renderer,
    };

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
