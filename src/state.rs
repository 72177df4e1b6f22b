use std::sync::Arc;

use sqlx::SqlitePool;

use crate::renderer::PdfRenderer;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub renderer: Arc<dyn PdfRenderer>,
}
