use std::env;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::AppError;
use crate::models::SyllabusDetail;

#[derive(Clone, Debug)]
pub struct RendererConfig {
    pub base_url: String,
    pub api_token: Option<String>,
}

impl RendererConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("RENDERER_URL")
            .map_err(|_| AppError::BadRequest("RENDERER_URL is not set".to_string()))?;
        let api_token = env::var("RENDERER_TOKEN").ok();

        Ok(Self {
            base_url,
            api_token,
        })
    }
}

/// Turns a syllabus document into PDF bytes. Rendering happens in an
/// external service; this crate only proxies the result.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, document: &SyllabusDetail) -> Result<Vec<u8>, AppError>;
}

pub struct HttpPdfRenderer {
    client: Client,
    config: RendererConfig,
}

impl HttpPdfRenderer {
    pub fn new(config: RendererConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl PdfRenderer for HttpPdfRenderer {
    async fn render(&self, document: &SyllabusDetail) -> Result<Vec<u8>, AppError> {
        let url = format!("{}/render", self.config.base_url.trim_end_matches('/'));

        let mut request = self.client.post(&url).json(document);
        if let Some(token) = &self.config.api_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|_| AppError::InternalServerError)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BadRequest(format!(
                "Renderer error {}: {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|_| AppError::InternalServerError)?;

        Ok(bytes.to_vec())
    }
}

/// Stand-in used when no renderer is configured and in tests.
pub struct NoopPdfRenderer;

#[async_trait]
impl PdfRenderer for NoopPdfRenderer {
    async fn render(&self, _document: &SyllabusDetail) -> Result<Vec<u8>, AppError> {
        Ok(Vec::new())
    }
}
