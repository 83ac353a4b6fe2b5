//! HTTP client for the rendering engine.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::{BackendError, Document, PageAnalysis, PdfInfo, RenderBackend, RenderRequest};
use crate::config::RendererConfig;

/// [`RenderBackend`] speaking the engine's multipart HTTP API.
#[derive(Clone)]
pub struct HttpRenderBackend {
    client: Client,
    base_url: String,
}

impl HttpRenderBackend {
    /// # Errors
    ///
    /// Returns `BackendError::InvalidConfig` if the base URL is empty or the
    /// HTTP client cannot be created.
    pub fn new(config: &RendererConfig) -> Result<Self, BackendError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BackendError::InvalidConfig(
                "renderer base_url cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                BackendError::InvalidConfig(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn post(
        &self,
        path: &str,
        query: &[(&str, String)],
        form: Form,
    ) -> Result<Response, BackendError> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "Sending request to rendering engine");

        let response = self
            .client
            .post(&url)
            .query(query)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Connection(format!("{} request failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn body(response: Response) -> Result<Bytes, BackendError> {
        response
            .bytes()
            .await
            .map_err(|e| BackendError::Connection(format!("Failed to read body: {}", e)))
    }
}

fn document_form(document: &Document) -> Form {
    Form::new().part(
        "file",
        Part::bytes(document.bytes().to_vec()).file_name(document.name().to_string()),
    )
}

fn render_form(document: &Document, request: &RenderRequest) -> Result<Form, BackendError> {
    let modifiers = request
        .modifiers
        .to_json()
        .map_err(|e| BackendError::Decode(format!("page modifiers: {}", e)))?;
    let mut form = document_form(document).text("page_modifiers_json", modifiers);

    if let Some(removals) = &request.removals {
        let targets = serde_json::to_string(removals)
            .map_err(|e| BackendError::Decode(format!("remove targets: {}", e)))?;
        form = form.text("remove_targets_json", targets);
    }

    if let Some(image) = &request.watermark_image {
        form = form.part(
            "watermark_image",
            Part::bytes(image.to_vec()).file_name("watermark.png"),
        );
    }

    Ok(form)
}

#[async_trait]
impl RenderBackend for HttpRenderBackend {
    async fn pdf_info(&self, document: &Document) -> Result<PdfInfo, BackendError> {
        let response = self.post("pdf-info", &[], document_form(document)).await?;
        Self::json(response).await
    }

    async fn analyze(
        &self,
        document: &Document,
        page_index: usize,
        analyze_all: bool,
    ) -> Result<PageAnalysis, BackendError> {
        let query = [
            ("page_index", page_index.to_string()),
            ("analyze_all", analyze_all.to_string()),
        ];
        let response = self
            .post("analyze", &query, document_form(document))
            .await?;
        Self::json(response).await
    }

    async fn preview(
        &self,
        document: &Document,
        page_index: usize,
        request: &RenderRequest,
    ) -> Result<Bytes, BackendError> {
        let query = [("page_index", page_index.to_string())];
        let form = render_form(document, request)?;
        let response = self.post("preview", &query, form).await?;
        Self::body(response).await
    }

    async fn reconstruct(
        &self,
        document: &Document,
        request: &RenderRequest,
    ) -> Result<Bytes, BackendError> {
        let form = render_form(document, request)?;
        let response = self.post("reconstruct", &[], form).await?;
        Self::body(response).await
    }
}
