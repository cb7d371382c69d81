//! Rendering of binary report deliverables.
//!
//! PDF and PPTX generation lives outside this service; the pipeline only
//! talks to it through [`ReportRenderer`]. When no renderer is wired up,
//! the binary formats are simply never produced and only the JSON
//! deliverable exists.

use async_trait::async_trait;
use consilium_core::{ArtifactFormat, JobResult};
use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{OrchestratorError, Result};

/// Narrow interface to a report rendering backend.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Render one deliverable for a completed job.
    async fn render(
        &self,
        job_id: Uuid,
        result: &JobResult,
        format: ArtifactFormat,
    ) -> Result<Vec<u8>>;
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    job_id: Uuid,
    result: &'a JobResult,
}

/// Renderer backed by an HTTP rendering service. Expects
/// `POST {base}/render/{format}` to return the document bytes.
pub struct HttpRenderer {
    base_url: String,
    client: Client,
}

impl HttpRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl ReportRenderer for HttpRenderer {
    async fn render(
        &self,
        job_id: Uuid,
        result: &JobResult,
        format: ArtifactFormat,
    ) -> Result<Vec<u8>> {
        let url = format!(
            "{}/render/{}",
            self.base_url.trim_end_matches('/'),
            format.as_str()
        );

        let response = self
            .client
            .post(&url)
            .json(&RenderRequest { job_id, result })
            .send()
            .await
            .map_err(|e| OrchestratorError::Render(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrchestratorError::Render(format!(
                "renderer returned {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            OrchestratorError::Render(format!("reading renderer response failed: {}", e))
        })?;

        Ok(bytes.to_vec())
    }
}
