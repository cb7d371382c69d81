use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use consilium_core::{AnalysisRequest, ArtifactFormat, Job, JobError, JobStatus};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

const RECENT_ANALYSES_LIMIT: i64 = 50;

/// Acknowledgement for an accepted analysis job
#[derive(Serialize, ToSchema)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

impl From<&Job> for SubmitResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            progress: job.progress,
            created_at: job.created_at,
        }
    }
}

/// Lifecycle projection of a job, cheap enough to poll
#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Job> for StatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            progress: job.progress,
            error: job.error.clone(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// One row of the recent-analyses listing
#[derive(Serialize, ToSchema)]
pub struct JobSummary {
    pub job_id: Uuid,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub strategic_question: String,
    pub status: JobStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            company_name: job.input.company_name.clone(),
            industry: job.input.industry.clone(),
            strategic_question: job.input.strategic_question.clone(),
            status: job.status,
            progress: job.progress,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ClarifyResponse {
    pub question: String,
}

#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalysisRequest,
    responses(
        (status = 202, description = "Analysis job accepted", body = SubmitResponse),
        (status = 400, description = "Invalid request"),
    ),
    tag = "analyses"
)]
pub async fn submit_analysis(
    State(state): State<AppState>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    payload.validate()?;

    let job = state.pipeline.submit(payload).await?;

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse::from(&job))))
}

#[utoipa::path(
    get,
    path = "/status/{job_id}",
    params(
        ("job_id" = Uuid, Path, description = "Job ID"),
    ),
    responses(
        (status = 200, description = "Job status", body = StatusResponse),
        (status = 404, description = "Job not found"),
    ),
    tag = "analyses"
)]
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let job = state
        .repository
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job not found: {}", job_id)))?;

    Ok(Json(StatusResponse::from(&job)))
}

#[utoipa::path(
    get,
    path = "/results/{job_id}",
    params(
        ("job_id" = Uuid, Path, description = "Job ID"),
    ),
    responses(
        (status = 200, description = "Full analysis result", body = consilium_core::JobResult),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job has not completed"),
    ),
    tag = "analyses"
)]
pub async fn get_results(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<consilium_core::JobResult>, AppError> {
    let job = state
        .repository
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job not found: {}", job_id)))?;

    if job.status != JobStatus::Completed {
        return Err(AppError::NotReady(format!(
            "Job {} is {} at {}%",
            job_id, job.status, job.progress
        )));
    }

    let result = job.result.ok_or_else(|| {
        AppError::Internal(format!("Completed job {} has no stored result", job_id))
    })?;

    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/download/{job_id}/{format}",
    params(
        ("job_id" = Uuid, Path, description = "Job ID"),
        ("format" = String, Path, description = "Artifact format: pdf, pptx or json"),
    ),
    responses(
        (status = 200, description = "Artifact file"),
        (status = 400, description = "Unknown artifact format"),
        (status = 404, description = "Job unknown, not completed, or artifact missing"),
    ),
    tag = "analyses"
)]
pub async fn download_artifact(
    State(state): State<AppState>,
    Path((job_id, format)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    let format = ArtifactFormat::parse(&format)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown artifact format: {}", format)))?;

    let job = state
        .repository
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job not found: {}", job_id)))?;

    if job.status != JobStatus::Completed {
        return Err(AppError::NotFound(format!(
            "No {} artifact for job {}: job is {}",
            format.as_str(),
            job_id,
            job.status
        )));
    }

    if !state.artifacts.exists(job_id, format).await {
        return Err(AppError::NotFound(format!(
            "No {} artifact for job {}",
            format.as_str(),
            job_id
        )));
    }

    let bytes = state
        .artifacts
        .read(job_id, format)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.{}\"", job_id, format.extension()),
        ),
    ];

    Ok((headers, bytes))
}

#[utoipa::path(
    get,
    path = "/analyses",
    responses(
        (status = 200, description = "Recent analysis jobs", body = [JobSummary]),
    ),
    tag = "analyses"
)]
pub async fn list_analyses(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobSummary>>, AppError> {
    let jobs = state.repository.find_recent(RECENT_ANALYSES_LIMIT).await?;

    Ok(Json(jobs.iter().map(JobSummary::from).collect()))
}

#[utoipa::path(
    post,
    path = "/clarify",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Clarifying question for the draft request", body = ClarifyResponse),
        (status = 400, description = "Invalid request"),
    ),
    tag = "analyses"
)]
pub async fn clarify(
    State(state): State<AppState>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<Json<ClarifyResponse>, AppError> {
    payload.validate()?;

    let question = state.clarifier.clarify(&payload).await;

    Ok(Json(ClarifyResponse { question }))
}
