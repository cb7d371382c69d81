use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::report::{JobError, JobResult};
use crate::domain::request::AnalysisRequest;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_transition(&self, to: JobStatus) -> bool {
        match (self, to) {
            (Self::Queued, Self::Processing | Self::Failed) => true,
            (Self::Processing, Self::Completed | Self::Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analysis run. Created `queued`, driven to a terminal state by the
/// pipeline, never reused. Exactly one of `result`/`error` is set once
/// terminal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    /// Completion percentage (0-100), non-decreasing while processing
    pub progress: u8,
    pub input: AnalysisRequest,
    pub result: Option<JobResult>,
    pub error: Option<JobError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(input: AnalysisRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::default(),
            progress: 0,
            input,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Partial update applied to a stored job. Constructors keep the
/// terminal-state invariants: `completed` always carries progress 100 and
/// a result, `failed` always carries an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub result: Option<JobResult>,
    pub error: Option<JobError>,
}

impl JobPatch {
    pub fn processing(progress: u8) -> Self {
        Self {
            status: Some(JobStatus::Processing),
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn completed(result: JobResult) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: JobError) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.progress.is_none()
            && self.result.is_none()
            && self.error.is_none()
    }
}
