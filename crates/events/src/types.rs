//! Event types emitted over the analysis job lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All possible events in the system. Statuses and stages travel as
/// their wire strings so subscribers need no domain types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new analysis job was accepted
    #[serde(rename = "job.submitted")]
    JobSubmitted { job_id: Uuid, company_name: String },

    /// Job moved between lifecycle states or advanced its progress
    #[serde(rename = "job.status_changed")]
    JobStatusChanged {
        job_id: Uuid,
        from_status: String,
        to_status: String,
        progress: u8,
    },

    /// An agent stage began executing
    #[serde(rename = "stage.started")]
    StageStarted { job_id: Uuid, stage: String },

    /// An agent stage finished successfully
    #[serde(rename = "stage.completed")]
    StageCompleted {
        job_id: Uuid,
        stage: String,
        duration_ms: u64,
    },

    /// Job reached its terminal success state
    #[serde(rename = "job.completed")]
    JobCompleted { job_id: Uuid },

    /// Job reached its terminal failure state
    #[serde(rename = "job.failed")]
    JobFailed {
        job_id: Uuid,
        stage: String,
        message: String,
    },

    /// Generic error event
    #[serde(rename = "error")]
    Error {
        message: String,
        context: Option<String>,
    },
}

impl Event {
    /// Get the job ID associated with this event, if any
    pub fn job_id(&self) -> Option<Uuid> {
        match self {
            Event::JobSubmitted { job_id, .. } => Some(*job_id),
            Event::JobStatusChanged { job_id, .. } => Some(*job_id),
            Event::StageStarted { job_id, .. } => Some(*job_id),
            Event::StageCompleted { job_id, .. } => Some(*job_id),
            Event::JobCompleted { job_id } => Some(*job_id),
            Event::JobFailed { job_id, .. } => Some(*job_id),
            Event::Error { .. } => None,
        }
    }
}
