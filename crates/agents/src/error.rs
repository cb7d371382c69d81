use consilium_core::{JobError, Stage};
use thiserror::Error;

/// Uniform failure type of every agent adapter. Carries the stage it
/// happened in so the orchestrator can record which part of the run broke.
#[derive(Debug, Clone, Error)]
#[error("{stage} adapter failed: {message}")]
pub struct AdapterError {
    pub stage: Stage,
    pub message: String,
}

impl AdapterError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl From<AdapterError> for JobError {
    fn from(error: AdapterError) -> Self {
        JobError::new(error.stage, error.message)
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
