use agents::AdapterError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Database error: {0}")]
    Database(#[from] db::DbError),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
