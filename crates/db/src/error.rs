use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Invalid job status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
