use chrono::{DateTime, TimeZone, Utc};
use consilium_core::{Job, JobStatus};
use uuid::Uuid;

/// Storage shape of a job. Request, result and error travel as JSON in
/// TEXT columns; timestamps as unix seconds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRow {
    pub id: String,
    pub status: String,
    pub progress: i64,
    pub input: String,
    pub result: Option<String>,
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl JobRow {
    pub fn into_domain(self) -> Job {
        Job {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            status: JobStatus::parse(&self.status).unwrap_or_default(),
            progress: self.progress.clamp(0, 100) as u8,
            input: serde_json::from_str(&self.input).unwrap_or_default(),
            result: self.result.and_then(|s| serde_json::from_str(&s).ok()),
            error: self.error.and_then(|s| serde_json::from_str(&s).ok()),
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            status: job.status.as_str().to_string(),
            progress: i64::from(job.progress),
            input: serde_json::to_string(&job.input).unwrap_or_else(|_| "{}".to_string()),
            result: job
                .result
                .as_ref()
                .and_then(|r| serde_json::to_string(r).ok()),
            error: job
                .error
                .as_ref()
                .and_then(|e| serde_json::to_string(e).ok()),
            created_at: datetime_to_timestamp(job.created_at),
            updated_at: datetime_to_timestamp(job.updated_at),
        }
    }
}

fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0).unwrap()
}

fn datetime_to_timestamp(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}
