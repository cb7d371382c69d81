//! Artifact storage for generated deliverables
//!
//! Handles writing and reading the report files a completed job leaves
//! behind, laid out as `<base>/artifacts/<job_id>.<ext>`.

use std::path::PathBuf;

use consilium_core::{ArtifactFormat, JobResult};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{OrchestratorError, Result};

/// Directory for generated deliverables
const ARTIFACTS_DIR: &str = "artifacts";

/// Manages deliverable files for analysis jobs
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Base path of the service data directory
    base_path: PathBuf,
}

impl ArtifactStore {
    /// Create a new ArtifactStore rooted at the given data directory
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Get the path to the artifacts directory
    pub fn artifacts_dir(&self) -> PathBuf {
        self.base_path.join(ARTIFACTS_DIR)
    }

    /// Get the path to one deliverable of a job
    pub fn path_for(&self, job_id: Uuid, format: ArtifactFormat) -> PathBuf {
        self.artifacts_dir()
            .join(format!("{}.{}", job_id, format.extension()))
    }

    /// Ensure the artifacts directory exists
    pub async fn ensure_directories(&self) -> Result<()> {
        let dir = self.artifacts_dir();

        debug!("Ensuring artifacts directory exists: {:?}", dir);

        fs::create_dir_all(&dir).await.map_err(|e| {
            OrchestratorError::Artifact(format!(
                "Failed to create artifacts directory {:?}: {}",
                dir, e
            ))
        })
    }

    /// Serialize and write the JSON deliverable for a job
    pub async fn write_json(&self, job_id: Uuid, result: &JobResult) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(result).map_err(|e| {
            OrchestratorError::Artifact(format!(
                "Failed to serialize result for job {}: {}",
                job_id, e
            ))
        })?;

        self.write_bytes(job_id, ArtifactFormat::Json, &bytes).await
    }

    /// Write one deliverable (atomic write via temp file + rename)
    pub async fn write_bytes(
        &self,
        job_id: Uuid,
        format: ArtifactFormat,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        self.ensure_directories().await?;
        let path = self.path_for(job_id, format);
        let temp_path = self
            .artifacts_dir()
            .join(format!(".{}.{}.tmp", job_id, format.extension()));

        info!("Writing {} artifact to {:?}", format.as_str(), path);

        fs::write(&temp_path, bytes).await.map_err(|e| {
            OrchestratorError::Artifact(format!(
                "Failed to write temp artifact file {:?}: {}",
                temp_path, e
            ))
        })?;

        fs::rename(&temp_path, &path).await.map_err(|e| {
            OrchestratorError::Artifact(format!(
                "Failed to rename artifact file {:?} -> {:?}: {}",
                temp_path, path, e
            ))
        })?;

        Ok(path)
    }

    /// Read one deliverable back
    pub async fn read(&self, job_id: Uuid, format: ArtifactFormat) -> Result<Vec<u8>> {
        let path = self.path_for(job_id, format);

        debug!("Reading artifact from {:?}", path);
        fs::read(&path).await.map_err(|e| {
            OrchestratorError::Artifact(format!("Failed to read artifact file {:?}: {}", path, e))
        })
    }

    /// Check if a deliverable exists for a job
    pub async fn exists(&self, job_id: Uuid, format: ArtifactFormat) -> bool {
        fs::try_exists(self.path_for(job_id, format))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_store() -> (ArtifactStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_ensure_directories() {
        let (store, _temp_dir) = setup_test_store();

        store.ensure_directories().await.unwrap();

        assert!(store.artifacts_dir().exists());
    }

    #[tokio::test]
    async fn test_write_and_read_json() {
        let (store, _temp_dir) = setup_test_store();
        let job_id = Uuid::new_v4();
        let result = JobResult::default();

        let path = store.write_json(job_id, &result).await.unwrap();
        assert!(path.exists());

        let bytes = store.read(job_id, ArtifactFormat::Json).await.unwrap();
        let parsed: JobResult = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.synthesis.verdict, result.synthesis.verdict);
    }

    #[tokio::test]
    async fn test_write_bytes_and_exists() {
        let (store, _temp_dir) = setup_test_store();
        let job_id = Uuid::new_v4();

        assert!(!store.exists(job_id, ArtifactFormat::Pdf).await);

        store
            .write_bytes(job_id, ArtifactFormat::Pdf, b"%PDF-1.7")
            .await
            .unwrap();

        assert!(store.exists(job_id, ArtifactFormat::Pdf).await);
        let bytes = store.read(job_id, ArtifactFormat::Pdf).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_read_missing_artifact_fails() {
        let (store, _temp_dir) = setup_test_store();

        let error = store.read(Uuid::new_v4(), ArtifactFormat::Pptx).await;
        assert!(error.is_err());
    }

    #[test]
    fn test_path_layout() {
        let store = ArtifactStore::new("/data");
        let job_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();

        assert_eq!(
            store.path_for(job_id, ArtifactFormat::Pdf),
            PathBuf::from("/data/artifacts/550e8400-e29b-41d4-a716-446655440000.pdf")
        );
        assert_eq!(
            store.path_for(job_id, ArtifactFormat::Json),
            PathBuf::from("/data/artifacts/550e8400-e29b-41d4-a716-446655440000.json")
        );
    }
}
