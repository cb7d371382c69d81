use agents::StageModels;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

const CONFIG_FILE: &str = ".consilium/config.json";

pub const DEFAULT_GATEWAY_URL: &str = "https://api.groq.com/openai";
pub const DEFAULT_DATA_DIR: &str = ".consilium";

/// Service configuration stored in .consilium/config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Per-stage model overrides
    #[serde(default)]
    pub stage_models: StageModels,
    /// Base URL of the OpenAI-compatible completion gateway
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Base URL of the document renderer. Without one the service only
    /// produces the JSON deliverable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_url: Option<String>,
    /// Directory the generated deliverables are written under
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_artifacts_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            stage_models: StageModels::default(),
            gateway_url: default_gateway_url(),
            renderer_url: None,
            artifacts_dir: default_artifacts_dir(),
        }
    }
}

impl ServiceConfig {
    /// Read config from the working directory
    pub async fn read(base_path: &Path) -> Self {
        let config_path = base_path.join(CONFIG_FILE);

        if !config_path.exists() {
            debug!(path = %config_path.display(), "Config file does not exist, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&config_path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    debug!(path = %config_path.display(), "Config loaded successfully");
                    config
                }
                Err(e) => {
                    warn!(path = %config_path.display(), error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %config_path.display(), error = %e, "Failed to read config file, using defaults");
                Self::default()
            }
        }
    }

    /// Write config to the working directory
    pub async fn write(&self, base_path: &Path) -> std::io::Result<()> {
        let config_dir = base_path.join(".consilium");
        let config_path = config_dir.join("config.json");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).await?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&config_path, content).await?;
        debug!(path = %config_path.display(), "Config saved successfully");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agents::ModelSelection;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_default() {
        let config = ServiceConfig::default();
        assert_eq!(config.gateway_url, DEFAULT_GATEWAY_URL);
        assert!(config.renderer_url.is_none());
        assert!(config.stage_models.research.is_none());
        assert_eq!(config.artifacts_dir, DEFAULT_DATA_DIR);
    }

    #[tokio::test]
    async fn test_config_read_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServiceConfig::read(temp_dir.path()).await;
        assert_eq!(config.gateway_url, DEFAULT_GATEWAY_URL);
    }

    #[tokio::test]
    async fn test_config_read_garbage_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join(".consilium");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.json"), "not json").unwrap();

        let config = ServiceConfig::read(temp_dir.path()).await;
        assert_eq!(config.gateway_url, DEFAULT_GATEWAY_URL);
    }

    #[tokio::test]
    async fn test_config_write_and_read() {
        let temp_dir = TempDir::new().unwrap();

        let config = ServiceConfig {
            stage_models: StageModels {
                synthesis: Some(ModelSelection::new("openrouter", "deepseek/deepseek-chat")),
                ..StageModels::default()
            },
            gateway_url: "http://localhost:4000".to_string(),
            renderer_url: Some("http://localhost:7070".to_string()),
            artifacts_dir: "data".to_string(),
        };

        config.write(temp_dir.path()).await.unwrap();

        let loaded = ServiceConfig::read(temp_dir.path()).await;
        assert_eq!(loaded.gateway_url, "http://localhost:4000");
        assert_eq!(loaded.renderer_url.as_deref(), Some("http://localhost:7070"));
        assert_eq!(
            loaded.stage_models.synthesis.as_ref().unwrap().provider_id,
            "openrouter"
        );
        assert!(loaded.stage_models.research.is_none());
        assert_eq!(loaded.artifacts_dir, "data");
    }
}
