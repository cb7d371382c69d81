use consilium_core::Stage;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROVIDER: &str = "groq";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Model selection for a specific stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    /// Provider ID (e.g., "groq", "openrouter")
    pub provider_id: String,
    /// Model ID (e.g., "llama-3.3-70b-versatile")
    pub model_id: String,
}

impl ModelSelection {
    pub fn new(provider_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
        }
    }

    /// The "provider/model" form the gateway routes on.
    pub fn qualified(&self) -> String {
        format!("{}/{}", self.provider_id, self.model_id)
    }
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDER, DEFAULT_MODEL)
    }
}

/// Per-stage model overrides. Unset stages use the default model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageModels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research: Option<ModelSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyst: Option<ModelSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regulatory: Option<ModelSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<ModelSelection>,
}

impl StageModels {
    pub fn for_stage(&self, stage: Stage) -> ModelSelection {
        let selected = match stage {
            Stage::Research => &self.research,
            Stage::Analyst => &self.analyst,
            Stage::Regulatory => &self.regulatory,
            Stage::Synthesis => &self.synthesis,
        };
        selected.clone().unwrap_or_default()
    }
}
