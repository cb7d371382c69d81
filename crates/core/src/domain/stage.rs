use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pipeline stage an agent runs in. Failed jobs record the stage that
/// broke the run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Research,
    Analyst,
    Regulatory,
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Analyst => "analyst",
            Self::Regulatory => "regulatory",
            Self::Synthesis => "synthesis",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "research" => Some(Self::Research),
            "analyst" => Some(Self::Analyst),
            "regulatory" => Some(Self::Regulatory),
            "synthesis" | "synthesizer" => Some(Self::Synthesis),
            _ => None,
        }
    }

    pub fn all() -> [Stage; 4] {
        [
            Self::Research,
            Self::Analyst,
            Self::Regulatory,
            Self::Synthesis,
        ]
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
