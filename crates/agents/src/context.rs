use consilium_core::{
    AnalysisRequest, MarketAssessment, RegulatoryAssessment, ResearchBrief, Stage,
};

use crate::error::AdapterError;

/// Working context threaded through a run. Each stage reads what earlier
/// stages produced; the orchestrator merges new outputs in between stages.
#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    pub request: AnalysisRequest,
    pub research: Option<ResearchBrief>,
    pub analysis: Option<MarketAssessment>,
    pub regulatory: Option<RegulatoryAssessment>,
}

impl AgentContext {
    pub fn new(request: AnalysisRequest) -> Self {
        Self {
            request,
            research: None,
            analysis: None,
            regulatory: None,
        }
    }

    /// Research output, or an error attributed to the requesting stage.
    pub fn require_research(&self, requester: Stage) -> Result<&ResearchBrief, AdapterError> {
        self.research
            .as_ref()
            .ok_or_else(|| AdapterError::new(requester, "research output missing from context"))
    }

    pub fn require_analysis(&self, requester: Stage) -> Result<&MarketAssessment, AdapterError> {
        self.analysis
            .as_ref()
            .ok_or_else(|| AdapterError::new(requester, "analyst output missing from context"))
    }

    pub fn require_regulatory(
        &self,
        requester: Stage,
    ) -> Result<&RegulatoryAssessment, AdapterError> {
        self.regulatory
            .as_ref()
            .ok_or_else(|| AdapterError::new(requester, "regulatory output missing from context"))
    }
}
