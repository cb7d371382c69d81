use std::sync::Arc;

use async_trait::async_trait;
use consilium_core::{
    MarketAssessment, RegulatoryAssessment, ResearchBrief, Stage, SynthesisReport,
};

use crate::context::AgentContext;
use crate::error::AdapterError;
use crate::gateway::GatewayClient;
use crate::models::StageModels;
use crate::stages::{AnalystAgent, RegulatoryAgent, ResearchAgent, SynthesizerAgent};

/// Uniform contract every stage adapter implements. An adapter is an
/// opaque collaborator: it reads the context, does its work, and either
/// returns its typed output or an [`AdapterError`] naming its stage.
#[async_trait]
pub trait Agent: Send + Sync {
    type Output;

    fn stage(&self) -> Stage;

    async fn invoke(&self, context: &AgentContext) -> Result<Self::Output, AdapterError>;
}

/// The four adapters a pipeline runs, as shared trait objects so tests
/// can substitute any of them.
#[derive(Clone)]
pub struct AgentSet {
    pub research: Arc<dyn Agent<Output = ResearchBrief>>,
    pub analyst: Arc<dyn Agent<Output = MarketAssessment>>,
    pub regulatory: Arc<dyn Agent<Output = RegulatoryAssessment>>,
    pub synthesizer: Arc<dyn Agent<Output = SynthesisReport>>,
}

impl AgentSet {
    /// Wires all four stages to the completion gateway with the given
    /// per-stage model selection.
    pub fn over_gateway(gateway: Arc<GatewayClient>, models: &StageModels) -> Self {
        Self {
            research: Arc::new(ResearchAgent::new(
                gateway.clone(),
                models.for_stage(Stage::Research),
            )),
            analyst: Arc::new(AnalystAgent::new(
                gateway.clone(),
                models.for_stage(Stage::Analyst),
            )),
            regulatory: Arc::new(RegulatoryAgent::new(
                gateway.clone(),
                models.for_stage(Stage::Regulatory),
            )),
            synthesizer: Arc::new(SynthesizerAgent::new(
                gateway,
                models.for_stage(Stage::Synthesis),
            )),
        }
    }
}

impl std::fmt::Debug for AgentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSet")
            .field("research", &self.research.stage())
            .field("analyst", &self.analyst.stage())
            .field("regulatory", &self.regulatory.stage())
            .field("synthesizer", &self.synthesizer.stage())
            .finish()
    }
}
