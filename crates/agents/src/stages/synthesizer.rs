//! Synthesizer stage adapter.
//!
//! Final stage. Reads everything the earlier stages produced and writes
//! the recommendation the caller actually receives.

use std::sync::Arc;

use async_trait::async_trait;
use consilium_core::{Stage, SynthesisReport};
use tracing::debug;

use crate::agent::Agent;
use crate::context::AgentContext;
use crate::error::AdapterError;
use crate::gateway::{CompletionRequest, GatewayClient};
use crate::models::ModelSelection;
use crate::parser::parse_stage_output;
use crate::prompts::StagePrompts;

const SYSTEM: &str = "You are a strategy consultant writing for a board audience. Commit to a verdict and respond only with the requested JSON.";

pub struct SynthesizerAgent {
    gateway: Arc<GatewayClient>,
    model: ModelSelection,
}

impl SynthesizerAgent {
    pub fn new(gateway: Arc<GatewayClient>, model: ModelSelection) -> Self {
        Self { gateway, model }
    }
}

#[async_trait]
impl Agent for SynthesizerAgent {
    type Output = SynthesisReport;

    fn stage(&self) -> Stage {
        Stage::Synthesis
    }

    async fn invoke(&self, context: &AgentContext) -> Result<SynthesisReport, AdapterError> {
        let research = context.require_research(Stage::Synthesis)?;
        let analysis = context.require_analysis(Stage::Synthesis)?;
        let regulatory = context.require_regulatory(Stage::Synthesis)?;
        let prompt = StagePrompts::synthesis(&context.request, research, analysis, regulatory);

        debug!(
            company = %context.request.company_name,
            prompt_length = prompt.len(),
            "Invoking synthesizer agent"
        );

        let request = CompletionRequest::new(self.model.qualified(), SYSTEM, &prompt);
        let text = self
            .gateway
            .complete(&request)
            .await
            .map_err(|e| AdapterError::new(Stage::Synthesis, e.to_string()))?;

        parse_stage_output(Stage::Synthesis, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consilium_core::{AnalysisRequest, MarketAssessment, RegulatoryAssessment, ResearchBrief};

    fn full_context() -> AgentContext {
        let mut context = AgentContext::new(AnalysisRequest::new(
            "Zomato",
            "Food Delivery",
            "Should Zomato expand into Saudi Arabia?",
        ));
        context.research = Some(ResearchBrief::default());
        context.analysis = Some(MarketAssessment::default());
        context.regulatory = Some(RegulatoryAssessment::default());
        context
    }

    #[test]
    fn test_stage() {
        let agent = SynthesizerAgent::new(
            Arc::new(GatewayClient::new("http://localhost:0")),
            ModelSelection::default(),
        );
        assert_eq!(agent.stage(), Stage::Synthesis);
    }

    #[tokio::test]
    async fn test_requires_every_upstream_output() {
        let agent = SynthesizerAgent::new(
            Arc::new(GatewayClient::new("http://localhost:0")),
            ModelSelection::default(),
        );

        let mut context = full_context();
        context.analysis = None;

        let error = agent.invoke(&context).await.unwrap_err();
        assert_eq!(error.stage, Stage::Synthesis);
        assert!(error.message.contains("analyst output missing"));
    }
}
