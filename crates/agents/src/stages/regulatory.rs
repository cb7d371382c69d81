//! Regulatory stage adapter.
//!
//! Maps compliance exposure of the proposed move. Runs concurrently
//! with the analyst stage, both reading the research brief.

use std::sync::Arc;

use async_trait::async_trait;
use consilium_core::{RegulatoryAssessment, Stage};
use tracing::debug;

use crate::agent::Agent;
use crate::context::AgentContext;
use crate::error::AdapterError;
use crate::gateway::{CompletionRequest, GatewayClient};
use crate::models::ModelSelection;
use crate::parser::parse_stage_output;
use crate::prompts::StagePrompts;

const SYSTEM: &str = "You are a regulatory affairs advisor for cross-border expansions. Flag blockers explicitly and respond only with the requested JSON.";

pub struct RegulatoryAgent {
    gateway: Arc<GatewayClient>,
    model: ModelSelection,
}

impl RegulatoryAgent {
    pub fn new(gateway: Arc<GatewayClient>, model: ModelSelection) -> Self {
        Self { gateway, model }
    }
}

#[async_trait]
impl Agent for RegulatoryAgent {
    type Output = RegulatoryAssessment;

    fn stage(&self) -> Stage {
        Stage::Regulatory
    }

    async fn invoke(&self, context: &AgentContext) -> Result<RegulatoryAssessment, AdapterError> {
        let research = context.require_research(Stage::Regulatory)?;
        let prompt = StagePrompts::regulatory(&context.request, research);

        debug!(
            company = %context.request.company_name,
            prompt_length = prompt.len(),
            "Invoking regulatory agent"
        );

        let request = CompletionRequest::new(self.model.qualified(), SYSTEM, &prompt);
        let text = self
            .gateway
            .complete(&request)
            .await
            .map_err(|e| AdapterError::new(Stage::Regulatory, e.to_string()))?;

        parse_stage_output(Stage::Regulatory, &text)
    }
}
