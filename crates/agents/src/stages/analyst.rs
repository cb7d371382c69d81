//! Analyst stage adapter.
//!
//! Sizes the market and models the financial case. Runs concurrently
//! with the regulatory stage, both reading the research brief.

use std::sync::Arc;

use async_trait::async_trait;
use consilium_core::{MarketAssessment, Stage};
use tracing::debug;

use crate::agent::Agent;
use crate::context::AgentContext;
use crate::error::AdapterError;
use crate::gateway::{CompletionRequest, GatewayClient};
use crate::models::ModelSelection;
use crate::parser::parse_stage_output;
use crate::prompts::StagePrompts;

const SYSTEM: &str = "You are a financial analyst building market entry models. Keep estimates conservative and respond only with the requested JSON.";

pub struct AnalystAgent {
    gateway: Arc<GatewayClient>,
    model: ModelSelection,
}

impl AnalystAgent {
    pub fn new(gateway: Arc<GatewayClient>, model: ModelSelection) -> Self {
        Self { gateway, model }
    }
}

#[async_trait]
impl Agent for AnalystAgent {
    type Output = MarketAssessment;

    fn stage(&self) -> Stage {
        Stage::Analyst
    }

    async fn invoke(&self, context: &AgentContext) -> Result<MarketAssessment, AdapterError> {
        let research = context.require_research(Stage::Analyst)?;
        let prompt = StagePrompts::analyst(&context.request, research);

        debug!(
            company = %context.request.company_name,
            prompt_length = prompt.len(),
            "Invoking analyst agent"
        );

        let request = CompletionRequest::new(self.model.qualified(), SYSTEM, &prompt);
        let text = self
            .gateway
            .complete(&request)
            .await
            .map_err(|e| AdapterError::new(Stage::Analyst, e.to_string()))?;

        parse_stage_output(Stage::Analyst, &text)
    }
}
