//! Research stage adapter.
//!
//! First stage of every run. Works from the request alone and produces
//! the grounding brief every later stage reads.

use std::sync::Arc;

use async_trait::async_trait;
use consilium_core::{ResearchBrief, Stage};
use tracing::debug;

use crate::agent::Agent;
use crate::context::AgentContext;
use crate::error::AdapterError;
use crate::gateway::{CompletionRequest, GatewayClient};
use crate::models::ModelSelection;
use crate::parser::parse_stage_output;
use crate::prompts::StagePrompts;

const SYSTEM: &str = "You are a market research analyst. Be factual, name your sources, and respond only with the requested JSON.";

pub struct ResearchAgent {
    gateway: Arc<GatewayClient>,
    model: ModelSelection,
}

impl ResearchAgent {
    pub fn new(gateway: Arc<GatewayClient>, model: ModelSelection) -> Self {
        Self { gateway, model }
    }
}

#[async_trait]
impl Agent for ResearchAgent {
    type Output = ResearchBrief;

    fn stage(&self) -> Stage {
        Stage::Research
    }

    async fn invoke(&self, context: &AgentContext) -> Result<ResearchBrief, AdapterError> {
        let prompt = StagePrompts::research(&context.request);

        debug!(
            company = %context.request.company_name,
            prompt_length = prompt.len(),
            "Invoking research agent"
        );

        let request = CompletionRequest::new(self.model.qualified(), SYSTEM, &prompt);
        let text = self
            .gateway
            .complete(&request)
            .await
            .map_err(|e| AdapterError::new(Stage::Research, e.to_string()))?;

        parse_stage_output(Stage::Research, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consilium_core::AnalysisRequest;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context() -> AgentContext {
        AgentContext::new(AnalysisRequest::new(
            "Zomato",
            "Food Delivery",
            "Should Zomato expand into Saudi Arabia?",
        ))
    }

    #[test]
    fn test_stage() {
        let agent = ResearchAgent::new(
            Arc::new(GatewayClient::new("http://localhost:0")),
            ModelSelection::default(),
        );
        assert_eq!(agent.stage(), Stage::Research);
    }

    #[tokio::test]
    async fn test_invoke_parses_brief() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content":
                "```json\n{\"key_findings\": [\"Delivery penetration is low\"], \"market_context\": \"Growing market\"}\n```"
            }}]
        });
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let agent = ResearchAgent::new(
            Arc::new(GatewayClient::new(server.uri())),
            ModelSelection::default(),
        );

        let brief = agent.invoke(&context()).await.unwrap();
        assert_eq!(brief.key_findings, vec!["Delivery penetration is low"]);
        assert_eq!(brief.market_context, "Growing market");
    }

    #[tokio::test]
    async fn test_gateway_failure_attributed_to_research() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let agent = ResearchAgent::new(
            Arc::new(GatewayClient::new(server.uri())),
            ModelSelection::default(),
        );

        let error = agent.invoke(&context()).await.unwrap_err();
        assert_eq!(error.stage, Stage::Research);
        assert!(error.message.contains("500"));
    }
}
