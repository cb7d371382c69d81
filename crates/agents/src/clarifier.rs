//! Pre-submission clarification helper.
//!
//! One gateway call that proposes the single most useful clarifying
//! question for a prospective request. Best-effort: when the gateway
//! misbehaves the caller still gets a usable canned question.

use std::sync::Arc;

use consilium_core::AnalysisRequest;
use tracing::warn;

use crate::gateway::{CompletionRequest, GatewayClient};
use crate::models::ModelSelection;
use crate::prompts::StagePrompts;

const SYSTEM: &str = "You help scope strategic analyses. Ask exactly one short clarifying question.";

const FALLBACK_QUESTION: &str =
    "What timeline and investment budget should the analysis assume for this move?";

pub struct Clarifier {
    gateway: Arc<GatewayClient>,
    model: ModelSelection,
}

impl Clarifier {
    pub fn new(gateway: Arc<GatewayClient>, model: ModelSelection) -> Self {
        Self { gateway, model }
    }

    pub async fn clarify(&self, request: &AnalysisRequest) -> String {
        let prompt = StagePrompts::clarify(request);
        let completion = CompletionRequest::new(self.model.qualified(), SYSTEM, &prompt)
            .with_temperature(0.7);

        match self.gateway.complete(&completion).await {
            Ok(text) => first_question(&text).unwrap_or_else(|| FALLBACK_QUESTION.to_string()),
            Err(e) => {
                warn!(error = %e, "Clarification call failed, using fallback question");
                FALLBACK_QUESTION.to_string()
            }
        }
    }
}

fn first_question(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_matches('"').to_string())
}
