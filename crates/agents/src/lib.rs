//! Agent adapters for the analysis pipeline.
//!
//! Every stage of an analysis run is carried out by an agent behind the
//! uniform [`Agent`] contract: build a prompt from the working context,
//! call the completion gateway, parse the typed stage output. Failures
//! surface as [`AdapterError`] naming the stage that broke.

mod agent;
mod clarifier;
mod context;
mod error;
mod gateway;
mod models;
mod parser;
mod prompts;
mod stages;

pub use agent::{Agent, AgentSet};
pub use clarifier::Clarifier;
pub use context::AgentContext;
pub use error::{AdapterError, Result};
pub use gateway::{CompletionRequest, GatewayClient, GatewayError};
pub use models::{ModelSelection, StageModels};
pub use parser::{extract_json_block, parse_stage_output};
pub use prompts::StagePrompts;
pub use stages::{AnalystAgent, RegulatoryAgent, ResearchAgent, SynthesizerAgent};
