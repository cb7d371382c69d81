//! Extraction of structured output from agent responses.
//!
//! Models are told to answer with a bare JSON object but routinely wrap
//! it in markdown fences or surround it with prose. The parser accepts
//! all three shapes.

use consilium_core::Stage;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::AdapterError;

/// Extract the JSON object from a response. Checks for a fenced json
/// block first, then falls back to the outermost brace pair.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let fence = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("invalid fence pattern");

    if let Some(captures) = fence.captures(text) {
        if let Some(block) = captures.get(1) {
            return Some(block.as_str());
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Parse the typed output of a stage out of raw response text. Missing
/// or malformed JSON fails with an error attributed to that stage.
pub fn parse_stage_output<T: DeserializeOwned>(stage: Stage, text: &str) -> Result<T, AdapterError> {
    let block = extract_json_block(text)
        .ok_or_else(|| AdapterError::new(stage, "no JSON object in agent response"))?;

    serde_json::from_str(block)
        .map_err(|e| AdapterError::new(stage, format!("malformed agent response: {e}")))
}
