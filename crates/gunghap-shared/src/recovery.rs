//! Two-tier JSON recovery for sanitized model text.

use crate::error::ReportError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

/// First opening brace through the final closing brace, greedy.
static BRACE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("brace block pattern is valid"));

/// Strict parse, then fall back to the outermost brace-delimited block.
///
/// The fallback recovers from conversational text placed before the object.
/// When the text holds several JSON-like blocks the greedy match spans all of
/// them and usually fails to parse.
pub fn recover_json(text: &str) -> Result<Value, ReportError> {
    let strict_err = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    debug!("Strict parse failed ({}), trying brace block", strict_err);

    let block = BRACE_BLOCK
        .find(text)
        .ok_or_else(|| ReportError::Parse(format!("no JSON object in model output: {}", strict_err)))?;

    serde_json::from_str::<Value>(block.as_str())
        .map_err(|e| ReportError::Parse(format!("brace block is not valid JSON: {}", e)))
}
