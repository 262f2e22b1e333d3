//! Gemini `generateContent` client.
//!
//! One POST per call, bounded by the caller's timeout. The provider is asked
//! for JSON output at generation time; everything downstream still assumes
//! it may not comply.

use crate::config::ServiceConfig;
use crate::llm_trait::ModelClient;
use async_trait::async_trait;
use gunghap_shared::{Conversation, Prompt, ReportError};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Sampling options for report generation
const REPORT_TEMPERATURE: f64 = 0.9;
const TOP_P: f64 = 0.95;
const TOP_K: u32 = 40;
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Chat relay answers in free text
const CHAT_TEMPERATURE: f64 = 0.7;

/// Upstream error bodies are cut to this many chars before logging
const ERROR_BODY_PREVIEW: usize = 500;

pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client from the service config.
    ///
    /// Fails with `ReportError::Config` when no credential is configured.
    pub fn new(config: &ServiceConfig) -> Result<Self, ReportError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ReportError::Config("GEMINI_API_KEY is not set".into()))?;

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| ReportError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// POST a body and pull the candidate text out of the response
    async fn call(&self, body: &Value, timeout: Duration) -> Result<String, ReportError> {
        let start = Instant::now();
        info!("[>]  GEMINI CALL [{}] (timeout {}s)", self.model, timeout.as_secs());

        let attempt = async {
            let response = self
                .http_client
                .post(self.endpoint())
                .query(&[("key", self.api_key.as_str())])
                .timeout(timeout)
                .json(body)
                .send()
                .await
                .map_err(|e| map_transport_error(e, timeout))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                error!(
                    "[-]  Gemini error {}: {}",
                    status,
                    preview(&error_text, ERROR_BODY_PREVIEW)
                );
                return Err(ReportError::Upstream {
                    status: status.as_u16(),
                    body: error_text,
                });
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| map_transport_error(e, timeout))
        };

        // Dropping the future aborts the in-flight request
        let envelope = tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| ReportError::Timeout(timeout.as_secs()))??;

        let text = extract_candidate_text(&envelope);
        info!(
            "[<]  GEMINI RESPONSE ({} chars) in {:.2}s",
            text.chars().count(),
            start.elapsed().as_secs_f64()
        );
        debug!("Gemini text: {}", preview(&text, 1000));
        Ok(text)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &Prompt, timeout: Duration) -> Result<String, ReportError> {
        self.call(&report_request_body(prompt), timeout).await
    }

    async fn chat(
        &self,
        conversation: &Conversation,
        timeout: Duration,
    ) -> Result<String, ReportError> {
        self.call(&chat_request_body(conversation), timeout).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for a report: system instruction plus one user turn
pub fn report_request_body(prompt: &Prompt) -> Value {
    json!({
        "systemInstruction": { "parts": [ { "text": prompt.system } ] },
        "contents": [ { "role": "user", "parts": [ { "text": prompt.user } ] } ],
        "generationConfig": {
            "temperature": REPORT_TEMPERATURE,
            "topP": TOP_P,
            "topK": TOP_K,
            "maxOutputTokens": MAX_OUTPUT_TOKENS,
            "responseMimeType": "application/json"
        }
    })
}

/// Request body for the chat relay: history then the active turn
pub fn chat_request_body(conversation: &Conversation) -> Value {
    let contents: Vec<Value> = conversation
        .turns()
        .map(|turn| json!({ "role": turn.role.as_str(), "parts": [ { "text": turn.text } ] }))
        .collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": CHAT_TEMPERATURE,
            "topP": TOP_P,
            "topK": TOP_K,
            "maxOutputTokens": MAX_OUTPUT_TOKENS
        }
    });
    if let Some(system) = &conversation.system_instruction {
        body["systemInstruction"] = json!({ "parts": [ { "text": system } ] });
    }
    body
}

/// Text at `candidates[0].content.parts[*].text`, joined.
///
/// A missing path yields an empty string; the parser deals with it.
pub fn extract_candidate_text(envelope: &Value) -> String {
    envelope["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

/// reqwest errors carry the URL, which holds the key; strip it
fn map_transport_error(e: reqwest::Error, timeout: Duration) -> ReportError {
    if e.is_timeout() {
        ReportError::Timeout(timeout.as_secs())
    } else {
        ReportError::Network(e.without_url().to_string())
    }
}

fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
