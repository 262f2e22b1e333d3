//! Model client trait abstraction.
//!
//! Production code uses `GeminiClient`. Tests use `FakeModelClient` with
//! scripted responses, so orchestration and routes run without the network.

use async_trait::async_trait;
use gunghap_shared::{Conversation, Prompt, ReportError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Model Client Trait
// ============================================================================

/// One call to the external generation provider.
///
/// Implementations must give up once `timeout` elapses and report it as
/// `ReportError::Timeout`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a JSON-shaped report text for the prompt
    async fn generate(&self, prompt: &Prompt, timeout: Duration) -> Result<String, ReportError>;

    /// Relay a multi-turn conversation and return the reply text
    async fn chat(
        &self,
        conversation: &Conversation,
        timeout: Duration,
    ) -> Result<String, ReportError>;

    /// Model identifier reported back to callers
    fn model(&self) -> &str;
}

// ============================================================================
// Fake Model Client (Testing)
// ============================================================================

/// Scripted model client.
///
/// ## Example
///
/// ```rust,ignore
/// let fake = FakeModelClient::builder()
///     .generate_err(ReportError::Timeout(20))
///     .generate_ok(r#"{"score": 90}"#)
///     .build();
/// ```
pub struct FakeModelClient {
    generate_script: Mutex<VecDeque<Result<String, ReportError>>>,
    chat_script: Mutex<VecDeque<Result<String, ReportError>>>,
    generate_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    last_prompt: Mutex<Option<Prompt>>,
    last_conversation: Mutex<Option<Conversation>>,
    model: String,
}

impl FakeModelClient {
    pub fn builder() -> FakeModelClientBuilder {
        FakeModelClientBuilder::new()
    }

    /// Client that always answers `generate` with `text`
    pub fn answering(text: &str) -> Self {
        Self::builder().generate_ok(text).build()
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.generate_calls() + self.chat_calls()
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }

    pub fn last_conversation(&self) -> Option<Conversation> {
        self.last_conversation.lock().ok().and_then(|c| c.clone())
    }

    /// Pop the next scripted result; the last one repeats once the script runs dry
    fn next(script: &Mutex<VecDeque<Result<String, ReportError>>>) -> Result<String, ReportError> {
        let mut script = script.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.unwrap_or_else(|| Err(ReportError::Network("fake client has no scripted response".into())))
    }
}

#[async_trait]
impl ModelClient for FakeModelClient {
    async fn generate(&self, prompt: &Prompt, _timeout: Duration) -> Result<String, ReportError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.clone());
        }
        Self::next(&self.generate_script)
    }

    async fn chat(
        &self,
        conversation: &Conversation,
        _timeout: Duration,
    ) -> Result<String, ReportError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_conversation.lock() {
            *last = Some(conversation.clone());
        }
        Self::next(&self.chat_script)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Builder for `FakeModelClient`
pub struct FakeModelClientBuilder {
    generate_script: VecDeque<Result<String, ReportError>>,
    chat_script: VecDeque<Result<String, ReportError>>,
    model: String,
}

impl FakeModelClientBuilder {
    pub fn new() -> Self {
        Self {
            generate_script: VecDeque::new(),
            chat_script: VecDeque::new(),
            model: "fake-model".to_string(),
        }
    }

    pub fn generate_ok(mut self, text: &str) -> Self {
        self.generate_script.push_back(Ok(text.to_string()));
        self
    }

    pub fn generate_err(mut self, err: ReportError) -> Self {
        self.generate_script.push_back(Err(err));
        self
    }

    pub fn chat_ok(mut self, text: &str) -> Self {
        self.chat_script.push_back(Ok(text.to_string()));
        self
    }

    pub fn chat_err(mut self, err: ReportError) -> Self {
        self.chat_script.push_back(Err(err));
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn build(self) -> FakeModelClient {
        FakeModelClient {
            generate_script: Mutex::new(self.generate_script),
            chat_script: Mutex::new(self.chat_script),
            generate_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_conversation: Mutex::new(None),
            model: self.model,
        }
    }
}

impl Default for FakeModelClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt {
            system: "sys".into(),
            user: "user".into(),
        }
    }

    #[tokio::test]
    async fn test_script_order_and_repeat() {
        let fake = FakeModelClient::builder()
            .generate_err(ReportError::Timeout(20))
            .generate_ok("second")
            .build();
        let timeout = Duration::from_secs(1);

        assert!(fake.generate(&prompt(), timeout).await.is_err());
        assert_eq!(fake.generate(&prompt(), timeout).await.unwrap(), "second");
        assert_eq!(fake.generate(&prompt(), timeout).await.unwrap(), "second");
        assert_eq!(fake.generate_calls(), 3);
        assert_eq!(fake.last_prompt(), Some(prompt()));
    }

    #[tokio::test]
    async fn test_empty_script_errors() {
        let fake = FakeModelClient::builder().build();
        let result = fake.generate(&prompt(), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ReportError::Network(_))));
        assert_eq!(fake.chat_calls(), 0);
    }
}
