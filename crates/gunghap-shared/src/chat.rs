//! OpenAI-style chat relay types and their mapping to provider turns.

use crate::error::ReportError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    /// Anything else (tool, function, ...) is relayed as a user turn
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    /// Plain text. A missing or `null` content reads as empty, and an
    /// array of content parts is flattened to its text parts.
    #[serde(default, deserialize_with = "content_text")]
    pub content: String,
}

fn content_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(s) => Some(s.as_str()),
                Value::Object(_) => part.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => other.to_string(),
    };
    Ok(text)
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Inbound body of the chat relay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    /// Accepted for client compatibility but not used: replies always come
    /// from the configured model.
    #[serde(default)]
    pub model: Option<String>,
}

/// Speaker of a provider conversational turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

/// Messages mapped into the provider's turn format.
///
/// System messages are folded into one system instruction. The last
/// remaining message is the active turn, everything before it is history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub system_instruction: Option<String>,
    pub history: Vec<ConversationTurn>,
    pub active: ConversationTurn,
}

impl Conversation {
    pub fn from_messages(messages: &[ChatMessage]) -> Result<Self, ReportError> {
        let mut system_parts = Vec::new();
        let mut turns = Vec::with_capacity(messages.len());

        for message in messages {
            let role = match message.role {
                ChatRole::System => {
                    system_parts.push(message.content.as_str());
                    continue;
                }
                ChatRole::Assistant => TurnRole::Model,
                ChatRole::User | ChatRole::Other => TurnRole::User,
            };
            turns.push(ConversationTurn {
                role,
                text: message.content.clone(),
            });
        }

        let active = turns
            .pop()
            .ok_or_else(|| ReportError::Validation("messages must include a non-system message".into()))?;

        Ok(Self {
            system_instruction: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
            history: turns,
            active,
        })
    }

    /// History followed by the active turn, in send order
    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.history.iter().chain(std::iter::once(&self.active))
    }
}

impl ChatCompletionRequest {
    /// Reject a missing or empty message list
    pub fn validate(&self) -> Result<Conversation, ReportError> {
        match self.messages.as_deref() {
            None | Some([]) => Err(ReportError::Validation("messages is required".into())),
            Some(messages) => Conversation::from_messages(messages),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// OpenAI chat-completion envelope with a single choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: ChatUsage,
}

impl ChatCompletionResponse {
    pub fn new(model: &str, content: String) -> Self {
        Self {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
            object: "chat.completion".to_string(),
            created: chrono::Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage::new(ChatRole::Assistant, content),
                finish_reason: "stop".to_string(),
            }],
            usage: ChatUsage::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_mapping_and_split() {
        let messages = vec![
            ChatMessage::new(ChatRole::System, "be nice"),
            ChatMessage::new(ChatRole::User, "hi"),
            ChatMessage::new(ChatRole::Assistant, "hello"),
            ChatMessage::new(ChatRole::User, "how are we?"),
        ];
        let conv = Conversation::from_messages(&messages).unwrap();
        assert_eq!(conv.system_instruction.as_deref(), Some("be nice"));
        assert_eq!(conv.history.len(), 2);
        assert_eq!(conv.history[1].role, TurnRole::Model);
        assert_eq!(conv.active.text, "how are we?");
        assert_eq!(conv.turns().count(), 3);
    }

    #[test]
    fn test_unknown_role_deserializes_as_other() {
        let msg: ChatMessage = serde_json::from_str(r#"{"role":"tool","content":"x"}"#).unwrap();
        assert_eq!(msg.role, ChatRole::Other);
    }

    #[test]
    fn test_empty_messages_rejected() {
        let req = ChatCompletionRequest {
            messages: Some(vec![]),
            model: None,
        };
        assert!(matches!(req.validate(), Err(ReportError::Validation(_))));
        assert!(ChatCompletionRequest::default().validate().is_err());
    }

    #[test]
    fn test_null_and_missing_content_read_as_empty() {
        let msg: ChatMessage = serde_json::from_str(r#"{"role":"assistant","content":null}"#).unwrap();
        assert_eq!(msg.content, "");
        let msg: ChatMessage = serde_json::from_str(r#"{"role":"user"}"#).unwrap();
        assert_eq!(msg.content, "");
    }

    #[test]
    fn test_content_parts_flattened_to_text() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{"role":"user","content":[
                {"type":"text","text":"첫 줄"},
                {"type":"image_url","image_url":{"url":"https://example.com/a.png"}},
                {"type":"text","text":"둘째 줄"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(msg.content, "첫 줄\n둘째 줄");
    }

    #[test]
    fn test_model_field_is_optional() {
        let req: ChatCompletionRequest =
            serde_json::from_str(r#"{"model":"gpt-4o","messages":[{"role":"user","content":"hi"}]}"#)
                .unwrap();
        assert_eq!(req.model.as_deref(), Some("gpt-4o"));
        assert_eq!(req.validate().unwrap().active.text, "hi");
    }

    #[test]
    fn test_only_system_messages_rejected() {
        let messages = vec![ChatMessage::new(ChatRole::System, "rules")];
        assert!(Conversation::from_messages(&messages).is_err());
    }

    #[test]
    fn test_response_envelope() {
        let resp = ChatCompletionResponse::new("gemini-2.0-flash", "안녕".into());
        assert!(resp.id.starts_with("chatcmpl-"));
        assert_eq!(resp.object, "chat.completion");
        assert_eq!(resp.choices.len(), 1);
        assert_eq!(resp.choices[0].message.role, ChatRole::Assistant);
        assert_eq!(resp.usage.total_tokens, 0);
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["choices"][0]["message"]["role"], "assistant");
    }
}
