//! Shared types and pure logic for the gunghap report service.
//!
//! Everything here is free of I/O: request validation, prompt construction,
//! model-output repair and the normalizer that produces the UI contract.

pub mod chat;
pub mod error;
pub mod normalize;
pub mod prompt;
pub mod recovery;
pub mod report;
pub mod request;
pub mod sanitize;

pub use chat::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole, Conversation,
    ConversationTurn, TurnRole,
};
pub use error::ReportError;
pub use normalize::{normalize, normalize_value};
pub use prompt::{build_prompt, Prompt, UNKNOWN_PLACEHOLDER};
pub use recovery::recover_json;
pub use report::{Facet, FacetExplanations, FacetScores, NormalizedReport, ParsedReport};
pub use request::{BloodType, PersonInput, ReportInput, ReportRequest, Topic};
pub use sanitize::sanitize_model_text;
