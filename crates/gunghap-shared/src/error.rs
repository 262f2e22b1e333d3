//! Error types for the report pipeline.

use thiserror::Error;

/// Detail sent to clients when the model output cannot be recovered.
pub const PARSE_FAILURE_DETAIL: &str = "응답을 해석하지 못했습니다";

/// Detail sent to clients for upstream failures.
pub const UPSTREAM_FAILURE_DETAIL: &str = "리포트 생성 서비스에 연결하지 못했습니다";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream did not respond within {0}s")]
    Timeout(u64),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ReportError {
    /// HTTP status code this error surfaces as.
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::Validation(_) => 400,
            ReportError::Config(_)
            | ReportError::Upstream { .. }
            | ReportError::Network(_)
            | ReportError::Timeout(_)
            | ReportError::Parse(_) => 500,
        }
    }

    /// Short message that is safe to return to the client.
    ///
    /// Upstream bodies and raw model text stay server side.
    pub fn public_detail(&self) -> String {
        match self {
            ReportError::Config(msg) | ReportError::Validation(msg) => msg.clone(),
            ReportError::Upstream { status, .. } => {
                format!("{} (HTTP {})", UPSTREAM_FAILURE_DETAIL, status)
            }
            ReportError::Network(_) | ReportError::Timeout(_) => {
                UPSTREAM_FAILURE_DETAIL.to_string()
            }
            ReportError::Parse(_) => PARSE_FAILURE_DETAIL.to_string(),
        }
    }
}
