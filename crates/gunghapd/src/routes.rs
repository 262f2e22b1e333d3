//! API routes for gunghapd
//!
//! - `POST /api/report`: compatibility report
//! - `POST /api/chat`, `POST /v1/chat/completions`: chat relay
//! - `GET /api/health`: liveness and configuration summary

use crate::pipeline::generate_report;
use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gunghap_shared::{
    ChatCompletionRequest, ChatCompletionResponse, NormalizedReport, ReportError, ReportRequest,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Error Envelope
// ============================================================================

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: bool,
    pub detail: String,
}

/// A `ReportError` on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub ReportError);

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ReportError::Validation(format!(
            "요청 본문을 읽지 못했습니다: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Full detail stays in the server log
        if status.is_server_error() {
            error!("  Request failed: {}", self.0);
        } else {
            warn!("  Request rejected: {}", self.0);
        }

        let body = ErrorBody {
            error: true,
            detail: self.0.public_detail(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Report Routes
// ============================================================================

pub fn report_routes() -> Router<AppStateArc> {
    Router::new().route("/api/report", post(create_report))
}

async fn create_report(
    State(state): State<AppStateArc>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<NormalizedReport>, ApiError> {
    let Json(req) = payload?;
    let input = req.validate()?;
    let client = state.require_client()?;

    let report = generate_report(client.as_ref(), &input, state.config.request_timeout()).await?;
    Ok(Json(report))
}

// ============================================================================
// Chat Relay Routes
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/chat", post(chat_completion))
        .route("/v1/chat/completions", post(chat_completion))
}

async fn chat_completion(
    State(state): State<AppStateArc>,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Json<ChatCompletionResponse>, ApiError> {
    let Json(req) = payload?;
    let conversation = req.validate()?;
    let client = state.require_client()?;

    info!(
        "  Chat relay: {} history turns",
        conversation.history.len()
    );
    let text = client
        .chat(&conversation, state.config.request_timeout())
        .await?;

    Ok(Json(ChatCompletionResponse::new(client.model(), text)))
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: String,
    pub credential_configured: bool,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/api/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: state.config.model.clone(),
        credential_configured: state.client.is_some(),
    })
}
