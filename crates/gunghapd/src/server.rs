//! HTTP server for gunghapd

use crate::config::ServiceConfig;
use crate::gemini::GeminiClient;
use crate::llm_trait::ModelClient;
use crate::routes;
use anyhow::{Context, Result};
use axum::http::Method;
use axum::Router;
use gunghap_shared::ReportError;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Maximum request body size: 64 KiB
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Application state shared across handlers. Immutable after startup.
pub struct AppState {
    pub config: ServiceConfig,
    /// None when no credential is configured
    pub client: Option<Arc<dyn ModelClient>>,
    pub start_time: Instant,
}

impl AppState {
    /// Build state with the Gemini client the config describes
    pub fn new(config: ServiceConfig) -> Result<Self, ReportError> {
        let client: Option<Arc<dyn ModelClient>> = match GeminiClient::new(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(ReportError::Config(msg)) if !config.has_credential() => {
                warn!("  {} - report and chat endpoints will answer 500", msg);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            config,
            client,
            start_time: Instant::now(),
        })
    }

    /// Build state around an existing client (tests, alternative providers)
    pub fn with_client(config: ServiceConfig, client: Arc<dyn ModelClient>) -> Self {
        Self {
            config,
            client: Some(client),
            start_time: Instant::now(),
        }
    }

    /// State with no client at all, as when the credential is missing
    pub fn without_client(config: ServiceConfig) -> Self {
        Self {
            config,
            client: None,
            start_time: Instant::now(),
        }
    }

    /// The model client, or a ConfigError when no credential is set
    pub fn require_client(&self) -> Result<&Arc<dyn ModelClient>, ReportError> {
        self.client
            .as_ref()
            .ok_or_else(|| ReportError::Config("서비스 인증 정보가 설정되지 않았습니다".into()))
    }
}

/// Router with every route and layer, ready to serve
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(routes::report_routes())
        .merge(routes::chat_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Run the HTTP server until Ctrl-C
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr.clone();
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("  Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("  Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
