//! gunghapd library - exposes modules for testing.

pub mod config;
pub mod gemini;
pub mod llm_trait;
pub mod pipeline;
pub mod retry;
pub mod routes;
pub mod server;

pub use config::ServiceConfig;
pub use llm_trait::{FakeModelClient, FakeModelClientBuilder, ModelClient};
pub use server::{build_router, AppState, MAX_BODY_SIZE};
