//! Single blind retry around the model client.
//!
//! Two back-to-back attempts, each with its own timeout window. The second
//! starts only after the first has fully failed. No backoff.

use crate::llm_trait::ModelClient;
use gunghap_shared::{Prompt, ReportError};
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Run `op` once, and once more if it fails
pub async fn retry_once<T, F, Fut>(label: &str, mut op: F) -> Result<T, ReportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ReportError>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(first) => {
            warn!("[!]  {} attempt 1 failed: {}; retrying once", label, first);
            op().await.map_err(|second| {
                error!("[-]  {} attempt 2 failed: {}", label, second);
                second
            })
        }
    }
}

/// Generate with one retry, each attempt bounded by `timeout`
pub async fn generate_with_retry(
    client: &dyn ModelClient,
    prompt: &Prompt,
    timeout: Duration,
) -> Result<String, ReportError> {
    retry_once("generate", move || client.generate(prompt, timeout)).await
}
