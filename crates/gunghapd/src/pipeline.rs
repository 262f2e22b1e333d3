//! Report pipeline: prompt → model (with retry) → sanitize → recover → normalize.

use crate::llm_trait::ModelClient;
use crate::retry::generate_with_retry;
use gunghap_shared::{
    build_prompt, normalize_value, recover_json, sanitize_model_text, NormalizedReport,
    ReportError, ReportInput,
};
use std::time::Duration;
use tracing::{info, warn};

/// Produce a normalized report for an already validated request
pub async fn generate_report(
    client: &dyn ModelClient,
    input: &ReportInput,
    timeout: Duration,
) -> Result<NormalizedReport, ReportError> {
    let prompt = build_prompt(input);
    info!(
        "  Report [{}] {} x {}",
        input.topic.as_str(),
        input.man.mbti,
        input.woman.mbti
    );

    let raw = generate_with_retry(client, &prompt, timeout).await?;
    let clean = sanitize_model_text(&raw);

    let value = recover_json(&clean).map_err(|e| {
        warn!("[-]  Unrecoverable model output ({} chars): {}", raw.chars().count(), e);
        e
    })?;

    let report = normalize_value(&value);
    info!("  Report ready: score {}", report.score);
    Ok(report)
}
