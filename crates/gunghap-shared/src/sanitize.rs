//! Strips markdown fences and trailing prose from raw model text.

const FENCE: &str = "```";

/// Remove the most common contamination around a JSON object.
///
/// Trims, drops an opening fence (with optional language tag) and a
/// closing fence, then cuts everything after the last `}`. The result is not
/// guaranteed to be valid JSON.
pub fn sanitize_model_text(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(after_fence) = text.strip_prefix(FENCE) {
        // Language tag, if any, runs up to the first non-alphanumeric char
        text = after_fence.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }

    text = text.trim_end();
    if let Some(stripped) = text.strip_suffix(FENCE) {
        text = stripped;
    }

    if let Some(last_brace) = text.rfind('}') {
        text = &text[..=last_brace];
    }

    text.trim().to_string()
}
