//! Output normalizer: coerces untrusted model output into `NormalizedReport`.
//!
//! Never fails. Whatever parses as JSON comes out in bounds, falling back to
//! neutral defaults field by field.

use crate::report::{Facet, FacetExplanations, FacetScores, NormalizedReport, ParsedReport};
use serde_json::Value;

pub const SCORE_MIN: u32 = 30;
pub const SCORE_MAX: u32 = 98;
pub const DEFAULT_SCORE: f64 = 80.0;

pub const FACET_MIN: u32 = 0;
pub const FACET_MAX: u32 = 100;

pub const SUMMARY_MAX_CHARS: usize = 400;
pub const ONE_LINER_MAX_CHARS: usize = 80;
pub const MAX_INSIGHTS: usize = 3;

/// Normalize a parsed report into the UI contract
pub fn normalize(parsed: &ParsedReport) -> NormalizedReport {
    let score = bounded_score(parsed.score.as_ref(), DEFAULT_SCORE, SCORE_MIN, SCORE_MAX);

    let facets = FacetScores::from_fn(|facet| {
        bounded_score(
            parsed.facet(facet),
            f64::from(facet.default_score()),
            FACET_MIN,
            FACET_MAX,
        )
    });

    let insights = match parsed.insights.as_ref() {
        Some(Value::Array(items)) => items.iter().take(MAX_INSIGHTS).map(coerce_string).collect(),
        _ => Vec::new(),
    };

    let explanation = FacetExplanations::from_fn(|facet: Facet| {
        parsed.explanation_for(facet).map(coerce_string).unwrap_or_default()
    });

    NormalizedReport {
        score,
        facets,
        summary: truncate_chars(&optional_string(parsed.summary.as_ref()), SUMMARY_MAX_CHARS),
        insights,
        one_liner: truncate_chars(&optional_string(parsed.one_liner.as_ref()), ONE_LINER_MAX_CHARS),
        explanation,
    }
}

/// Normalize straight from a decoded JSON value
pub fn normalize_value(value: &Value) -> NormalizedReport {
    normalize(&ParsedReport::from_value(value))
}

/// Coerce to a number: JSON numbers, or strings holding a finite number
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn bounded_score(value: Option<&Value>, default: f64, min: u32, max: u32) -> u32 {
    let n = coerce_number(value).unwrap_or(default);
    n.round().clamp(f64::from(min), f64::from(max)) as u32
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn optional_string(value: Option<&Value>) -> String {
    value.map(coerce_string).unwrap_or_default()
}

/// Truncate on character boundaries
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_gets_defaults() {
        let report = normalize_value(&json!({}));
        assert_eq!(report.score, 80);
        assert_eq!(report.facets, FacetScores::default());
        assert_eq!(report.summary, "");
        assert!(report.insights.is_empty());
        assert_eq!(report.one_liner, "");
        assert_eq!(report.explanation, FacetExplanations::default());
    }

    #[test]
    fn test_score_is_clamped_and_rounded() {
        assert_eq!(normalize_value(&json!({"score": 150})).score, 98);
        assert_eq!(normalize_value(&json!({"score": -4})).score, 30);
        assert_eq!(normalize_value(&json!({"score": 87.6})).score, 88);
        assert_eq!(normalize_value(&json!({"score": "91"})).score, 91);
        assert_eq!(normalize_value(&json!({"score": "high"})).score, 80);
        assert_eq!(normalize_value(&json!({"score": true})).score, 80);
    }

    #[test]
    fn test_facets_are_clamped_with_per_facet_defaults() {
        let report = normalize_value(&json!({
            "facets": {"emotion": 120, "communication": -1, "realism": "n/a", "vibe": 50}
        }));
        assert_eq!(report.facets.emotion, 100);
        assert_eq!(report.facets.communication, 0);
        assert_eq!(report.facets.realism, Facet::Realism.default_score());
        assert_eq!(report.facets.growth, Facet::Growth.default_score());
        assert_eq!(report.facets.sustainability, Facet::Sustainability.default_score());
    }

    #[test]
    fn test_summary_and_one_liner_truncated_by_chars() {
        let long_korean = "궁".repeat(500);
        let report = normalize_value(&json!({
            "summary": long_korean,
            "one_liner": "가".repeat(100),
        }));
        assert_eq!(report.summary.chars().count(), SUMMARY_MAX_CHARS);
        assert_eq!(report.one_liner.chars().count(), ONE_LINER_MAX_CHARS);
    }

    #[test]
    fn test_summary_coerces_non_strings() {
        assert_eq!(normalize_value(&json!({"summary": 42})).summary, "42");
        assert_eq!(normalize_value(&json!({"summary": null})).summary, "");
    }

    #[test]
    fn test_insights_take_first_three() {
        let report = normalize_value(&json!({"insights": ["a", 2, null, "d", "e"]}));
        assert_eq!(report.insights, vec!["a", "2", ""]);

        let report = normalize_value(&json!({"insights": "not a list"}));
        assert!(report.insights.is_empty());
    }

    #[test]
    fn test_explanation_keeps_only_known_facets() {
        let report = normalize_value(&json!({
            "explanation": {"emotion": "따뜻함", "growth": 3, "luck": "drop me"}
        }));
        assert_eq!(report.explanation.emotion, "따뜻함");
        assert_eq!(report.explanation.growth, "3");
        assert_eq!(report.explanation.communication, "");
        let v = serde_json::to_value(&report.explanation).unwrap();
        assert!(v.get("luck").is_none());
    }

    #[test]
    fn test_alias_collision_does_not_reset_report() {
        let report = normalize_value(&json!({
            "score": 91,
            "total": 90,
            "facets": {"emotion": 99},
            "summary": "잘 맞는 한 쌍",
            "insights": ["a", "b"],
            "one_liner": "찰떡궁합"
        }));
        assert_eq!(report.score, 91);
        assert_eq!(report.facets.emotion, 99);
        assert_eq!(report.summary, "잘 맞는 한 쌍");
        assert_eq!(report.insights, vec!["a", "b"]);
        assert_eq!(report.one_liner, "찰떡궁합");
    }

    #[test]
    fn test_non_object_input() {
        let report = normalize_value(&json!([1, 2, 3]));
        assert_eq!(report.score, 80);
        let report = normalize_value(&Value::Null);
        assert_eq!(report.facets, FacetScores::default());
    }

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
