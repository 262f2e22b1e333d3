//! Report shapes: the untrusted model output and the normalized UI contract.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One of the five fixed sub-scores composing the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Emotion,
    Communication,
    Realism,
    Growth,
    Sustainability,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Facet::Emotion,
        Facet::Communication,
        Facet::Realism,
        Facet::Growth,
        Facet::Sustainability,
    ];

    /// JSON key used both in the prompt and in the response
    pub fn key(&self) -> &'static str {
        match self {
            Facet::Emotion => "emotion",
            Facet::Communication => "communication",
            Facet::Realism => "realism",
            Facet::Growth => "growth",
            Facet::Sustainability => "sustainability",
        }
    }

    /// Korean display label, as shown to the model
    pub fn label(&self) -> &'static str {
        match self {
            Facet::Emotion => "감정",
            Facet::Communication => "소통",
            Facet::Realism => "현실",
            Facet::Growth => "성장",
            Facet::Sustainability => "지속",
        }
    }

    /// Neutral baseline used when the model omits this facet
    pub fn default_score(&self) -> u32 {
        match self {
            Facet::Emotion => 82,
            Facet::Communication => 76,
            Facet::Realism => 70,
            Facet::Growth => 78,
            Facet::Sustainability => 74,
        }
    }
}

/// Model output before normalization.
///
/// Each field is kept as raw JSON so the normalizer decides every coercion.
/// `null` and absent are the same thing here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReport {
    pub score: Option<Value>,
    pub facets: Option<Value>,
    pub summary: Option<Value>,
    pub insights: Option<Value>,
    pub one_liner: Option<Value>,
    pub explanation: Option<Value>,
}

/// Accepted keys per field, canonical name first
const SCORE_KEYS: &[&str] = &["score", "total", "total_score"];
const FACETS_KEYS: &[&str] = &["facets", "scores"];
const SUMMARY_KEYS: &[&str] = &["summary"];
const INSIGHTS_KEYS: &[&str] = &["insights", "tips"];
const ONE_LINER_KEYS: &[&str] = &["one_liner", "oneLiner", "one_line"];
const EXPLANATION_KEYS: &[&str] = &["explanation", "explain", "explanations"];

/// First non-null value under any of `keys`
fn pick(map: &Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
        .cloned()
}

impl ParsedReport {
    /// Read the known fields out of any JSON value.
    ///
    /// Fields are looked up independently, so a malformed or duplicated key
    /// never affects the others. Non-objects yield an empty report, which
    /// normalizes to all defaults.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            tracing::debug!("Model output is not an object, using defaults");
            return Self::default();
        };

        Self {
            score: pick(map, SCORE_KEYS),
            facets: pick(map, FACETS_KEYS),
            summary: pick(map, SUMMARY_KEYS),
            insights: pick(map, INSIGHTS_KEYS),
            one_liner: pick(map, ONE_LINER_KEYS),
            explanation: pick(map, EXPLANATION_KEYS),
        }
    }

    /// Raw value for a facet inside the `facets` object
    pub fn facet(&self, facet: Facet) -> Option<&Value> {
        self.facets.as_ref().and_then(|f| f.get(facet.key()))
    }

    /// Raw explanation for a facet inside the `explanation` object
    pub fn explanation_for(&self, facet: Facet) -> Option<&Value> {
        self.explanation.as_ref().and_then(|e| e.get(facet.key()))
    }
}

/// Five facet scores, each in [0, 100]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetScores {
    pub emotion: u32,
    pub communication: u32,
    pub realism: u32,
    pub growth: u32,
    pub sustainability: u32,
}

impl FacetScores {
    pub fn get(&self, facet: Facet) -> u32 {
        match facet {
            Facet::Emotion => self.emotion,
            Facet::Communication => self.communication,
            Facet::Realism => self.realism,
            Facet::Growth => self.growth,
            Facet::Sustainability => self.sustainability,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Facet) -> u32) -> Self {
        Self {
            emotion: f(Facet::Emotion),
            communication: f(Facet::Communication),
            realism: f(Facet::Realism),
            growth: f(Facet::Growth),
            sustainability: f(Facet::Sustainability),
        }
    }
}

impl Default for FacetScores {
    fn default() -> Self {
        Self::from_fn(|facet| facet.default_score())
    }
}

/// One explanation string per facet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetExplanations {
    pub emotion: String,
    pub communication: String,
    pub realism: String,
    pub growth: String,
    pub sustainability: String,
}

impl FacetExplanations {
    pub fn get(&self, facet: Facet) -> &str {
        match facet {
            Facet::Emotion => &self.emotion,
            Facet::Communication => &self.communication,
            Facet::Realism => &self.realism,
            Facet::Growth => &self.growth,
            Facet::Sustainability => &self.sustainability,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Facet) -> String) -> Self {
        Self {
            emotion: f(Facet::Emotion),
            communication: f(Facet::Communication),
            realism: f(Facet::Realism),
            growth: f(Facet::Growth),
            sustainability: f(Facet::Sustainability),
        }
    }
}

/// The payload returned to the browser UI.
///
/// Every field is always present and within bounds; see `normalize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReport {
    pub score: u32,
    pub facets: FacetScores,
    pub summary: String,
    pub insights: Vec<String>,
    pub one_liner: String,
    pub explanation: FacetExplanations,
}
