//! Report request as it arrives on the wire, and its validated form.
//!
//! Every wire field is optional so that a missing required field surfaces as a
//! `ReportError::Validation` (HTTP 400) rather than a deserialization failure.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Blood type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodType {
    A,
    B,
    O,
    AB,
}

impl BloodType {
    /// Parse case-insensitively; anything outside A/B/O/AB is unknown.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(BloodType::A),
            "B" => Some(BloodType::B),
            "O" => Some(BloodType::O),
            "AB" => Some(BloodType::AB),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::A => "A",
            BloodType::B => "B",
            BloodType::O => "O",
            BloodType::AB => "AB",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}형", self.as_str())
    }
}

/// Report variant selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topic {
    /// General compatibility report
    #[default]
    Basic,
    /// Boundaries and red lines in the relationship
    RedLine,
    /// Lucky colour and mood for the couple
    LuckyColor,
}

impl Topic {
    /// Unknown or absent topics select the basic report.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("redline") | Some("red-line") | Some("red_line") => Topic::RedLine,
            Some("lucky-color") | Some("lucky_color") | Some("luckycolor") => Topic::LuckyColor,
            _ => Topic::Basic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Basic => "basic",
            Topic::RedLine => "redline",
            Topic::LuckyColor => "lucky-color",
        }
    }
}

/// Inbound JSON body of `POST /api/report`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub man_birth: Option<String>,
    #[serde(default)]
    pub woman_birth: Option<String>,
    #[serde(default)]
    pub man_mbti: Option<String>,
    #[serde(default)]
    pub woman_mbti: Option<String>,
    #[serde(default)]
    pub man_blood: Option<String>,
    #[serde(default)]
    pub woman_blood: Option<String>,
    #[serde(default)]
    pub man_time: Option<String>,
    #[serde(default)]
    pub woman_time: Option<String>,
}

/// One person's validated inputs
#[derive(Debug, Clone, PartialEq)]
pub struct PersonInput {
    pub birth_date: String,
    pub birth_time: Option<String>,
    pub mbti: String,
    pub blood: Option<BloodType>,
}

/// Validated request, ready for prompt construction
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInput {
    pub topic: Topic,
    pub man: PersonInput,
    pub woman: PersonInput,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ReportRequest {
    /// Check required fields and collect the validated input.
    ///
    /// Both birth dates and both MBTI codes must be non-blank.
    pub fn validate(&self) -> Result<ReportInput, ReportError> {
        let mut missing = Vec::new();
        let man_birth = present(&self.man_birth);
        let woman_birth = present(&self.woman_birth);
        let man_mbti = present(&self.man_mbti);
        let woman_mbti = present(&self.woman_mbti);

        if man_birth.is_none() {
            missing.push("man_birth");
        }
        if woman_birth.is_none() {
            missing.push("woman_birth");
        }
        if man_mbti.is_none() {
            missing.push("man_mbti");
        }
        if woman_mbti.is_none() {
            missing.push("woman_mbti");
        }

        match (man_birth, woman_birth, man_mbti, woman_mbti) {
            (Some(man_birth), Some(woman_birth), Some(man_mbti), Some(woman_mbti)) => {
                Ok(ReportInput {
                    topic: Topic::parse(self.topic.as_deref()),
                    man: PersonInput {
                        birth_date: man_birth,
                        birth_time: present(&self.man_time),
                        mbti: man_mbti.to_ascii_uppercase(),
                        blood: self.man_blood.as_deref().and_then(BloodType::parse),
                    },
                    woman: PersonInput {
                        birth_date: woman_birth,
                        birth_time: present(&self.woman_time),
                        mbti: woman_mbti.to_ascii_uppercase(),
                        blood: self.woman_blood.as_deref().and_then(BloodType::parse),
                    },
                })
            }
            _ => Err(ReportError::Validation(format!(
                "필수 항목이 누락되었습니다: {}",
                missing.join(", ")
            ))),
        }
    }
}
