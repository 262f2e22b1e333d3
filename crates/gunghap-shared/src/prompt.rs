//! Prompt construction for the compatibility report.
//!
//! The system instruction is fixed per topic; the user turn always renders
//! every field, substituting `미상` for anything the caller left out.

use crate::report::Facet;
use crate::request::{PersonInput, ReportInput, Topic};

/// Placeholder for optional fields the caller did not supply
pub const UNKNOWN_PLACEHOLDER: &str = "미상";

const BASE_INSTRUCTION: &str = "\
당신은 사주, MBTI, 혈액형을 종합해 커플 궁합을 풀어주는 연애 상담가입니다.
말투는 따뜻하고 구체적으로, 단정적인 예언이나 공포를 조장하는 표현은 피하세요.
과학적 근거가 없는 해석은 가볍고 재미있게 전달하고, 두 사람 모두를 존중하세요.
반드시 아래 JSON 형식 하나만 출력하세요. 코드 블록이나 설명 문장을 붙이지 마세요.";

const JSON_SHAPE: &str = r#"{
  "score": 30~98 사이 정수 (종합 궁합 점수),
  "facets": {
    "emotion": 0~100 정수,
    "communication": 0~100 정수,
    "realism": 0~100 정수,
    "growth": 0~100 정수,
    "sustainability": 0~100 정수
  },
  "summary": "400자 이내 종합 해설",
  "insights": ["조언 1", "조언 2", "조언 3"],
  "one_liner": "80자 이내 한 줄 요약",
  "explanation": {
    "emotion": "감정 점수 해설",
    "communication": "소통 점수 해설",
    "realism": "현실 점수 해설",
    "growth": "성장 점수 해설",
    "sustainability": "지속 점수 해설"
  }
}"#;

fn topic_instruction(topic: Topic) -> &'static str {
    match topic {
        Topic::Basic => "주제: 기본 궁합. 두 사람의 전반적인 조화와 강점, 주의할 점을 균형 있게 다루세요.",
        Topic::RedLine => "주제: 레드라인. 두 사람이 서로 넘지 말아야 할 선과 갈등이 커지는 상황, 그때의 대처법을 중심으로 다루세요.",
        Topic::LuckyColor => "주제: 행운의 컬러. 두 사람에게 어울리는 색과 데이트 분위기, 그 색이 관계에 주는 기운을 중심으로 다루세요.",
    }
}

/// System instruction plus user payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Both parts as a single text block
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or(UNKNOWN_PLACEHOLDER)
}

fn person_block(title: &str, person: &PersonInput) -> String {
    let blood = person
        .blood
        .map(|b| b.to_string())
        .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string());
    format!(
        "[{}]\n- 생년월일: {}\n- 태어난 시간: {}\n- MBTI: {}\n- 혈액형: {}",
        title,
        person.birth_date,
        or_unknown(person.birth_time.as_deref()),
        person.mbti,
        blood,
    )
}

/// Build the prompt for a validated request
pub fn build_prompt(input: &ReportInput) -> Prompt {
    let facet_labels = Facet::ALL
        .iter()
        .map(|f| format!("{}({})", f.key(), f.label()))
        .collect::<Vec<_>>()
        .join(", ");

    let system = format!(
        "{}\n{}\n세부 항목: {}\n\n출력 형식:\n{}",
        BASE_INSTRUCTION,
        topic_instruction(input.topic),
        facet_labels,
        JSON_SHAPE,
    );

    let user = format!(
        "{}\n\n{}\n\n위 두 사람의 궁합 리포트를 JSON으로 작성해 주세요.",
        person_block("남자", &input.man),
        person_block("여자", &input.woman),
    );

    Prompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{BloodType, ReportRequest};

    fn required_only() -> ReportInput {
        ReportRequest {
            man_birth: Some("1990-03-14".into()),
            woman_birth: Some("1992-11-02".into()),
            man_mbti: Some("INTJ".into()),
            woman_mbti: Some("ENFP".into()),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_unknown_placeholders_for_missing_optionals() {
        let prompt = build_prompt(&required_only());
        // Two times and two blood types, all unknown
        assert_eq!(prompt.user.matches(UNKNOWN_PLACEHOLDER).count(), 4);
        assert!(prompt.user.contains("- 태어난 시간: 미상"));
        assert!(prompt.user.contains("- 혈액형: 미상"));
        assert!(prompt.user.contains("1990-03-14"));
        assert!(prompt.user.contains("ENFP"));
    }

    #[test]
    fn test_supplied_optionals_rendered() {
        let mut input = required_only();
        input.man.birth_time = Some("07:30".into());
        input.woman.blood = Some(BloodType::AB);
        let prompt = build_prompt(&input);
        assert!(prompt.user.contains("- 태어난 시간: 07:30"));
        assert!(prompt.user.contains("- 혈액형: AB형"));
        assert_eq!(prompt.user.matches(UNKNOWN_PLACEHOLDER).count(), 2);
    }

    #[test]
    fn test_system_names_every_field() {
        let prompt = build_prompt(&required_only());
        for key in ["score", "facets", "summary", "insights", "one_liner", "explanation"] {
            assert!(prompt.system.contains(key), "missing {}", key);
        }
        for facet in Facet::ALL {
            assert!(prompt.system.contains(facet.key()));
        }
    }

    #[test]
    fn test_topic_changes_framing() {
        let mut input = required_only();
        let basic = build_prompt(&input);
        input.topic = Topic::RedLine;
        let redline = build_prompt(&input);
        assert_ne!(basic.system, redline.system);
        assert!(redline.system.contains("레드라인"));
        assert_eq!(basic.user, redline.user);
    }

    #[test]
    fn test_combined_contains_both_parts() {
        let prompt = build_prompt(&required_only());
        let combined = prompt.combined();
        assert!(combined.starts_with(&prompt.system));
        assert!(combined.ends_with(&prompt.user));
    }
}
