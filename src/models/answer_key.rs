use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a choice as it appears in submissions and in the persisted
/// answer key. Question banks in circulation use either integer external ids
/// or single-letter choice keys; both normalize onto this one comparable
/// type, so scoring never cares which flavor produced the data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceId {
    Num(i64),
    Key(String),
}

impl ChoiceId {
    /// Numbers and numeric strings become `Num`; any other non-empty string
    /// becomes an uppercased `Key`. Everything else is not an identifier.
    pub fn normalize(value: &Value) -> Option<ChoiceId> {
        match value {
            Value::Number(n) => n.as_i64().map(ChoiceId::Num),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                match trimmed.parse::<i64>() {
                    Ok(n) => Some(ChoiceId::Num(n)),
                    Err(_) => Some(ChoiceId::Key(trimmed.to_uppercase())),
                }
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChoiceId::Num(n) => write!(f, "{}", n),
            ChoiceId::Key(k) => write!(f, "{}", k),
        }
    }
}

/// The canonical correct-answer set for one question, as read back from the
/// answer store. `choice_ids` is kept sorted so set comparison is a plain
/// slice equality.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectAnswer {
    pub choice_ids: Vec<ChoiceId>,
    pub description: Option<String>,
}

impl CorrectAnswer {
    pub fn new(mut choice_ids: Vec<ChoiceId>, description: Option<String>) -> Self {
        choice_ids.sort();
        Self {
            choice_ids,
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_numbers_and_numeric_strings() {
        assert_eq!(ChoiceId::normalize(&json!(7)), Some(ChoiceId::Num(7)));
        assert_eq!(ChoiceId::normalize(&json!("42")), Some(ChoiceId::Num(42)));
    }

    #[test]
    fn uppercases_letter_keys() {
        assert_eq!(
            ChoiceId::normalize(&json!("b")),
            Some(ChoiceId::Key("B".to_string()))
        );
    }

    #[test]
    fn rejects_blank_and_non_identifier_values() {
        assert_eq!(ChoiceId::normalize(&json!("  ")), None);
        assert_eq!(ChoiceId::normalize(&json!(null)), None);
        assert_eq!(ChoiceId::normalize(&json!(true)), None);
    }

    #[test]
    fn correct_answer_sorts_its_ids() {
        let ca = CorrectAnswer::new(vec![ChoiceId::Num(3), ChoiceId::Num(1)], None);
        assert_eq!(ca.choice_ids, vec![ChoiceId::Num(1), ChoiceId::Num(3)]);
    }
}
