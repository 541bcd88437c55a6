use crate::models::answer_key::ChoiceId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One answered question of an attempt. `answers` is the raw submitted
/// value: a single identifier or a list of identifiers, exactly as the
/// calling application stored it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub question_id: i64,
    #[serde(default)]
    pub answers: Value,
}

impl Submission {
    /// Array-wraps the submitted value and normalizes it into a sorted set,
    /// so `["C","A"]` and `["A","C"]` compare equal and a scalar behaves as
    /// a one-element set.
    pub fn normalized_answers(&self) -> Vec<ChoiceId> {
        let mut ids: Vec<ChoiceId> = match &self.answers {
            Value::Array(items) => items.iter().filter_map(ChoiceId::normalize).collect(),
            Value::Null => Vec::new(),
            other => ChoiceId::normalize(other).into_iter().collect(),
        };
        ids.sort();
        ids
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringDetail {
    pub question_id: i64,
    pub correct: bool,
    pub user_answers: Vec<ChoiceId>,
    pub correct_answers: Vec<ChoiceId>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub score: i32,
    pub total: i32,
    pub details: Vec<ScoringDetail>,
}

impl ScoreReport {
    pub fn passed(&self, number_pass: i32) -> bool {
        self.score >= number_pass
    }
}
