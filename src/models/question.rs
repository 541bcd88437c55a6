use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultiChoice => "multi_choice",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "single_choice" => Some(QuestionType::SingleChoice),
            "multi_choice" => Some(QuestionType::MultiChoice),
            _ => None,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, QuestionType::SingleChoice)
    }

    /// Field name the grading prompt asks for and the extractor looks up.
    pub fn correct_key(&self) -> &'static str {
        if self.is_single() {
            "correct_index"
        } else {
            "correct_indices"
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question with its choices loaded, in the fixed persisted order
/// (ascending choice id). That order is what prompts are built from and what
/// extracted indices map back onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub external_question_id: i64,
    pub question_type: QuestionType,
    pub body: String,
    pub explanation: Option<String>,
    pub correct_answer_description: Option<String>,
    pub correct_answers_fetched_at: Option<DateTime<Utc>>,
    pub choices: Vec<QuestionChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionChoice {
    pub id: i64,
    pub external_choice_id: i64,
    pub label: String,
}
