use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session row owned by the surrounding application; the engine reads it to
/// resolve a session and to report fetch/score results against it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExamSession {
    pub id: i64,
    pub hash_id: String,
    pub exam_title: Option<String>,
    pub total_questions: Option<i32>,
    pub number_pass: Option<i32>,
    pub time_limit_seconds: Option<i32>,
}
