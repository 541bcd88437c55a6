pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::answer_key::CorrectAnswer;
use crate::models::exam_session::ExamSession;
use crate::models::question::Question;
use crate::models::submission::Submission;
use std::collections::HashMap;

/// Contract with the canonical answer store. The surrounding application
/// owns the rows; this engine reads questions/choices, stores submissions,
/// and is the only writer of correct-answer sets.
#[async_trait::async_trait]
pub trait AnswerStore: Send + Sync {
    /// Session row by its public hash id.
    async fn session_by_hash(&self, hash_id: &str) -> Result<ExamSession>;

    /// All questions of a session with their choices loaded, in the fixed
    /// persisted order (ascending ids).
    async fn questions_for_session(&self, session_id: i64) -> Result<Vec<Question>>;

    /// Canonical correct sets keyed by external question id. Every question
    /// of the session appears; questions without a fetched key map to an
    /// empty set.
    async fn correct_answers_for_session(
        &self,
        session_id: i64,
    ) -> Result<HashMap<i64, CorrectAnswer>>;

    /// Atomically replaces a question's correct-answer set together with its
    /// explanation and fetched-at stamp. Full replace: no stale entries
    /// survive a re-fetch, and a failed replace leaves the previous set
    /// intact.
    async fn replace_correct_answers(
        &self,
        question_id: i64,
        correct_choice_ids: &[i64],
        explanation: Option<&str>,
    ) -> Result<()>;

    /// Stores an attempt's submissions, overwriting any previous payload.
    async fn save_submissions(&self, attempt_id: i64, submissions: &[Submission]) -> Result<()>;
}
