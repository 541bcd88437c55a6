use super::AnswerStore;
use crate::error::{Error, Result};
use crate::models::answer_key::{ChoiceId, CorrectAnswer};
use crate::models::exam_session::ExamSession;
use crate::models::question::Question;
use crate::models::submission::Submission;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory answer store: the same contract as the database-backed store,
/// for tests and embedders that bring no database.
#[derive(Default)]
pub struct InMemoryAnswerStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    sessions: Vec<ExamSession>,
    /// Questions per session id, in insertion order.
    questions: HashMap<i64, Vec<Question>>,
    /// Correct internal choice ids per internal question id.
    correct: HashMap<i64, Vec<i64>>,
    submissions: HashMap<i64, Vec<Submission>>,
}

impl InMemoryAnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(&self, session: ExamSession) {
        self.inner.lock().unwrap().sessions.push(session);
    }

    pub fn add_question(&self, session_id: i64, question: Question) {
        self.inner
            .lock()
            .unwrap()
            .questions
            .entry(session_id)
            .or_default()
            .push(question);
    }

    /// Current correct internal choice ids for a question, for inspection.
    pub fn correct_choice_ids(&self, question_id: i64) -> Vec<i64> {
        self.inner
            .lock()
            .unwrap()
            .correct
            .get(&question_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn saved_submissions(&self, attempt_id: i64) -> Vec<Submission> {
        self.inner
            .lock()
            .unwrap()
            .submissions
            .get(&attempt_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AnswerStore for InMemoryAnswerStore {
    async fn session_by_hash(&self, hash_id: &str) -> Result<ExamSession> {
        self.inner
            .lock()
            .unwrap()
            .sessions
            .iter()
            .find(|s| s.hash_id == hash_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("No exam session for hash {}", hash_id)))
    }

    async fn questions_for_session(&self, session_id: i64) -> Result<Vec<Question>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .questions
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn correct_answers_for_session(
        &self,
        session_id: i64,
    ) -> Result<HashMap<i64, CorrectAnswer>> {
        let inner = self.inner.lock().unwrap();
        let questions = inner.questions.get(&session_id);

        let mut map = HashMap::new();
        for question in questions.into_iter().flatten() {
            let correct_ids = inner
                .correct
                .get(&question.id)
                .cloned()
                .unwrap_or_default();
            let choice_ids = question
                .choices
                .iter()
                .filter(|c| correct_ids.contains(&c.id))
                .map(|c| ChoiceId::Num(c.external_choice_id))
                .collect();
            map.insert(
                question.external_question_id,
                CorrectAnswer::new(choice_ids, question.correct_answer_description.clone()),
            );
        }
        Ok(map)
    }

    async fn replace_correct_answers(
        &self,
        question_id: i64,
        correct_choice_ids: &[i64],
        explanation: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .correct
            .insert(question_id, correct_choice_ids.to_vec());

        for questions in inner.questions.values_mut() {
            if let Some(question) = questions.iter_mut().find(|q| q.id == question_id) {
                question.correct_answer_description = explanation.map(|e| e.to_string());
                question.correct_answers_fetched_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn save_submissions(&self, attempt_id: i64, submissions: &[Submission]) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .submissions
            .insert(attempt_id, submissions.to_vec());
        Ok(())
    }
}
