use crate::error::Result;
use crate::models::question::QuestionType;
use crate::models::submission::{ScoreReport, Submission};
use crate::services::grading_service::GradingService;
use crate::services::shuffle_service::ShuffleService;
use crate::store::AnswerStore;
use serde::Serialize;
use std::sync::Arc;

/// One choice as a candidate sees it.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceView {
    pub id: i64,
    pub label: String,
}

/// One question as a candidate sees it, in the order it is served.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    pub choices: Vec<ChoiceView>,
}

/// Serves per-attempt question views and scores submitted attempts.
#[derive(Clone)]
pub struct ExamService {
    store: Arc<dyn AnswerStore>,
}

impl ExamService {
    pub fn new(store: Arc<dyn AnswerStore>) -> Self {
        Self { store }
    }

    /// Questions in the order one candidate sees them. A room groups its
    /// members onto the room's seed (everyone gets the same paper); a lone
    /// candidate's order keys off their attempt token; with neither, the
    /// persisted order is served unchanged.
    ///
    /// When choice shuffling is on, each question's choices get their own
    /// seed derived from the base seed and the question id, so the choice
    /// order differs across questions but stays stable per question.
    pub async fn questions_for_attempt(
        &self,
        session_id: i64,
        room_id: Option<i64>,
        attempt_token: Option<&str>,
        shuffle_choices: bool,
    ) -> Result<Vec<QuestionView>> {
        let questions = self.store.questions_for_session(session_id).await?;
        let seed = ShuffleService::question_order_seed(room_id, attempt_token);
        let questions = ShuffleService::shuffle(seed, questions);

        let views = questions
            .into_iter()
            .map(|q| {
                let mut choices: Vec<ChoiceView> = q
                    .choices
                    .iter()
                    .map(|c| ChoiceView {
                        id: c.external_choice_id,
                        label: c.label.clone(),
                    })
                    .collect();

                if shuffle_choices {
                    if let Some(base) = seed {
                        let choice_seed = ShuffleService::choice_order_seed(base, q.id);
                        choices = ShuffleService::shuffle(Some(choice_seed), choices);
                    }
                }

                QuestionView {
                    id: q.external_question_id,
                    question_type: q.question_type,
                    question: q.body,
                    choices,
                }
            })
            .collect();

        Ok(views)
    }

    /// Scores an attempt's submissions against the persisted answer key.
    /// Recomputed on every call; nothing is cached or stored.
    pub async fn score_attempt(
        &self,
        session_id: i64,
        submissions: &[Submission],
    ) -> Result<ScoreReport> {
        let canonical = self.store.correct_answers_for_session(session_id).await?;
        Ok(GradingService::score(submissions, &canonical))
    }
}
