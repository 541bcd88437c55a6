use crate::error::Result;
use crate::models::question::Question;
use crate::services::answer_fetcher::CorrectAnswerFetcher;
use crate::store::AnswerStore;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Serialize)]
pub struct QuestionFetchError {
    pub question_id: i64,
    pub error: String,
}

/// Outcome of fetching the answer key for a whole session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionFetchReport {
    pub total: usize,
    pub success: usize,
    pub errors: Vec<QuestionFetchError>,
}

/// Fetches AI answer keys and persists them into the canonical answer store.
#[derive(Clone)]
pub struct AnswerKeyService {
    fetcher: Arc<CorrectAnswerFetcher>,
    store: Arc<dyn AnswerStore>,
    concurrency: usize,
}

impl AnswerKeyService {
    pub fn new(
        fetcher: Arc<CorrectAnswerFetcher>,
        store: Arc<dyn AnswerStore>,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetches and persists the answer key for one question. Returns how many
    /// choices were marked correct.
    ///
    /// The extracted 0-based indices map back onto the question's stored
    /// choices in the same fixed order the prompt was built from;
    /// out-of-range indices are ignored. The store replace is atomic: either
    /// the new set, explanation and fetched-at stamp all land, or the
    /// previous key stays intact.
    pub async fn fetch_and_persist(&self, question: &Question) -> Result<usize> {
        let key = self
            .fetcher
            .fetch(&question.body, &question.choices, question.question_type)
            .await?;

        let choice_ids: Vec<i64> = key
            .correct_indices
            .iter()
            .filter(|idx| **idx < question.choices.len())
            .map(|idx| question.choices[*idx].id)
            .collect();

        let explanation = if key.explanation.is_empty() {
            None
        } else {
            Some(key.explanation.as_str())
        };

        self.store
            .replace_correct_answers(question.id, &choice_ids, explanation)
            .await?;

        tracing::info!(
            question_id = question.external_question_id,
            correct_count = choice_ids.len(),
            "Answer key persisted"
        );
        Ok(choice_ids.len())
    }

    /// Fetches the answer key for every question of a session. Questions are
    /// independent: they run under a bounded worker pool and one failure
    /// never aborts the rest; failures are collected per question.
    pub async fn fetch_all(&self, session_id: i64) -> Result<SessionFetchReport> {
        let questions = self.store.questions_for_session(session_id).await?;
        let total = questions.len();

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for question in questions {
            let service = self.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let question_id = question.external_question_id;
                let outcome = service.fetch_and_persist(&question).await;
                (question_id, outcome)
            });
        }

        let mut success = 0;
        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(_))) => success += 1,
                Ok((question_id, Err(err))) => errors.push(QuestionFetchError {
                    question_id,
                    error: err.to_string(),
                }),
                Err(join_err) => errors.push(QuestionFetchError {
                    question_id: 0,
                    error: format!("Fetch task failed: {}", join_err),
                }),
            }
        }
        errors.sort_by_key(|e| e.question_id);

        Ok(SessionFetchReport {
            total,
            success,
            errors,
        })
    }
}
