use super::AnswerStore;
use crate::error::Result;
use crate::models::answer_key::{ChoiceId, CorrectAnswer};
use crate::models::exam_session::ExamSession;
use crate::models::question::{Question, QuestionChoice, QuestionType};
use crate::models::submission::Submission;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

/// PostgreSQL-backed answer store.
#[derive(Clone)]
pub struct PgAnswerStore {
    pool: PgPool,
}

impl PgAnswerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AnswerStore for PgAnswerStore {
    async fn session_by_hash(&self, hash_id: &str) -> Result<ExamSession> {
        let session = sqlx::query_as::<_, ExamSession>(
            r#"SELECT id, hash_id, exam_title, total_questions, number_pass, time_limit_seconds
               FROM exam_sessions WHERE hash_id = $1"#,
        )
        .bind(hash_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }

    async fn questions_for_session(&self, session_id: i64) -> Result<Vec<Question>> {
        let question_rows = sqlx::query(
            r#"SELECT id, external_question_id, question_type, body, explanation,
                      correct_answer_description, correct_answers_fetched_at
               FROM questions
               WHERE exam_session_id = $1
               ORDER BY id"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let choice_rows = sqlx::query(
            r#"SELECT c.id, c.question_id, c.external_choice_id, c.label
               FROM question_choices c
               JOIN questions q ON q.id = c.question_id
               WHERE q.exam_session_id = $1
               ORDER BY c.id"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let mut choices_by_question: HashMap<i64, Vec<QuestionChoice>> = HashMap::new();
        for row in choice_rows {
            let question_id: i64 = row.try_get("question_id")?;
            choices_by_question
                .entry(question_id)
                .or_default()
                .push(QuestionChoice {
                    id: row.try_get("id")?,
                    external_choice_id: row.try_get("external_choice_id")?,
                    label: row.try_get("label")?,
                });
        }

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in question_rows {
            let id: i64 = row.try_get("id")?;
            let type_raw: String = row.try_get("question_type")?;
            let question_type = QuestionType::parse(&type_raw)
                .ok_or_else(|| anyhow::anyhow!("Unknown question type: {}", type_raw))?;

            questions.push(Question {
                id,
                external_question_id: row.try_get("external_question_id")?,
                question_type,
                body: row.try_get("body")?,
                explanation: row.try_get("explanation")?,
                correct_answer_description: row.try_get("correct_answer_description")?,
                correct_answers_fetched_at: row.try_get("correct_answers_fetched_at")?,
                choices: choices_by_question.remove(&id).unwrap_or_default(),
            });
        }

        Ok(questions)
    }

    async fn correct_answers_for_session(
        &self,
        session_id: i64,
    ) -> Result<HashMap<i64, CorrectAnswer>> {
        // LEFT JOINs keep questions without a fetched key in the map, so
        // scoring counts them in the total with an empty (never-correct) set.
        let rows = sqlx::query(
            r#"SELECT q.external_question_id, q.correct_answer_description, c.external_choice_id
               FROM questions q
               LEFT JOIN question_correct_answers a ON a.question_id = q.id
               LEFT JOIN question_choices c ON c.id = a.question_choice_id
               WHERE q.exam_session_id = $1
               ORDER BY q.id, c.id"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<i64, CorrectAnswer> = HashMap::new();
        for row in rows {
            let question_id: i64 = row.try_get("external_question_id")?;
            let description: Option<String> = row.try_get("correct_answer_description")?;
            let choice: Option<i64> = row.try_get("external_choice_id")?;

            let entry = map.entry(question_id).or_insert_with(|| CorrectAnswer {
                choice_ids: Vec::new(),
                description: None,
            });
            if entry.description.is_none() {
                entry.description = description;
            }
            if let Some(choice) = choice {
                entry.choice_ids.push(ChoiceId::Num(choice));
            }
        }
        for answer in map.values_mut() {
            answer.choice_ids.sort();
        }

        Ok(map)
    }

    async fn replace_correct_answers(
        &self,
        question_id: i64,
        correct_choice_ids: &[i64],
        explanation: Option<&str>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM question_correct_answers WHERE question_id = $1")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;

        for choice_id in correct_choice_ids {
            sqlx::query(
                r#"INSERT INTO question_correct_answers (question_id, question_choice_id)
                   VALUES ($1, $2)"#,
            )
            .bind(question_id)
            .bind(choice_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"UPDATE questions
               SET correct_answer_description = $1, correct_answers_fetched_at = $2
               WHERE id = $3"#,
        )
        .bind(explanation)
        .bind(Utc::now())
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn save_submissions(&self, attempt_id: i64, submissions: &[Submission]) -> Result<()> {
        let payload = serde_json::to_value(submissions)?;
        sqlx::query("UPDATE exam_attempts SET submissions = $1, updated_at = NOW() WHERE id = $2")
            .bind(payload)
            .bind(attempt_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
