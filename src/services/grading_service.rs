use crate::models::answer_key::CorrectAnswer;
use crate::models::submission::{ScoreReport, ScoringDetail, Submission};
use std::collections::HashMap;

pub struct GradingService;

impl GradingService {
    /// Scores submissions against the canonical answer key. Pure and
    /// re-entrant: the same inputs always produce the same report.
    ///
    /// A submission is correct iff the canonical set is non-empty and the
    /// normalized submitted set equals it, compared order-independently.
    /// Submissions for unknown question ids are skipped; `total` is the
    /// number of canonical-backed questions, not the number of submissions.
    pub fn score(
        submissions: &[Submission],
        canonical: &HashMap<i64, CorrectAnswer>,
    ) -> ScoreReport {
        let total = canonical.len() as i32;
        if submissions.is_empty() {
            return ScoreReport {
                score: 0,
                total,
                details: Vec::new(),
            };
        }

        let mut score = 0;
        let mut details = Vec::new();

        for sub in submissions {
            let Some(answer) = canonical.get(&sub.question_id) else {
                continue;
            };

            let user_answers = sub.normalized_answers();
            let correct = !answer.choice_ids.is_empty()
                && !user_answers.is_empty()
                && user_answers == answer.choice_ids;
            if correct {
                score += 1;
            }

            details.push(ScoringDetail {
                question_id: sub.question_id,
                correct,
                user_answers,
                correct_answers: answer.choice_ids.clone(),
                description: answer.description.clone(),
            });
        }

        ScoreReport {
            score,
            total,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer_key::ChoiceId;
    use serde_json::json;

    fn canonical(entries: &[(i64, &[&str])]) -> HashMap<i64, CorrectAnswer> {
        entries
            .iter()
            .map(|(qid, keys)| {
                let ids = keys
                    .iter()
                    .map(|k| ChoiceId::normalize(&json!(k)).unwrap())
                    .collect();
                (*qid, CorrectAnswer::new(ids, None))
            })
            .collect()
    }

    fn submission(question_id: i64, answers: serde_json::Value) -> Submission {
        Submission {
            question_id,
            answers,
        }
    }

    #[test]
    fn single_answer_correct_and_incorrect() {
        let canonical = canonical(&[(1, &["B"])]);

        let right = GradingService::score(&[submission(1, json!("B"))], &canonical);
        assert_eq!((right.score, right.total), (1, 1));
        assert!(right.details[0].correct);

        let wrong = GradingService::score(&[submission(1, json!("A"))], &canonical);
        assert_eq!((wrong.score, wrong.total), (0, 1));
        assert!(!wrong.details[0].correct);
    }

    #[test]
    fn multi_answer_is_order_independent() {
        let canonical = canonical(&[(2, &["A", "C"])]);

        let reversed = GradingService::score(&[submission(2, json!(["C", "A"]))], &canonical);
        assert_eq!(reversed.score, 1);

        let partial = GradingService::score(&[submission(2, json!(["A"]))], &canonical);
        assert_eq!(partial.score, 0);
    }

    #[test]
    fn unknown_question_ids_do_not_inflate_total() {
        let canonical = canonical(&[(1, &["B"])]);
        let report = GradingService::score(
            &[submission(1, json!("B")), submission(999, json!("A"))],
            &canonical,
        );
        assert_eq!((report.score, report.total), (1, 1));
        assert_eq!(report.details.len(), 1);
    }

    #[test]
    fn empty_submissions_score_zero_over_question_count() {
        let canonical = canonical(&[(1, &["B"]), (2, &["A", "C"])]);
        let report = GradingService::score(&[], &canonical);
        assert_eq!((report.score, report.total), (0, 2));
        assert!(report.details.is_empty());
    }

    #[test]
    fn empty_canonical_set_is_never_correct() {
        let canonical = canonical(&[(1, &[])]);
        let report = GradingService::score(&[submission(1, json!("A"))], &canonical);
        assert_eq!(report.score, 0);
        assert!(!report.details[0].correct);
    }

    #[test]
    fn integer_ids_and_numeric_strings_compare_equal() {
        let canonical = canonical(&[(1, &["101", "103"])]);
        let report = GradingService::score(&[submission(1, json!([103, 101]))], &canonical);
        assert_eq!(report.score, 1);
    }

    #[test]
    fn scoring_is_reentrant() {
        let canonical = canonical(&[(1, &["B"]), (2, &["A", "C"])]);
        let subs = vec![submission(1, json!("b")), submission(2, json!(["C", "A"]))];
        let first = serde_json::to_string(&GradingService::score(&subs, &canonical)).unwrap();
        let second = serde_json::to_string(&GradingService::score(&subs, &canonical)).unwrap();
        assert_eq!(first, second);
    }
}
