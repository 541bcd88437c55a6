use crate::models::question::{QuestionChoice, QuestionType};

/// Builds the grading instruction sent to a text-generation backend.
///
/// Choices are numbered 1..N in exactly the order given; the reply contract
/// (`correct_index` / `correct_indices`, 1-based, plus `explanation`) is the
/// one the extraction waterfall searches for.
pub fn build_answer_key_prompt(
    question_body: &str,
    choices: &[QuestionChoice],
    question_type: QuestionType,
) -> String {
    let options_text = choices
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i + 1, c.label))
        .collect::<Vec<_>>()
        .join("\n");

    let single = question_type.is_single();
    let correct_key = question_type.correct_key();
    let instruction = if single {
        "Exactly one option is correct."
    } else {
        "One or more options may be correct."
    };
    let format_value = if single { "INTEGER" } else { "[INTEGER, INTEGER]" };

    format!(
        r#"You are an expert at grading multiple choice questions.

You MUST return ONLY a valid JSON object.
Do NOT include markdown, comments, extra text, or explanations outside JSON.

Question:
{question_body}

Options (numbered starting from 1):
{options_text}

Instructions:
{instruction}

Rules:
- If there is ONE correct answer, return an integer
- If there are MULTIPLE correct answers, return an array of integers
- Numbers must be 1-based (match the option numbers)
- explanation must be a short string in English

Response format EXACTLY:

{{
  "{correct_key}": {format_value},
  "explanation": "SHORT EXPLANATION"
}}

Do not output anything else.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(labels: &[&str]) -> Vec<QuestionChoice> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| QuestionChoice {
                id: i as i64 + 1,
                external_choice_id: i as i64 + 101,
                label: label.to_string(),
            })
            .collect()
    }

    #[test]
    fn numbers_choices_one_based_in_given_order() {
        let prompt = build_answer_key_prompt(
            "Pick one",
            &choices(&["first", "second", "third"]),
            QuestionType::SingleChoice,
        );
        assert!(prompt.contains("1. first\n2. second\n3. third"));
    }

    #[test]
    fn single_choice_asks_for_correct_index() {
        let prompt =
            build_answer_key_prompt("Q", &choices(&["a", "b"]), QuestionType::SingleChoice);
        assert!(prompt.contains("\"correct_index\""));
        assert!(prompt.contains("Exactly one option is correct."));
    }

    #[test]
    fn multi_choice_asks_for_correct_indices() {
        let prompt = build_answer_key_prompt("Q", &choices(&["a", "b"]), QuestionType::MultiChoice);
        assert!(prompt.contains("\"correct_indices\""));
        assert!(prompt.contains("One or more options may be correct."));
    }
}
