use crate::error::{Error, Result};
use crate::models::question::QuestionType;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const EXPLANATION_KEY: &str = "explanation";
const CORRECT_KEYS: [&str; 2] = ["correct_index", "correct_indices"];

/// Answer key salvaged from one model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedAnswerKey {
    /// 0-based indices into the choice order the prompt was built from.
    pub correct_indices: Vec<usize>,
    pub explanation: String,
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("fence regex"))
}

/// Reduces a raw, untrusted model reply to a structured answer key.
///
/// Finds one well-formed object carrying the expected correctness field plus
/// an explanation, decodes it, and converts its 1-based indices to 0-based,
/// dropping anything non-positive. Anything that cannot be reduced raises
/// `InvalidResponse` with the parser's message; transport and credential
/// failures are a different error class and never originate here.
pub fn extract_answer_key(
    raw_text: &str,
    question_type: QuestionType,
) -> Result<ExtractedAnswerKey> {
    let candidate = extract_json_candidate(raw_text);
    let data: Value = serde_json::from_str(&candidate)
        .map_err(|e| Error::InvalidResponse(format!("Invalid JSON: {}", e)))?;

    let raw_indices = data
        .get(question_type.correct_key())
        .cloned()
        .unwrap_or(Value::Null);
    let explanation = data
        .get(EXPLANATION_KEY)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim()
        .to_string();

    Ok(ExtractedAnswerKey {
        correct_indices: coerce_indices(&raw_indices),
        explanation,
    })
}

/// 1-based scalar-or-list, to 0-based indices. Non-positive entries (a model
/// answering 0 or below) are dropped instead of wrapping.
fn coerce_indices(raw: &Value) -> Vec<usize> {
    let one_based: Vec<i64> = match raw {
        Value::Array(items) => items.iter().map(to_int).collect(),
        Value::Null => Vec::new(),
        scalar => vec![to_int(scalar)],
    };

    one_based
        .into_iter()
        .map(|n| n - 1)
        .filter(|n| *n >= 0)
        .map(|n| n as usize)
        .collect()
}

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Extracts a JSON object candidate from a potentially fenced/noisy reply.
///
/// Strategies are tried in order, each only when the previous yields nothing
/// parseable; the trimmed raw text is the last resort (and will then fail at
/// decode time with a diagnostic).
pub fn extract_json_candidate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    // 1) ```json ... ```
    if text.contains("```") {
        if let Some(caps) = fence_regex().captures(text) {
            let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if !inner.is_empty() {
                return inner.to_string();
            }
        }
    }

    // 2) Locate an object containing "explanation" plus one of the
    //    correctness fields, anchored at the last "explanation" occurrence.
    if let Some(candidate) = anchored_object(text) {
        return candidate;
    }

    // 3) Single-line JSON.
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            continue;
        }
        if line.starts_with('{') && line.ends_with('}') {
            return line.to_string();
        }
    }

    // 4) Scan from a known key opener and read until braces match.
    for key in CORRECT_KEYS {
        let needle = format!("{{\"{}\"", key);
        let mut pos = 0;
        while let Some(found) = text[pos..].find(&needle) {
            let start = pos + found;
            if let Some(candidate) = balanced_span(text, start) {
                if serde_json::from_str::<Value>(&candidate).is_ok() {
                    return candidate;
                }
            }
            pos = start + 1;
        }
    }

    trimmed.to_string()
}

/// Scans backward from the last "explanation" to the nearest opening brace,
/// then forward with an explicit nesting-depth counter. Depth is tracked
/// character by character because explanation strings may themselves contain
/// braces and nesting is unbounded. A balanced span is accepted only when it
/// names both the explanation field and a correctness field.
fn anchored_object(text: &str) -> Option<String> {
    let anchor = text.rfind(EXPLANATION_KEY)?;
    let start = text[..anchor].rfind('{')?;

    let mut depth: i64 = 0;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            let candidate = &text[start..start + offset + ch.len_utf8()];
            if candidate.contains(EXPLANATION_KEY)
                && CORRECT_KEYS.iter().any(|key| candidate.contains(key))
            {
                return Some(candidate.to_string());
            }
        }
    }
    None
}

/// Balanced-brace span starting at `start` (which must point at `{`).
fn balanced_span(text: &str, start: usize) -> Option<String> {
    let mut depth: i64 = 0;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            return Some(text[start..start + offset + ch.len_utf8()].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_single_answer() {
        let raw = "Here you go:\n```json\n{\"correct_index\": 2, \"explanation\": \"because\"}\n```";
        let key = extract_answer_key(raw, QuestionType::SingleChoice).unwrap();
        assert_eq!(key.correct_indices, vec![1]);
        assert_eq!(key.explanation, "because");
    }

    #[test]
    fn fenced_block_without_language_tag() {
        let raw = "```\n{\"correct_index\": 3, \"explanation\": \"x\"}\n```";
        let key = extract_answer_key(raw, QuestionType::SingleChoice).unwrap();
        assert_eq!(key.correct_indices, vec![2]);
    }

    #[test]
    fn prose_wrapped_multi_answer() {
        let raw = "Sure! {\"correct_indices\": [1,3], \"explanation\": \"two are right\"} Hope that helps.";
        let key = extract_answer_key(raw, QuestionType::MultiChoice).unwrap();
        assert_eq!(key.correct_indices, vec![0, 2]);
        assert_eq!(key.explanation, "two are right");
    }

    #[test]
    fn braces_inside_explanation_do_not_break_matching() {
        let raw = "Answer below.\n{\"correct_index\": 1, \"explanation\": \"use {x} and {y} here\"}\nDone.";
        let key = extract_answer_key(raw, QuestionType::SingleChoice).unwrap();
        assert_eq!(key.correct_indices, vec![0]);
        assert_eq!(key.explanation, "use {x} and {y} here");
    }

    #[test]
    fn zero_index_is_clamped_away() {
        let raw = "{\"correct_index\": 0, \"explanation\": \"nope\"}";
        let key = extract_answer_key(raw, QuestionType::SingleChoice).unwrap();
        assert!(key.correct_indices.is_empty());
    }

    #[test]
    fn negative_indices_are_dropped_from_lists() {
        let raw = "{\"correct_indices\": [0, 2, -3], \"explanation\": \"mixed\"}";
        let key = extract_answer_key(raw, QuestionType::MultiChoice).unwrap();
        assert_eq!(key.correct_indices, vec![1]);
    }

    #[test]
    fn scalar_under_multi_key_still_coerces_to_list() {
        let raw = "{\"correct_indices\": 2, \"explanation\": \"one\"}";
        let key = extract_answer_key(raw, QuestionType::MultiChoice).unwrap();
        assert_eq!(key.correct_indices, vec![1]);
    }

    #[test]
    fn numeric_strings_coerce() {
        let raw = "{\"correct_indices\": [\"1\", \"3\"], \"explanation\": \"s\"}";
        let key = extract_answer_key(raw, QuestionType::MultiChoice).unwrap();
        assert_eq!(key.correct_indices, vec![0, 2]);
    }

    #[test]
    fn missing_explanation_defaults_to_empty() {
        let raw = "{\"correct_index\": 2}";
        let key = extract_answer_key(raw, QuestionType::SingleChoice).unwrap();
        assert_eq!(key.explanation, "");
        assert_eq!(key.correct_indices, vec![1]);
    }

    #[test]
    fn single_line_json_among_comments() {
        let raw = "# model output\n// log line\n{\"correct_index\": 2, \"explanation\": \"line\"}\ntrailing";
        let key = extract_answer_key(raw, QuestionType::SingleChoice).unwrap();
        assert_eq!(key.correct_indices, vec![1]);
    }

    #[test]
    fn keyed_brace_scan_recovers_object_glued_to_text() {
        // No fence, no "explanation" anchor, not alone on its line.
        let raw = "noise {\"correct_index\": 2, \"note\": \"n\"} more noise";
        assert_eq!(
            extract_json_candidate(raw),
            "{\"correct_index\": 2, \"note\": \"n\"}"
        );
    }

    #[test]
    fn unparseable_text_raises_invalid_response() {
        let err = extract_answer_key("no json here at all", QuestionType::SingleChoice)
            .expect_err("should fail");
        match err {
            Error::InvalidResponse(msg) => assert!(msg.contains("Invalid JSON")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn invalid_response_is_not_model_specific() {
        let err = extract_answer_key("garbage", QuestionType::SingleChoice).unwrap_err();
        assert!(!err.is_model_specific());
    }

    #[test]
    fn last_explanation_occurrence_anchors_the_search() {
        let raw = "The word explanation appears early.\nFinal: {\"correct_indices\": [2], \"explanation\": \"late\"}";
        let key = extract_answer_key(raw, QuestionType::MultiChoice).unwrap();
        assert_eq!(key.correct_indices, vec![1]);
        assert_eq!(key.explanation, "late");
    }
}
