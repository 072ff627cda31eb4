//! Parsing of model output
//!
//! Models asked for strict JSON still wrap it in code fences often enough
//! that every JSON consumer strips them first. Malformed output is a 500,
//! never a panic.

use crate::error::AppError;
use crate::services::artifacts::ParsedQuestion;

/// Strip a single surrounding Markdown code fence, if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").map(str::trim).unwrap_or(trimmed)
}

#[derive(Debug, serde::Deserialize)]
struct QuizDocument {
    questions: Vec<ParsedQuestion>,
}

/// Parse the quiz JSON the model was instructed to produce.
pub fn parse_quiz(text: &str) -> Result<Vec<ParsedQuestion>, AppError> {
    let body = strip_code_fences(text);
    let parsed: QuizDocument = serde_json::from_str(body)
        .map_err(|e| AppError::Upstream(format!("model returned malformed quiz JSON: {e}")))?;

    if parsed.questions.is_empty() {
        return Err(AppError::Upstream("model returned an empty quiz".into()));
    }
    for question in &parsed.questions {
        let choices = question.choices.len() as i32;
        if question.answer_index < 0 || question.answer_index >= choices {
            return Err(AppError::Upstream(
                "quiz answer index out of range".into(),
            ));
        }
    }
    Ok(parsed.questions)
}

/// Parse a JSON array of strings; fall back to non-empty lines.
pub fn parse_string_list(text: &str) -> Vec<String> {
    let body = strip_code_fences(text);
    if let Ok(list) = serde_json::from_str::<Vec<String>>(body) {
        return list.into_iter().filter(|s| !s.trim().is_empty()).collect();
    }
    body.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', ' ']).to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_with_language_tag() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\": 1}");
    }

    #[test]
    fn unfenced_text_passes_through() {
        assert_eq!(strip_code_fences("  plain  "), "plain");
    }

    #[test]
    fn parses_a_well_formed_quiz() {
        let json = r#"{"questions": [
            {"prompt": "2+2?", "choices": ["3", "4", "5", "6"], "answer_index": 1}
        ]}"#;
        let questions = parse_quiz(json).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer_index, 1);
    }

    #[test]
    fn rejects_out_of_range_answer_index() {
        let json = r#"{"questions": [
            {"prompt": "2+2?", "choices": ["3", "4"], "answer_index": 5}
        ]}"#;
        assert!(matches!(parse_quiz(json), Err(AppError::Upstream(_))));
    }

    #[test]
    fn rejects_empty_quiz() {
        assert!(parse_quiz(r#"{"questions": []}"#).is_err());
    }

    #[test]
    fn rejects_prose_instead_of_json() {
        assert!(parse_quiz("Sure! Here is your quiz...").is_err());
    }

    #[test]
    fn string_list_prefers_json() {
        let list = parse_string_list("[\"one\", \"two\", \"\"]");
        assert_eq!(list, vec!["one", "two"]);
    }

    #[test]
    fn string_list_falls_back_to_lines() {
        let list = parse_string_list("- first\n- second\n\n");
        assert_eq!(list, vec!["first", "second"]);
    }
}
