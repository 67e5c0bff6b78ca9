//! Question-bank loading.
//!
//! The bank is a JSON array of `{ question, options, correct, explanation? }`
//! entries. Malformed entries are rejected here, at load time, so the exam
//! core only ever sees validated questions.

use std::fs;
use std::path::Path;

use thiserror::Error;

use exam_core::model::{Question, QuestionDraft, QuestionValidationError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("question bank is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid question at index {index}: {source}")]
    InvalidEntry {
        index: usize,
        source: QuestionValidationError,
    },
}

/// Parse and validate a question bank from its JSON text.
///
/// # Errors
///
/// Returns `BankError::Parse` for malformed JSON and
/// `BankError::InvalidEntry` for the first entry that fails validation.
pub fn parse_bank(json: &str) -> Result<Vec<Question>, BankError> {
    let drafts: Vec<QuestionDraft> = serde_json::from_str(json)?;

    let mut questions = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.into_iter().enumerate() {
        let question = draft
            .validate()
            .map_err(|source| BankError::InvalidEntry { index, source })?;
        questions.push(question);
    }

    tracing::debug!(count = questions.len(), "question bank parsed");
    Ok(questions)
}

/// Load and validate a question bank from a JSON file.
///
/// # Errors
///
/// Returns `BankError::Io` if the file cannot be read, plus everything
/// [`parse_bank`] reports.
pub fn load_bank(path: impl AsRef<Path>) -> Result<Vec<Question>, BankError> {
    let raw = fs::read_to_string(path)?;
    parse_bank(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_valid_bank() {
        let json = r#"[
            {
                "question": "What drives the risk assessment?",
                "options": ["Assets", "Budget", "Headcount"],
                "correct": 0,
                "explanation": "Assets and their owners."
            },
            {
                "question": "Which clause requires an audit programme?",
                "options": ["Clause 8", "Clause 9"],
                "correct": 1
            }
        ]"#;

        let bank = parse_bank(json).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank[0].correct_option(), "Assets");
        assert_eq!(bank[1].explanation(), None);
    }

    #[test]
    fn rejects_entry_with_out_of_range_correct() {
        let json = r#"[
            { "question": "Q", "options": ["a", "b"], "correct": 5 }
        ]"#;
        let err = parse_bank(json).unwrap_err();
        assert!(matches!(
            err,
            BankError::InvalidEntry {
                index: 0,
                source: QuestionValidationError::CorrectOutOfRange { index: 5, len: 2 }
            }
        ));
    }

    #[test]
    fn rejects_entry_with_single_option_and_reports_index() {
        let json = r#"[
            { "question": "fine", "options": ["a", "b"], "correct": 0 },
            { "question": "broken", "options": ["only"], "correct": 0 }
        ]"#;
        let err = parse_bank(json).unwrap_err();
        assert!(matches!(err, BankError::InvalidEntry { index: 1, .. }));
    }

    #[test]
    fn rejects_non_json_input() {
        assert!(matches!(parse_bank("not json"), Err(BankError::Parse(_))));
    }
}
