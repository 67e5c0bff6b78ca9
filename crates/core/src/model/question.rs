use serde::Deserialize;
use thiserror::Error;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Unvalidated question as it arrives from a bank file.
///
/// Field names mirror the bank JSON format:
/// `{ "question": ..., "options": [...], "correct": n, "explanation": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionDraft {
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct: usize,
    ) -> Self {
        Self {
            question: question.into(),
            options,
            correct,
            explanation: None,
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// - `QuestionValidationError::EmptyText` if the question text is blank
    /// - `QuestionValidationError::TooFewOptions` if fewer than two options
    /// - `QuestionValidationError::CorrectOutOfRange` if `correct` does not
    ///   index into `options`
    pub fn validate(self) -> Result<Question, QuestionValidationError> {
        if self.question.trim().is_empty() {
            return Err(QuestionValidationError::EmptyText);
        }
        if self.options.len() < 2 {
            return Err(QuestionValidationError::TooFewOptions {
                len: self.options.len(),
            });
        }
        if self.correct >= self.options.len() {
            return Err(QuestionValidationError::CorrectOutOfRange {
                index: self.correct,
                len: self.options.len(),
            });
        }

        Ok(Question {
            text: self.question,
            options: self.options,
            correct_index: self.correct,
            explanation: self.explanation,
        })
    }
}

/// A validated multiple-choice question.
///
/// Immutable once constructed: `correct_index` always indexes into `options`
/// and `options` always has at least two entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_index: usize,
    explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// The text of the correct option.
    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionValidationError {
    #[error("question text is empty")]
    EmptyText,

    #[error("a question needs at least two options, got {len}")]
    TooFewOptions { len: usize },

    #[error("correct option index {index} is out of range for {len} options")]
    CorrectOutOfRange { index: usize, len: usize },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
