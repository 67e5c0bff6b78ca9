use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use exam_core::model::{
    AttemptId, ExamResult, Question, QuestionDraft, QuestionValidationError,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── PERSISTED RECORDS ─────────────────────────────────────────────────────────
//

/// Persisted shape of a question inside a history payload.
///
/// Mirrors the domain `Question` so the payload codec never leaks into the
/// domain layer; conversion back re-runs domain validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            question: question.text().to_owned(),
            options: question.options().to_vec(),
            correct: question.correct_index(),
            explanation: question.explanation().map(str::to_owned),
        }
    }

    /// Convert the record back into a validated domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` if the persisted entry no longer
    /// satisfies the question invariants.
    pub fn into_question(self) -> Result<Question, QuestionValidationError> {
        QuestionDraft {
            question: self.question,
            options: self.options,
            correct: self.correct,
            explanation: self.explanation,
        }
        .validate()
    }
}

/// Persisted correctness counts of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
}

/// Persisted shape of one completed attempt.
///
/// `timed_out` defaults to `false` so records written before the flag existed
/// still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResultRecord {
    pub id: AttemptId,
    pub score: ScoreRecord,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub time_taken_seconds: i64,
    pub questions: Vec<QuestionRecord>,
    pub answers: HashMap<usize, usize>,
    #[serde(default)]
    pub timed_out: bool,
}

impl ExamResultRecord {
    #[must_use]
    pub fn from_result(result: &ExamResult) -> Self {
        Self {
            id: result.id(),
            score: ScoreRecord {
                correct: result.score().correct(),
                total: result.score().total(),
                percent: result.score().percent(),
            },
            started_at: result.started_at(),
            completed_at: result.completed_at(),
            time_taken_seconds: result.time_taken_seconds(),
            questions: result.questions().iter().map(QuestionRecord::from_question).collect(),
            answers: result.answers().clone(),
            timed_out: result.timed_out(),
        }
    }

    /// Convert the record back into a domain `ExamResult`, re-checking every
    /// invariant (answer ranges, score consistency, timestamps).
    ///
    /// # Errors
    ///
    /// Returns `exam_core::Error` if any persisted field fails validation.
    pub fn into_result(self) -> Result<ExamResult, exam_core::Error> {
        let mut questions = Vec::with_capacity(self.questions.len());
        for record in self.questions {
            questions.push(record.into_question()?);
        }

        Ok(ExamResult::from_persisted(
            self.id,
            questions,
            self.answers,
            self.score.correct,
            self.score.total,
            self.score.percent,
            self.started_at,
            self.completed_at,
            self.time_taken_seconds,
            self.timed_out,
        )?)
    }
}

//
// ─── REPOSITORY CONTRACT ───────────────────────────────────────────────────────
//

/// Repository contract for the persisted attempt history.
///
/// The whole history lives under one named record; `save_history` replaces
/// that record in full. A missing record reads as an empty history, and
/// adapters recover from an unreadable payload by returning an empty history
/// rather than failing the caller's startup.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Load the history stored under `name`, oldest attempt first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for infrastructure failures; a missing or
    /// malformed record is an empty history, not an error.
    async fn load_history(&self, name: &str) -> Result<Vec<ExamResult>, StorageError>;

    /// Replace the history stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn save_history(&self, name: &str, history: &[ExamResult]) -> Result<(), StorageError>;
}

/// Simple in-memory history store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<Mutex<HashMap<String, Vec<ExamResult>>>>,
}

impl InMemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryStore {
    async fn load_history(&self, name: &str) -> Result<Vec<ExamResult>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(name).cloned().unwrap_or_default())
    }

    async fn save_history(&self, name: &str, history: &[ExamResult]) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(name.to_owned(), history.to_vec());
        Ok(())
    }
}

/// Aggregates the history repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub history: Arc<dyn HistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            history: Arc::new(InMemoryHistoryStore::new()),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
