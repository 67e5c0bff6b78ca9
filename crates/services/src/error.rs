//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::ExamResultError;
use storage::repository::StorageError;

/// Errors emitted by the exam session engine and its orchestration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error("question pool is empty")]
    EmptyPool,

    #[error("a session is already underway; submit, abort, or reset it first")]
    AlreadyStarted,

    #[error("no session is in progress")]
    NotInProgress,

    #[error("session is not completed")]
    NotCompleted,

    #[error("question position {position} is out of range for {total} questions")]
    InvalidPosition { position: usize, total: usize },

    #[error("option {option} is out of range for question {position} with {len} options")]
    InvalidOption {
        position: usize,
        option: usize,
        len: usize,
    },

    #[error(transparent)]
    Result(#[from] ExamResultError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
