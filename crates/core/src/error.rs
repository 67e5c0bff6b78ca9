use thiserror::Error;

use crate::model::{ExamResultError, QuestionValidationError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    QuestionValidation(#[from] QuestionValidationError),
    #[error(transparent)]
    ResultValidation(#[from] ExamResultError),
}
