mod exam_config;
mod ids;
mod question;
mod result;

pub use exam_config::{ExamConfig, MAX_DURATION_SECONDS, MIN_DURATION_SECONDS};
pub use ids::AttemptId;
pub use question::{Question, QuestionDraft, QuestionValidationError};
pub use result::{ExamResult, ExamResultError, Score};
