#![forbid(unsafe_code)]

pub mod analytics;
pub mod error;
pub mod sessions;

pub use exam_core::Clock;

pub use analytics::AnalyticsService;
pub use error::ExamError;

pub use sessions::{
    AnswerReviewItem, DEFAULT_HISTORY_RECORD, ExamEngine, ExamLoopService, ExamProgress,
    ExamState, Tick, format_hms, review_answers,
};
