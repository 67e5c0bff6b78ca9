mod engine;
mod progress;
mod sampler;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::ExamError;
pub use engine::{ExamEngine, ExamState, Tick};
pub use progress::ExamProgress;
pub use sampler::{draw, draw_with};
pub use view::{AnswerReviewItem, format_hms, review_answers};
pub use workflow::{DEFAULT_HISTORY_RECORD, ExamLoopService};
