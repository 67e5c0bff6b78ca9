use serde::Serialize;

/// Aggregated view of session progress, useful for displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining_seconds: u32,
    pub is_complete: bool,
}
