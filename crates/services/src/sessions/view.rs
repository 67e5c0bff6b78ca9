use serde::Serialize;

use exam_core::model::ExamResult;

/// Presentation-agnostic review row for one question of a completed attempt.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings beyond the raw question/option text
/// - no styling or localization assumptions
///
/// A front end decides how to render right/wrong/unanswered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerReviewItem {
    pub position: usize,
    pub text: String,
    pub options: Vec<String>,
    /// The option the candidate chose, if the question was answered.
    pub chosen: Option<usize>,
    pub correct: usize,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

/// Build the per-question review of a completed attempt, in question order.
#[must_use]
pub fn review_answers(result: &ExamResult) -> Vec<AnswerReviewItem> {
    result
        .questions()
        .iter()
        .enumerate()
        .map(|(position, question)| {
            let chosen = result.answers().get(&position).copied();
            AnswerReviewItem {
                position,
                text: question.text().to_owned(),
                options: question.options().to_vec(),
                chosen,
                correct: question.correct_index(),
                is_correct: chosen == Some(question.correct_index()),
                explanation: question.explanation().map(str::to_owned),
            }
        })
        .collect()
}

/// Format a second count as `HH:MM:SS`. Negative input clamps to zero.
#[must_use]
pub fn format_hms(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
