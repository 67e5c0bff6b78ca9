//! Exact scoring of a completed answer sheet.
//!
//! A position counts as correct only when an answer was recorded for it and
//! that answer equals the question's correct option. Unanswered positions and
//! wrong answers both count against the score; there is no partial credit.

use std::collections::HashMap;

use crate::model::{Question, Score};

/// Score an answer sheet against its question set.
///
/// `answers` is sparse: keys are positions into `questions`, values are the
/// chosen option indexes. Positions missing from the map are unanswered.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn score(questions: &[Question], answers: &HashMap<usize, usize>) -> Score {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i) == Some(&q.correct_index()))
        .count();

    Score::new(correct as u32, questions.len() as u32)
}
