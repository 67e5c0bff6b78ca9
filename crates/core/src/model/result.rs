use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{AttemptId, Question};
use crate::scoring;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamResultError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("time taken must be non-negative, got {seconds}")]
    NegativeTime { seconds: i64 },

    #[error("correct count {correct} exceeds total {total}")]
    CountMismatch { correct: u32, total: u32 },

    #[error("score total {stored} does not match {actual} questions")]
    TotalMismatch { stored: u32, actual: usize },

    #[error("score percent {stored} does not match computed {expected}")]
    PercentMismatch { stored: u32, expected: u32 },

    #[error("answer recorded for position {position}, but only {total} questions")]
    AnswerPositionOutOfRange { position: usize, total: usize },

    #[error("answer {option} for position {position} is out of range for {len} options")]
    AnswerOptionOutOfRange {
        position: usize,
        option: usize,
        len: usize,
    },
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Correctness counts and the derived percentage for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    correct: u32,
    total: u32,
    percent: u32,
}

impl Score {
    /// Build a score; the percentage is derived, rounded to the nearest
    /// integer, and 0 when there are no questions.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(correct: u32, total: u32) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (100.0 * f64::from(correct) / f64::from(total)).round() as u32
        };
        Self {
            correct,
            total,
            percent,
        }
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Pass/fail against a percentage threshold (inclusive).
    #[must_use]
    pub fn passed(&self, threshold: u32) -> bool {
        self.percent >= threshold
    }
}

//
// ─── EXAM RESULT ───────────────────────────────────────────────────────────────
//

/// Write-once record of a completed exam attempt.
///
/// Created exactly once when a session is submitted (or expires) and never
/// mutated afterwards; history analytics treat these as immutable facts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamResult {
    id: AttemptId,
    score: Score,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    time_taken_seconds: i64,
    questions: Vec<Question>,
    answers: HashMap<usize, usize>,
    timed_out: bool,
}

impl ExamResult {
    /// Score and snapshot a finished attempt.
    ///
    /// `time_taken_seconds` is derived from the two timestamps here, once;
    /// nothing downstream recomputes it.
    ///
    /// # Errors
    ///
    /// Returns `ExamResultError` if the timestamps are inverted or any
    /// recorded answer is out of range.
    pub fn new(
        id: AttemptId,
        questions: Vec<Question>,
        answers: HashMap<usize, usize>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        timed_out: bool,
    ) -> Result<Self, ExamResultError> {
        let score = scoring::score(&questions, &answers);
        let time_taken_seconds = completed_at.signed_duration_since(started_at).num_seconds();
        Self::from_persisted(
            id,
            questions,
            answers,
            score.correct(),
            score.total(),
            score.percent(),
            started_at,
            completed_at,
            time_taken_seconds,
            timed_out,
        )
    }

    /// Rehydrate a result from persisted storage, re-checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns `ExamResultError` if counts, percentage, timestamps, or any
    /// answer do not line up with the question set.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: AttemptId,
        questions: Vec<Question>,
        answers: HashMap<usize, usize>,
        correct: u32,
        total: u32,
        percent: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        time_taken_seconds: i64,
        timed_out: bool,
    ) -> Result<Self, ExamResultError> {
        if completed_at < started_at {
            return Err(ExamResultError::InvalidTimeRange);
        }
        if time_taken_seconds < 0 {
            return Err(ExamResultError::NegativeTime {
                seconds: time_taken_seconds,
            });
        }
        if correct > total {
            return Err(ExamResultError::CountMismatch { correct, total });
        }
        if total as usize != questions.len() {
            return Err(ExamResultError::TotalMismatch {
                stored: total,
                actual: questions.len(),
            });
        }
        let expected = Score::new(correct, total);
        if expected.percent() != percent {
            return Err(ExamResultError::PercentMismatch {
                stored: percent,
                expected: expected.percent(),
            });
        }
        for (&position, &option) in &answers {
            let Some(question) = questions.get(position) else {
                return Err(ExamResultError::AnswerPositionOutOfRange {
                    position,
                    total: questions.len(),
                });
            };
            if option >= question.options().len() {
                return Err(ExamResultError::AnswerOptionOutOfRange {
                    position,
                    option,
                    len: question.options().len(),
                });
            }
        }

        Ok(Self {
            id,
            score: expected,
            started_at,
            completed_at,
            time_taken_seconds,
            questions,
            answers,
            timed_out,
        })
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn time_taken_seconds(&self) -> i64 {
        self.time_taken_seconds
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<usize, usize> {
        &self.answers
    }

    /// True when the attempt was auto-submitted by countdown expiry.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn question(correct: usize) -> Question {
        QuestionDraft::new("Q", vec!["a".into(), "b".into(), "c".into()], correct)
            .validate()
            .unwrap()
    }

    #[test]
    fn new_scores_and_derives_time_taken() {
        let started = fixed_now();
        let completed = started + Duration::seconds(95);
        let questions = vec![question(1), question(2)];
        let mut answers = HashMap::new();
        answers.insert(0, 1);

        let result = ExamResult::new(
            AttemptId::new(),
            questions,
            answers,
            started,
            completed,
            false,
        )
        .unwrap();

        assert_eq!(result.score().correct(), 1);
        assert_eq!(result.score().total(), 2);
        assert_eq!(result.score().percent(), 50);
        assert_eq!(result.time_taken_seconds(), 95);
        assert!(!result.timed_out());
    }

    #[test]
    fn inverted_timestamps_are_rejected() {
        let started = fixed_now();
        let err = ExamResult::new(
            AttemptId::new(),
            vec![question(0)],
            HashMap::new(),
            started,
            started - Duration::seconds(1),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ExamResultError::InvalidTimeRange));
    }

    #[test]
    fn persisted_percent_must_match() {
        let now = fixed_now();
        let err = ExamResult::from_persisted(
            AttemptId::new(),
            vec![question(0), question(0)],
            HashMap::new(),
            1,
            2,
            99,
            now,
            now,
            0,
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ExamResultError::PercentMismatch { stored: 99, expected: 50 }
        ));
    }

    #[test]
    fn persisted_total_must_match_question_count() {
        let now = fixed_now();
        let err = ExamResult::from_persisted(
            AttemptId::new(),
            vec![question(0)],
            HashMap::new(),
            0,
            3,
            0,
            now,
            now,
            0,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ExamResultError::TotalMismatch { stored: 3, actual: 1 }));
    }

    #[test]
    fn answers_outside_the_question_set_are_rejected() {
        let now = fixed_now();
        let mut answers = HashMap::new();
        answers.insert(5, 0);
        let err = ExamResult::new(
            AttemptId::new(),
            vec![question(0)],
            answers,
            now,
            now,
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ExamResultError::AnswerPositionOutOfRange { position: 5, total: 1 }
        ));

        let mut answers = HashMap::new();
        answers.insert(0, 9);
        let err = ExamResult::new(
            AttemptId::new(),
            vec![question(0)],
            answers,
            now,
            now,
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ExamResultError::AnswerOptionOutOfRange { position: 0, option: 9, len: 3 }
        ));
    }
}
