use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

use exam_core::model::{AttemptId, ExamConfig, ExamResult, Question};

use super::progress::ExamProgress;
use super::sampler;
use crate::error::ExamError;

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

/// Observable state of the session state machine.
///
/// Aborting returns straight to `Setup`; abort is a transition, not a resting
/// state, so it never shows up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamState {
    Setup,
    InProgress,
    Completed,
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { remaining_seconds: u32 },
    /// The countdown hit zero and the session auto-submitted with whatever
    /// answers were present.
    Expired,
}

struct ActiveExam {
    selected: Vec<Question>,
    answers: HashMap<usize, usize>,
    remaining_seconds: u32,
    started_at: DateTime<Utc>,
}

struct CompletedExam {
    result: ExamResult,
    /// Set once the workflow has appended the result to history.
    recorded: bool,
}

enum Phase {
    Setup,
    InProgress(ActiveExam),
    Completed(CompletedExam),
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// State machine for one timed exam attempt over a fixed question pool.
///
/// Exactly one engine is active at a time; every operation is synchronous and
/// takes its timestamp from the caller (the services clock), so tests stay
/// deterministic. The countdown is driven externally: a 1 Hz scheduler calls
/// [`ExamEngine::tick`] only while the state is `InProgress` and stops on the
/// first transition out of it.
pub struct ExamEngine {
    pool: Vec<Question>,
    config: ExamConfig,
    phase: Phase,
}

impl ExamEngine {
    #[must_use]
    pub fn new(pool: Vec<Question>, config: ExamConfig) -> Self {
        Self {
            pool,
            config,
            phase: Phase::Setup,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    /// Replace the configuration for the next session.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::AlreadyStarted` outside `Setup`; a running or
    /// completed session keeps the parameters it started with.
    pub fn set_config(&mut self, config: ExamConfig) -> Result<(), ExamError> {
        if !matches!(self.phase, Phase::Setup) {
            return Err(ExamError::AlreadyStarted);
        }
        self.config = config;
        Ok(())
    }

    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    #[must_use]
    pub fn state(&self) -> ExamState {
        match self.phase {
            Phase::Setup => ExamState::Setup,
            Phase::InProgress(_) => ExamState::InProgress,
            Phase::Completed(_) => ExamState::Completed,
        }
    }

    /// Setup → InProgress: draw the question set and arm the countdown.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::EmptyPool` if the pool has no questions; the
    /// state stays `Setup`. Returns `ExamError::AlreadyStarted` outside
    /// `Setup`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), ExamError> {
        if !matches!(self.phase, Phase::Setup) {
            return Err(ExamError::AlreadyStarted);
        }

        let requested = usize::try_from(self.config.num_questions()).unwrap_or(usize::MAX);
        let selected = sampler::draw(&self.pool, requested)?;

        self.phase = Phase::InProgress(ActiveExam {
            selected,
            answers: HashMap::new(),
            remaining_seconds: self.config.duration_seconds(),
            started_at: now,
        });
        Ok(())
    }

    /// Record (or overwrite) the answer for one question.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::InvalidPosition` / `ExamError::InvalidOption` for
    /// out-of-range input, leaving the answer sheet untouched, and
    /// `ExamError::NotInProgress` outside `InProgress`.
    pub fn answer(&mut self, position: usize, option: usize) -> Result<(), ExamError> {
        let Phase::InProgress(active) = &mut self.phase else {
            return Err(ExamError::NotInProgress);
        };

        let total = active.selected.len();
        let Some(question) = active.selected.get(position) else {
            return Err(ExamError::InvalidPosition { position, total });
        };
        let len = question.options().len();
        if option >= len {
            return Err(ExamError::InvalidOption {
                position,
                option,
                len,
            });
        }

        active.answers.insert(position, option);
        Ok(())
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero auto-submits with the answers present at that instant;
    /// unanswered questions count as incorrect by policy.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NotInProgress` outside `InProgress`; the caller's
    /// scheduler should already have stopped by then.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<Tick, ExamError> {
        {
            let Phase::InProgress(active) = &mut self.phase else {
                return Err(ExamError::NotInProgress);
            };
            active.remaining_seconds = active.remaining_seconds.saturating_sub(1);
            if active.remaining_seconds > 0 {
                return Ok(Tick::Running {
                    remaining_seconds: active.remaining_seconds,
                });
            }
        }

        self.complete(now, true)?;
        Ok(Tick::Expired)
    }

    /// InProgress → Completed: score the sheet and snapshot the result.
    ///
    /// Idempotent: submitting an already-completed session returns the
    /// existing result without a transition.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NotInProgress` when called from `Setup`.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<&ExamResult, ExamError> {
        if matches!(self.phase, Phase::InProgress(_)) {
            self.complete(now, false)?;
        }
        match &self.phase {
            Phase::Completed(done) => Ok(&done.result),
            _ => Err(ExamError::NotInProgress),
        }
    }

    /// InProgress → Setup: discard the attempt without producing a result.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NotInProgress` outside `InProgress`.
    pub fn abort(&mut self) -> Result<(), ExamError> {
        if !matches!(self.phase, Phase::InProgress(_)) {
            return Err(ExamError::NotInProgress);
        }
        self.phase = Phase::Setup;
        Ok(())
    }

    /// Completed → Setup: clear the selection and answers for a retry.
    ///
    /// History is untouched; the result of the finished attempt lives there.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NotCompleted` outside `Completed`.
    pub fn reset(&mut self) -> Result<(), ExamError> {
        if !matches!(self.phase, Phase::Completed(_)) {
            return Err(ExamError::NotCompleted);
        }
        self.phase = Phase::Setup;
        Ok(())
    }

    fn complete(&mut self, now: DateTime<Utc>, timed_out: bool) -> Result<(), ExamError> {
        if !matches!(self.phase, Phase::InProgress(_)) {
            return Err(ExamError::NotInProgress);
        }
        let Phase::InProgress(active) = std::mem::replace(&mut self.phase, Phase::Setup) else {
            return Err(ExamError::NotInProgress);
        };

        // The countdown is the time source here; a wall clock that drifted
        // behind the start stamp must not invalidate the snapshot.
        let completed_at = now.max(active.started_at);
        let result = ExamResult::new(
            AttemptId::new(),
            active.selected,
            active.answers,
            active.started_at,
            completed_at,
            timed_out,
        )?;

        self.phase = Phase::Completed(CompletedExam {
            result,
            recorded: false,
        });
        Ok(())
    }

    /// Hand the completed result to the workflow exactly once.
    ///
    /// Returns `None` if there is no completed result or it was already
    /// recorded, which is what makes double-submit append a single history
    /// entry.
    pub(crate) fn take_unrecorded_result(&mut self) -> Option<ExamResult> {
        match &mut self.phase {
            Phase::Completed(done) if !done.recorded => {
                done.recorded = true;
                Some(done.result.clone())
            }
            _ => None,
        }
    }

    //
    // ─── READ ACCESS ───────────────────────────────────────────────────────
    //

    /// The question set of the running or completed session; empty in Setup.
    #[must_use]
    pub fn selected(&self) -> &[Question] {
        match &self.phase {
            Phase::Setup => &[],
            Phase::InProgress(active) => &active.selected,
            Phase::Completed(done) => done.result.questions(),
        }
    }

    /// The recorded answer for a position, if any.
    #[must_use]
    pub fn answer_for(&self, position: usize) -> Option<usize> {
        match &self.phase {
            Phase::Setup => None,
            Phase::InProgress(active) => active.answers.get(&position).copied(),
            Phase::Completed(done) => done.result.answers().get(&position).copied(),
        }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        match &self.phase {
            Phase::Setup => 0,
            Phase::InProgress(active) => active.answers.len(),
            Phase::Completed(done) => done.result.answers().len(),
        }
    }

    /// Seconds left on the countdown; zero outside `InProgress`.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        match &self.phase {
            Phase::InProgress(active) => active.remaining_seconds,
            _ => 0,
        }
    }

    /// The result of the completed session, if any.
    #[must_use]
    pub fn result(&self) -> Option<&ExamResult> {
        match &self.phase {
            Phase::Completed(done) => Some(&done.result),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> ExamProgress {
        ExamProgress {
            total: self.selected().len(),
            answered: self.answered_count(),
            remaining_seconds: self.remaining_seconds(),
            is_complete: matches!(self.phase, Phase::Completed(_)),
        }
    }
}

impl fmt::Debug for ExamEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamEngine")
            .field("pool_len", &self.pool.len())
            .field("state", &self.state())
            .field("answered", &self.answered_count())
            .field("remaining_seconds", &self.remaining_seconds())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::QuestionDraft;
    use exam_core::time::fixed_now;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                QuestionDraft::new(
                    format!("question {i}"),
                    vec!["a".into(), "b".into(), "c".into()],
                    i % 3,
                )
                .validate()
                .unwrap()
            })
            .collect()
    }

    fn engine(pool_size: usize, num_questions: u32) -> ExamEngine {
        ExamEngine::new(pool(pool_size), ExamConfig::new(num_questions, 600, 70))
    }

    #[test]
    fn start_draws_distinct_questions_and_arms_countdown() {
        let mut engine = engine(5, 3);
        assert_eq!(engine.state(), ExamState::Setup);

        engine.start(fixed_now()).unwrap();
        assert_eq!(engine.state(), ExamState::InProgress);
        assert_eq!(engine.selected().len(), 3);
        assert_eq!(engine.remaining_seconds(), 600);

        let texts: HashSet<&str> = engine.selected().iter().map(Question::text).collect();
        assert_eq!(texts.len(), 3);
    }

    #[test]
    fn empty_pool_blocks_start_and_keeps_setup() {
        let mut engine = ExamEngine::new(Vec::new(), ExamConfig::default());
        let err = engine.start(fixed_now()).unwrap_err();
        assert!(matches!(err, ExamError::EmptyPool));
        assert_eq!(engine.state(), ExamState::Setup);
    }

    #[test]
    fn config_changes_only_in_setup() {
        let mut engine = engine(5, 3);
        engine.set_config(ExamConfig::quick_practice()).unwrap();
        assert_eq!(engine.config().num_questions(), 20);

        engine.start(fixed_now()).unwrap();
        let err = engine.set_config(ExamConfig::default()).unwrap_err();
        assert!(matches!(err, ExamError::AlreadyStarted));
        assert_eq!(engine.config().num_questions(), 20);
    }

    #[test]
    fn start_while_running_is_rejected() {
        let mut engine = engine(5, 3);
        engine.start(fixed_now()).unwrap();
        let err = engine.start(fixed_now()).unwrap_err();
        assert!(matches!(err, ExamError::AlreadyStarted));
        assert_eq!(engine.state(), ExamState::InProgress);
    }

    #[test]
    fn answer_upserts_and_rejects_out_of_range() {
        let mut engine = engine(4, 4);
        engine.start(fixed_now()).unwrap();

        engine.answer(0, 1).unwrap();
        engine.answer(0, 2).unwrap();
        assert_eq!(engine.answer_for(0), Some(2));
        assert_eq!(engine.answered_count(), 1);

        let err = engine.answer(9, 0).unwrap_err();
        assert!(matches!(err, ExamError::InvalidPosition { position: 9, total: 4 }));

        let err = engine.answer(1, 7).unwrap_err();
        assert!(matches!(
            err,
            ExamError::InvalidOption { position: 1, option: 7, len: 3 }
        ));

        // Rejected input never corrupts the sheet.
        assert_eq!(engine.answered_count(), 1);
        assert_eq!(engine.answer_for(1), None);
    }

    #[test]
    fn answer_outside_a_session_is_rejected() {
        let mut engine = engine(3, 3);
        assert!(matches!(engine.answer(0, 0), Err(ExamError::NotInProgress)));
    }

    #[test]
    fn submit_scores_one_of_three() {
        let mut engine = engine(3, 3);
        engine.start(fixed_now()).unwrap();

        // Right answer at position 0, wrong at 1, position 2 left blank.
        let right = engine.selected()[0].correct_index();
        let wrong = (engine.selected()[1].correct_index() + 1) % 3;
        engine.answer(0, right).unwrap();
        engine.answer(1, wrong).unwrap();

        let result = engine.submit(fixed_now() + chrono::Duration::seconds(30)).unwrap();
        assert_eq!(result.score().correct(), 1);
        assert_eq!(result.score().total(), 3);
        assert_eq!(result.score().percent(), 33);
        assert_eq!(result.time_taken_seconds(), 30);
        assert!(!result.timed_out());
        assert_eq!(engine.state(), ExamState::Completed);
    }

    #[test]
    fn submit_is_idempotent() {
        let mut engine = engine(3, 3);
        engine.start(fixed_now()).unwrap();

        let first = engine.submit(fixed_now()).unwrap().id();
        let second = engine.submit(fixed_now() + chrono::Duration::seconds(5)).unwrap().id();
        assert_eq!(first, second);
        assert_eq!(engine.state(), ExamState::Completed);
    }

    #[test]
    fn submit_from_setup_is_rejected() {
        let mut engine = engine(3, 3);
        assert!(matches!(
            engine.submit(fixed_now()),
            Err(ExamError::NotInProgress)
        ));
    }

    #[test]
    fn countdown_ticks_down_then_expires_into_completed() {
        let mut engine = engine(4, 2);
        engine.start(fixed_now()).unwrap();
        engine.answer(0, 1).unwrap();

        let duration = engine.config().duration_seconds();
        for expected in (1..duration).rev() {
            let tick = engine.tick(fixed_now()).unwrap();
            assert_eq!(tick, Tick::Running { remaining_seconds: expected });
        }

        let tick = engine.tick(fixed_now()).unwrap();
        assert_eq!(tick, Tick::Expired);
        assert_eq!(engine.state(), ExamState::Completed);

        // The expired result carries exactly the answers present at expiry.
        let result = engine.result().unwrap();
        assert!(result.timed_out());
        assert_eq!(result.answers().len(), 1);
        assert_eq!(result.answers().get(&0), Some(&1));
    }

    #[test]
    fn tick_after_completion_is_rejected() {
        let mut engine = engine(3, 3);
        engine.start(fixed_now()).unwrap();
        engine.submit(fixed_now()).unwrap();
        assert!(matches!(
            engine.tick(fixed_now()),
            Err(ExamError::NotInProgress)
        ));
    }

    #[test]
    fn abort_discards_without_a_result() {
        let mut engine = engine(5, 3);
        engine.start(fixed_now()).unwrap();
        engine.answer(0, 0).unwrap();

        engine.abort().unwrap();
        assert_eq!(engine.state(), ExamState::Setup);
        assert!(engine.result().is_none());
        assert!(engine.selected().is_empty());

        // The engine is immediately reusable.
        engine.start(fixed_now()).unwrap();
        assert_eq!(engine.state(), ExamState::InProgress);
        assert_eq!(engine.answered_count(), 0);
    }

    #[test]
    fn reset_clears_session_state_for_a_retry() {
        let mut engine = engine(5, 3);
        engine.start(fixed_now()).unwrap();
        engine.answer(0, 0).unwrap();
        engine.submit(fixed_now()).unwrap();

        engine.reset().unwrap();
        assert_eq!(engine.state(), ExamState::Setup);
        assert!(engine.selected().is_empty());
        assert_eq!(engine.answered_count(), 0);
        assert_eq!(engine.remaining_seconds(), 0);
    }

    #[test]
    fn reset_requires_a_completed_session() {
        let mut engine = engine(5, 3);
        assert!(matches!(engine.reset(), Err(ExamError::NotCompleted)));

        engine.start(fixed_now()).unwrap();
        assert!(matches!(engine.reset(), Err(ExamError::NotCompleted)));
    }

    #[test]
    fn progress_reflects_the_session() {
        let mut engine = engine(4, 4);
        engine.start(fixed_now()).unwrap();
        engine.answer(2, 0).unwrap();
        engine.tick(fixed_now()).unwrap();

        let progress = engine.progress();
        assert_eq!(progress.total, 4);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining_seconds, 599);
        assert!(!progress.is_complete);
    }

    #[test]
    fn unrecorded_result_is_taken_once() {
        let mut engine = engine(3, 3);
        engine.start(fixed_now()).unwrap();
        engine.submit(fixed_now()).unwrap();

        assert!(engine.take_unrecorded_result().is_some());
        assert!(engine.take_unrecorded_result().is_none());
    }
}
