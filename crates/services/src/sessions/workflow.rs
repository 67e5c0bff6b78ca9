use chrono::{DateTime, Utc};
use std::sync::Arc;

use exam_core::model::ExamResult;
use storage::repository::HistoryRepository;

use super::engine::{ExamEngine, Tick};
use crate::Clock;
use crate::error::ExamError;

/// Default name of the persisted history record.
pub const DEFAULT_HISTORY_RECORD: &str = "exam-history";

/// Orchestrates clocked session transitions and history persistence.
///
/// Owns the append-only history log: it is loaded once at startup and this
/// service is its sole writer. Every completed attempt is appended exactly
/// once (the engine hands each result over a single time) and the persisted
/// record is rewritten in full after each append.
#[derive(Clone)]
pub struct ExamLoopService {
    clock: Clock,
    history: Arc<dyn HistoryRepository>,
    record_name: String,
    log: Vec<ExamResult>,
}

impl ExamLoopService {
    /// Build the service, loading the persisted history once.
    ///
    /// A missing record is an empty history; an unreadable one degrades to
    /// empty inside the storage adapter instead of failing startup.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Storage` if the repository itself is unreachable.
    pub async fn load(
        clock: Clock,
        history: Arc<dyn HistoryRepository>,
        record_name: impl Into<String>,
    ) -> Result<Self, ExamError> {
        let record_name = record_name.into();
        let log = history.load_history(&record_name).await?;
        tracing::debug!(attempts = log.len(), record = %record_name, "exam history loaded");
        Ok(Self {
            clock,
            history,
            record_name,
            log,
        })
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Start a session on the given engine, stamping it from the clock.
    ///
    /// # Errors
    ///
    /// Propagates `ExamError::EmptyPool` / `ExamError::AlreadyStarted` from
    /// the engine; the engine state is unchanged on failure.
    pub fn start(&self, engine: &mut ExamEngine) -> Result<(), ExamError> {
        engine.start(self.clock.now())
    }

    /// Record an answer. Pure delegation; no clock or persistence involved.
    ///
    /// # Errors
    ///
    /// Propagates the engine's range and state errors.
    pub fn answer(
        &self,
        engine: &mut ExamEngine,
        position: usize,
        option: usize,
    ) -> Result<(), ExamError> {
        engine.answer(position, option)
    }

    /// Drive the countdown by one second; persists the result on expiry.
    ///
    /// # Errors
    ///
    /// Propagates engine state errors and storage failures.
    pub async fn tick(&mut self, engine: &mut ExamEngine) -> Result<Tick, ExamError> {
        let tick = engine.tick(self.clock.now())?;
        if matches!(tick, Tick::Expired) {
            self.record(engine).await?;
        }
        Ok(tick)
    }

    /// Submit the session and persist its result.
    ///
    /// Safe to call again on a completed session: the engine's submit is
    /// idempotent and the result is appended to history only once.
    ///
    /// # Errors
    ///
    /// Propagates engine state errors and storage failures.
    pub async fn submit(&mut self, engine: &mut ExamEngine) -> Result<ExamResult, ExamError> {
        engine.submit(self.clock.now())?;
        self.record(engine).await?;
        engine.result().cloned().ok_or(ExamError::NotCompleted)
    }

    /// Abort the running session. Nothing is recorded.
    ///
    /// # Errors
    ///
    /// Propagates `ExamError::NotInProgress`.
    pub fn abort(&self, engine: &mut ExamEngine) -> Result<(), ExamError> {
        engine.abort()
    }

    /// Return a completed engine to Setup. History is untouched.
    ///
    /// # Errors
    ///
    /// Propagates `ExamError::NotCompleted`.
    pub fn reset(&self, engine: &mut ExamEngine) -> Result<(), ExamError> {
        engine.reset()
    }

    /// Rewrite the persisted record from the in-memory log.
    ///
    /// Useful to retry after a transient storage failure during `submit` or
    /// `tick`: the appended result stays in the log even when the rewrite
    /// failed.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Storage` if the rewrite fails again.
    pub async fn flush(&self) -> Result<(), ExamError> {
        self.history
            .save_history(&self.record_name, &self.log)
            .await?;
        Ok(())
    }

    async fn record(&mut self, engine: &mut ExamEngine) -> Result<(), ExamError> {
        let Some(result) = engine.take_unrecorded_result() else {
            return Ok(());
        };
        self.log.push(result);
        self.flush().await
    }

    /// The in-memory history log, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ExamResult] {
        &self.log
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
