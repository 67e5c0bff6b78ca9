use std::sync::Arc;

use exam_core::analytics::AnalyticsSummary;
use storage::repository::HistoryRepository;

use crate::error::ExamError;

/// Read-only analytics facade over the persisted attempt history.
///
/// Loads a fresh snapshot on every call and derives everything from it, so a
/// summary can be computed while the next session is in progress: the two
/// share no mutable state.
#[derive(Clone)]
pub struct AnalyticsService {
    history: Arc<dyn HistoryRepository>,
    record_name: String,
    pass_threshold: u32,
}

impl AnalyticsService {
    #[must_use]
    pub fn new(
        history: Arc<dyn HistoryRepository>,
        record_name: impl Into<String>,
        pass_threshold: u32,
    ) -> Self {
        Self {
            history,
            record_name: record_name.into(),
            pass_threshold,
        }
    }

    /// Derive the full analytics summary from the current history snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Storage` when the repository cannot be read.
    pub async fn summary(&self) -> Result<AnalyticsSummary, ExamError> {
        let snapshot = self.history.load_history(&self.record_name).await?;
        Ok(AnalyticsSummary::from_history(
            &snapshot,
            self.pass_threshold,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::analytics::TrendSignal;
    use exam_core::model::{AttemptId, ExamResult, Question, QuestionDraft};
    use exam_core::time::fixed_now;
    use chrono::Duration;
    use std::collections::HashMap;
    use storage::repository::InMemoryHistoryStore;

    fn attempt(correct_of_ten: usize) -> ExamResult {
        let questions: Vec<Question> = (0..10)
            .map(|i| {
                QuestionDraft::new(format!("plain text {i}"), vec!["a".into(), "b".into()], 0)
                    .validate()
                    .unwrap()
            })
            .collect();
        let answers: HashMap<usize, usize> = (0..correct_of_ten).map(|i| (i, 0)).collect();
        ExamResult::new(
            AttemptId::new(),
            questions,
            answers,
            fixed_now(),
            fixed_now() + Duration::seconds(300),
            false,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn summary_reflects_the_stored_snapshot() {
        let store = InMemoryHistoryStore::new();
        let history = vec![attempt(5), attempt(8)];
        store.save_history("exam-history", &history).await.unwrap();

        let svc = AnalyticsService::new(Arc::new(store), "exam-history", 70);
        let summary = svc.summary().await.unwrap();

        assert_eq!(summary.overall.total_exams, 2);
        assert_eq!(summary.overall.average_score, 65);
        assert_eq!(summary.overall.pass_rate, 50);
        assert_eq!(summary.over_time.len(), 2);
        assert_eq!(summary.over_time[1].percent, 80);
        assert_eq!(summary.recent.unwrap().best, 80);
    }

    #[tokio::test]
    async fn empty_store_gives_empty_summary() {
        let store = InMemoryHistoryStore::new();
        let svc = AnalyticsService::new(Arc::new(store), "exam-history", 70);
        let summary = svc.summary().await.unwrap();

        assert_eq!(summary.overall.total_exams, 0);
        assert!(summary.weak_areas.is_empty());
        assert!(summary.over_time.is_empty());
        assert_eq!(summary.trend, TrendSignal::Steady);
        assert!(summary.recent.is_none());
    }
}
