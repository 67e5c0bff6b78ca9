//! History analytics: summary statistics, weak areas, and trend series.
//!
//! Everything here is derived on demand from a slice of past results; nothing
//! is cached or persisted, so a recomputation always reflects its input.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::category::{self, Category};
use crate::model::{ExamResult, Score};

//
// ─── OVERALL STATS ─────────────────────────────────────────────────────────────
//

/// Headline statistics across the whole attempt history.
///
/// All fields are zero for an empty history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OverallStats {
    pub total_exams: u32,
    /// Rounded mean of attempt percentages.
    pub average_score: u32,
    /// Percentage of attempts at or above the pass threshold.
    pub pass_rate: u32,
    pub total_time_spent_minutes: u64,
    pub average_time_per_exam_minutes: u64,
    /// Mean of the last up-to-3 percentages minus the mean of the first
    /// up-to-3; positive numbers mean scores are improving.
    pub improvement_trend: i64,
}

/// Compute headline statistics; `pass_threshold` is a percentage (usually 70).
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn overall_stats(history: &[ExamResult], pass_threshold: u32) -> OverallStats {
    if history.is_empty() {
        return OverallStats::default();
    }

    let percents: Vec<f64> = history
        .iter()
        .map(|result| f64::from(result.score().percent()))
        .collect();

    let total = history.len();
    let passed = history
        .iter()
        .filter(|result| result.score().passed(pass_threshold))
        .count();

    let total_seconds: i64 = history.iter().map(ExamResult::time_taken_seconds).sum();
    let total_minutes = (total_seconds as f64 / 60.0).round();
    let average_minutes = (total_minutes / total as f64).round();

    let window = total.min(3);
    let recent_mean = mean(&percents[total - window..]);
    let early_mean = mean(&percents[..window]);

    OverallStats {
        total_exams: total as u32,
        average_score: mean(&percents).round() as u32,
        pass_rate: (100.0 * passed as f64 / total as f64).round() as u32,
        total_time_spent_minutes: total_minutes.max(0.0) as u64,
        average_time_per_exam_minutes: average_minutes.max(0.0) as u64,
        improvement_trend: (recent_mean - early_mean).round() as i64,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

//
// ─── WEAK AREAS ────────────────────────────────────────────────────────────────
//

/// Aggregate correctness for one question category across the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeakArea {
    pub category: Category,
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

/// Per-category correctness across every (result, question) occurrence.
///
/// A question seen in three sessions counts three times. Only categories that
/// occurred are returned, weakest first; ties keep taxonomy order.
#[must_use]
pub fn weak_areas(history: &[ExamResult]) -> Vec<WeakArea> {
    let mut tally = [(0_u32, 0_u32); Category::ALL.len()];

    for result in history {
        for (position, question) in result.questions().iter().enumerate() {
            let slot = &mut tally[category::classify(question) as usize];
            slot.1 += 1;
            if result.answers().get(&position) == Some(&question.correct_index()) {
                slot.0 += 1;
            }
        }
    }

    let mut areas: Vec<WeakArea> = Category::ALL
        .iter()
        .zip(tally)
        .filter(|(_, (_, total))| *total > 0)
        .map(|(&category, (correct, total))| WeakArea {
            category,
            correct,
            total,
            percentage: Score::new(correct, total).percent(),
        })
        .collect();

    areas.sort_by_key(|area| area.percentage);
    areas
}

//
// ─── PERFORMANCE SERIES ────────────────────────────────────────────────────────
//

/// One point of the score-over-time series, in history order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerformancePoint {
    /// 1-based attempt number.
    pub attempt: usize,
    pub percent: u32,
    pub completed_at: DateTime<Utc>,
    pub time_taken_seconds: i64,
}

/// The raw series a trend display consumes.
#[must_use]
pub fn performance_over_time(history: &[ExamResult]) -> Vec<PerformancePoint> {
    history
        .iter()
        .enumerate()
        .map(|(index, result)| PerformancePoint {
            attempt: index + 1,
            percent: result.score().percent(),
            completed_at: result.completed_at(),
            time_taken_seconds: result.time_taken_seconds(),
        })
        .collect()
}

//
// ─── TREND & RECENT ────────────────────────────────────────────────────────────
//

/// Coarse reading of the improvement trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendSignal {
    Improving,
    Declining,
    Steady,
}

impl TrendSignal {
    /// More than five points either way counts as a real movement.
    #[must_use]
    pub fn from_trend(improvement_trend: i64) -> Self {
        if improvement_trend > 5 {
            TrendSignal::Improving
        } else if improvement_trend < -5 {
            TrendSignal::Declining
        } else {
            TrendSignal::Steady
        }
    }
}

/// Last/average/best percentages for the setup-screen summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecentPerformance {
    pub last: u32,
    pub average: u32,
    pub best: u32,
}

/// `None` when there is no history yet.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn recent_performance(history: &[ExamResult]) -> Option<RecentPerformance> {
    let last = history.last()?.score().percent();
    let percents: Vec<f64> = history
        .iter()
        .map(|result| f64::from(result.score().percent()))
        .collect();
    let best = history
        .iter()
        .map(|result| result.score().percent())
        .max()
        .unwrap_or(0);

    Some(RecentPerformance {
        last,
        average: mean(&percents).round() as u32,
        best,
    })
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Everything the analytics views need, derived in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub overall: OverallStats,
    pub weak_areas: Vec<WeakArea>,
    pub over_time: Vec<PerformancePoint>,
    pub trend: TrendSignal,
    pub recent: Option<RecentPerformance>,
}

impl AnalyticsSummary {
    #[must_use]
    pub fn from_history(history: &[ExamResult], pass_threshold: u32) -> Self {
        let overall = overall_stats(history, pass_threshold);
        Self {
            overall,
            weak_areas: weak_areas(history),
            over_time: performance_over_time(history),
            trend: TrendSignal::from_trend(overall.improvement_trend),
            recent: recent_performance(history),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
