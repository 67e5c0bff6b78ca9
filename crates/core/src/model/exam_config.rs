/// Shortest accepted exam duration (10 minutes).
pub const MIN_DURATION_SECONDS: u32 = 600;
/// Longest accepted exam duration (8 hours).
pub const MAX_DURATION_SECONDS: u32 = 28_800;

/// Parameters accepted when starting an exam session.
///
/// Out-of-range values are clamped rather than rejected; a session start can
/// only fail on an empty question pool. The defaults mirror the PECB exam
/// format: 80 questions, 180 minutes, 70 % pass mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamConfig {
    num_questions: u32,
    duration_seconds: u32,
    pass_threshold: u32,
}

impl ExamConfig {
    /// Build a config, clamping every field into its accepted range.
    ///
    /// - `num_questions` is raised to at least 1 (and later capped to the
    ///   pool size when the session starts)
    /// - `duration_seconds` is clamped to
    ///   [`MIN_DURATION_SECONDS`]..=[`MAX_DURATION_SECONDS`]
    /// - `pass_threshold` is a percentage, clamped to 0..=100
    #[must_use]
    pub fn new(num_questions: u32, duration_seconds: u32, pass_threshold: u32) -> Self {
        Self {
            num_questions: num_questions.max(1),
            duration_seconds: duration_seconds.clamp(MIN_DURATION_SECONDS, MAX_DURATION_SECONDS),
            pass_threshold: pass_threshold.min(100),
        }
    }

    /// Short practice run: 20 questions in 60 minutes.
    #[must_use]
    pub fn quick_practice() -> Self {
        Self::new(20, 3_600, 70)
    }

    #[must_use]
    pub fn num_questions(&self) -> u32 {
        self.num_questions
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn pass_threshold(&self) -> u32 {
        self.pass_threshold
    }
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self::new(80, 10_800, 70)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_pecb_format() {
        let config = ExamConfig::default();
        assert_eq!(config.num_questions(), 80);
        assert_eq!(config.duration_seconds(), 10_800);
        assert_eq!(config.pass_threshold(), 70);
    }

    #[test]
    fn duration_is_clamped_to_range() {
        assert_eq!(ExamConfig::new(10, 30, 70).duration_seconds(), MIN_DURATION_SECONDS);
        assert_eq!(
            ExamConfig::new(10, 1_000_000, 70).duration_seconds(),
            MAX_DURATION_SECONDS
        );
    }

    #[test]
    fn num_questions_has_floor_of_one() {
        assert_eq!(ExamConfig::new(0, 3_600, 70).num_questions(), 1);
    }

    #[test]
    fn pass_threshold_is_capped_at_100() {
        assert_eq!(ExamConfig::new(10, 3_600, 250).pass_threshold(), 100);
    }

    #[test]
    fn quick_practice_preset() {
        let config = ExamConfig::quick_practice();
        assert_eq!(config.num_questions(), 20);
        assert_eq!(config.duration_seconds(), 3_600);
    }
}
