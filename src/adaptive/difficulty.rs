//! Session performance tracking and difficulty control
//!
//! Difficulty only moves one level at a time, and only after three
//! consecutive session evaluations land on the same side of the
//! performance thresholds.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 10;
pub const DEFAULT_DIFFICULTY: u8 = 5;

/// Final scores kept for the rolling performance signal
pub const RECENT_OUTCOME_LIMIT: usize = 5;
/// Outcomes required before difficulty is evaluated at all
pub const MIN_OUTCOMES_FOR_ADJUSTMENT: usize = 3;
/// Consecutive evaluations needed to move difficulty one level
pub const STREAK_TO_ADJUST: u32 = 3;

const SCORE_THRESHOLD_FLOOR: f64 = 50.0;
const AVERAGE_WEIGHT: f64 = 0.8;
const HIGH_FACTOR: f64 = 1.5;
const LOW_FACTOR: f64 = 0.5;
const DIFFICULTY_HISTORY_LIMIT: usize = 100;

pub fn is_valid_difficulty(level: u8) -> bool {
    (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&level)
}

/// Session outcomes and streak counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PerformanceState {
    /// Most recent final scores, oldest first
    pub recent_outcomes: VecDeque<u32>,
    /// Mean of `recent_outcomes`
    pub average_score: f64,
    pub average_session_duration_ms: f64,
    pub total_sessions: u32,
    pub consecutive_high_streak: u32,
    pub consecutive_low_streak: u32,
    /// Start of the running session, if any
    pub session_start_ms: Option<u64>,
}

impl PerformanceState {
    pub fn mean_recent_outcome(&self) -> Option<f64> {
        if self.recent_outcomes.is_empty() {
            return None;
        }
        let sum: u64 = self.recent_outcomes.iter().map(|&s| u64::from(s)).sum();
        Some(sum as f64 / self.recent_outcomes.len() as f64)
    }

    fn push_outcome(&mut self, score: u32) {
        if self.recent_outcomes.len() >= RECENT_OUTCOME_LIMIT {
            self.recent_outcomes.pop_front();
        }
        self.recent_outcomes.push_back(score);
        self.average_score = self.mean_recent_outcome().unwrap_or(0.0);
    }
}

/// Score bands derived from the stored average score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub score: f64,
    pub high: f64,
    pub low: f64,
}

impl Thresholds {
    /// Bands for a stored average score.
    ///
    /// `end_session` keeps `average_score` equal to the recent mean, and
    /// that mean never reaches `high` against its own average. Only an
    /// imported average below the recent mean can start a high streak.
    pub fn for_average(average_score: f64) -> Self {
        let score = SCORE_THRESHOLD_FLOOR.max(average_score * AVERAGE_WEIGHT);
        Self {
            score,
            high: score * HIGH_FACTOR,
            low: score * LOW_FACTOR,
        }
    }
}

/// Where one evaluation of recent outcomes landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    InsufficientData,
    High,
    Moderate,
    Low,
}

/// Within-session bookkeeping; not persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionProgress {
    pub consumptions: u32,
    pub last_consumption_ms: Option<u64>,
    pub best_score: u32,
}

#[derive(Debug, Clone)]
pub struct DifficultyController {
    performance: PerformanceState,
    difficulty: u8,
    history: Vec<u8>,
    progress: SessionProgress,
}

impl DifficultyController {
    pub fn new() -> Self {
        Self {
            performance: PerformanceState::default(),
            difficulty: DEFAULT_DIFFICULTY,
            history: Vec::new(),
            progress: SessionProgress::default(),
        }
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn performance(&self) -> &PerformanceState {
        &self.performance
    }

    /// Levels reached through adjustments, oldest first
    pub fn history(&self) -> &[u8] {
        &self.history
    }

    pub fn progress(&self) -> SessionProgress {
        self.progress
    }

    pub fn session_active(&self) -> bool {
        self.performance.session_start_ms.is_some()
    }

    /// Accept `level` only when it lies in `1..=10`; anything else is ignored.
    pub fn set_difficulty(&mut self, level: u8) -> bool {
        if !is_valid_difficulty(level) {
            debug!(level, "ignoring out-of-range difficulty");
            return false;
        }
        self.difficulty = level;
        true
    }

    pub(crate) fn restore_performance(&mut self, mut performance: PerformanceState) {
        while performance.recent_outcomes.len() > RECENT_OUTCOME_LIMIT {
            performance.recent_outcomes.pop_front();
        }
        self.performance = performance;
    }

    pub(crate) fn restore_history(&mut self, history: Vec<u8>) {
        self.history = history.into_iter().filter(|&l| is_valid_difficulty(l)).collect();
        self.trim_history();
    }

    pub fn start_session(&mut self, now_ms: u64) {
        self.performance.session_start_ms = Some(now_ms);
        self.progress = SessionProgress::default();
    }

    pub fn record_consumption(&mut self, now_ms: u64, score: u32) {
        self.progress.consumptions += 1;
        self.progress.last_consumption_ms = Some(now_ms);
        self.progress.best_score = self.progress.best_score.max(score);
    }

    /// Close the running session and re-evaluate difficulty.
    ///
    /// Without a prior [`start_session`](Self::start_session) the session
    /// counts with a zero duration. Returns the new level if it changed.
    pub fn end_session(&mut self, now_ms: u64, final_score: u32) -> Option<u8> {
        let duration_ms = self
            .performance
            .session_start_ms
            .map(|start| now_ms.saturating_sub(start))
            .unwrap_or(0);

        let perf = &mut self.performance;
        perf.push_outcome(final_score);
        perf.total_sessions = perf.total_sessions.saturating_add(1);
        let n = f64::from(perf.total_sessions.max(1));
        perf.average_session_duration_ms =
            (perf.average_session_duration_ms * (n - 1.0) + duration_ms as f64) / n;
        perf.session_start_ms = None;

        info!(
            final_score,
            duration_ms,
            total_sessions = perf.total_sessions,
            average_score = perf.average_score,
            "session ended"
        );

        self.calculate_difficulty()
    }

    /// Classify the recent outcomes against the current thresholds
    pub fn evaluate(&self) -> Evaluation {
        if self.performance.recent_outcomes.len() < MIN_OUTCOMES_FOR_ADJUSTMENT {
            return Evaluation::InsufficientData;
        }
        let Some(mean) = self.performance.mean_recent_outcome() else {
            return Evaluation::InsufficientData;
        };

        let thresholds = Thresholds::for_average(self.performance.average_score);
        if mean >= thresholds.high {
            Evaluation::High
        } else if mean <= thresholds.low {
            Evaluation::Low
        } else {
            Evaluation::Moderate
        }
    }

    /// Update the streak counters and move difficulty when a streak completes.
    /// Returns the new level if it changed.
    pub fn calculate_difficulty(&mut self) -> Option<u8> {
        let evaluation = self.evaluate();
        let perf = &mut self.performance;
        let target = match evaluation {
            Evaluation::InsufficientData => return None,
            Evaluation::High => {
                perf.consecutive_high_streak = perf.consecutive_high_streak.saturating_add(1);
                perf.consecutive_low_streak = 0;
                if perf.consecutive_high_streak < STREAK_TO_ADJUST {
                    None
                } else {
                    perf.consecutive_high_streak = 0;
                    Some(self.difficulty.saturating_add(1).min(MAX_DIFFICULTY))
                }
            }
            Evaluation::Low => {
                perf.consecutive_low_streak = perf.consecutive_low_streak.saturating_add(1);
                perf.consecutive_high_streak = 0;
                if perf.consecutive_low_streak < STREAK_TO_ADJUST {
                    None
                } else {
                    perf.consecutive_low_streak = 0;
                    Some(self.difficulty.saturating_sub(1).max(MIN_DIFFICULTY))
                }
            }
            Evaluation::Moderate => {
                perf.consecutive_high_streak = 0;
                perf.consecutive_low_streak = 0;
                None
            }
        };

        debug!(
            ?evaluation,
            high_streak = self.performance.consecutive_high_streak,
            low_streak = self.performance.consecutive_low_streak,
            "difficulty evaluated"
        );

        let level = target.filter(|&level| level != self.difficulty)?;
        info!(from = self.difficulty, to = level, "difficulty changed");
        self.difficulty = level;
        self.history.push(level);
        self.trim_history();
        Some(level)
    }

    fn trim_history(&mut self) {
        if self.history.len() > DIFFICULTY_HISTORY_LIMIT {
            let excess = self.history.len() - DIFFICULTY_HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with(outcomes: &[u32], average_score: f64, difficulty: u8) -> DifficultyController {
        let mut controller = DifficultyController::new();
        controller.restore_performance(PerformanceState {
            recent_outcomes: outcomes.iter().copied().collect(),
            average_score,
            ..PerformanceState::default()
        });
        assert!(controller.set_difficulty(difficulty));
        controller
    }

    #[test]
    fn test_thresholds_have_a_floor() {
        let low_average = Thresholds::for_average(5.0);
        assert_eq!(low_average.score, 50.0);
        assert_eq!(low_average.high, 75.0);
        assert_eq!(low_average.low, 25.0);

        let high_average = Thresholds::for_average(100.0);
        assert_eq!(high_average.score, 80.0);
        assert_eq!(high_average.high, 120.0);
        assert_eq!(high_average.low, 40.0);
    }

    #[test]
    fn test_insufficient_data_keeps_difficulty() {
        let mut controller = controller_with(&[0, 0], 0.0, 6);
        assert_eq!(controller.evaluate(), Evaluation::InsufficientData);
        assert_eq!(controller.calculate_difficulty(), None);
        assert_eq!(controller.difficulty(), 6);
        assert_eq!(controller.performance().consecutive_low_streak, 0);
    }

    #[test]
    fn test_single_low_evaluation_only_bumps_streak() {
        let mut controller = controller_with(&[5, 6, 4], 5.0, 1);
        assert_eq!(controller.calculate_difficulty(), None);
        assert_eq!(controller.performance().consecutive_low_streak, 1);
        assert_eq!(controller.difficulty(), 1);
    }

    #[test]
    fn test_three_high_evaluations_raise_difficulty() {
        let mut controller = controller_with(&[100, 100, 100], 50.0, 4);
        assert_eq!(controller.calculate_difficulty(), None);
        assert_eq!(controller.calculate_difficulty(), None);
        assert_eq!(controller.performance().consecutive_high_streak, 2);
        assert_eq!(controller.calculate_difficulty(), Some(5));
        assert_eq!(controller.difficulty(), 5);
        assert_eq!(controller.performance().consecutive_high_streak, 0);
        assert_eq!(controller.history(), &[5]);
    }

    #[test]
    fn test_difficulty_is_clamped_at_the_top() {
        let mut controller = controller_with(&[100, 100, 100], 50.0, MAX_DIFFICULTY);
        for _ in 0..3 {
            assert_eq!(controller.calculate_difficulty(), None);
        }
        assert_eq!(controller.difficulty(), MAX_DIFFICULTY);
        assert_eq!(controller.performance().consecutive_high_streak, 0);
        assert!(controller.history().is_empty());
    }

    #[test]
    fn test_moderate_evaluation_resets_streaks() {
        let mut controller = controller_with(&[5, 6, 4], 5.0, 3);
        controller.calculate_difficulty();
        assert_eq!(controller.performance().consecutive_low_streak, 1);

        controller.restore_performance(PerformanceState {
            recent_outcomes: [40, 40, 40].into_iter().collect(),
            average_score: 40.0,
            consecutive_low_streak: 1,
            ..PerformanceState::default()
        });
        assert_eq!(controller.evaluate(), Evaluation::Moderate);
        controller.calculate_difficulty();
        assert_eq!(controller.performance().consecutive_low_streak, 0);
        assert_eq!(controller.performance().consecutive_high_streak, 0);
    }

    #[test]
    fn test_end_session_bookkeeping() {
        let mut controller = DifficultyController::new();
        controller.start_session(1_000);
        assert!(controller.session_active());
        controller.end_session(4_000, 12);

        controller.start_session(10_000);
        controller.end_session(11_000, 8);

        let perf = controller.performance();
        assert_eq!(perf.total_sessions, 2);
        assert_eq!(perf.recent_outcomes, VecDeque::from(vec![12, 8]));
        assert_eq!(perf.average_score, 10.0);
        assert_eq!(perf.average_session_duration_ms, 2_000.0);
        assert_eq!(perf.session_start_ms, None);
    }

    #[test]
    fn test_end_session_without_start_counts_zero_duration() {
        let mut controller = DifficultyController::new();
        controller.end_session(50_000, 3);
        assert_eq!(controller.performance().average_session_duration_ms, 0.0);
        assert_eq!(controller.performance().total_sessions, 1);
    }

    #[test]
    fn test_recent_outcomes_are_bounded() {
        let mut controller = DifficultyController::new();
        for score in 1..=7 {
            controller.end_session(0, score);
        }
        let perf = controller.performance();
        assert_eq!(perf.recent_outcomes, VecDeque::from(vec![3, 4, 5, 6, 7]));
        assert_eq!(perf.average_score, 5.0);
    }

    #[test]
    fn test_low_sessions_lower_difficulty() {
        let mut controller = controller_with(&[5, 6, 4], 5.0, 4);
        assert_eq!(controller.end_session(0, 5), None);
        assert_eq!(controller.end_session(0, 5), None);
        assert_eq!(controller.end_session(0, 5), Some(3));
        assert_eq!(controller.performance().consecutive_low_streak, 0);
    }

    #[test]
    fn test_invalid_difficulty_is_rejected() {
        let mut controller = DifficultyController::new();
        assert!(!controller.set_difficulty(0));
        assert!(!controller.set_difficulty(11));
        assert_eq!(controller.difficulty(), DEFAULT_DIFFICULTY);
        assert!(controller.set_difficulty(10));
        assert_eq!(controller.difficulty(), 10);
    }

    #[test]
    fn test_consumption_progress_resets_per_session() {
        let mut controller = DifficultyController::new();
        controller.start_session(0);
        controller.record_consumption(500, 1);
        controller.record_consumption(900, 2);
        assert_eq!(controller.progress().consumptions, 2);
        assert_eq!(controller.progress().last_consumption_ms, Some(900));
        assert_eq!(controller.progress().best_score, 2);

        controller.start_session(1_000);
        assert_eq!(controller.progress(), SessionProgress::default());
    }

    #[test]
    fn test_restored_history_drops_invalid_levels() {
        let mut controller = DifficultyController::new();
        controller.restore_history(vec![4, 0, 12, 5]);
        assert_eq!(controller.history(), &[4, 5]);
    }
}
