//! The adaptive engine
//!
//! One owned value per player profile. It is fed by the game loop (moves,
//! session boundaries, consumptions) and answers placement requests and
//! rendering reads. All calls are synchronous; the caller serializes them.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, trace, warn};

use super::difficulty::{
    DifficultyController, PerformanceState, SessionProgress, is_valid_difficulty,
};
use super::error::SnapshotError;
use super::grid::GridSpec;
use super::heatmap::{FrequencyGrid, HeatmapStatistics, Spot};
use super::intensity::{
    INTENSITY_WINDOW, MAX_INTENSITY, MIN_INTENSITY, combined_intensity, movement_intensity,
};
use super::movement::{MovementContext, MovementEvent, MovementLog, PatternAnalysis};
use super::placement::{PlacementStrategy, resolve_cell, select_strategy};
use super::snapshot::{AdaptationState, EngineSnapshot, SnapshotPatch};
use crate::game::{Direction, Position};

/// Tunables for the adaptive engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Most movement events kept in memory
    pub movement_log_capacity: usize,
    /// Fixed seed for placement randomness; entropy when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            movement_log_capacity: 1000,
            seed: None,
        }
    }
}

/// Milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct AdaptiveEngine {
    grid: GridSpec,
    heatmap: FrequencyGrid,
    movements: MovementLog,
    controller: DifficultyController,
    strategy: PlacementStrategy,
    movement_intensity: u8,
    visual_intensity: u8,
    rng: StdRng,
}

impl AdaptiveEngine {
    pub fn new(grid: GridSpec, config: &AdaptiveConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let controller = DifficultyController::new();
        let visual_intensity = combined_intensity(MIN_INTENSITY, controller.difficulty());

        Self {
            grid,
            heatmap: FrequencyGrid::new(grid),
            movements: MovementLog::new(config.movement_log_capacity),
            controller,
            strategy: PlacementStrategy::default(),
            movement_intensity: MIN_INTENSITY,
            visual_intensity,
            rng,
        }
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    // ---- movement ---------------------------------------------------------

    /// Record one grid step. `position` is in external units.
    pub fn record_movement(
        &mut self,
        position: Position,
        direction: Direction,
        context: MovementContext,
    ) {
        self.record_movement_at(now_ms(), position, direction, context);
    }

    pub fn record_movement_at(
        &mut self,
        timestamp_ms: u64,
        position: Position,
        direction: Direction,
        context: MovementContext,
    ) {
        if !self.heatmap.record(position) {
            trace!(x = position.x, y = position.y, "movement outside grid not counted");
        }
        self.movements.append(MovementEvent {
            timestamp_ms,
            position,
            direction,
            context,
        });
        self.refresh_movement_intensity();
    }

    pub fn analyze_movement_patterns(&self) -> PatternAnalysis {
        self.movements.analyze()
    }

    /// Copy of the retained movement events, oldest first
    pub fn movement_history(&self) -> Vec<MovementEvent> {
        self.movements.to_vec()
    }

    // ---- placement --------------------------------------------------------

    /// Pick a cell for the next target, avoiding `excluded` (external units).
    pub fn suggest_placement(&mut self, excluded: &[Position]) -> Position {
        let strategy = select_strategy(&self.movements, self.controller.difficulty());
        self.strategy = strategy;

        let excluded: HashSet<Position> = excluded.iter().copied().collect();
        let position = resolve_cell(strategy, &self.heatmap, &excluded, &mut self.rng);
        debug!(
            strategy = strategy.name(),
            x = position.x,
            y = position.y,
            "placement suggested"
        );
        position
    }

    // ---- sessions and difficulty -----------------------------------------

    pub fn start_session(&mut self) {
        self.start_session_at(now_ms());
    }

    pub fn start_session_at(&mut self, now_ms: u64) {
        self.controller.start_session(now_ms);
    }

    /// Close the running session; returns the resulting difficulty
    pub fn end_session(&mut self, final_score: u32) -> u8 {
        self.end_session_at(now_ms(), final_score)
    }

    pub fn end_session_at(&mut self, now_ms: u64, final_score: u32) -> u8 {
        if self.controller.end_session(now_ms, final_score).is_some() {
            self.refresh_visual_intensity();
        }
        self.controller.difficulty()
    }

    pub fn record_consumption(&mut self, score: u32) {
        self.record_consumption_at(now_ms(), score);
    }

    pub fn record_consumption_at(&mut self, now_ms: u64, score: u32) {
        self.controller.record_consumption(now_ms, score);
    }

    /// Re-evaluate recent outcomes; returns the resulting difficulty
    pub fn calculate_difficulty(&mut self) -> u8 {
        if self.controller.calculate_difficulty().is_some() {
            self.refresh_visual_intensity();
        }
        self.controller.difficulty()
    }

    /// Out-of-range levels are ignored and `false` is returned.
    pub fn set_difficulty(&mut self, level: u8) -> bool {
        let accepted = self.controller.set_difficulty(level);
        if accepted {
            self.refresh_visual_intensity();
        }
        accepted
    }

    pub fn session_active(&self) -> bool {
        self.controller.session_active()
    }

    pub fn session_progress(&self) -> SessionProgress {
        self.controller.progress()
    }

    // ---- read-only views ---------------------------------------------------

    pub fn difficulty(&self) -> u8 {
        self.controller.difficulty()
    }

    pub fn placement_strategy(&self) -> PlacementStrategy {
        self.strategy
    }

    pub fn visual_intensity(&self) -> u8 {
        self.visual_intensity
    }

    pub fn movement_intensity(&self) -> u8 {
        self.movement_intensity
    }

    pub fn performance(&self) -> PerformanceState {
        self.controller.performance().clone()
    }

    pub fn adaptation(&self) -> AdaptationState {
        AdaptationState {
            difficulty_level: self.controller.difficulty(),
            placement_strategy: self.strategy,
            visual_intensity: self.visual_intensity,
            movement_intensity: self.movement_intensity,
            difficulty_history: self.controller.history().to_vec(),
        }
    }

    pub fn normalized_heatmap(&self) -> Vec<Vec<f64>> {
        self.heatmap.normalized()
    }

    pub fn raw_heatmap(&self) -> Vec<Vec<u32>> {
        self.heatmap.raw()
    }

    pub fn hotspots(&self, threshold: f64) -> Vec<Spot> {
        self.heatmap.hotspots(threshold)
    }

    pub fn coldspots(&self, threshold: f64) -> Vec<Spot> {
        self.heatmap.coldspots(threshold)
    }

    pub fn heatmap_statistics(&self) -> HeatmapStatistics {
        self.heatmap.statistics()
    }

    /// Zero the frequency grid. Only for explicit clears by the player.
    pub fn reset_heatmap(&mut self) {
        info!("frequency grid reset");
        self.heatmap.reset();
    }

    // ---- persistence -------------------------------------------------------

    pub fn export_state(&self) -> EngineSnapshot {
        EngineSnapshot {
            frequency_grid: self.heatmap.raw(),
            performance_state: self.performance(),
            adaptation_state: self.adaptation(),
        }
    }

    /// Merge a previously exported snapshot into this engine.
    ///
    /// Fields that are missing or unreadable keep their current values. A
    /// snapshot of the wrong shape is rejected and nothing is applied.
    pub fn import_state(&mut self, snapshot: &Value) -> Result<(), SnapshotError> {
        let patch = SnapshotPatch::parse(snapshot)?;

        let heatmap = patch.frequency_grid.and_then(|rows| {
            let restored = FrequencyGrid::from_rows(self.grid, &rows);
            if restored.is_none() {
                warn!(
                    width = self.grid.width(),
                    height = self.grid.height(),
                    "snapshot frequency grid has different dimensions, keeping current grid"
                );
            }
            restored
        });
        if let Some(heatmap) = heatmap {
            self.heatmap = heatmap;
        }

        let mut performance = self.controller.performance().clone();
        patch.performance.apply_to(&mut performance);
        self.controller.restore_performance(performance);

        let adaptation = patch.adaptation;
        if let Some(level) = adaptation.difficulty_level {
            if !is_valid_difficulty(level) {
                warn!(level, "snapshot difficulty out of range, keeping current");
            }
            self.controller.set_difficulty(level);
        }
        if let Some(strategy) = adaptation.placement_strategy {
            self.strategy = strategy;
        }
        if let Some(intensity) = adaptation.movement_intensity {
            if (MIN_INTENSITY..=MAX_INTENSITY).contains(&intensity) {
                self.movement_intensity = intensity;
            }
        }
        if let Some(history) = adaptation.difficulty_history {
            self.controller.restore_history(history);
        }
        self.refresh_visual_intensity();

        info!(
            difficulty = self.controller.difficulty(),
            sessions = self.controller.performance().total_sessions,
            "adaptive state imported"
        );
        Ok(())
    }

    fn refresh_movement_intensity(&mut self) {
        let directions: Vec<Direction> = self
            .movements
            .recent(INTENSITY_WINDOW)
            .map(|event| event.direction)
            .collect();
        self.movement_intensity = movement_intensity(&directions);
        self.refresh_visual_intensity();
    }

    fn refresh_visual_intensity(&mut self) {
        self.visual_intensity =
            combined_intensity(self.movement_intensity, self.controller.difficulty());
    }
}
