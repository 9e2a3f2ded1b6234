//! Behavior-adaptive engine
//!
//! Watches how the player moves and uses it to decide where food goes, how
//! hard the game is, and how loud the visuals get:
//! - `heatmap`: per-cell visit counter
//! - `movement`: bounded movement log and direction statistics
//! - `placement`: strategy selection and cell resolution
//! - `difficulty`: session outcomes and streak-based difficulty
//! - `intensity`: visual intensity derivation
//! - `snapshot`: persistable state and partial import
//! - `engine`: the owning facade the game loop talks to

pub mod difficulty;
pub mod engine;
pub mod error;
pub mod grid;
pub mod heatmap;
pub mod intensity;
pub mod movement;
pub mod placement;
pub mod snapshot;

pub use difficulty::{
    DifficultyController, Evaluation, MAX_DIFFICULTY, MIN_DIFFICULTY, PerformanceState,
    SessionProgress, Thresholds,
};
pub use engine::{AdaptiveConfig, AdaptiveEngine, now_ms};
pub use error::SnapshotError;
pub use grid::{GridCell, GridSpec};
pub use heatmap::{FrequencyGrid, HeatmapStatistics, Spot};
pub use movement::{
    DirectionCounts, MovementContext, MovementEvent, MovementLog, PatternAnalysis,
};
pub use placement::PlacementStrategy;
pub use snapshot::{AdaptationState, EngineSnapshot};
