//! Placement strategist
//!
//! Picks where the next target goes. Strategy selection looks at how varied
//! the player's movement is and at the current difficulty; cell resolution
//! then falls through `strategy -> uniform random -> origin` until one layer
//! produces a cell.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::heatmap::FrequencyGrid;
use super::movement::MovementLog;
use crate::game::Position;

/// Below this many logged moves the strategy follows difficulty alone
pub const COLD_START_MOVEMENTS: usize = 20;
/// Diversity under this favors sparse cells
pub const SPARSE_DIVERSITY_CEILING: f64 = 0.6;
/// Diversity over this favors moderately visited cells
pub const MODERATE_DIVERSITY_FLOOR: f64 = 0.8;

const HARD_DIFFICULTY: u8 = 7;
const EASY_DIFFICULTY: u8 = 3;
const EASIEST_DIFFICULTY: u8 = 2;

const COLDSPOT_THRESHOLD: f64 = 0.3;
const COLDEST_FRACTION: f64 = 0.3;
const MODERATE_BAND: (f64, f64) = (0.2, 0.6);
pub const RANDOM_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementStrategy {
    /// Uniform over the board
    #[default]
    Random,
    /// Rarely visited cells; the challenging choice
    SparseFavoring,
    /// Cells with middling traffic; the accessible choice
    ModerateFavoring,
}

impl PlacementStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            PlacementStrategy::Random => "random",
            PlacementStrategy::SparseFavoring => "sparse",
            PlacementStrategy::ModerateFavoring => "moderate",
        }
    }
}

/// Strategy implied by difficulty alone
pub fn strategy_for_difficulty(difficulty: u8) -> PlacementStrategy {
    if difficulty >= HARD_DIFFICULTY {
        PlacementStrategy::SparseFavoring
    } else if difficulty <= EASY_DIFFICULTY {
        PlacementStrategy::ModerateFavoring
    } else {
        PlacementStrategy::Random
    }
}

/// Choose the strategy for the next placement
pub fn select_strategy(movements: &MovementLog, difficulty: u8) -> PlacementStrategy {
    let chosen = if movements.len() < COLD_START_MOVEMENTS {
        strategy_for_difficulty(difficulty)
    } else {
        let diversity = movements.analyze().movement_diversity;
        if diversity < SPARSE_DIVERSITY_CEILING {
            PlacementStrategy::SparseFavoring
        } else if diversity > MODERATE_DIVERSITY_FLOOR {
            PlacementStrategy::ModerateFavoring
        } else {
            strategy_for_difficulty(difficulty)
        }
    };

    if difficulty >= HARD_DIFFICULTY {
        PlacementStrategy::SparseFavoring
    } else if difficulty <= EASIEST_DIFFICULTY && chosen == PlacementStrategy::SparseFavoring {
        PlacementStrategy::Random
    } else {
        chosen
    }
}

/// Coldest cells not excluded, in external units, coldest first.
///
/// Only the coldest 30% of the coldspots (at least one) survive.
pub fn sparse_candidates(heatmap: &FrequencyGrid, excluded: &HashSet<Position>) -> Vec<Position> {
    let mut candidates: Vec<Position> = heatmap
        .coldspots(COLDSPOT_THRESHOLD)
        .into_iter()
        .map(|spot| spot.position)
        .filter(|position| !excluded.contains(position))
        .collect();

    let keep = ((candidates.len() as f64 * COLDEST_FRACTION).floor() as usize).max(1);
    candidates.truncate(keep);
    candidates
}

/// Cells with normalized intensity in `[0.2, 0.6]`, row-major
pub fn moderate_candidates(heatmap: &FrequencyGrid, excluded: &HashSet<Position>) -> Vec<Position> {
    let (low, high) = MODERATE_BAND;
    let spec = heatmap.spec();
    heatmap
        .intensities()
        .filter(|&(_, value)| (low..=high).contains(&value))
        .map(|(cell, _)| spec.to_external(cell))
        .filter(|position| !excluded.contains(position))
        .collect()
}

/// Up to [`RANDOM_ATTEMPTS`] uniform draws; `None` if every draw was excluded
pub fn uniform_cell<R: Rng>(
    heatmap: &FrequencyGrid,
    excluded: &HashSet<Position>,
    rng: &mut R,
) -> Option<Position> {
    let spec = heatmap.spec();
    (0..RANDOM_ATTEMPTS)
        .map(|_| spec.to_external(spec.cell_at(rng.gen_range(0..spec.cell_count()))))
        .find(|position| !excluded.contains(position))
}

/// Resolve a concrete cell for `strategy`.
///
/// The origin is returned only when every layer comes up empty. That is a
/// deterministic tie-break for degenerate boards (e.g. an exclusion set that
/// covers everything) and may itself be excluded.
pub fn resolve_cell<R: Rng>(
    strategy: PlacementStrategy,
    heatmap: &FrequencyGrid,
    excluded: &HashSet<Position>,
    rng: &mut R,
) -> Position {
    let candidates = match strategy {
        PlacementStrategy::SparseFavoring => sparse_candidates(heatmap, excluded),
        PlacementStrategy::ModerateFavoring => moderate_candidates(heatmap, excluded),
        PlacementStrategy::Random => Vec::new(),
    };

    candidates
        .choose(rng)
        .copied()
        .or_else(|| uniform_cell(heatmap, excluded, rng))
        .unwrap_or_else(|| heatmap.spec().origin())
}
