//! Spatial frequency model
//!
//! A fixed-size, row-major counter of how often the player's head visited
//! each grid cell. Counts only ever grow, except through an explicit
//! [`FrequencyGrid::reset`].

use super::grid::{GridCell, GridSpec};
use crate::game::Position;

/// A cell reported by a hotspot or coldspot query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spot {
    /// Cell position in external units
    pub position: Position,
    /// Normalized visit intensity in [0, 1]
    pub intensity: f64,
}

/// Aggregate statistics over the frequency grid
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeatmapStatistics {
    /// Sum of all counters
    pub total_moves: u64,
    /// Smallest non-zero counter (0 when nothing was recorded)
    pub min_visits: u32,
    /// Largest counter
    pub max_visits: u32,
    /// Mean over non-zero counters
    pub average_visits: f64,
    /// Fraction of cells visited at least once
    pub coverage: f64,
}

/// Visit counter over the whole board
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyGrid {
    spec: GridSpec,
    counts: Vec<u32>,
}

impl FrequencyGrid {
    pub fn new(spec: GridSpec) -> Self {
        Self {
            spec,
            counts: vec![0; spec.cell_count()],
        }
    }

    /// Rebuild from row-major rows, as produced by [`FrequencyGrid::raw`].
    ///
    /// Returns `None` unless the rows match the grid's dimensions exactly.
    pub fn from_rows(spec: GridSpec, rows: &[Vec<u32>]) -> Option<Self> {
        if rows.len() != spec.height() || rows.iter().any(|row| row.len() != spec.width()) {
            return None;
        }
        Some(Self {
            spec,
            counts: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    /// Count one visit at an external position. Returns `false` (and leaves
    /// the grid untouched) when the position is off the board.
    pub fn record(&mut self, position: Position) -> bool {
        match self.spec.from_external(position) {
            Some(cell) => self.record_cell(cell),
            None => false,
        }
    }

    pub fn record_cell(&mut self, cell: GridCell) -> bool {
        match self.spec.index_of(cell) {
            Some(index) => {
                self.counts[index] = self.counts[index].saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub fn count(&self, cell: GridCell) -> Option<u32> {
        self.spec.index_of(cell).map(|index| self.counts[index])
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Every cell with its normalized intensity, in row-major order
    pub fn intensities(&self) -> impl Iterator<Item = (GridCell, f64)> + '_ {
        let max = f64::from(self.max_count());
        self.counts.iter().enumerate().map(move |(index, &count)| {
            let value = if max > 0.0 { f64::from(count) / max } else { 0.0 };
            (self.spec.cell_at(index), value)
        })
    }

    /// Counts divided by the current maximum; an empty grid stays all zero
    pub fn normalized(&self) -> Vec<Vec<f64>> {
        let values: Vec<f64> = self.intensities().map(|(_, value)| value).collect();
        values
            .chunks(self.spec.width())
            .map(<[f64]>::to_vec)
            .collect()
    }

    /// Independent copy of the raw counters
    pub fn raw(&self) -> Vec<Vec<u32>> {
        self.counts
            .chunks(self.spec.width())
            .map(<[u32]>::to_vec)
            .collect()
    }

    /// Cells at or above `threshold`, hottest first
    pub fn hotspots(&self, threshold: f64) -> Vec<Spot> {
        let mut spots = self.spots_where(|value| value >= threshold);
        // stable sort keeps row-major order among equal intensities
        spots.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
        spots
    }

    /// Cells at or below `threshold`, coldest first
    pub fn coldspots(&self, threshold: f64) -> Vec<Spot> {
        let mut spots = self.spots_where(|value| value <= threshold);
        spots.sort_by(|a, b| a.intensity.total_cmp(&b.intensity));
        spots
    }

    fn spots_where(&self, keep: impl Fn(f64) -> bool) -> Vec<Spot> {
        self.intensities()
            .filter(|&(_, value)| keep(value))
            .map(|(cell, intensity)| Spot {
                position: self.spec.to_external(cell),
                intensity,
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.counts.fill(0);
    }

    pub fn statistics(&self) -> HeatmapStatistics {
        let total_moves = self.counts.iter().map(|&c| u64::from(c)).sum();
        let visited: Vec<u32> = self.counts.iter().copied().filter(|&c| c > 0).collect();
        if visited.is_empty() {
            return HeatmapStatistics::default();
        }

        let visited_sum: u64 = visited.iter().map(|&c| u64::from(c)).sum();
        HeatmapStatistics {
            total_moves,
            min_visits: visited.iter().copied().min().unwrap_or(0),
            max_visits: visited.iter().copied().max().unwrap_or(0),
            average_visits: visited_sum as f64 / visited.len() as f64,
            coverage: visited.len() as f64 / self.counts.len() as f64,
        }
    }
}
