//! Movement log and direction pattern analysis
//!
//! The log keeps the most recent movement events in arrival order and drops
//! the oldest one once full. Pattern analysis is a coarse count of how the
//! four directions are used across the retained log.

use std::collections::VecDeque;

use crate::game::{Direction, Position};

/// Fewest retained events before pattern analysis reports anything
pub const MIN_EVENTS_FOR_ANALYSIS: usize = 10;

/// Game state at the moment of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementContext {
    pub score: u32,
    pub length: usize,
    /// Manhattan distance from the head to the current target, in grid cells
    pub distance_to_target: u32,
}

/// One recorded grid step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementEvent {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    /// Head position in external units
    pub position: Position,
    pub direction: Direction,
    pub context: MovementContext,
}

/// Occurrences of each direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionCounts {
    pub up: usize,
    pub down: usize,
    pub left: usize,
    pub right: usize,
}

impl DirectionCounts {
    pub fn get(&self, direction: Direction) -> usize {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    fn bump(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.up += 1,
            Direction::Down => self.down += 1,
            Direction::Left => self.left += 1,
            Direction::Right => self.right += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.up + self.down + self.left + self.right
    }

    /// Number of directions seen at least once
    pub fn distinct(&self) -> usize {
        Direction::ALL
            .iter()
            .filter(|&&direction| self.get(direction) > 0)
            .count()
    }
}

impl FromIterator<Direction> for DirectionCounts {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut counts = Self::default();
        for direction in iter {
            counts.bump(direction);
        }
        counts
    }
}

/// Result of [`MovementLog::analyze`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatternAnalysis {
    pub direction_counts: DirectionCounts,
    /// Directions used more than the per-direction average, most used first
    pub dominant_directions: Vec<Direction>,
    /// Fraction of the four directions in use: 0, 0.25, 0.5, 0.75 or 1
    pub movement_diversity: f64,
}

/// Bounded FIFO of recent movement events
#[derive(Debug, Clone)]
pub struct MovementLog {
    events: VecDeque<MovementEvent>,
    capacity: usize,
}

impl MovementLog {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an event, evicting the oldest one when full
    pub fn append(&mut self, event: MovementEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &MovementEvent> + ExactSizeIterator {
        self.events.iter()
    }

    /// The newest `count` events, oldest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &MovementEvent> {
        self.events.iter().skip(self.events.len().saturating_sub(count))
    }

    /// Independent copy of every retained event
    pub fn to_vec(&self) -> Vec<MovementEvent> {
        self.events.iter().copied().collect()
    }

    /// Direction statistics over the whole retained log.
    ///
    /// Below [`MIN_EVENTS_FOR_ANALYSIS`] events the neutral result is
    /// returned: zero counts, no dominant directions, diversity 0.
    pub fn analyze(&self) -> PatternAnalysis {
        if self.events.len() < MIN_EVENTS_FOR_ANALYSIS {
            return PatternAnalysis::default();
        }

        let counts: DirectionCounts = self.events.iter().map(|e| e.direction).collect();
        let average = counts.total() as f64 / Direction::ALL.len() as f64;

        let mut dominant: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&direction| counts.get(direction) as f64 > average)
            .collect();
        dominant.sort_by(|a, b| counts.get(*b).cmp(&counts.get(*a)));

        PatternAnalysis {
            direction_counts: counts,
            dominant_directions: dominant,
            movement_diversity: counts.distinct() as f64 / Direction::ALL.len() as f64,
        }
    }
}
