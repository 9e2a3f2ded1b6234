use serde::{Deserialize, Serialize};

/// One of the four grid directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Canonical order used for per-direction counters
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Slot of this direction in [`Direction::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// A turn from `self` to `other` would reverse the snake onto itself
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Grid delta `(dx, dy)`; y grows downwards
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Player intent for the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Continue,
}

impl Action {
    /// Requested heading, if any
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Action::Move(direction) => Some(*direction),
            Action::Continue => None,
        }
    }
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        Action::Move(direction)
    }
}
