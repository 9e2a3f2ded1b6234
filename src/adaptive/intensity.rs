//! Visual intensity derivation
//!
//! The renderer gets a single scalar in `1..=5` built from two terms: how
//! varied the player's recent movement is, and how hard the game currently is.

use crate::game::Direction;

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 5;

/// Number of trailing moves the movement term looks at
pub const INTENSITY_WINDOW: usize = 20;
/// Below this many moves the movement term stays at the minimum
pub const MIN_EVENTS_FOR_INTENSITY: usize = 5;

const DIFFICULTY_DIVISOR: f64 = 3.33;

/// Movement term from the trailing window of directions, oldest first.
///
/// Callers pass at most [`INTENSITY_WINDOW`] directions.
pub fn movement_intensity(directions: &[Direction]) -> u8 {
    if directions.len() < MIN_EVENTS_FOR_INTENSITY {
        return MIN_INTENSITY;
    }

    let mut seen = [false; 4];
    for direction in directions {
        seen[direction.index()] = true;
    }
    let diversity = seen.iter().filter(|&&s| s).count() as f64 / 4.0;

    let changes = directions.windows(2).filter(|pair| pair[0] != pair[1]).count();
    let change_ratio = changes as f64 / (directions.len() - 1) as f64;

    let score = diversity * 2.0 + change_ratio * 3.0;
    clamp_intensity(score.ceil())
}

/// Maps difficulty 1..=10 onto a 1..=3 modifier
pub fn difficulty_modifier(difficulty: u8) -> u8 {
    (f64::from(difficulty) / DIFFICULTY_DIVISOR).ceil().max(1.0) as u8
}

/// Rounded mean of the movement term and the difficulty modifier
pub fn combined_intensity(movement: u8, difficulty: u8) -> u8 {
    let mean = (f64::from(movement) + f64::from(difficulty_modifier(difficulty))) / 2.0;
    clamp_intensity(mean.round())
}

fn clamp_intensity(value: f64) -> u8 {
    value.clamp(f64::from(MIN_INTENSITY), f64::from(MAX_INTENSITY)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction::*;

    #[test]
    fn test_short_history_is_minimum() {
        assert_eq!(movement_intensity(&[]), 1);
        assert_eq!(movement_intensity(&[Up, Left, Down, Right]), 1);
    }

    #[test]
    fn test_straight_line_is_low() {
        // diversity 0.25, no changes: ceil(0.5) = 1
        assert_eq!(movement_intensity(&[Right; 20]), 1);
    }

    #[test]
    fn test_zigzag_is_high() {
        // diversity 0.5, every pair changes: ceil(1 + 3) = 4
        let zigzag: Vec<Direction> = (0..10).flat_map(|_| [Right, Down]).collect();
        assert_eq!(movement_intensity(&zigzag), 4);

        // all four directions, every pair changes: 2 + 3 = 5
        let spiral: Vec<Direction> = (0..5).flat_map(|_| [Up, Right, Down, Left]).collect();
        assert_eq!(movement_intensity(&spiral), 5);
    }

    #[test]
    fn test_partial_changes_round_up() {
        // diversity 0.5, one change out of 5 pairs: 1 + 0.6 = 1.6 -> 2
        assert_eq!(movement_intensity(&[Up, Up, Up, Left, Left, Left]), 2);
    }

    #[test]
    fn test_difficulty_modifier_range() {
        assert_eq!(difficulty_modifier(1), 1);
        assert_eq!(difficulty_modifier(3), 1);
        assert_eq!(difficulty_modifier(4), 2);
        assert_eq!(difficulty_modifier(6), 2);
        assert_eq!(difficulty_modifier(7), 3);
        // 10 / 3.33 lands just above 3
        assert_eq!(difficulty_modifier(10), 4);
    }

    #[test]
    fn test_combined_intensity() {
        assert_eq!(combined_intensity(1, 1), 1);
        // (4 + 2) / 2 = 3
        assert_eq!(combined_intensity(4, 5), 3);
        // (2 + 1) / 2 = 1.5 rounds up
        assert_eq!(combined_intensity(2, 2), 2);
        // (5 + 4) / 2 = 4.5 rounds up
        assert_eq!(combined_intensity(5, 10), 5);
    }
}
