use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::iter;

use super::action::Direction;

/// A position on the game grid.
///
/// The game itself works in grid cells; the adaptive engine speaks in
/// external units (grid cells scaled by the configured cell size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The neighbouring cell in `direction`
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Grid cell to external units
    pub fn scaled(&self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn manhattan_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// The snake, head first
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with the head at the front
    pub body: VecDeque<Position>,
    pub direction: Direction,
}

impl Snake {
    /// A straight snake of `length` segments (at least one) trailing behind
    /// `head`, opposite to `direction`
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let back = direction.opposite();
        let body = iter::successors(Some(head), |segment| {
            Some(segment.moved_in_direction(back))
        })
        .take(length.max(1))
        .collect();

        Self { body, direction }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Whether `pos` hits any segment behind the head
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body.iter().skip(1).any(|&segment| segment == pos)
    }

    /// Advance one cell in the current direction, keeping the tail when growing
    pub fn move_snake(&mut self, should_grow: bool) {
        let new_head = self.head().moved_in_direction(self.direction);
        self.body.push_front(new_head);
        if !should_grow {
            self.body.pop_back();
        }
    }

    /// Every segment scaled to external units, for placement exclusion
    pub fn cells_scaled(&self, factor: i32) -> Vec<Position> {
        self.body.iter().map(|segment| segment.scaled(factor)).collect()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    Wall,
    SelfCollision,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub grid_width: usize,
    pub grid_height: usize,
    pub score: u32,
    pub steps: u32,
    pub is_alive: bool,
}

impl GameState {
    pub fn new(snake: Snake, food: Position, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snake,
            food,
            grid_width,
            grid_height,
            score: 0,
            steps: 0,
            is_alive: true,
        }
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        (0..self.grid_width as i32).contains(&pos.x)
            && (0..self.grid_height as i32).contains(&pos.y)
    }

    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.body.contains(&pos)
    }

    /// Grid distance from the head to the food
    pub fn distance_to_food(&self) -> u32 {
        self.snake.head().manhattan_distance(self.food)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake() -> Snake {
        Snake::new(Position::new(5, 5), Direction::Right, 3)
    }

    #[test]
    fn test_position_helpers() {
        let pos = Position::new(3, 4);
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(3, 3));
        assert_eq!(pos.moved_by(-3, 1), Position::new(0, 5));
        assert_eq!(pos.scaled(20), Position::new(60, 80));
        assert_eq!(pos.manhattan_distance(Position::new(0, 0)), 7);
        assert_eq!(pos.manhattan_distance(Position::new(5, 1)), 5);
    }

    #[test]
    fn test_snake_trails_behind_head() {
        let snake = snake();
        let body: Vec<Position> = snake.body.iter().copied().collect();
        assert_eq!(
            body,
            vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)]
        );

        let upward = Snake::new(Position::new(2, 2), Direction::Up, 2);
        assert_eq!(upward.body[1], Position::new(2, 3));
    }

    #[test]
    fn test_zero_length_snake_keeps_its_head() {
        let snake = Snake::new(Position::new(1, 1), Direction::Left, 0);
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Position::new(1, 1));
    }

    #[test]
    fn test_snake_movement_and_growth() {
        let mut snake = snake();

        snake.move_snake(false);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(6, 5));
        assert_eq!(snake.body.back(), Some(&Position::new(4, 5)));

        snake.move_snake(true);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Position::new(7, 5));
    }

    #[test]
    fn test_body_collision_ignores_head() {
        let snake = snake();
        assert!(!snake.collides_with_body(Position::new(5, 5)));
        assert!(snake.collides_with_body(Position::new(4, 5)));
        assert!(!snake.collides_with_body(Position::new(10, 10)));
    }

    #[test]
    fn test_cells_scaled() {
        assert_eq!(
            snake().cells_scaled(10),
            vec![Position::new(50, 50), Position::new(40, 50), Position::new(30, 50)]
        );
    }

    #[test]
    fn test_bounds_and_food_distance() {
        let state = GameState::new(snake(), Position::new(10, 10), 20, 20);

        assert!(state.is_in_bounds(Position::new(0, 0)));
        assert!(state.is_in_bounds(Position::new(19, 19)));
        assert!(!state.is_in_bounds(Position::new(-1, 0)));
        assert!(!state.is_in_bounds(Position::new(20, 0)));
        assert!(!state.is_in_bounds(Position::new(0, 20)));
        assert_eq!(state.distance_to_food(), 10);
    }
}
