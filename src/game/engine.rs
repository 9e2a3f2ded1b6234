use std::time::Duration;

use super::{
    action::{Action, Direction},
    config::GameConfig,
    state::{CollisionType, GameState, Position, Snake},
};
use crate::adaptive::{AdaptiveEngine, MovementContext};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the game has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that handles all game logic.
///
/// Owns the adaptive engine: every completed move is reported to it, food is
/// placed where it suggests, and game start/over open and close sessions.
pub struct GameEngine {
    config: GameConfig,
    adaptive: AdaptiveEngine,
}

impl GameEngine {
    /// Create a new game engine with a fresh adaptive engine
    pub fn new(config: GameConfig) -> Self {
        let adaptive = AdaptiveEngine::new(config.grid_spec(), &config.adaptive);
        Self { config, adaptive }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn adaptive(&self) -> &AdaptiveEngine {
        &self.adaptive
    }

    pub fn adaptive_mut(&mut self) -> &mut AdaptiveEngine {
        &mut self.adaptive
    }

    /// Current game speed, derived from difficulty
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval(self.adaptive.difficulty())
    }

    /// Reset the game to initial state and open a new session
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        self.adaptive.start_session();
        let food = self.place_food(&snake);

        GameState::new(snake, food, self.config.grid_width, self.config.grid_height)
    }

    /// Close the session of a game abandoned before game over
    pub fn abandon(&mut self, state: &GameState) {
        if state.is_alive && self.adaptive.session_active() {
            self.adaptive.end_session(state.score);
        }
    }

    /// Execute one step of the game
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepResult {
        if !state.is_alive {
            return StepResult {
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision_type: None,
                },
            };
        }

        // Update direction based on action (prevent 180° turns)
        let heading = state.snake.direction;
        if let Some(new_direction) = action.direction().filter(|&d| !heading.is_opposite(d)) {
            state.snake.direction = new_direction;
        }

        // Calculate new head position
        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        // Check for collisions
        if let Some(collision_type) = self.check_collision(state, new_head) {
            state.is_alive = false;
            state.steps += 1;
            self.adaptive.end_session(state.score);

            return StepResult {
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision_type: Some(collision_type),
                },
            };
        }

        // Check if snake ate food
        let ate_food = new_head == state.food;

        // Move snake (grow if ate food)
        state.snake.move_snake(ate_food);
        state.steps += 1;
        if ate_food {
            state.score += 1;
        }

        let cell_size = self.cell_size();
        self.adaptive.record_movement(
            new_head.scaled(cell_size),
            state.snake.direction,
            MovementContext {
                score: state.score,
                length: state.snake.len(),
                distance_to_target: state.distance_to_food(),
            },
        );

        if ate_food {
            self.adaptive.record_consumption(state.score);
            state.food = self.place_food(&state.snake);
        }

        StepResult {
            terminated: false,
            info: StepInfo {
                ate_food,
                collision_type: None,
            },
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionType> {
        // Check wall collision
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        // Check self-collision
        if state.snake.collides_with_body(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Ask the adaptive engine for a food cell away from the snake
    fn place_food(&mut self, snake: &Snake) -> Position {
        let excluded = snake.cells_scaled(self.cell_size());
        let suggested = self.adaptive.suggest_placement(&excluded);

        self.adaptive
            .grid()
            .from_external(suggested)
            .map(|cell| Position::new(cell.column as i32, cell.row as i32))
            .unwrap_or(Position::new(0, 0))
    }

    fn cell_size(&self) -> i32 {
        self.adaptive.grid().cell_size()
    }
}
