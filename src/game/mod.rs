//! Core game logic module for Snake
//!
//! Snake movement, collisions and scoring, without any I/O or rendering.
//! Food placement and session bookkeeping are delegated to the
//! [`adaptive`](crate::adaptive) engine owned by [`GameEngine`].

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use state::{CollisionType, GameState, Position, Snake};
