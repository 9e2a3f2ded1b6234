//! Adaptive Snake - a Snake game that adapts to how it is played
//!
//! This library provides:
//! - Core game logic (game module)
//! - The behavior-adaptive engine: movement heatmap, food placement
//!   strategies, streak-based difficulty, visual intensity (adaptive module)
//! - Snapshot persistence (persistence module)
//! - TUI rendering and keyboard input (render, input modules)
//! - The interactive game loop (modes module)

pub mod adaptive;
pub mod game;
pub mod input;
pub mod modes;
pub mod persistence;
pub mod render;
