use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::adaptive::{AdaptiveConfig, GridSpec};

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Size of one grid cell in the adaptive engine's external units
    pub cell_size: u32,

    // Speed
    /// Tick interval at difficulty 1, in milliseconds
    pub base_tick_ms: u64,
    /// How much faster each difficulty level ticks, in milliseconds
    pub tick_step_ms: u64,
    /// Fastest allowed tick interval, in milliseconds
    pub min_tick_ms: u64,

    /// Settings for the adaptive engine
    pub adaptive: AdaptiveConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 3,
            cell_size: 20,
            base_tick_ms: 160,
            tick_step_ms: 10,
            min_tick_ms: 60,
            adaptive: AdaptiveConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Grid geometry handed to the adaptive engine
    pub fn grid_spec(&self) -> GridSpec {
        GridSpec::new(self.grid_width, self.grid_height, self.cell_size)
    }

    /// Tick interval for a difficulty level, never faster than `min_tick_ms`
    pub fn tick_interval(&self, difficulty: u8) -> Duration {
        let speedup = u64::from(difficulty.saturating_sub(1)) * self.tick_step_ms;
        let ms = self
            .base_tick_ms
            .saturating_sub(speedup)
            .max(self.min_tick_ms);
        Duration::from_millis(ms)
    }

    /// Load a TOML configuration file, falling back to defaults.
    ///
    /// Missing keys take their default values. A missing file yields the
    /// defaults silently; an unreadable or malformed one is logged.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read config, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.cell_size, 20);
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
    }

    #[test]
    fn test_tick_interval_speeds_up_with_difficulty() {
        let config = GameConfig::default();
        assert_eq!(config.tick_interval(1), Duration::from_millis(160));
        assert_eq!(config.tick_interval(5), Duration::from_millis(120));
        assert!(config.tick_interval(10) < config.tick_interval(9));

        let steep = GameConfig {
            tick_step_ms: 50,
            ..GameConfig::default()
        };
        assert_eq!(steep.tick_interval(10), Duration::from_millis(60));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = GameConfig::load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn test_load_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snake.toml");
        fs::write(
            &path,
            "grid_width = 30\n\n[adaptive]\nmovement_log_capacity = 250\n",
        )
        .unwrap();

        let cfg = GameConfig::load_or_default(&path);
        assert_eq!(cfg.grid_width, 30);
        assert_eq!(cfg.grid_height, 20);
        assert_eq!(cfg.adaptive.movement_log_capacity, 250);
        assert_eq!(cfg.adaptive.seed, None);
    }

    #[test]
    fn test_load_malformed_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "grid_width = \"wide\"").unwrap();

        let cfg = GameConfig::load_or_default(&path);
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let custom = GameConfig {
            cell_size: 8,
            adaptive: AdaptiveConfig {
                movement_log_capacity: 64,
                seed: Some(7),
            },
            ..GameConfig::new(30, 30)
        };
        let text = toml::to_string_pretty(&custom).unwrap();
        let parsed: GameConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, custom);
    }
}
