//! Saving and loading the adaptive engine's state
//!
//! Snapshots are stored as pretty-printed JSON. Loading hands back the raw
//! JSON value rather than a typed snapshot so that
//! [`AdaptiveEngine::import_state`](crate::adaptive::AdaptiveEngine::import_state)
//! can merge whatever fields survived.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::adaptive::{AdaptiveEngine, EngineSnapshot};

/// Write a snapshot to `path`, creating parent directories if needed
pub fn save_snapshot(snapshot: &EngineSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    fs::write(path, json).with_context(|| format!("Failed to write snapshot to {:?}", path))?;

    info!(path = %path.display(), "snapshot saved");
    Ok(())
}

/// Read a snapshot from `path`. A missing file is `Ok(None)`.
pub fn load_snapshot(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot from {:?}", path))?;
    let value = serde_json::from_str(&json)
        .with_context(|| format!("Snapshot at {:?} is not valid JSON", path))?;
    Ok(Some(value))
}

/// Load `path` into `engine` if it exists. Returns whether anything was applied.
pub fn restore_engine(engine: &mut AdaptiveEngine, path: &Path) -> Result<bool> {
    let Some(value) = load_snapshot(path)? else {
        return Ok(false);
    };
    engine
        .import_state(&value)
        .with_context(|| format!("Snapshot at {:?} was rejected", path))?;
    info!(path = %path.display(), "snapshot restored");
    Ok(true)
}

/// Export `engine` and save it to `path`
pub fn persist_engine(engine: &AdaptiveEngine, path: &Path) -> Result<()> {
    save_snapshot(&engine.export_state(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::{AdaptiveConfig, GridSpec};
    use tempfile::TempDir;

    fn engine() -> AdaptiveEngine {
        let config = AdaptiveConfig {
            seed: Some(1),
            ..AdaptiveConfig::default()
        };
        AdaptiveEngine::new(GridSpec::new(8, 6, 10), &config)
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = load_snapshot(&temp_dir.path().join("none.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("profiles").join("player.json");

        persist_engine(&engine(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(load_snapshot(&path).is_err());
    }

    #[test]
    fn test_rejected_snapshot_leaves_engine_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("odd.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let mut engine = engine();
        let before = engine.export_state();
        assert!(restore_engine(&mut engine, &path).is_err());
        assert_eq!(engine.export_state(), before);
    }

    #[test]
    fn test_restore_applies_saved_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("player.json");

        let mut original = engine();
        original.set_difficulty(8);
        original.start_session_at(0);
        original.end_session_at(2_000, 17);
        persist_engine(&original, &path).unwrap();

        let mut restored = engine();
        assert!(restore_engine(&mut restored, &path).unwrap());
        assert_eq!(restored.export_state(), original.export_state());
    }
}
