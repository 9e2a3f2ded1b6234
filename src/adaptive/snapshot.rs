//! Persistable engine state
//!
//! [`EngineSnapshot`] is what gets exported. Importing goes through
//! [`SnapshotPatch`], which reads every field on its own so that one corrupt
//! value only costs that value, while a snapshot of the wrong shape is
//! rejected before anything is applied.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use tracing::warn;

use super::difficulty::{DEFAULT_DIFFICULTY, PerformanceState};
use super::error::{SnapshotError, json_kind};
use super::intensity::{MIN_INTENSITY, combined_intensity};
use super::placement::PlacementStrategy;

const FREQUENCY_GRID: &str = "frequency_grid";
const PERFORMANCE_STATE: &str = "performance_state";
const ADAPTATION_STATE: &str = "adaptation_state";

/// Current adaptation outputs, read by the renderer and the game speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationState {
    pub difficulty_level: u8,
    pub placement_strategy: PlacementStrategy,
    pub visual_intensity: u8,
    /// Movement term the visual intensity was derived from
    pub movement_intensity: u8,
    /// Levels reached through difficulty adjustments, oldest first
    pub difficulty_history: Vec<u8>,
}

impl Default for AdaptationState {
    fn default() -> Self {
        Self {
            difficulty_level: DEFAULT_DIFFICULTY,
            placement_strategy: PlacementStrategy::default(),
            visual_intensity: combined_intensity(MIN_INTENSITY, DEFAULT_DIFFICULTY),
            movement_intensity: MIN_INTENSITY,
            difficulty_history: Vec::new(),
        }
    }
}

/// Everything the engine persists between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Row-major visit counts, `height` rows of `width` columns
    pub frequency_grid: Vec<Vec<u32>>,
    pub performance_state: PerformanceState,
    pub adaptation_state: AdaptationState,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PerformancePatch {
    pub recent_outcomes: Option<VecDeque<u32>>,
    pub average_score: Option<f64>,
    pub average_session_duration_ms: Option<f64>,
    pub total_sessions: Option<u32>,
    pub consecutive_high_streak: Option<u32>,
    pub consecutive_low_streak: Option<u32>,
    pub session_start_ms: Option<u64>,
}

impl PerformancePatch {
    fn parse(section: &Map<String, Value>) -> Self {
        Self {
            recent_outcomes: field(PERFORMANCE_STATE, section, "recent_outcomes"),
            average_score: non_negative(field(PERFORMANCE_STATE, section, "average_score")),
            average_session_duration_ms: non_negative(field(
                PERFORMANCE_STATE,
                section,
                "average_session_duration_ms",
            )),
            total_sessions: field(PERFORMANCE_STATE, section, "total_sessions"),
            consecutive_high_streak: field(PERFORMANCE_STATE, section, "consecutive_high_streak"),
            consecutive_low_streak: field(PERFORMANCE_STATE, section, "consecutive_low_streak"),
            session_start_ms: field(PERFORMANCE_STATE, section, "session_start_ms"),
        }
    }

    /// Overlay the present fields onto `base`
    pub fn apply_to(self, base: &mut PerformanceState) {
        if let Some(v) = self.recent_outcomes {
            base.recent_outcomes = v;
        }
        if let Some(v) = self.average_score {
            base.average_score = v;
        }
        if let Some(v) = self.average_session_duration_ms {
            base.average_session_duration_ms = v;
        }
        if let Some(v) = self.total_sessions {
            base.total_sessions = v;
        }
        if let Some(v) = self.consecutive_high_streak {
            base.consecutive_high_streak = v;
        }
        if let Some(v) = self.consecutive_low_streak {
            base.consecutive_low_streak = v;
        }
        if let Some(v) = self.session_start_ms {
            base.session_start_ms = Some(v);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AdaptationPatch {
    pub difficulty_level: Option<u8>,
    pub placement_strategy: Option<PlacementStrategy>,
    pub movement_intensity: Option<u8>,
    pub difficulty_history: Option<Vec<u8>>,
}

impl AdaptationPatch {
    fn parse(section: &Map<String, Value>) -> Self {
        // visual_intensity is always re-derived, so it is not read back
        Self {
            difficulty_level: field(ADAPTATION_STATE, section, "difficulty_level"),
            placement_strategy: field(ADAPTATION_STATE, section, "placement_strategy"),
            movement_intensity: field(ADAPTATION_STATE, section, "movement_intensity"),
            difficulty_history: field(ADAPTATION_STATE, section, "difficulty_history"),
        }
    }
}

/// A validated, possibly partial snapshot ready to be merged into an engine
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SnapshotPatch {
    pub frequency_grid: Option<Vec<Vec<u32>>>,
    pub performance: PerformancePatch,
    pub adaptation: AdaptationPatch,
}

impl SnapshotPatch {
    pub fn parse(value: &Value) -> Result<Self, SnapshotError> {
        let Value::Object(root) = value else {
            return Err(SnapshotError::NotAnObject {
                found: json_kind(value),
            });
        };

        let grid = section(root, FREQUENCY_GRID, |v| v.is_array(), "an array")?;
        let performance = section(root, PERFORMANCE_STATE, |v| v.is_object(), "an object")?;
        let adaptation = section(root, ADAPTATION_STATE, |v| v.is_object(), "an object")?;
        if grid.is_none() && performance.is_none() && adaptation.is_none() {
            return Err(SnapshotError::NoKnownSections);
        }

        Ok(Self {
            frequency_grid: grid.and_then(|v| parse_or_warn(FREQUENCY_GRID, v)),
            performance: performance
                .and_then(Value::as_object)
                .map(PerformancePatch::parse)
                .unwrap_or_default(),
            adaptation: adaptation
                .and_then(Value::as_object)
                .map(AdaptationPatch::parse)
                .unwrap_or_default(),
        })
    }
}

fn section<'a>(
    root: &'a Map<String, Value>,
    name: &'static str,
    shape_ok: impl Fn(&Value) -> bool,
    expected: &'static str,
) -> Result<Option<&'a Value>, SnapshotError> {
    match root.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if shape_ok(value) => Ok(Some(value)),
        Some(value) => Err(SnapshotError::InvalidSection {
            section: name,
            expected,
            found: json_kind(value),
        }),
    }
}

fn field<T: DeserializeOwned>(section: &str, map: &Map<String, Value>, key: &str) -> Option<T> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => parse_or_warn(&format!("{section}.{key}"), value),
    }
}

fn parse_or_warn<T: DeserializeOwned>(name: &str, value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(field = name, %err, "skipping unreadable snapshot field");
            None
        }
    }
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}
