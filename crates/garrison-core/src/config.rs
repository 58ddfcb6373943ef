//! Match configuration.
//!
//! [`MatchConfig`] carries every tunable constant of a match. `Default` gives
//! the stock values; a JSON file may override any subset of fields:
//!
//! ```
//! use garrison_core::config::MatchConfig;
//!
//! let config: MatchConfig = serde_json::from_str(r#"{ "speed": 250.0 }"#).unwrap();
//! assert_eq!(config.speed, 250.0);
//! assert_eq!(config.nodes_per_lane, 48);
//! assert!(config.validate().is_ok());
//! ```

use std::collections::HashSet;

use garrison_host::prelude::*;
use serde::{Deserialize, Serialize};

use crate::server::WARMUP_PRESET;
use crate::troop::{
    TroopParams, DEFAULT_SPEED, HEALTH_PRECISION, MAX_HEALTH_PRECISION, SPAWN_HEALTH,
};

// ---------------------------------------------------------------------------
// ConfigurationError
// ---------------------------------------------------------------------------

/// A match cannot start.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// A required map entity does not exist.
    #[error("required entity '{name}' not found")]
    MissingEntity { name: String },

    /// A required map entity has the wrong engine class.
    #[error("entity '{name}' is a {found}, expected {expected}")]
    WrongClass {
        name: String,
        expected: &'static str,
        found: String,
    },

    /// A configuration value is out of range.
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// Where and how one block of overlay text is painted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextSlot {
    pub x: f32,
    pub y: f32,
    pub duration: f32,
    pub color: Rgb,
}

impl TextSlot {
    /// Paint `text` into this slot.
    pub fn paint(&self, text: String) -> DebugText {
        DebugText {
            text,
            x: self.x,
            y: self.y,
            duration: self.duration,
            color: self.color,
        }
    }
}

/// Placement of the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// The "Game Time" line above the table.
    pub game_time: TextSlot,
    /// The troop table.
    pub table: TextSlot,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            game_time: TextSlot {
                x: 0.15,
                y: 0.13,
                duration: 0.125,
                color: Rgb::new(255, 255, 128),
            },
            table: TextSlot {
                x: 0.15,
                y: 0.15,
                duration: 0.125,
                color: Rgb::new(200, 200, 200),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Everything tunable about a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Troop movement speed, engine units per second.
    pub speed: f64,
    /// Seconds between thinks.
    pub think_interval: f64,
    /// Delay before the first think.
    pub first_think_delay: f64,
    /// Lane names; path nodes are `<faction>_path.<lane>.<n>`.
    pub lanes: Vec<String>,
    /// Path nodes per lane, numbered from 1.
    pub nodes_per_lane: u32,
    /// Health shown before the first change arrives.
    pub spawn_health: f64,
    /// Fractional digits of displayed health, at most 16.
    pub health_precision: usize,
    /// Server commands issued at start.
    pub warmup_commands: Vec<String>,
    /// Also issue the movement preset at start.
    pub kz_movement: bool,
    pub overlay: OverlayConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            think_interval: 0.125,
            first_think_delay: 1.0 / 1024.0,
            lanes: ["a", "b", "c", "d", "e", "f"]
                .into_iter()
                .map(String::from)
                .collect(),
            nodes_per_lane: 48,
            spawn_health: SPAWN_HEALTH,
            health_precision: HEALTH_PRECISION,
            warmup_commands: WARMUP_PRESET.iter().map(|c| (*c).to_owned()).collect(),
            kz_movement: false,
            overlay: OverlayConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Check every field is usable.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        positive("speed", self.speed)?;
        positive("think_interval", self.think_interval)?;
        positive("spawn_health", self.spawn_health)?;
        if !self.first_think_delay.is_finite() || self.first_think_delay < 0.0 {
            return Err(invalid(
                "first_think_delay",
                format!("must be finite and non-negative, got {}", self.first_think_delay),
            ));
        }
        if self.lanes.is_empty() {
            return Err(invalid("lanes", "at least one lane is required".to_owned()));
        }
        let mut seen = HashSet::new();
        for lane in &self.lanes {
            if lane.is_empty() || lane.contains(['.', ' ']) {
                return Err(invalid("lanes", format!("bad lane name '{lane}'")));
            }
            if !seen.insert(lane.as_str()) {
                return Err(invalid("lanes", format!("duplicate lane '{lane}'")));
            }
        }
        if self.health_precision > MAX_HEALTH_PRECISION {
            return Err(invalid(
                "health_precision",
                format!(
                    "at most {MAX_HEALTH_PRECISION} digits, got {}",
                    self.health_precision
                ),
            ));
        }
        if self.nodes_per_lane == 0 {
            return Err(invalid("nodes_per_lane", "must be at least 1".to_owned()));
        }
        Ok(())
    }

    /// The lane used when a command names none.
    pub fn default_lane(&self) -> &str {
        self.lanes.first().map(String::as_str).unwrap_or_default()
    }

    /// Spawn parameters for troops of this match.
    pub fn troop_params(&self) -> TroopParams {
        TroopParams {
            speed: self.speed,
            spawn_health: self.spawn_health,
            health_precision: self.health_precision,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite and positive, got {value}")))
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigurationError {
    ConfigurationError::InvalidConfig { field, reason }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lanes.len(), 6);
        assert_eq!(config.default_lane(), "a");
        assert_eq!(config.troop_params(), TroopParams::default());
        assert_eq!(config.warmup_commands[0], "mp_warmup_offline_enabled 1");
    }

    #[test]
    fn json_round_trip_keeps_every_field() {
        let mut config = MatchConfig::default();
        config.kz_movement = true;
        config.lanes = vec!["mid".to_owned()];
        let json = serde_json::to_string(&config).unwrap();
        let back: MatchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_overlay_falls_back_to_defaults() {
        let config: MatchConfig = serde_json::from_str(
            r#"{ "overlay": { "table": { "x": 0.5, "y": 0.5, "duration": 1.0,
                 "color": { "r": 1, "g": 2, "b": 3 } } } }"#,
        )
        .unwrap();
        assert_eq!(config.overlay.table.x, 0.5);
        assert_eq!(config.overlay.game_time, OverlayConfig::default().game_time);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cases: [(&str, fn(&mut MatchConfig)); 10] = [
            ("speed", |c: &mut MatchConfig| c.speed = 0.0),
            ("speed", |c: &mut MatchConfig| c.speed = f64::NAN),
            ("think_interval", |c: &mut MatchConfig| c.think_interval = -0.1),
            ("first_think_delay", |c: &mut MatchConfig| {
                c.first_think_delay = f64::INFINITY
            }),
            ("spawn_health", |c: &mut MatchConfig| c.spawn_health = 0.0),
            ("lanes", |c: &mut MatchConfig| c.lanes.clear()),
            ("lanes", |c: &mut MatchConfig| c.lanes.push("a".to_owned())),
            ("lanes", |c: &mut MatchConfig| c.lanes.push("x.y".to_owned())),
            ("nodes_per_lane", |c: &mut MatchConfig| c.nodes_per_lane = 0),
            ("health_precision", |c: &mut MatchConfig| {
                c.health_precision = 70_000
            }),
        ];
        for (expected, mutate) in cases {
            let mut config = MatchConfig::default();
            mutate(&mut config);
            match config.validate() {
                Err(ConfigurationError::InvalidConfig { field, .. }) => {
                    assert_eq!(field, expected)
                }
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }
}
