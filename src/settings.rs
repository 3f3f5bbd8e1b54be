//! Simulation tuning
//!
//! Loaded from a JSON file when present; every field falls back to its
//! default so partial files work.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing, difficulty and spawning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Difficulty ramp ===
    /// Period of the difficulty ramp task
    pub ramp_period_ms: u64,
    /// Speed added to every moving axis per ramp tick
    pub ramp_acceleration: f64,

    // === Power-ups ===
    /// Period of the power-up spawn attempt task
    pub power_up_period_ms: u64,
    /// Chance that one attempt spawns a power-up (before upgrades)
    pub power_up_spawn_chance: f64,
    /// Minimum time between two spawned power-ups
    pub power_up_cooldown_ms: u64,

    // === Presets ===
    /// Slack past zero before the next preset is drawn
    pub preset_buffer_distance: f64,
    /// Distance before the very first preset
    pub initial_preset_distance: f64,

    // === Run end ===
    /// Pause between the crash and saving the profile
    pub game_over_grace_ms: u64,

    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ramp_period_ms: 1000,
            ramp_acceleration: 0.005,

            power_up_period_ms: 5000,
            power_up_spawn_chance: 0.25,
            power_up_cooldown_ms: 4500,

            preset_buffer_distance: 0.45,
            initial_preset_distance: 0.1,

            game_over_grace_ms: 500,

            seed: None,
        }
    }
}

impl Settings {
    pub fn ramp_period(&self) -> Duration {
        Duration::from_millis(self.ramp_period_ms.max(1))
    }

    pub fn power_up_period(&self) -> Duration {
        Duration::from_millis(self.power_up_period_ms.max(1))
    }

    pub fn game_over_grace(&self) -> Duration {
        Duration::from_millis(self.game_over_grace_ms)
    }

    /// Spawn chance clamped to a valid probability
    pub fn spawn_chance(&self) -> f64 {
        if self.power_up_spawn_chance.is_nan() {
            0.0
        } else {
            self.power_up_spawn_chance.clamp(0.0, 1.0)
        }
    }

    /// Load settings from a JSON file, defaults if missing or malformed
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"seed": 7, "ramp_period_ms": 250}"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.ramp_period(), Duration::from_millis(250));
        assert_eq!(settings.preset_buffer_distance, 0.45);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load("/nonexistent/space-runner/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_spawn_chance_is_clamped() {
        let mut settings = Settings::default();
        settings.power_up_spawn_chance = 3.0;
        assert_eq!(settings.spawn_chance(), 1.0);
        settings.power_up_spawn_chance = f64::NAN;
        assert_eq!(settings.spawn_chance(), 0.0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let file = NamedTempFile::new().unwrap();
        let settings = Settings {
            seed: Some(99),
            ..Default::default()
        };
        settings.save(file.path()).unwrap();
        assert_eq!(Settings::load(file.path()), settings);
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ ramp_period_ms: ").unwrap();
        assert_eq!(Settings::load(file.path()), Settings::default());
    }
}
