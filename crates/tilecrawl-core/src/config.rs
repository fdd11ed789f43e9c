//! Generation limits and debugging switches.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Tiles on the main path, start and exit included
    pub main_length: u32,
    /// Tiles per branch, counting the main-path tile it grows from
    pub branch_length: u32,
    pub num_branches: u32,
    /// Chance (0-100) that a connected socket receives a door
    pub door_percent: u32,
    /// Seconds to wait between steps, for watching the level assemble
    pub construction_delay: f32,
    /// Consecutive rejected placements before backtracking
    pub max_attempts: u32,
    /// Keep collision volumes after generation instead of stripping them
    pub keep_colliders: bool,
    /// Recolour room lights by generation phase
    pub debug_lighting: bool,
    /// Put lights back to their prefab colour once generation ends
    pub restore_lighting: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            main_length: 10,
            branch_length: 5,
            num_branches: 10,
            door_percent: 25,
            construction_delay: 0.0,
            max_attempts: 50,
            keep_colliders: false,
            debug_lighting: false,
            restore_lighting: true,
        }
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value < min || value > max || value.is_nan() {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl GeneratorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("main_length", self.main_length as f64, 2.0, 100.0)?;
        check_range("branch_length", self.branch_length as f64, 0.0, 50.0)?;
        check_range("num_branches", self.num_branches as f64, 0.0, 25.0)?;
        check_range("door_percent", self.door_percent as f64, 0.0, 100.0)?;
        check_range(
            "construction_delay",
            self.construction_delay as f64,
            0.0,
            1.0,
        )?;
        check_range("max_attempts", self.max_attempts as f64, 1.0, u32::MAX as f64)?;
        Ok(())
    }

    pub fn with_main_length(mut self, main_length: u32) -> Self {
        self.main_length = main_length;
        self
    }

    pub fn with_branches(mut self, num_branches: u32, branch_length: u32) -> Self {
        self.num_branches = num_branches;
        self.branch_length = branch_length;
        self
    }

    pub fn with_door_percent(mut self, door_percent: u32) -> Self {
        self.door_percent = door_percent;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_construction_delay(mut self, seconds: f32) -> Self {
        self.construction_delay = seconds;
        self
    }

    /// Tint tile lights by generation phase while building.
    pub fn with_debug_lighting(mut self) -> Self {
        self.debug_lighting = true;
        self
    }

    /// Whether debug tints are reset to each light's base colour on completion.
    pub fn with_restore_lighting(mut self, restore: bool) -> Self {
        self.restore_lighting = restore;
        self
    }

    pub fn with_kept_colliders(mut self) -> Self {
        self.keep_colliders = true;
        self
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_secs_f32(self.construction_delay.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_attempts, 50);
    }

    #[test]
    fn test_main_length_below_two_rejected() {
        let config = GeneratorConfig::default().with_main_length(1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "main_length",
                ..
            })
        ));
    }

    #[test]
    fn test_door_percent_above_hundred_rejected() {
        let config = GeneratorConfig::default().with_door_percent(101);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_fills_defaults() {
        let config = GeneratorConfig::from_json(r#"{"main_length": 3, "num_branches": 0}"#).unwrap();
        assert_eq!(config.main_length, 3);
        assert_eq!(config.num_branches, 0);
        assert_eq!(config.branch_length, 5);
        assert_eq!(config.door_percent, 25);
    }

    #[test]
    fn test_json_out_of_range_rejected() {
        assert!(GeneratorConfig::from_json(r#"{"branch_length": 80}"#).is_err());
    }

    #[test]
    fn test_pacing_delay() {
        let config = GeneratorConfig::default().with_construction_delay(0.25);
        assert_eq!(config.pacing_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_lighting_flags_are_independent() {
        let config = GeneratorConfig::default().with_debug_lighting();
        assert!(config.debug_lighting && config.restore_lighting);

        let config = GeneratorConfig::default().with_restore_lighting(false);
        assert!(!config.debug_lighting && !config.restore_lighting);

        let config = GeneratorConfig::default()
            .with_restore_lighting(false)
            .with_debug_lighting();
        assert!(config.debug_lighting && !config.restore_lighting);
    }
}
