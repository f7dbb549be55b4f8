//! Generation configuration with documented constants
//!
//! All tuning numbers used by battlefield generation are collected here.
//! The config is passed explicitly into generation; there is no global copy.

use serde::{Deserialize, Serialize};

use crate::core::error::{ForgeError, Result};

/// Tunables for battlefield generation
///
/// Fractions are of map width (columns) unless noted otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    // === TERRAIN ===
    /// Maximum number of forts left on a map after zone painting
    ///
    /// Excess forts are demoted to plain at random. Thrones are placed by
    /// features and are not counted.
    pub max_forts: usize,

    // === DEPLOYMENT ===
    /// Player deploy count when neither the request nor the act table has one
    pub default_deploy_count: usize,

    /// Width in columns of the fallback player zone (left edge)
    pub player_fallback_columns: i32,

    /// Left edge of the fallback enemy zone when a template has none
    pub enemy_fallback_start: f64,

    /// Enemy count offset range for acts missing from the offset table
    pub unmapped_enemy_offset: (usize, usize),

    // === COMPOSITION ===
    /// Chance that an ordinary enemy slot draws from the promoted tier
    pub promoted_chance: f64,

    /// Fraction range of boss-half enemies put on guard duty (seize only)
    ///
    /// The actual fraction is drawn uniformly from this range per battle.
    pub guard_fraction: (f64, f64),

    // === RECRUIT NPC ===
    /// Preferred NPC column band on river maps
    pub npc_tight_zone: (f64, f64),

    /// NPC column band for other maps, and the fallback on river maps
    pub npc_wide_zone: (f64, f64),

    /// Minimum Manhattan distance between the NPC and every player spawn
    pub npc_min_player_distance: u32,

    /// Minimum Manhattan distance between the NPC and every enemy spawn
    pub npc_min_enemy_distance: u32,

    /// Highest number of enemies allowed to threaten the NPC on turn one
    pub npc_max_threats: usize,

    /// How many candidates are screened for threats before settling
    pub npc_threat_attempts: usize,

    /// Cap on weapon reach used when estimating enemy threat
    pub threat_range_cap: u32,

    // === RIVERS ===
    /// Column band searched for water when a template demands bridges
    /// and has no river zone
    pub bridge_band: (f64, f64),

    // === SAFETY LIMITS ===
    /// Carve loop ceiling as a multiple of (cols + rows)
    pub carve_step_factor: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_forts: 4,

            default_deploy_count: 4,
            player_fallback_columns: 3,
            enemy_fallback_start: 0.6,
            unmapped_enemy_offset: (2, 3),

            promoted_chance: 0.3,
            guard_fraction: (0.15, 0.25),

            npc_tight_zone: (0.2, 0.4),
            npc_wide_zone: (0.2, 0.55),
            npc_min_player_distance: 2,
            npc_min_enemy_distance: 4,
            npc_max_threats: 2,
            npc_threat_attempts: 12,
            threat_range_cap: 2,

            bridge_band: (0.35, 0.65),

            carve_step_factor: 2,
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a TOML table, filling gaps with defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GenerationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.promoted_chance) {
            return Err(ForgeError::InvalidConfig(format!(
                "promoted_chance ({}) must be within [0, 1]",
                self.promoted_chance
            )));
        }

        for (name, (lo, hi)) in [
            ("guard_fraction", self.guard_fraction),
            ("npc_tight_zone", self.npc_tight_zone),
            ("npc_wide_zone", self.npc_wide_zone),
            ("bridge_band", self.bridge_band),
        ] {
            if !(0.0 <= lo && lo <= hi && hi <= 1.0) {
                return Err(ForgeError::InvalidConfig(format!(
                    "{} ({}, {}) must satisfy 0 <= lo <= hi <= 1",
                    name, lo, hi
                )));
            }
        }

        if self.unmapped_enemy_offset.0 > self.unmapped_enemy_offset.1 {
            return Err(ForgeError::InvalidConfig(
                "unmapped_enemy_offset min must not exceed max".into(),
            ));
        }

        if self.carve_step_factor == 0 || self.npc_threat_attempts == 0 {
            return Err(ForgeError::InvalidConfig(
                "carve_step_factor and npc_threat_attempts must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GenerationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let config = GenerationConfig {
            npc_wide_zone: (0.6, 0.2),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ForgeError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GenerationConfig::from_toml("max_forts = 2\n").unwrap();
        assert_eq!(config.max_forts, 2);
        assert_eq!(config.promoted_chance, 0.3);
    }

    #[test]
    fn test_bad_chance_rejected_from_toml() {
        assert!(GenerationConfig::from_toml("promoted_chance = 1.5\n").is_err());
    }
}
