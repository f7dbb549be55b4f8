//! Per-act battle sizing tables

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{ForgeError, Result};

/// Deployable squad size for an act
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployLimit {
    pub min: usize,
    pub max: usize,
}

fn default_offset() -> (usize, usize) {
    (1, 2)
}

/// Extra enemies over the deploy count, as an inclusive range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyCountOffsets {
    #[serde(default = "default_offset")]
    pub default: (usize, usize),
    #[serde(default)]
    pub boss: Option<(usize, usize)>,
    /// Keyed by progression-map row, as a string
    #[serde(default)]
    pub rows: BTreeMap<String, (usize, usize)>,
}

impl EnemyCountOffsets {
    /// Boss range wins over a row range, which wins over the default
    pub fn offset_for(&self, row: Option<u32>, is_boss: bool) -> (usize, usize) {
        if is_boss {
            if let Some(boss) = self.boss {
                return boss;
            }
        }
        row.and_then(|r| self.rows.get(&r.to_string()).copied())
            .unwrap_or(self.default)
    }
}

/// Enemy ceiling for maps of at least `min_tiles` tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityCap {
    pub min_tiles: usize,
    pub max_enemies: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub act: String,
    pub cols: i32,
    pub rows: i32,
}

impl MapSize {
    pub fn tiles(&self) -> usize {
        (self.cols * self.rows) as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub deploy_limits: BTreeMap<String, DeployLimit>,
    #[serde(default)]
    pub enemy_count_offsets: BTreeMap<String, EnemyCountOffsets>,
    #[serde(default)]
    pub density_caps: Vec<DensityCap>,
    pub map_sizes: Vec<MapSize>,
}

impl Rules {
    pub fn from_toml(content: &str) -> Result<Self> {
        let rules: Rules = toml::from_str(content)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        if self.map_sizes.is_empty() {
            return Err(ForgeError::InvalidData("no map sizes defined".into()));
        }
        for size in &self.map_sizes {
            // Feature anchors sit three columns from the right edge
            if size.cols < 4 || size.rows < 2 {
                return Err(ForgeError::InvalidData(format!(
                    "map size {}x{} for {} is too small",
                    size.cols, size.rows, size.act
                )));
            }
        }

        for (act, limit) in &self.deploy_limits {
            if limit.min == 0 || limit.min > limit.max {
                return Err(ForgeError::InvalidData(format!(
                    "deploy limit for {} must satisfy 1 <= min <= max",
                    act
                )));
            }
        }

        for (act, offsets) in &self.enemy_count_offsets {
            let ranges = std::iter::once(offsets.default)
                .chain(offsets.boss)
                .chain(offsets.rows.values().copied());
            for (lo, hi) in ranges {
                if lo > hi {
                    return Err(ForgeError::InvalidData(format!(
                        "enemy count offset ({}, {}) for {} is inverted",
                        lo, hi, act
                    )));
                }
            }
            if let Some(bad) = offsets.rows.keys().find(|k| k.parse::<u32>().is_err()) {
                return Err(ForgeError::InvalidData(format!(
                    "enemy count offset row '{}' for {} is not a number",
                    bad, act
                )));
            }
        }

        Ok(())
    }

    pub fn deploy_limit(&self, act: &str) -> Option<DeployLimit> {
        self.deploy_limits.get(act).copied()
    }

    /// Offset range for a battle; `None` when the act is unmapped
    pub fn enemy_offset(&self, act: &str, row: Option<u32>, is_boss: bool) -> Option<(usize, usize)> {
        self.enemy_count_offsets
            .get(act)
            .map(|offsets| offsets.offset_for(row, is_boss))
    }

    /// Ceiling from the largest threshold not above `tiles`
    pub fn density_cap(&self, tiles: usize) -> Option<usize> {
        self.density_caps
            .iter()
            .filter(|cap| cap.min_tiles <= tiles)
            .max_by_key(|cap| cap.min_tiles)
            .map(|cap| cap.max_enemies)
    }

    /// Sizes for an act, falling back to act1 and then to every size
    pub fn map_sizes_for(&self, act: &str) -> Vec<&MapSize> {
        for wanted in [act, "act1"] {
            let sizes: Vec<&MapSize> = self.map_sizes.iter().filter(|s| s.act == wanted).collect();
            if !sizes.is_empty() {
                return sizes;
            }
        }
        self.map_sizes.iter().collect()
    }
}
