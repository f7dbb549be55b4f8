//! Attack and vision ranges
//!
//! Both are Manhattan rings clipped to the grid, enumerated rows top to
//! bottom and columns left to right.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::ForgeError;
use crate::core::types::GridPos;
use crate::grid::constants::ALL_RANGE;

/// Inclusive weapon reach in tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponRange {
    pub min: u32,
    pub max: u32,
}

impl WeaponRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn melee() -> Self {
        Self::new(1, 1)
    }

    pub fn contains(&self, distance: u32) -> bool {
        distance >= self.min && distance <= self.max
    }

    pub fn can_hit(&self, from: GridPos, target: GridPos) -> bool {
        self.contains(from.distance(&target))
    }
}

impl fmt::Display for WeaponRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min == self.max, self.max == ALL_RANGE) {
            (_, true) => write!(f, "{}-ALL", self.min),
            (true, false) => write!(f, "{}", self.min),
            (false, false) => write!(f, "{}-{}", self.min, self.max),
        }
    }
}

/// Parses "1", "1-2" and "1-ALL"
///
/// Any range mentioning ALL covers the whole map from 1, whatever its
/// stated minimum.
impl FromStr for WeaponRange {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.to_ascii_uppercase().contains("ALL") {
            return Ok(Self::new(1, ALL_RANGE));
        }

        let invalid = || ForgeError::InvalidRange(s.to_string());
        let bound = |part: &str| part.trim().parse::<u32>().map_err(|_| invalid());

        let (min, max) = match s.split_once('-') {
            Some((lo, hi)) => (bound(lo)?, bound(hi)?),
            None => {
                let value = bound(s)?;
                (value, value)
            }
        };
        if min > max {
            return Err(invalid());
        }
        Ok(Self { min, max })
    }
}

fn ring(cols: i32, rows: i32, origin: GridPos, min: u32, max: u32) -> Vec<GridPos> {
    // Nothing on the grid is further than cols + rows
    let reach = max.min((cols + rows).max(0) as u32) as i32;
    let mut tiles = Vec::new();
    for row in (origin.row - reach).max(0)..=(origin.row + reach).min(rows - 1) {
        for col in (origin.col - reach).max(0)..=(origin.col + reach).min(cols - 1) {
            let pos = GridPos::new(col, row);
            let dist = origin.distance(&pos);
            if dist >= min && dist <= max {
                tiles.push(pos);
            }
        }
    }
    tiles
}

/// Tiles a weapon can strike from `origin`
pub fn attack_range(cols: i32, rows: i32, origin: GridPos, range: WeaponRange) -> Vec<GridPos> {
    ring(cols, rows, origin, range.min, range.max)
}

/// Tiles seen from `origin`, the origin included
pub fn vision_range(cols: i32, rows: i32, origin: GridPos, range: u32) -> Vec<GridPos> {
    ring(cols, rows, origin, 0, range)
}
