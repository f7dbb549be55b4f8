//! End-of-phase terrain damage

use serde::{Deserialize, Serialize};

use crate::core::types::GridPos;
use crate::grid::engine::GridEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardOutcome {
    pub next_hp: u32,
    /// Damage actually taken after the floor
    pub applied_damage: u32,
}

/// Apply hazard damage; never takes a unit below 1 HP
pub fn apply_hazard(current_hp: u32, damage: u32) -> HazardOutcome {
    let next_hp = current_hp.saturating_sub(damage).max(1);
    HazardOutcome {
        next_hp,
        applied_damage: current_hp.saturating_sub(next_hp),
    }
}

/// Damage dealt to a unit ending its phase on `pos`, if any
pub fn hazard_damage_at(engine: &GridEngine, pos: GridPos) -> Option<u32> {
    engine
        .terrain_at(pos)
        .and_then(|kind| kind.hazard_damage)
        .filter(|damage| *damage > 0)
}

/// Apply the tile's hazard to a unit; `None` when the tile is harmless
pub fn apply_tile_hazard(engine: &GridEngine, pos: GridPos, current_hp: u32) -> Option<HazardOutcome> {
    hazard_damage_at(engine, pos).map(|damage| apply_hazard(current_hp, damage))
}
