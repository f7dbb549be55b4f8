//! Grid engine constants - tunable values in one place

use crate::core::types::MoveType;

// Vision (tiles, Manhattan)
pub const INFANTRY_VISION_RANGE: u32 = 3;
pub const ARMORED_VISION_RANGE: u32 = 3;
pub const CAVALRY_VISION_RANGE: u32 = 4;
pub const FLYING_VISION_RANGE: u32 = 5;

// Weapon range written as "ALL" (whole map)
pub const ALL_RANGE: u32 = 99;

// End-of-phase damage of the built-in Lava Crack terrain
pub const LAVA_CRACK_DAMAGE: u32 = 5;

// Temporary terrain lasts at least one turn
pub const MIN_TEMPORARY_TURNS: u32 = 1;

/// Vision radius for a movement class
pub fn vision_range_for(move_type: MoveType) -> u32 {
    match move_type {
        MoveType::Infantry => INFANTRY_VISION_RANGE,
        MoveType::Armored => ARMORED_VISION_RANGE,
        MoveType::Cavalry => CAVALRY_VISION_RANGE,
        MoveType::Flying => FLYING_VISION_RANGE,
    }
}
