//! Grid engine: movement, pathfinding and battlefield overlays during play

pub mod constants;
pub mod engine;
pub mod fog;
pub mod hazards;
pub mod movement;
pub mod occupancy;
pub mod pathfinding;
pub mod ranges;
pub mod slide;

pub use constants::vision_range_for;
pub use engine::{GridEngine, TemporaryTerrain};
pub use fog::{FogOfWar, VisibilityState};
pub use hazards::{apply_hazard, apply_tile_hazard, hazard_damage_at, HazardOutcome};
pub use movement::{movement_range, MovementRange, Reach};
pub use occupancy::Occupancy;
pub use pathfinding::{find_path, path_cost};
pub use ranges::{attack_range, vision_range, WeaponRange};
pub use slide::{compute_effective_path, entry_direction, resolve_slide, EffectivePath};
