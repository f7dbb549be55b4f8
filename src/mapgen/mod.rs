//! Procedural battlefield generation
//!
//! `generate_battle` runs the whole pipeline; the submodules are exposed for
//! callers that want individual stages.

pub mod anchors;
pub mod assembler;
pub mod composition;
pub mod enemies;
pub mod layout;
pub mod npc;
pub mod reachability;
pub mod spawns;
pub mod terrain_builder;

pub use anchors::{resolve_anchor, AnchorContext};
pub use assembler::{
    generate_battle, generate_seeded, pick_template, roll_enemy_count, BattleRequest,
    BattlefieldDescriptor,
};
pub use composition::{composition_weight, ClassChooser};
pub use enemies::{assign_guards, place_enemies, score_tile, EnemyContext, EnemySpawn};
pub use layout::Layout;
pub use npc::{count_threats, pick_recruit, place_npc, NpcContext, NpcSpawn};
pub use reachability::{carve_path, ensure_bridges, ensure_reachability, reachable_from};
pub use spawns::{enemy_zone, place_player_spawns, player_zone};
pub use terrain_builder::{apply_features, build_terrain, cap_terrain_count};
