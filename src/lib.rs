//! Fieldforge - procedural battlefields and grid movement for tile tactics

pub mod catalog;
pub mod core;
pub mod grid;
pub mod mapgen;

pub use crate::catalog::GameData;
pub use crate::core::{ForgeError, GenerationConfig, Result};
pub use crate::grid::GridEngine;
pub use crate::mapgen::{generate_battle, generate_seeded, BattleRequest, BattlefieldDescriptor};
