pub mod config;
pub mod error;
pub mod random;
pub mod types;

pub use config::GenerationConfig;
pub use error::{ForgeError, Result};
pub use random::{seeded_rng, WeightedRng};
pub use types::{Direction, Faction, GridPos, MoveType, Objective, TileRect};
