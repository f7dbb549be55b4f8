//! Read-only game data: terrain, templates, units and sizing rules

pub mod loader;
pub mod rules;
pub mod templates;
pub mod terrain;
pub mod units;

pub use loader::GameData;
pub use rules::{DensityCap, DeployLimit, EnemyCountOffsets, MapSize, Rules};
pub use templates::{
    AnchorRule, AnchorSpec, Feature, FeaturePosition, Template, TemplateCatalog, Zone, ZoneRole,
};
pub use terrain::{KeyTerrain, MoveCosts, TerrainId, TerrainKind, TerrainTable};
pub use units::{
    classify, AiMode, BossDef, ClassDef, CompositionCategory, EnemyPool, Proficiency, RecruitDef,
    RecruitPool, Tier, UnitCatalog,
};
