//! Game data loading
//!
//! `GameData` bundles every read-only table generation consumes. It is built
//! either from the data set compiled into the crate or from a directory
//! holding `terrain.toml`, `templates.toml`, `units.toml` and `rules.toml`.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::rules::Rules;
use crate::catalog::templates::TemplateCatalog;
use crate::catalog::terrain::TerrainTable;
use crate::catalog::units::UnitCatalog;
use crate::core::error::{ForgeError, Result};
use crate::core::types::Objective;

const BUILTIN_TERRAIN: &str = include_str!("../../data/terrain.toml");
const BUILTIN_TEMPLATES: &str = include_str!("../../data/templates.toml");
const BUILTIN_UNITS: &str = include_str!("../../data/units.toml");
const BUILTIN_RULES: &str = include_str!("../../data/rules.toml");

/// All externally authored tables, validated against each other
#[derive(Debug, Clone)]
pub struct GameData {
    pub terrain: Arc<TerrainTable>,
    pub templates: TemplateCatalog,
    pub units: UnitCatalog,
    pub rules: Rules,
}

impl GameData {
    /// Parse the four TOML documents and cross-check them
    pub fn from_toml_sources(terrain: &str, templates: &str, units: &str, rules: &str) -> Result<Self> {
        let terrain = Arc::new(TerrainTable::from_toml(terrain)?);
        let templates = TemplateCatalog::from_toml(templates, &terrain)?;
        let units = UnitCatalog::from_toml(units)?;
        let rules = Rules::from_toml(rules)?;

        let data = Self {
            terrain,
            templates,
            units,
            rules,
        };
        data.validate()?;
        Ok(data)
    }

    /// The data set shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_sources(BUILTIN_TERRAIN, BUILTIN_TEMPLATES, BUILTIN_UNITS, BUILTIN_RULES)
    }

    /// Load from a directory of TOML files
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            debug!(path = %path.display(), "Reading game data");
            std::fs::read_to_string(&path)
        };

        let data = Self::from_toml_sources(
            &read("terrain.toml")?,
            &read("templates.toml")?,
            &read("units.toml")?,
            &read("rules.toml")?,
        )?;

        info!(
            dir = %dir.display(),
            terrain = data.terrain.len(),
            classes = data.units.classes().len(),
            "Loaded game data"
        );
        Ok(data)
    }

    /// Cross-table references
    fn validate(&self) -> Result<()> {
        for template in self
            .templates
            .pool(Objective::Rout)
            .iter()
            .chain(self.templates.pool(Objective::Seize))
        {
            for anchor in &template.anchors {
                if let Some(class) = &anchor.class {
                    self.units.require_class(class)?;
                }
            }
        }

        for size in &self.rules.map_sizes {
            if self.units.pool(&size.act).is_none() {
                return Err(ForgeError::InvalidData(format!(
                    "map size defined for {} but it has no enemy pool",
                    size.act
                )));
            }
        }

        Ok(())
    }
}
