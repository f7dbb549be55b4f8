//! Battlefield templates: weighted terrain zones, features and anchors
//!
//! Templates are authored in TOML under `[[rout]]` and `[[seize]]`. Every
//! template is validated against the terrain catalog at load time so that
//! generation never sees a degenerate rectangle or an unknown terrain name.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::catalog::terrain::TerrainTable;
use crate::catalog::units::{AiMode, CompositionCategory};
use crate::core::error::{ForgeError, Result};
use crate::core::types::{GridPos, Objective, TileRect};

/// Special meaning attached to a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneRole {
    PlayerSpawn,
    EnemySpawn,
    River,
}

/// A normalized rectangle painted from a weighted terrain table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// `[x1, y1, x2, y2]` as fractions of the map
    pub rect: [f64; 4],
    /// Terrain name -> relative weight
    #[serde(default)]
    pub terrain: BTreeMap<String, f64>,
    /// Higher priority zones are painted later
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub role: Option<ZoneRole>,
}

impl Zone {
    pub fn tile_rect(&self, cols: i32, rows: i32) -> TileRect {
        let [x1, y1, x2, y2] = self.rect;
        TileRect::from_fractions(x1, y1, x2, y2, cols, rows)
    }

    /// Terrain table in draw order
    pub fn weights(&self) -> Vec<(&str, f64)> {
        self.terrain
            .iter()
            .map(|(name, weight)| (name.as_str(), *weight))
            .collect()
    }
}

/// Named anchor point for a fixed-position feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeaturePosition {
    Center,
    Right,
    TopRight,
    BottomRight,
}

impl FeaturePosition {
    pub fn resolve(&self, cols: i32, rows: i32) -> GridPos {
        let row_at = |frac: f64| (rows as f64 * frac).floor() as i32;
        let pos = match self {
            FeaturePosition::Center => GridPos::new(cols / 2, rows / 2),
            FeaturePosition::Right => GridPos::new(cols - 3, rows / 2),
            FeaturePosition::TopRight => GridPos::new(cols - 3, row_at(0.3)),
            FeaturePosition::BottomRight => GridPos::new(cols - 3, row_at(0.7)),
        };
        // Very narrow maps would push the right-hand anchors off the grid
        GridPos::new(pos.col.clamp(0, cols - 1), pos.row.clamp(0, rows - 1))
    }
}

/// Single-tile terrain override applied after zone painting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub terrain: String,
    pub position: FeaturePosition,
}

/// Named placement rule for scripted enemies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorRule {
    /// On or next to the throne
    Throne,
    /// Chokepoint in the center column
    CenterGap,
    /// Land tiles at the far end of bridges
    BridgeEnds,
    /// Beside gaps in wall lines
    GateAdjacent,
}

impl AnchorRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorRule::Throne => "throne",
            AnchorRule::CenterGap => "center_gap",
            AnchorRule::BridgeEnds => "bridge_ends",
            AnchorRule::GateAdjacent => "gate_adjacent",
        }
    }
}

fn default_anchor_count() -> usize {
    1
}

/// A scripted enemy placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorSpec {
    pub rule: AnchorRule,
    /// `None` defers to the strongest class in the act's pool
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default = "default_anchor_count")]
    pub count: usize,
    #[serde(default)]
    pub ai_mode: Option<AiMode>,
}

/// A battlefield blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    /// Acts this template is meant for; empty means any act
    #[serde(default)]
    pub acts: Vec<String>,
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub anchors: Vec<AnchorSpec>,
    /// Composition category -> weight multiplier
    #[serde(default)]
    pub composition: BTreeMap<String, f64>,
    #[serde(default)]
    pub min_bridges: Option<usize>,
}

impl Template {
    pub fn zone_with_role(&self, role: ZoneRole) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.role == Some(role))
    }

    /// Zones in painting order (stable for equal priorities)
    pub fn zones_by_priority(&self) -> Vec<&Zone> {
        let mut zones: Vec<&Zone> = self.zones.iter().collect();
        zones.sort_by_key(|zone| zone.priority);
        zones
    }

    /// Maps built around a river band
    pub fn is_river(&self) -> bool {
        self.min_bridges.is_some() || self.zone_with_role(ZoneRole::River).is_some()
    }

    pub fn allows_act(&self, act: &str) -> bool {
        self.acts.is_empty() || self.acts.iter().any(|a| a == act)
    }

    /// Parsed composition multipliers
    pub fn composition_weights(&self) -> Result<Vec<(CompositionCategory, f64)>> {
        self.composition
            .iter()
            .map(|(key, weight)| {
                let category = key
                    .parse::<CompositionCategory>()
                    .map_err(|_| ForgeError::template(&self.id, format!("unknown composition category '{}'", key)))?;
                Ok((category, *weight))
            })
            .collect()
    }

    /// Reject geometry and names generation cannot honor
    pub fn validate(&self, terrain: &TerrainTable) -> Result<()> {
        if self.zones.is_empty() {
            return Err(ForgeError::template(&self.id, "template has no zones"));
        }

        for (idx, zone) in self.zones.iter().enumerate() {
            let [x1, y1, x2, y2] = zone.rect;
            let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
            if !zone.rect.iter().all(|v| in_unit(*v)) || x1 >= x2 || y1 >= y2 {
                return Err(ForgeError::template(
                    &self.id,
                    format!("zone {} has degenerate rect {:?}", idx, zone.rect),
                ));
            }

            if zone.terrain.is_empty() && zone.role.is_none() {
                return Err(ForgeError::template(
                    &self.id,
                    format!("zone {} has neither terrain weights nor a role", idx),
                ));
            }

            for (name, weight) in &zone.terrain {
                terrain
                    .require(name)
                    .map_err(|_| ForgeError::template(&self.id, format!("unknown terrain '{}'", name)))?;
                if !weight.is_finite() || *weight <= 0.0 {
                    return Err(ForgeError::template(
                        &self.id,
                        format!("zone {} weight for {} must be positive", idx, name),
                    ));
                }
            }
        }

        for feature in &self.features {
            terrain.require(&feature.terrain).map_err(|_| {
                ForgeError::template(&self.id, format!("unknown feature terrain '{}'", feature.terrain))
            })?;
        }

        for anchor in &self.anchors {
            if anchor.count == 0 {
                return Err(ForgeError::template(
                    &self.id,
                    format!("anchor {} has a count of zero", anchor.rule.as_str()),
                ));
            }
        }

        for (_, multiplier) in self.composition_weights()? {
            if !multiplier.is_finite() || multiplier < 0.0 {
                return Err(ForgeError::template(
                    &self.id,
                    "composition multipliers must be non-negative",
                ));
            }
        }

        if self.min_bridges.is_some() {
            let key = terrain.key();
            if key.water.is_none() || key.bridge.is_none() {
                return Err(ForgeError::template(
                    &self.id,
                    "min_bridges needs Water and Bridge terrain",
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    rout: Vec<Template>,
    #[serde(default)]
    seize: Vec<Template>,
}

/// Templates grouped by the objective they support
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    rout: Vec<Template>,
    seize: Vec<Template>,
}

impl TemplateCatalog {
    /// Build and validate a catalog; ids must be unique within a pool
    pub fn new(rout: Vec<Template>, seize: Vec<Template>, terrain: &TerrainTable) -> Result<Self> {
        for pool in [&rout, &seize] {
            let mut seen = HashSet::new();
            for template in pool {
                if !seen.insert(template.id.as_str()) {
                    return Err(ForgeError::template(&template.id, "duplicate template id"));
                }
                template.validate(terrain)?;
            }
        }
        Ok(Self { rout, seize })
    }

    pub fn from_toml(content: &str, terrain: &TerrainTable) -> Result<Self> {
        let file: TemplateFile = toml::from_str(content)?;
        Self::new(file.rout, file.seize, terrain)
    }

    pub fn pool(&self, objective: Objective) -> &[Template] {
        match objective {
            Objective::Rout => &self.rout,
            Objective::Seize => &self.seize,
        }
    }

    pub fn find(&self, objective: Objective, id: &str) -> Option<&Template> {
        self.pool(objective).iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::terrain::{MoveCosts, TerrainKind};

    fn terrain() -> TerrainTable {
        TerrainTable::new(vec![
            TerrainKind::new("Plain", MoveCosts::uniform(1)),
            TerrainKind::new("Forest", MoveCosts::uniform(2)),
            TerrainKind::new("Throne", MoveCosts::uniform(1)),
        ])
        .unwrap()
    }

    fn forest_zone() -> Zone {
        Zone {
            rect: [0.0, 0.0, 1.0, 1.0],
            terrain: BTreeMap::from([("Forest".to_string(), 100.0)]),
            priority: 0,
            role: None,
        }
    }

    fn template(zones: Vec<Zone>) -> Template {
        Template {
            id: "test".into(),
            acts: vec![],
            zones,
            features: vec![],
            anchors: vec![],
            composition: BTreeMap::new(),
            min_bridges: None,
        }
    }

    #[test]
    fn test_degenerate_rect_rejected() {
        let mut zone = forest_zone();
        zone.rect = [0.5, 0.0, 0.5, 1.0];
        let result = template(vec![zone]).validate(&terrain());
        assert!(matches!(result, Err(ForgeError::InvalidTemplate { .. })));
    }

    #[test]
    fn test_out_of_unit_rect_rejected() {
        let mut zone = forest_zone();
        zone.rect = [0.0, 0.0, 1.2, 1.0];
        assert!(template(vec![zone]).validate(&terrain()).is_err());
    }

    #[test]
    fn test_unknown_terrain_rejected() {
        let mut zone = forest_zone();
        zone.terrain.insert("Swamp".into(), 10.0);
        assert!(template(vec![zone]).validate(&terrain()).is_err());
    }

    #[test]
    fn test_min_bridges_needs_water() {
        let mut t = template(vec![forest_zone()]);
        t.min_bridges = Some(2);
        assert!(t.validate(&terrain()).is_err());
    }

    #[test]
    fn test_zone_tile_rect() {
        let mut zone = forest_zone();
        zone.rect = [0.6, 0.0, 1.0, 0.5];
        assert_eq!(zone.tile_rect(10, 8), TileRect::new(6, 10, 0, 4));
    }

    #[test]
    fn test_feature_positions() {
        assert_eq!(FeaturePosition::Center.resolve(10, 8), GridPos::new(5, 4));
        assert_eq!(FeaturePosition::Right.resolve(10, 8), GridPos::new(7, 4));
        assert_eq!(FeaturePosition::TopRight.resolve(10, 8), GridPos::new(7, 2));
        assert_eq!(FeaturePosition::BottomRight.resolve(10, 8), GridPos::new(7, 5));
    }

    #[test]
    fn test_zones_sorted_by_priority() {
        let mut high = forest_zone();
        high.priority = 5;
        let low = forest_zone();
        let t = template(vec![high, low]);
        let order: Vec<i32> = t.zones_by_priority().iter().map(|z| z.priority).collect();
        assert_eq!(order, vec![0, 5]);
    }

    #[test]
    fn test_act_filter() {
        let mut t = template(vec![forest_zone()]);
        assert!(t.allows_act("act3"));
        t.acts = vec!["act1".into()];
        assert!(t.allows_act("act1"));
        assert!(!t.allows_act("act2"));
    }

    #[test]
    fn test_catalog_from_toml() {
        let catalog = TemplateCatalog::from_toml(
            r#"
            [[seize]]
            id = "keep"
            features = [{ terrain = "Throne", position = "right" }]

            [[seize.zones]]
            rect = [0.0, 0.0, 1.0, 1.0]
            terrain = { Plain = 70, Forest = 30 }

            [[seize.zones]]
            rect = [0.0, 0.0, 0.2, 1.0]
            role = "player_spawn"
            "#,
            &terrain(),
        )
        .unwrap();
        assert!(catalog.pool(Objective::Rout).is_empty());
        let keep = catalog.find(Objective::Seize, "keep").unwrap();
        assert!(keep.zone_with_role(ZoneRole::PlayerSpawn).is_some());
        assert_eq!(keep.features[0].position, FeaturePosition::Right);
    }
}
