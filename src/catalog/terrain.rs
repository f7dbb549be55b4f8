//! Terrain catalog: named terrain kinds and their effects
//!
//! Loaded once from data and shared read-only (behind an `Arc`) by
//! generation and the grid engine. Layouts store `TerrainId` indices into it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::error::{ForgeError, Result};
use crate::core::types::MoveType;

/// Index of a terrain kind within a `TerrainTable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainId(pub u16);

impl TerrainId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Per movement class traversal cost; `None` means impassable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveCosts {
    pub infantry: Option<u8>,
    pub armored: Option<u8>,
    pub cavalry: Option<u8>,
    pub flying: Option<u8>,
}

impl MoveCosts {
    /// Same cost for every movement class
    pub fn uniform(cost: u8) -> Self {
        Self {
            infantry: Some(cost),
            armored: Some(cost),
            cavalry: Some(cost),
            flying: Some(cost),
        }
    }

    pub fn for_move_type(&self, move_type: MoveType) -> Option<u8> {
        let cost = match move_type {
            MoveType::Infantry => self.infantry,
            MoveType::Armored => self.armored,
            MoveType::Cavalry => self.cavalry,
            MoveType::Flying => self.flying,
        };
        // A zero cost would break shortest-path guarantees
        cost.filter(|c| *c > 0)
    }
}

/// A named terrain kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainKind {
    pub name: String,
    #[serde(default)]
    pub move_cost: MoveCosts,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub avoid: i32,
    /// Units entering keep sliding in their entry direction
    #[serde(default)]
    pub slide: bool,
    /// Damage dealt at end of phase to a unit standing here
    #[serde(default)]
    pub hazard_damage: Option<u32>,
}

impl TerrainKind {
    pub fn new(name: &str, move_cost: MoveCosts) -> Self {
        Self {
            name: name.to_string(),
            move_cost,
            defense: 0,
            avoid: 0,
            slide: false,
            hazard_damage: None,
        }
    }

    /// Movement cost for a class, `None` if impassable
    pub fn cost_for(&self, move_type: MoveType) -> Option<u32> {
        self.move_cost.for_move_type(move_type).map(u32::from)
    }

    pub fn is_passable(&self, move_type: MoveType) -> bool {
        self.cost_for(move_type).is_some()
    }
}

/// Terrain kinds generation treats specially, resolved by name once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTerrain {
    pub plain: TerrainId,
    pub forest: Option<TerrainId>,
    pub mountain: Option<TerrainId>,
    pub fort: Option<TerrainId>,
    pub throne: Option<TerrainId>,
    pub wall: Option<TerrainId>,
    pub water: Option<TerrainId>,
    pub bridge: Option<TerrainId>,
}

#[derive(Debug, Deserialize)]
struct TerrainFile {
    terrain: Vec<TerrainKind>,
}

/// The full terrain catalog
#[derive(Debug, Clone)]
pub struct TerrainTable {
    kinds: Vec<TerrainKind>,
    by_name: HashMap<String, TerrainId>,
    key: KeyTerrain,
}

impl TerrainTable {
    /// Build a table; requires a terrain named "Plain"
    pub fn new(kinds: Vec<TerrainKind>) -> Result<Self> {
        if kinds.len() > u16::MAX as usize {
            return Err(ForgeError::InvalidData("too many terrain kinds".into()));
        }

        let mut by_name = HashMap::new();
        for (idx, kind) in kinds.iter().enumerate() {
            if by_name.insert(kind.name.clone(), TerrainId(idx as u16)).is_some() {
                return Err(ForgeError::InvalidData(format!(
                    "duplicate terrain name: {}",
                    kind.name
                )));
            }
        }

        let lookup = |name: &str| by_name.get(name).copied();
        let plain = lookup("Plain").ok_or_else(|| ForgeError::UnknownTerrain("Plain".into()))?;
        if !kinds[plain.index()].is_passable(MoveType::Infantry) {
            return Err(ForgeError::InvalidData(
                "Plain must be passable for infantry".into(),
            ));
        }

        let key = KeyTerrain {
            plain,
            forest: lookup("Forest"),
            mountain: lookup("Mountain"),
            fort: lookup("Fort"),
            throne: lookup("Throne"),
            wall: lookup("Wall"),
            water: lookup("Water"),
            bridge: lookup("Bridge"),
        };

        Ok(Self {
            kinds,
            by_name,
            key,
        })
    }

    /// Parse a `[[terrain]]` TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: TerrainFile = toml::from_str(content)?;
        Self::new(file.terrain)
    }

    pub fn get(&self, id: TerrainId) -> Option<&TerrainKind> {
        self.kinds.get(id.index())
    }

    pub fn id_of(&self, name: &str) -> Option<TerrainId> {
        self.by_name.get(name).copied()
    }

    /// Look up a terrain id, failing with `UnknownTerrain`
    pub fn require(&self, name: &str) -> Result<TerrainId> {
        self.id_of(name)
            .ok_or_else(|| ForgeError::UnknownTerrain(name.to_string()))
    }

    pub fn key(&self) -> &KeyTerrain {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TerrainId, &TerrainKind)> {
        self.kinds
            .iter()
            .enumerate()
            .map(|(idx, kind)| (TerrainId(idx as u16), kind))
    }

    pub fn cost(&self, id: TerrainId, move_type: MoveType) -> Option<u32> {
        self.get(id).and_then(|kind| kind.cost_for(move_type))
    }

    pub fn is_passable(&self, id: TerrainId, move_type: MoveType) -> bool {
        self.cost(id, move_type).is_some()
    }

    pub fn is_slide(&self, id: TerrainId) -> bool {
        self.get(id).is_some_and(|kind| kind.slide)
    }

    pub fn name(&self, id: TerrainId) -> &str {
        self.get(id).map(|kind| kind.name.as_str()).unwrap_or("?")
    }
}
