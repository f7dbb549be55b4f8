//! Which faction stands on which tile
//!
//! Movement and pathfinding treat tiles held by the mover's own faction as
//! passable (but not a valid place to stop) and every other occupant as a
//! wall.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Faction, GridPos};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    units: AHashMap<GridPos, Faction>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a unit, returning the faction previously on the tile
    pub fn insert(&mut self, pos: GridPos, faction: Faction) -> Option<Faction> {
        self.units.insert(pos, faction)
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Faction> {
        self.units.remove(&pos)
    }

    /// Move whatever stands on `from` to `to`
    pub fn relocate(&mut self, from: GridPos, to: GridPos) -> bool {
        match self.units.remove(&from) {
            Some(faction) => {
                self.units.insert(to, faction);
                true
            }
            None => false,
        }
    }

    pub fn faction_at(&self, pos: GridPos) -> Option<Faction> {
        self.units.get(&pos).copied()
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.units.contains_key(&pos)
    }

    /// Occupied by anyone the mover cannot pass through
    pub fn blocks(&self, pos: GridPos, mover: Faction) -> bool {
        self.faction_at(pos)
            .is_some_and(|f| !f.is_allied_with(mover))
    }

    /// Occupied by the mover's own side
    pub fn is_ally(&self, pos: GridPos, mover: Faction) -> bool {
        self.faction_at(pos)
            .is_some_and(|f| f.is_allied_with(mover))
    }

    /// Tiles held by a faction, sorted
    pub fn positions_of(&self, faction: Faction) -> Vec<GridPos> {
        let mut positions: Vec<GridPos> = self
            .units
            .iter()
            .filter(|(_, f)| **f == faction)
            .map(|(pos, _)| *pos)
            .collect();
        positions.sort();
        positions
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<(GridPos, Faction)> for Occupancy {
    fn from_iter<T: IntoIterator<Item = (GridPos, Faction)>>(iter: T) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}
