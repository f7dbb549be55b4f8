//! Battle grid: terrain lookups plus per-battle overlay state
//!
//! The engine owns a copy of the generated layout. Temporary terrain is
//! written straight into that copy and remembered so it can be reverted;
//! every query therefore sees the terrain currently in effect.

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::terrain::{TerrainId, TerrainKind, TerrainTable};
use crate::core::error::{ForgeError, Result};
use crate::core::types::{Faction, GridPos, MoveType};
use crate::grid::constants::{vision_range_for, MIN_TEMPORARY_TURNS};
use crate::grid::fog::{FogOfWar, VisibilityState};
use crate::grid::movement::{movement_range, MovementRange};
use crate::grid::occupancy::Occupancy;
use crate::grid::pathfinding::find_path;
use crate::grid::ranges::{attack_range, vision_range, WeaponRange};
use crate::grid::slide::{compute_effective_path, EffectivePath};
use crate::mapgen::assembler::BattlefieldDescriptor;
use crate::mapgen::layout::Layout;

/// A terrain override with a turn countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryTerrain {
    pub terrain: TerrainId,
    /// Terrain restored when the override expires
    pub original: TerrainId,
    pub turns_remaining: u32,
}

#[derive(Debug, Clone)]
pub struct GridEngine {
    layout: Layout,
    terrain: Arc<TerrainTable>,
    temporary: AHashMap<GridPos, TemporaryTerrain>,
    fog: FogOfWar,
}

impl GridEngine {
    pub fn new(layout: Layout, terrain: Arc<TerrainTable>) -> Self {
        let fog = FogOfWar::disabled(layout.cols(), layout.rows());
        Self {
            layout,
            terrain,
            temporary: AHashMap::new(),
            fog,
        }
    }

    /// Engine over a generated battlefield
    pub fn from_descriptor(battle: &BattlefieldDescriptor, terrain: Arc<TerrainTable>, fog_enabled: bool) -> Self {
        Self::new(battle.layout.clone(), terrain).with_fog(fog_enabled)
    }

    pub fn with_fog(mut self, enabled: bool) -> Self {
        self.fog = FogOfWar::new(self.layout.cols(), self.layout.rows(), enabled);
        self
    }

    pub fn cols(&self) -> i32 {
        self.layout.cols()
    }

    pub fn rows(&self) -> i32 {
        self.layout.rows()
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        self.layout.in_bounds(pos)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn terrain_table(&self) -> &TerrainTable {
        &self.terrain
    }

    pub fn terrain_id_at(&self, pos: GridPos) -> Option<TerrainId> {
        self.layout.get(pos)
    }

    /// Terrain in effect at a tile, `None` off the grid
    pub fn terrain_at(&self, pos: GridPos) -> Option<&TerrainKind> {
        self.layout.get(pos).and_then(|id| self.terrain.get(id))
    }

    /// Cost to enter a tile; `None` when impassable or off the grid
    pub fn move_cost(&self, pos: GridPos, move_type: MoveType) -> Option<u32> {
        self.layout
            .get(pos)
            .and_then(|id| self.terrain.cost(id, move_type))
    }

    pub fn is_passable(&self, pos: GridPos, move_type: MoveType) -> bool {
        self.move_cost(pos, move_type).is_some()
    }

    pub fn is_slide(&self, pos: GridPos) -> bool {
        self.layout
            .get(pos)
            .is_some_and(|id| self.terrain.is_slide(id))
    }

    /// In-bounds orthogonal neighbors
    pub fn neighbors(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        self.layout.neighbors(pos)
    }

    pub fn movement_range(
        &self,
        start: GridPos,
        budget: u32,
        move_type: MoveType,
        occupancy: &Occupancy,
        mover: Faction,
    ) -> MovementRange {
        movement_range(self, start, budget, move_type, occupancy, mover)
    }

    pub fn find_path(
        &self,
        start: GridPos,
        goal: GridPos,
        move_type: MoveType,
        occupancy: &Occupancy,
        mover: Faction,
    ) -> Option<Vec<GridPos>> {
        find_path(self, start, goal, move_type, occupancy, mover)
    }

    pub fn effective_path(&self, path: &[GridPos], move_type: MoveType, occupancy: &Occupancy) -> EffectivePath {
        compute_effective_path(self, path, move_type, occupancy)
    }

    pub fn attack_range(&self, origin: GridPos, range: WeaponRange) -> Vec<GridPos> {
        attack_range(self.cols(), self.rows(), origin, range)
    }

    pub fn vision_range(&self, origin: GridPos, move_type: MoveType) -> Vec<GridPos> {
        vision_range(self.cols(), self.rows(), origin, vision_range_for(move_type))
    }

    pub fn fog(&self) -> &FogOfWar {
        &self.fog
    }

    /// Recompute fog from the viewing side's units
    pub fn update_fog<I>(&mut self, viewers: I)
    where
        I: IntoIterator<Item = (GridPos, MoveType)>,
    {
        self.fog.update(viewers);
    }

    pub fn is_visible(&self, pos: GridPos) -> bool {
        self.fog.is_visible(pos)
    }

    pub fn visibility(&self, pos: GridPos) -> VisibilityState {
        self.fog.state(pos)
    }

    /// Override a tile for `turns` turns
    ///
    /// Re-applying on an overridden tile keeps the first original terrain
    /// and extends the countdown to the longer of the two.
    pub fn set_temporary_terrain(&mut self, pos: GridPos, terrain: TerrainId, turns: u32) -> Result<()> {
        if self.terrain.get(terrain).is_none() {
            return Err(ForgeError::UnknownTerrain(format!("id {}", terrain.index())));
        }
        let turns = turns.max(MIN_TEMPORARY_TURNS);
        let previous = self.layout.set(pos, terrain)?;

        let entry = self
            .temporary
            .entry(pos)
            .and_modify(|existing| {
                existing.terrain = terrain;
                existing.turns_remaining = existing.turns_remaining.max(turns);
            })
            .or_insert(TemporaryTerrain {
                terrain,
                original: previous,
                turns_remaining: turns,
            });
        debug!(%pos, terrain = self.terrain.name(terrain), turns = entry.turns_remaining, "Temporary terrain set");
        Ok(())
    }

    /// Override a tile by terrain name
    pub fn set_temporary_terrain_named(&mut self, pos: GridPos, name: &str, turns: u32) -> Result<()> {
        let id = self.terrain.require(name)?;
        self.set_temporary_terrain(pos, id, turns)
    }

    pub fn temporary_at(&self, pos: GridPos) -> Option<&TemporaryTerrain> {
        self.temporary.get(&pos)
    }

    /// Revert an override now; returns the restored terrain
    pub fn clear_temporary_terrain(&mut self, pos: GridPos) -> Result<Option<TerrainId>> {
        let Some(temp) = self.temporary.remove(&pos) else {
            return Ok(None);
        };
        self.layout.set(pos, temp.original)?;
        Ok(Some(temp.original))
    }

    /// Count every override down one turn, reverting those that expire
    ///
    /// Returns the reverted tiles, sorted.
    pub fn tick_temporary_terrain(&mut self) -> Result<Vec<GridPos>> {
        let mut expired = Vec::new();
        for (pos, temp) in self.temporary.iter_mut() {
            temp.turns_remaining = temp.turns_remaining.saturating_sub(1);
            if temp.turns_remaining == 0 {
                expired.push(*pos);
            }
        }
        expired.sort();

        for pos in &expired {
            self.clear_temporary_terrain(*pos)?;
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "Temporary terrain expired");
        }
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::terrain::MoveCosts;

    fn engine() -> GridEngine {
        let table = TerrainTable::new(vec![
            TerrainKind::new("Plain", MoveCosts::uniform(1)),
            TerrainKind::new("Wall", MoveCosts::default()),
            TerrainKind::new("Forest", MoveCosts::uniform(2)),
        ])
        .unwrap();
        let layout = Layout::new(5, 5, table.key().plain);
        GridEngine::new(layout, Arc::new(table))
    }

    #[test]
    fn test_out_of_bounds_impassable() {
        let engine = engine();
        assert_eq!(engine.move_cost(GridPos::new(-1, 0), MoveType::Infantry), None);
        assert_eq!(engine.move_cost(GridPos::new(0, 0), MoveType::Infantry), Some(1));
        assert!(engine.terrain_at(GridPos::new(5, 0)).is_none());
    }

    #[test]
    fn test_temporary_terrain_countdown() {
        let mut engine = engine();
        let pos = GridPos::new(2, 2);
        engine.set_temporary_terrain_named(pos, "Wall", 2).unwrap();
        assert!(!engine.is_passable(pos, MoveType::Infantry));

        assert!(engine.tick_temporary_terrain().unwrap().is_empty());
        assert!(!engine.is_passable(pos, MoveType::Infantry));

        assert_eq!(engine.tick_temporary_terrain().unwrap(), vec![pos]);
        assert_eq!(engine.terrain_at(pos).unwrap().name, "Plain");
        assert!(engine.temporary_at(pos).is_none());
    }

    #[test]
    fn test_reapply_keeps_first_original() {
        let mut engine = engine();
        let pos = GridPos::new(1, 1);
        engine.set_temporary_terrain_named(pos, "Wall", 3).unwrap();
        engine.set_temporary_terrain_named(pos, "Forest", 1).unwrap();

        let temp = engine.temporary_at(pos).unwrap();
        assert_eq!(temp.turns_remaining, 3);
        assert_eq!(engine.terrain_at(pos).unwrap().name, "Forest");

        engine.clear_temporary_terrain(pos).unwrap();
        assert_eq!(engine.terrain_at(pos).unwrap().name, "Plain");
    }

    #[test]
    fn test_zero_duration_lasts_one_turn() {
        let mut engine = engine();
        let pos = GridPos::new(0, 0);
        engine.set_temporary_terrain_named(pos, "Wall", 0).unwrap();
        assert_eq!(engine.temporary_at(pos).unwrap().turns_remaining, 1);
        assert_eq!(engine.tick_temporary_terrain().unwrap(), vec![pos]);
    }

    #[test]
    fn test_temporary_terrain_out_of_bounds() {
        let mut engine = engine();
        let result = engine.set_temporary_terrain_named(GridPos::new(9, 9), "Wall", 2);
        assert!(matches!(result, Err(ForgeError::OutOfBounds(_))));
        assert!(engine.temporary_at(GridPos::new(9, 9)).is_none());
    }

    #[test]
    fn test_clear_without_override() {
        let mut engine = engine();
        assert_eq!(engine.clear_temporary_terrain(GridPos::new(0, 0)).unwrap(), None);
    }
}
