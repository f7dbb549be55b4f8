//! Terrain grid produced by generation and consumed by the grid engine

use serde::{Deserialize, Serialize};

use crate::catalog::terrain::{TerrainId, TerrainTable};
use crate::core::error::{ForgeError, Result};
use crate::core::types::{GridPos, MoveType};

/// Row-major grid of terrain ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    cols: i32,
    rows: i32,
    tiles: Vec<TerrainId>,
}

impl Layout {
    /// Grid of the given size filled with one terrain
    pub fn new(cols: i32, rows: i32, fill: TerrainId) -> Self {
        let cols = cols.max(0);
        let rows = rows.max(0);
        Self {
            cols,
            rows,
            tiles: vec![fill; (cols * rows) as usize],
        }
    }

    /// Build from rows of terrain ids; every row must have the same width
    pub fn from_rows(rows: Vec<Vec<TerrainId>>) -> Result<Self> {
        let height = rows.len() as i32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as i32;
        if rows.iter().any(|r| r.len() as i32 != width) {
            return Err(ForgeError::InvalidData("layout rows differ in width".into()));
        }
        Ok(Self {
            cols: width,
            rows: height,
            tiles: rows.into_iter().flatten().collect(),
        })
    }

    /// Build from terrain names, as hand-authored maps are written
    pub fn from_names(terrain: &TerrainTable, rows: &[&[&str]]) -> Result<Self> {
        let ids = rows
            .iter()
            .map(|row| row.iter().map(|name| terrain.require(name)).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(ids)
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.col >= 0 && pos.col < self.cols && pos.row >= 0 && pos.row < self.rows
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.row * self.cols + pos.col) as usize)
    }

    pub fn get(&self, pos: GridPos) -> Option<TerrainId> {
        self.index(pos).map(|idx| self.tiles[idx])
    }

    /// Replace a tile, returning the previous terrain
    pub fn set(&mut self, pos: GridPos, id: TerrainId) -> Result<TerrainId> {
        let idx = self.index(pos).ok_or(ForgeError::OutOfBounds(pos))?;
        Ok(std::mem::replace(&mut self.tiles[idx], id))
    }

    /// All positions, row-major
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| GridPos::new(col, row)))
    }

    pub fn positions_of(&self, id: TerrainId) -> Vec<GridPos> {
        self.positions().filter(|p| self.get(*p) == Some(id)).collect()
    }

    pub fn count(&self, id: TerrainId) -> usize {
        self.tiles.iter().filter(|t| **t == id).count()
    }

    /// In-bounds orthogonal neighbors
    pub fn neighbors(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        pos.neighbors().into_iter().filter(move |n| self.in_bounds(*n))
    }

    /// Passable for a movement class; out of bounds is never passable
    pub fn is_passable(&self, pos: GridPos, terrain: &TerrainTable, move_type: MoveType) -> bool {
        self.get(pos)
            .is_some_and(|id| terrain.is_passable(id, move_type))
    }

    pub fn is(&self, pos: GridPos, id: Option<TerrainId>) -> bool {
        id.is_some() && self.get(pos) == id
    }

    /// Terrain ids as nested rows
    pub fn to_rows(&self) -> Vec<Vec<TerrainId>> {
        self.tiles
            .chunks(self.cols.max(1) as usize)
            .map(|row| row.to_vec())
            .collect()
    }
}
