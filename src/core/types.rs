//! Core grid types shared by generation and the grid engine
//!
//! Square grid, 4-connected. Positions are (col, row) with row 0 at the top.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tile coordinate on a battlefield grid
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance
    pub fn distance(&self, other: &Self) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// The 4 orthogonal neighbors, in `Direction::all()` order
    pub fn neighbors(&self) -> [GridPos; 4] {
        Direction::all().map(|dir| self.step(dir))
    }

    /// Position one tile away in the given direction
    pub fn step(&self, dir: Direction) -> GridPos {
        let (dc, dr) = dir.offset();
        GridPos::new(self.col + dc, self.row + dr)
    }

    /// All positions within Manhattan `range` (inclusive), unbounded
    pub fn tiles_in_range(&self, range: u32) -> Vec<GridPos> {
        let range = range as i32;
        let mut results = Vec::new();
        for dr in -range..=range {
            let span = range - dr.abs();
            for dc in -span..=span {
                results.push(GridPos::new(self.col + dc, self.row + dr));
            }
        }
        results
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Half-open tile rectangle: `start..end` on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub start_col: i32,
    pub end_col: i32,
    pub start_row: i32,
    pub end_row: i32,
}

impl TileRect {
    pub fn new(start_col: i32, end_col: i32, start_row: i32, end_row: i32) -> Self {
        Self {
            start_col,
            end_col,
            start_row,
            end_row,
        }
    }

    /// Rectangle from normalized column/row fractions of a grid
    ///
    /// Start edges floor, end edges ceil, both clamped to the grid.
    pub fn from_fractions(x1: f64, y1: f64, x2: f64, y2: f64, cols: i32, rows: i32) -> Self {
        let clamp_col = |v: f64| (v.max(0.0) as i32).min(cols);
        let clamp_row = |v: f64| (v.max(0.0) as i32).min(rows);
        Self {
            start_col: clamp_col((x1 * cols as f64).floor()),
            end_col: clamp_col((x2 * cols as f64).ceil()),
            start_row: clamp_row((y1 * rows as f64).floor()),
            end_row: clamp_row((y2 * rows as f64).ceil()),
        }
    }

    /// Full-height column band from fractions of the width
    pub fn column_band(lo: f64, hi: f64, cols: i32, rows: i32) -> Self {
        Self::from_fractions(lo, 0.0, hi, 1.0, cols, rows)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.col >= self.start_col
            && pos.col < self.end_col
            && pos.row >= self.start_row
            && pos.row < self.end_row
    }

    pub fn is_empty(&self) -> bool {
        self.start_col >= self.end_col || self.start_row >= self.end_row
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.end_col - self.start_col) * (self.end_row - self.start_row)) as usize
        }
    }

    /// Positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        (self.start_row..self.end_row)
            .flat_map(move |row| (self.start_col..self.end_col).map(move |col| GridPos::new(col, row)))
    }
}

/// Cardinal direction on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// (dc, dr) offset for this direction
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }

    /// Direction of a single orthogonal step, if `from -> to` is one
    pub fn between(from: GridPos, to: GridPos) -> Option<Direction> {
        match (to.col - from.col, to.row - from.row) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            (1, 0) => Some(Direction::East),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// All directions, in neighbor expansion order
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
    }
}

/// Movement class: decides per-terrain traversal cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    #[default]
    Infantry,
    Armored,
    Cavalry,
    Flying,
}

impl MoveType {
    pub fn all() -> [MoveType; 4] {
        [
            MoveType::Infantry,
            MoveType::Armored,
            MoveType::Cavalry,
            MoveType::Flying,
        ]
    }

    /// Walks on the ground (everything except fliers)
    pub fn is_grounded(&self) -> bool {
        !matches!(self, MoveType::Flying)
    }
}

/// Side a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Player,
    Enemy,
    Npc,
}

impl Faction {
    /// Only units of the same faction may pass through each other
    pub fn is_allied_with(&self, other: Faction) -> bool {
        *self == other
    }
}

/// Battle win condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    Rout,
    Seize,
}

impl Objective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::Rout => "rout",
            Objective::Seize => "seize",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rout" => Ok(Objective::Rout),
            "seize" => Ok(Objective::Seize),
            other => Err(format!("unknown objective: {}", other)),
        }
    }
}
