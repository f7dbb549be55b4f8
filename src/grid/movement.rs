//! Movement range: weighted flood fill from a unit's tile
//!
//! Dijkstra over 4-connected tiles. Tiles held by another faction are never
//! entered; tiles held by allies can be crossed but are dropped from the
//! result since a move cannot end there.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use serde::Serialize;

use crate::core::types::{Faction, GridPos, MoveType};
use crate::grid::engine::GridEngine;
use crate::grid::occupancy::Occupancy;

/// Cheapest known way to reach a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reach {
    pub cost: u32,
    pub parent: Option<GridPos>,
}

/// Frontier entry, ordered cheapest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierNode {
    pos: GridPos,
    cost: u32,
}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap, position breaks ties
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a movement range query
#[derive(Debug, Clone)]
pub struct MovementRange {
    start: GridPos,
    tiles: AHashMap<GridPos, Reach>,
    /// Crossed but not valid stopping tiles
    pass_through: AHashSet<GridPos>,
}

impl MovementRange {
    pub fn start(&self) -> GridPos {
        self.start
    }

    pub fn get(&self, pos: GridPos) -> Option<&Reach> {
        if self.pass_through.contains(&pos) {
            return None;
        }
        self.tiles.get(&pos)
    }

    pub fn cost(&self, pos: GridPos) -> Option<u32> {
        self.get(pos).map(|reach| reach.cost)
    }

    /// Reachable and a legal place to end the move (the start included)
    pub fn contains(&self, pos: GridPos) -> bool {
        self.get(pos).is_some()
    }

    pub fn len(&self) -> usize {
        self.tiles.len() - self.pass_through.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every reachable tile with its cost and parent, sorted by position
    pub fn iter(&self) -> Vec<(GridPos, Reach)> {
        let mut entries: Vec<(GridPos, Reach)> = self
            .tiles
            .iter()
            .filter(|(pos, _)| !self.pass_through.contains(*pos))
            .map(|(pos, reach)| (*pos, *reach))
            .collect();
        entries.sort_by_key(|(pos, _)| *pos);
        entries
    }

    /// Tiles a unit could move to, excluding its own, sorted
    pub fn destinations(&self) -> Vec<GridPos> {
        self.iter()
            .into_iter()
            .map(|(pos, _)| pos)
            .filter(|pos| *pos != self.start)
            .collect()
    }

    /// Walk parents back from `goal`; start and goal inclusive
    ///
    /// The walk may pass through ally tiles that are not themselves
    /// destinations.
    pub fn path_to(&self, goal: GridPos) -> Option<Vec<GridPos>> {
        if !self.contains(goal) {
            return None;
        }
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(parent) = self.tiles.get(&current).and_then(|reach| reach.parent) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        Some(path)
    }
}

/// Tiles reachable from `start` spending at most `budget`
///
/// The start tile is always present at cost 0, whatever stands on it.
pub fn movement_range(
    engine: &GridEngine,
    start: GridPos,
    budget: u32,
    move_type: MoveType,
    occupancy: &Occupancy,
    mover: Faction,
) -> MovementRange {
    let mut tiles: AHashMap<GridPos, Reach> = AHashMap::new();
    let mut frontier = BinaryHeap::new();

    tiles.insert(start, Reach { cost: 0, parent: None });
    frontier.push(FrontierNode { pos: start, cost: 0 });

    while let Some(current) = frontier.pop() {
        if tiles.get(&current.pos).is_some_and(|r| r.cost < current.cost) {
            continue;
        }

        for neighbor in engine.neighbors(current.pos) {
            let Some(step) = engine.move_cost(neighbor, move_type) else {
                continue;
            };
            if occupancy.blocks(neighbor, mover) {
                continue;
            }

            let cost = current.cost.saturating_add(step);
            if cost > budget {
                continue;
            }

            let better = tiles.get(&neighbor).map_or(true, |existing| cost < existing.cost);
            if better {
                tiles.insert(
                    neighbor,
                    Reach {
                        cost,
                        parent: Some(current.pos),
                    },
                );
                frontier.push(FrontierNode { pos: neighbor, cost });
            }
        }
    }

    let pass_through = tiles
        .keys()
        .filter(|pos| **pos != start && occupancy.is_ally(**pos, mover))
        .copied()
        .collect();

    MovementRange {
        start,
        tiles,
        pass_through,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::terrain::{MoveCosts, TerrainKind, TerrainTable};
    use crate::mapgen::layout::Layout;
    use std::sync::Arc;

    fn table() -> TerrainTable {
        TerrainTable::new(vec![
            TerrainKind::new("Plain", MoveCosts::uniform(1)),
            TerrainKind::new("Wall", MoveCosts::default()),
            TerrainKind::new(
                "Forest",
                MoveCosts {
                    infantry: Some(2),
                    armored: Some(2),
                    cavalry: Some(3),
                    flying: Some(1),
                },
            ),
        ])
        .unwrap()
    }

    fn engine(rows: &[&[&str]]) -> GridEngine {
        let table = table();
        let layout = Layout::from_names(&table, rows).unwrap();
        GridEngine::new(layout, Arc::new(table))
    }

    fn open(cols: usize, rows: usize) -> GridEngine {
        let row = vec!["Plain"; cols];
        let grid: Vec<&[&str]> = (0..rows).map(|_| row.as_slice()).collect();
        engine(&grid)
    }

    #[test]
    fn test_open_field_diamond() {
        let engine = open(9, 9);
        let range = engine.movement_range(GridPos::new(4, 4), 2, MoveType::Infantry, &Occupancy::new(), Faction::Player);
        assert_eq!(range.len(), 13);
        assert_eq!(range.cost(GridPos::new(4, 4)), Some(0));
        assert_eq!(range.cost(GridPos::new(6, 4)), Some(2));
        assert_eq!(range.destinations().len(), 12);
    }

    #[test]
    fn test_forest_costs_more() {
        let engine = engine(&[&["Plain", "Forest", "Plain", "Plain"]]);
        let range = engine.movement_range(GridPos::new(0, 0), 3, MoveType::Infantry, &Occupancy::new(), Faction::Player);
        assert_eq!(range.cost(GridPos::new(1, 0)), Some(2));
        assert_eq!(range.cost(GridPos::new(2, 0)), Some(3));
        assert!(!range.contains(GridPos::new(3, 0)));

        let cavalry = engine.movement_range(GridPos::new(0, 0), 3, MoveType::Cavalry, &Occupancy::new(), Faction::Player);
        assert!(!cavalry.contains(GridPos::new(2, 0)));
    }

    #[test]
    fn test_walls_route_around() {
        let engine = engine(&[
            &["Plain", "Wall", "Plain"],
            &["Plain", "Plain", "Plain"],
        ]);
        let range = engine.movement_range(GridPos::new(0, 0), 10, MoveType::Infantry, &Occupancy::new(), Faction::Player);
        assert_eq!(range.cost(GridPos::new(2, 0)), Some(4));
        assert!(!range.contains(GridPos::new(1, 0)));
        assert_eq!(
            range.path_to(GridPos::new(2, 0)).unwrap(),
            vec![
                GridPos::new(0, 0),
                GridPos::new(0, 1),
                GridPos::new(1, 1),
                GridPos::new(2, 1),
                GridPos::new(2, 0)
            ]
        );
    }

    #[test]
    fn test_enemies_block_allies_pass() {
        let engine = open(5, 1);
        let mut occupancy = Occupancy::new();
        occupancy.insert(GridPos::new(1, 0), Faction::Player);
        occupancy.insert(GridPos::new(3, 0), Faction::Enemy);

        let range = engine.movement_range(GridPos::new(0, 0), 10, MoveType::Infantry, &occupancy, Faction::Player);
        assert!(!range.contains(GridPos::new(1, 0)));
        assert_eq!(range.cost(GridPos::new(2, 0)), Some(2));
        assert!(!range.contains(GridPos::new(3, 0)));
        assert!(!range.contains(GridPos::new(4, 0)));
        assert_eq!(range.destinations(), vec![GridPos::new(2, 0)]);
        assert_eq!(range.path_to(GridPos::new(2, 0)).unwrap().len(), 3);
    }

    #[test]
    fn test_start_kept_even_when_occupied() {
        let engine = open(3, 1);
        let mut occupancy = Occupancy::new();
        occupancy.insert(GridPos::new(0, 0), Faction::Player);
        let range = engine.movement_range(GridPos::new(0, 0), 0, MoveType::Infantry, &occupancy, Faction::Player);
        assert_eq!(range.len(), 1);
        assert_eq!(range.cost(GridPos::new(0, 0)), Some(0));
        assert!(range.destinations().is_empty());
    }
}
