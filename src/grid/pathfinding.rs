//! A* pathfinding for battle grids
//!
//! Respects per-class terrain costs and faction occupancy. Manhattan
//! distance is admissible since every step costs at least 1.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::core::types::{Faction, GridPos, MoveType};
use crate::grid::engine::GridEngine;
use crate::grid::occupancy::Occupancy;

/// Node in the A* open set
#[derive(Debug, Clone, Copy)]
struct PathNode {
    coord: GridPos,
    g_cost: u32,
    f_cost: u32, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| self.g_cost.cmp(&other.g_cost))
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find path using A*
///
/// Returns the tiles from `start` to `goal` inclusive, or None if no path
/// exists. Enemy-held tiles are blocked; ally-held tiles can be crossed
/// but never end a path.
pub fn find_path(
    engine: &GridEngine,
    start: GridPos,
    goal: GridPos,
    move_type: MoveType,
    occupancy: &Occupancy,
    mover: Faction,
) -> Option<Vec<GridPos>> {
    if start == goal {
        return Some(vec![start]);
    }
    if !engine.in_bounds(goal) || occupancy.is_ally(goal, mover) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<GridPos, GridPos> = AHashMap::new();
    let mut g_scores: AHashMap<GridPos, u32> = AHashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        coord: start,
        g_cost: 0,
        f_cost: start.distance(&goal),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, current.coord));
        }

        let current_g = g_scores.get(&current.coord).copied().unwrap_or(u32::MAX);
        if current.g_cost > current_g {
            continue; // stale entry
        }

        for neighbor in engine.neighbors(current.coord) {
            let Some(move_cost) = engine.move_cost(neighbor, move_type) else {
                continue;
            };
            if occupancy.blocks(neighbor, mover) {
                continue;
            }

            let tentative_g = current_g.saturating_add(move_cost);
            let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    coord: neighbor,
                    g_cost: tentative_g,
                    f_cost: tentative_g.saturating_add(neighbor.distance(&goal)),
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path(came_from: &AHashMap<GridPos, GridPos>, mut current: GridPos) -> Vec<GridPos> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Movement points spent walking `path`
///
/// Sums the entry cost of every tile after the first. `None` if any of
/// those tiles is impassable for the class.
pub fn path_cost(engine: &GridEngine, path: &[GridPos], move_type: MoveType) -> Option<u32> {
    path.iter()
        .skip(1)
        .map(|pos| engine.move_cost(*pos, move_type))
        .sum()
}
