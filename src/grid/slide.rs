//! Frictionless terrain
//!
//! A grounded unit stepping onto slide terrain keeps going in its entry
//! direction until it reaches passable non-slide ground, or stops on the
//! last slide tile when the next tile is off the grid, impassable or
//! occupied. Fliers never slide.
//!
//! `occupancy` here should not contain the moving unit itself.

use serde::{Deserialize, Serialize};

use crate::core::types::{Direction, GridPos, MoveType};
use crate::grid::engine::GridEngine;
use crate::grid::occupancy::Occupancy;

/// The tiles a unit actually walks for a planned path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePath {
    pub effective_path: Vec<GridPos>,
    /// Index of the first slide tile entered, when a slide happened
    pub slide_start_index: Option<usize>,
    /// Index of the last tile taken from the planned path
    pub path_end_index: usize,
}

impl EffectivePath {
    fn unchanged(path: &[GridPos]) -> Self {
        Self {
            effective_path: path.to_vec(),
            slide_start_index: None,
            path_end_index: path.len().saturating_sub(1),
        }
    }

    /// Where the unit ends up
    pub fn destination(&self) -> Option<GridPos> {
        self.effective_path.last().copied()
    }

    pub fn slid(&self) -> bool {
        self.slide_start_index.is_some()
    }

    /// Tiles added by sliding past the planned path
    pub fn slide_tail(&self) -> &[GridPos] {
        let start = (self.path_end_index + 1).min(self.effective_path.len());
        &self.effective_path[start..]
    }
}

/// Direction of the final step of a path
pub fn entry_direction(path: &[GridPos]) -> Option<Direction> {
    match path {
        [.., prev, last] => Direction::between(*prev, *last),
        _ => None,
    }
}

/// Tiles entered after `from` while sliding in `dir`
///
/// Empty when `from` is not slide terrain, the unit flies, or the first
/// tile ahead is blocked.
pub fn resolve_slide(
    engine: &GridEngine,
    from: GridPos,
    dir: Direction,
    move_type: MoveType,
    occupancy: &Occupancy,
) -> Vec<GridPos> {
    let mut tail = Vec::new();
    if !move_type.is_grounded() || !engine.is_slide(from) {
        return tail;
    }

    let mut current = from;
    let limit = (engine.cols() + engine.rows()).max(0) as usize;
    for _ in 0..limit {
        let next = current.step(dir);
        if !engine.is_passable(next, move_type) || occupancy.is_occupied(next) {
            break;
        }
        tail.push(next);
        if !engine.is_slide(next) {
            break;
        }
        current = next;
    }
    tail
}

/// Apply sliding to a planned path
///
/// The first slide tile entered after the start triggers a slide and the
/// rest of the plan is dropped. If that tile is occupied the move instead
/// ends on the nearest earlier unoccupied tile of the plan.
pub fn compute_effective_path(
    engine: &GridEngine,
    path: &[GridPos],
    move_type: MoveType,
    occupancy: &Occupancy,
) -> EffectivePath {
    if !move_type.is_grounded() || path.len() < 2 {
        return EffectivePath::unchanged(path);
    }
    let Some(entry) = (1..path.len()).find(|&i| engine.is_slide(path[i])) else {
        return EffectivePath::unchanged(path);
    };

    if occupancy.is_occupied(path[entry]) {
        let stop = (1..entry)
            .rev()
            .find(|&i| !occupancy.is_occupied(path[i]))
            .unwrap_or(0);
        return EffectivePath {
            effective_path: path[..=stop].to_vec(),
            slide_start_index: None,
            path_end_index: stop,
        };
    }

    let Some(dir) = entry_direction(&path[..=entry]) else {
        return EffectivePath::unchanged(path);
    };
    let mut effective_path = path[..=entry].to_vec();
    effective_path.extend(resolve_slide(engine, path[entry], dir, move_type, occupancy));

    EffectivePath {
        effective_path,
        slide_start_index: Some(entry),
        path_end_index: entry,
    }
}
