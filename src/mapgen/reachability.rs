//! Reachability enforcement and river bridges
//!
//! Every enemy, the NPC and the throne must be reachable on foot from the
//! first player spawn. Unreachable targets get a corridor carved toward the
//! start; carving is destructive and order dependent, so targets are always
//! processed enemies first, then the NPC, then the throne.

use std::collections::VecDeque;

use ahash::AHashSet;
use tracing::debug;

use crate::catalog::terrain::TerrainTable;
use crate::core::error::Result;
use crate::core::types::{GridPos, MoveType, TileRect};
use crate::mapgen::layout::Layout;

/// Breadth-first walk over infantry-passable tiles
pub fn reachable_from(layout: &Layout, terrain: &TerrainTable, start: GridPos) -> AHashSet<GridPos> {
    let mut visited = AHashSet::new();
    if !layout.in_bounds(start) {
        return visited;
    }

    let mut queue = VecDeque::from([start]);
    visited.insert(start);
    while let Some(current) = queue.pop_front() {
        for next in layout.neighbors(current) {
            if visited.contains(&next) || !layout.is_passable(next, terrain, MoveType::Infantry) {
                continue;
            }
            visited.insert(next);
            queue.push_back(next);
        }
    }
    visited
}

/// Walk from `target` toward `start` making tiles passable
///
/// Each step reduces the larger axis delta (columns on ties). Impassable
/// tiles become Plain, or Bridge over water, until the walk enters the
/// reachable set. Returns the number of tiles changed.
pub fn carve_path(
    layout: &mut Layout,
    terrain: &TerrainTable,
    start: GridPos,
    target: GridPos,
    reachable: &AHashSet<GridPos>,
    max_steps: usize,
) -> Result<usize> {
    let key = terrain.key();
    let mut current = target;
    let mut changed = 0;

    for _ in 0..max_steps {
        if reachable.contains(&current) {
            break;
        }

        if !layout.is_passable(current, terrain, MoveType::Infantry) {
            let replacement = match key.bridge {
                Some(bridge) if layout.is(current, key.water) => bridge,
                _ => key.plain,
            };
            layout.set(current, replacement)?;
            changed += 1;
        }

        let dc = start.col - current.col;
        let dr = start.row - current.row;
        if dc == 0 && dr == 0 {
            break;
        }
        current = if dc.abs() >= dr.abs() {
            GridPos::new(current.col + dc.signum(), current.row)
        } else {
            GridPos::new(current.col, current.row + dr.signum())
        };
    }

    Ok(changed)
}

/// Carve until every target is reachable from `start`
///
/// Targets are processed in the given order, re-running the walk after
/// each carve. Returns the total number of tiles changed.
pub fn ensure_reachability(
    layout: &mut Layout,
    terrain: &TerrainTable,
    start: GridPos,
    targets: &[GridPos],
    max_steps: usize,
) -> Result<usize> {
    let mut reachable = reachable_from(layout, terrain, start);
    let mut total = 0;

    for &target in targets {
        if reachable.contains(&target) {
            continue;
        }
        let changed = carve_path(layout, terrain, start, target, &reachable, max_steps)?;
        debug!(%target, changed, "Carved path to unreachable target");
        total += changed;
        reachable = reachable_from(layout, terrain, start);
    }

    Ok(total)
}

/// Promote water to bridges until `band` holds at least `min_bridges`
///
/// New bridges go to the water tile nearest each evenly spaced target row,
/// scanning row-major so ties resolve to the upper-left tile.
pub fn ensure_bridges(
    layout: &mut Layout,
    terrain: &TerrainTable,
    band: TileRect,
    min_bridges: usize,
) -> Result<usize> {
    let key = terrain.key();
    let (Some(water), Some(bridge)) = (key.water, key.bridge) else {
        return Ok(0);
    };

    let mut bridges = band.positions().filter(|p| layout.get(*p) == Some(bridge)).count();
    let mut water_tiles: Vec<GridPos> = band.positions().filter(|p| layout.get(*p) == Some(water)).collect();
    let rows = layout.rows();
    let mut added = 0;

    while bridges < min_bridges && !water_tiles.is_empty() {
        let target_row = rows * (bridges as i32 + 1) / (min_bridges as i32 + 1);
        water_tiles.sort_by_key(|p| p.row.abs_diff(target_row));
        let pos = water_tiles.remove(0);
        layout.set(pos, bridge)?;
        debug!(%pos, "Added bridge");
        bridges += 1;
        added += 1;
    }

    Ok(added)
}
