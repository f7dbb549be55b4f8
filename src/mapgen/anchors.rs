//! Named anchor resolvers for scripted enemy placement
//!
//! Each `AnchorRule` maps to one resolver in `ANCHOR_RESOLVERS`. A resolver
//! returns infantry-passable candidate tiles in preference order; callers
//! filter out occupied tiles and tiles the unit's class cannot stand on.

use crate::catalog::templates::AnchorRule;
use crate::catalog::terrain::TerrainTable;
use crate::core::types::{Direction, GridPos, MoveType};
use crate::mapgen::layout::Layout;

/// Inputs shared by every resolver
#[derive(Debug, Clone, Copy)]
pub struct AnchorContext<'a> {
    pub layout: &'a Layout,
    pub terrain: &'a TerrainTable,
    pub throne: Option<GridPos>,
}

impl AnchorContext<'_> {
    fn passable(&self, pos: GridPos) -> bool {
        self.layout.is_passable(pos, self.terrain, MoveType::Infantry)
    }

    fn infantry_cost(&self, pos: GridPos) -> Option<u32> {
        self.layout
            .get(pos)
            .and_then(|id| self.terrain.cost(id, MoveType::Infantry))
    }
}

pub type AnchorResolver = fn(&AnchorContext) -> Vec<GridPos>;

/// Rule -> resolver table
pub const ANCHOR_RESOLVERS: &[(AnchorRule, AnchorResolver)] = &[
    (AnchorRule::Throne, throne_tiles),
    (AnchorRule::CenterGap, center_gap_tiles),
    (AnchorRule::BridgeEnds, bridge_end_tiles),
    (AnchorRule::GateAdjacent, gate_adjacent_tiles),
];

/// Candidate tiles for a rule; empty when the map has no such structure
pub fn resolve_anchor(rule: AnchorRule, ctx: &AnchorContext) -> Vec<GridPos> {
    ANCHOR_RESOLVERS
        .iter()
        .find(|(r, _)| *r == rule)
        .map(|(_, resolver)| resolver(ctx))
        .unwrap_or_default()
}

/// The throne itself, then its passable neighbors
fn throne_tiles(ctx: &AnchorContext) -> Vec<GridPos> {
    let Some(throne) = ctx.throne else {
        return Vec::new();
    };
    std::iter::once(throne)
        .chain(throne.neighbors())
        .filter(|pos| ctx.passable(*pos))
        .collect()
}

/// Center-column tiles beside harder or blocked ground, nearest the middle row first
fn center_gap_tiles(ctx: &AnchorContext) -> Vec<GridPos> {
    let col = ctx.layout.cols() / 2;
    let mid_row = ctx.layout.rows() / 2;

    let mut tiles: Vec<GridPos> = (0..ctx.layout.rows())
        .map(|row| GridPos::new(col, row))
        .filter(|pos| {
            let Some(cost) = ctx.infantry_cost(*pos) else {
                return false;
            };
            ctx.layout
                .neighbors(*pos)
                .any(|n| ctx.infantry_cost(n).map_or(true, |c| c > cost))
        })
        .collect();
    tiles.sort_by_key(|pos| (pos.row.abs_diff(mid_row), pos.row));
    tiles
}

/// Land tiles directly east of a bridge
fn bridge_end_tiles(ctx: &AnchorContext) -> Vec<GridPos> {
    let key = ctx.terrain.key();
    let Some(bridge) = key.bridge else {
        return Vec::new();
    };

    ctx.layout
        .positions()
        .filter(|pos| {
            let west = pos.step(Direction::West);
            ctx.layout.get(west) == Some(bridge)
                && ctx.layout.get(*pos) != Some(bridge)
                && ctx.passable(*pos)
        })
        .collect()
}

/// A passable tile in a wall line: wall on one side and wall again on the
/// opposite side within two tiles
fn is_gate(ctx: &AnchorContext, pos: GridPos) -> bool {
    let Some(wall) = ctx.terrain.key().wall else {
        return false;
    };
    if !ctx.passable(pos) {
        return false;
    }
    Direction::all().into_iter().any(|dir| {
        let back = dir.opposite();
        ctx.layout.is(pos.step(dir), Some(wall))
            && (ctx.layout.is(pos.step(back), Some(wall))
                || ctx.layout.is(pos.step(back).step(back), Some(wall)))
    })
}

/// Passable tiles flanking a gate, excluding the gate itself
fn gate_adjacent_tiles(ctx: &AnchorContext) -> Vec<GridPos> {
    let gates: Vec<GridPos> = ctx.layout.positions().filter(|p| is_gate(ctx, *p)).collect();

    let mut tiles: Vec<GridPos> = gates
        .iter()
        .flat_map(|gate| ctx.layout.neighbors(*gate).collect::<Vec<_>>())
        .filter(|pos| ctx.passable(*pos) && !gates.contains(pos))
        .collect();
    tiles.sort();
    tiles.dedup();
    tiles
}
