//! Player spawn placement and spawn-zone resolution

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use ahash::AHashSet;

use crate::catalog::templates::{Template, ZoneRole};
use crate::catalog::terrain::TerrainTable;
use crate::core::config::GenerationConfig;
use crate::core::error::Result;
use crate::core::types::{GridPos, MoveType, TileRect};
use crate::mapgen::layout::Layout;

/// Player deployment area: the `player_spawn` zone or the leftmost columns
pub fn player_zone(template: &Template, cols: i32, rows: i32, config: &GenerationConfig) -> TileRect {
    template
        .zone_with_role(ZoneRole::PlayerSpawn)
        .map(|zone| zone.tile_rect(cols, rows))
        .unwrap_or_else(|| TileRect::new(0, config.player_fallback_columns.min(cols), 0, rows))
}

/// Enemy deployment area: the `enemy_spawn` zone or the right-hand band
pub fn enemy_zone(template: &Template, cols: i32, rows: i32, config: &GenerationConfig) -> TileRect {
    template
        .zone_with_role(ZoneRole::EnemySpawn)
        .map(|zone| zone.tile_rect(cols, rows))
        .unwrap_or_else(|| TileRect::column_band(config.enemy_fallback_start, 1.0, cols, rows))
}

/// Choose `count` distinct player spawn tiles inside `zone`
///
/// Infantry-passable tiles are shuffled and taken first. When the zone is
/// short, unused zone tiles are forced to Plain in row-major order, then
/// tiles outside the zone from the left edge inward, so the result always
/// has exactly `count` entries when the map is large enough.
///
/// Tiles in `reserved` (the throne) are never used or repainted.
pub fn place_player_spawns<R: Rng + ?Sized>(
    layout: &mut Layout,
    zone: TileRect,
    terrain: &TerrainTable,
    count: usize,
    reserved: &[GridPos],
    rng: &mut R,
) -> Result<Vec<GridPos>> {
    let mut candidates: Vec<GridPos> = zone
        .positions()
        .filter(|pos| !reserved.contains(pos))
        .filter(|pos| layout.is_passable(*pos, terrain, MoveType::Infantry))
        .collect();
    candidates.shuffle(rng);
    candidates.truncate(count);

    let mut spawns = candidates;
    if spawns.len() < count {
        let used: AHashSet<GridPos> = spawns.iter().copied().collect();
        let cols = layout.cols();
        let rows = layout.rows();
        let outside_by_column = (0..cols)
            .flat_map(|col| (0..rows).map(move |row| GridPos::new(col, row)))
            .filter(|pos| !zone.contains(*pos));
        let forced: Vec<GridPos> = zone
            .positions()
            .filter(|pos| layout.in_bounds(*pos))
            .chain(outside_by_column)
            .filter(|pos| !used.contains(pos) && !reserved.contains(pos))
            .take(count - spawns.len())
            .collect();

        let plain = terrain.key().plain;
        for pos in forced {
            layout.set(pos, plain)?;
            debug!(%pos, "Forced player spawn tile to Plain");
            spawns.push(pos);
        }
    }

    Ok(spawns)
}
