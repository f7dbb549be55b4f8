//! Recruitable NPC placement for recruit battles
//!
//! The NPC should sit between the armies: away from the player start so
//! reaching it takes a turn or two, and away from enemies so it survives
//! the first enemy phase. Constraints relax in stages so a spawn is always
//! produced once a recruit has been chosen.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ahash::AHashSet;

use crate::catalog::terrain::TerrainTable;
use crate::catalog::units::{RecruitDef, RecruitPool, UnitCatalog};
use crate::core::config::GenerationConfig;
use crate::core::error::Result;
use crate::core::random::WeightedRng;
use crate::core::types::{GridPos, MoveType, TileRect};
use crate::mapgen::enemies::EnemySpawn;
use crate::mapgen::layout::Layout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSpawn {
    pub pos: GridPos,
    pub name: String,
    pub class_name: String,
    pub level: u32,
}

/// Pick a recruit whose name has not been used this run
///
/// When every name is used the whole pool is eligible again.
pub fn pick_recruit<'a, R: Rng + ?Sized>(
    pool: &'a RecruitPool,
    used_names: &AHashSet<String>,
    rng: &mut R,
) -> Option<&'a RecruitDef> {
    let fresh: Vec<&RecruitDef> = pool
        .pool
        .iter()
        .filter(|r| !used_names.contains(&r.name))
        .collect();
    if fresh.is_empty() {
        if !pool.pool.is_empty() {
            warn!("Every recruit already used this run, reusing the full pool");
        }
        return pool.pool.choose(rng);
    }
    fresh.choose(rng).copied()
}

/// Enemies able to reach `pos` on their first turn
///
/// Reach is movement plus weapon range capped at `range_cap`. Enemies of
/// unknown class are ignored.
pub fn count_threats(
    pos: GridPos,
    enemies: &[EnemySpawn],
    units: &UnitCatalog,
    range_cap: u32,
) -> usize {
    enemies
        .iter()
        .filter(|enemy| {
            units.class(&enemy.class_name).is_some_and(|class| {
                let reach = class.mov + class.weapon_reach().min(range_cap);
                enemy.pos.distance(&pos) <= reach
            })
        })
        .count()
}

/// Inputs for NPC placement
#[derive(Debug, Clone, Copy)]
pub struct NpcContext<'a> {
    pub terrain: &'a TerrainTable,
    pub units: &'a UnitCatalog,
    pub players: &'a [GridPos],
    pub enemies: &'a [EnemySpawn],
    pub river: bool,
    pub config: &'a GenerationConfig,
}

/// Choose and place the recruit; `None` only when the pool is empty
pub fn place_npc<R: Rng + ?Sized>(
    layout: &mut Layout,
    ctx: &NpcContext,
    recruits: &RecruitPool,
    used_names: &AHashSet<String>,
    rng: &mut R,
) -> Result<Option<NpcSpawn>> {
    let Some(recruit) = pick_recruit(recruits, used_names, rng) else {
        debug!("Recruit pool is empty, no NPC placed");
        return Ok(None);
    };
    let (min_level, max_level) = recruits.level_range;
    let level = rng.roll_inclusive(min_level as usize, max_level as usize) as u32;

    let pos = choose_npc_tile(layout, ctx, rng)?;
    Ok(Some(NpcSpawn {
        pos,
        name: recruit.name.clone(),
        class_name: recruit.class.clone(),
        level,
    }))
}

fn choose_npc_tile<R: Rng + ?Sized>(layout: &mut Layout, ctx: &NpcContext, rng: &mut R) -> Result<GridPos> {
    let config = ctx.config;
    let occupied: AHashSet<GridPos> = ctx
        .players
        .iter()
        .copied()
        .chain(ctx.enemies.iter().map(|e| e.pos))
        .collect();
    let (cols, rows) = (layout.cols(), layout.rows());

    let band = |(lo, hi): (f64, f64)| TileRect::column_band(lo, hi, cols, rows);
    let wide = band(config.npc_wide_zone);
    let bands = if ctx.river {
        vec![band(config.npc_tight_zone), wide]
    } else {
        vec![wide]
    };

    let open = |layout: &Layout, pos: &GridPos| {
        !occupied.contains(pos) && layout.is_passable(*pos, ctx.terrain, MoveType::Infantry)
    };
    let min_player_distance = |pos: &GridPos| {
        ctx.players
            .iter()
            .map(|p| p.distance(pos))
            .min()
            .unwrap_or(u32::MAX)
    };

    // Closest candidate of the first band that had any, used when no band
    // has a tile passing the threat screen
    let mut fallback = None;
    for zone in bands {
        let mut candidates: Vec<GridPos> = zone
            .positions()
            .filter(|pos| open(layout, pos))
            .filter(|pos| min_player_distance(pos) >= config.npc_min_player_distance)
            .filter(|pos| {
                ctx.enemies
                    .iter()
                    .all(|e| e.pos.distance(pos) >= config.npc_min_enemy_distance)
            })
            .collect();
        if candidates.is_empty() {
            continue;
        }

        candidates.sort_by_key(|pos| (min_player_distance(pos), *pos));
        let safe = candidates
            .iter()
            .take(config.npc_threat_attempts)
            .find(|pos| {
                count_threats(**pos, ctx.enemies, ctx.units, config.threat_range_cap) <= config.npc_max_threats
            });
        if let Some(pos) = safe {
            return Ok(*pos);
        }
        fallback.get_or_insert(candidates[0]);
    }
    if let Some(pos) = fallback {
        debug!(%pos, "No NPC tile passes the threat screen, using closest candidate");
        return Ok(pos);
    }

    let relaxed: Vec<GridPos> = wide.positions().filter(|pos| open(layout, pos)).collect();
    if let Some(pos) = relaxed.choose(rng) {
        debug!(%pos, "NPC distance constraints relaxed");
        return Ok(*pos);
    }

    let center = GridPos::new(cols / 2, rows / 2);
    let pos = if occupied.contains(&center) {
        layout
            .positions()
            .filter(|pos| !occupied.contains(pos))
            .min_by_key(|pos| (pos.distance(&center), *pos))
            .unwrap_or(center)
    } else {
        center
    };
    layout.set(pos, ctx.terrain.key().plain)?;
    warn!(%pos, "No open tile for NPC, forced tile to Plain");
    Ok(pos)
}
