//! Enemy placement: seize boss, anchored units, then scored sampling

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ahash::AHashSet;

use crate::catalog::templates::Template;
use crate::catalog::terrain::TerrainTable;
use crate::catalog::units::{AiMode, ClassDef, EnemyPool, UnitCatalog};
use crate::core::config::GenerationConfig;
use crate::core::error::Result;
use crate::core::random::WeightedRng;
use crate::core::types::{GridPos, MoveType, Objective, TileRect};
use crate::mapgen::anchors::{resolve_anchor, AnchorContext};
use crate::mapgen::composition::ClassChooser;
use crate::mapgen::layout::Layout;

/// A placed enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub pos: GridPos,
    pub class_name: String,
    pub level: u32,
    pub is_boss: bool,
    #[serde(default)]
    pub sunder_weapon: bool,
    #[serde(default)]
    pub ai_mode: Option<AiMode>,
    /// Named bosses only
    #[serde(default)]
    pub name: Option<String>,
}

/// Everything enemy placement reads
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext<'a> {
    pub layout: &'a Layout,
    pub terrain: &'a TerrainTable,
    pub template: &'a Template,
    pub units: &'a UnitCatalog,
    pub pool: &'a EnemyPool,
    pub act: &'a str,
    pub objective: Objective,
    pub throne: Option<GridPos>,
    pub zone: TileRect,
    pub level_range: (u32, u32),
    pub fighters_only: bool,
    pub config: &'a GenerationConfig,
}

/// Affinity of a tile for a movement class; 0 means the class cannot stand there
///
/// Passable tiles never score below 1, so terrain penalties only make a
/// tile less likely and every slot with a passable tile stays fillable.
pub fn score_tile(layout: &Layout, terrain: &TerrainTable, pos: GridPos, move_type: MoveType) -> u32 {
    let Some(id) = layout.get(pos) else {
        return 0;
    };
    if !terrain.is_passable(id, move_type) {
        return 0;
    }

    let key = terrain.key();
    let is = |other: Option<_>| other == Some(id);
    let mut score: i32 = 0;

    if is(key.fort) || is(key.throne) {
        score += 3;
    }
    if is(key.forest) || is(key.mountain) {
        match move_type {
            MoveType::Infantry | MoveType::Armored => score += 2,
            MoveType::Cavalry => score -= 2,
            MoveType::Flying => {}
        }
    }
    if id == key.plain && move_type == MoveType::Cavalry {
        score += 1;
    }
    score += layout
        .neighbors(pos)
        .filter(|n| layout.is(*n, key.wall))
        .count() as i32;

    score.max(1) as u32
}

/// Place up to `count` enemies, avoiding every tile in `occupied`
///
/// Order: the seize boss on the throne, anchored units, then one scored
/// draw per remaining slot. A slot whose class has no positively scored
/// tile is skipped, so the result may be shorter than `count`.
pub fn place_enemies<R: Rng + ?Sized>(
    ctx: &EnemyContext,
    count: usize,
    occupied: &mut AHashSet<GridPos>,
    rng: &mut R,
) -> Result<Vec<EnemySpawn>> {
    let chooser = ClassChooser::new(ctx.pool, ctx.units, ctx.template, ctx.fighters_only, ctx.config)?;
    let (min_level, max_level) = ctx.level_range;
    let mut spawns: Vec<EnemySpawn> = Vec::new();

    if ctx.objective == Objective::Seize {
        match ctx.throne {
            Some(throne) if !occupied.contains(&throne) => {
                if let Some(boss) = pick_boss(ctx, &chooser, rng)? {
                    occupied.insert(throne);
                    spawns.push(EnemySpawn { pos: throne, ..boss });
                }
            }
            Some(throne) => warn!(%throne, "Throne already occupied, no boss placed"),
            None => warn!(template = %ctx.template.id, "Seize template has no throne"),
        }
    }

    let anchor_ctx = AnchorContext {
        layout: ctx.layout,
        terrain: ctx.terrain,
        throne: ctx.throne,
    };
    for anchor in &ctx.template.anchors {
        let class = match &anchor.class {
            Some(name) => Some(ctx.units.require_class(name)?),
            None => chooser.strongest(),
        };
        let Some(class) = class else {
            continue;
        };

        let mut candidates = resolve_anchor(anchor.rule, &anchor_ctx)
            .into_iter()
            .filter(|pos| ctx.layout.is_passable(*pos, ctx.terrain, class.move_type))
            .collect::<Vec<_>>()
            .into_iter();
        for _ in 0..anchor.count {
            if spawns.len() >= count {
                break;
            }
            let Some(pos) = candidates.find(|pos| !occupied.contains(pos)) else {
                debug!(rule = anchor.rule.as_str(), "Anchor ran out of candidate tiles");
                break;
            };
            occupied.insert(pos);
            spawns.push(EnemySpawn {
                pos,
                class_name: class.name.clone(),
                level: max_level,
                is_boss: false,
                sunder_weapon: roll_sunder(class, ctx.pool, rng),
                ai_mode: anchor.ai_mode,
                name: None,
            });
        }
    }

    let zone_tiles: Vec<GridPos> = ctx
        .zone
        .positions()
        .filter(|pos| ctx.layout.is_passable(*pos, ctx.terrain, MoveType::Infantry))
        .collect();

    let remaining = count.saturating_sub(spawns.len());
    for _ in 0..remaining {
        let Some(class) = chooser.choose(rng) else {
            debug!(act = ctx.act, "Enemy pool has no drawable class");
            break;
        };

        let scored: Vec<(GridPos, f64)> = zone_tiles
            .iter()
            .filter(|pos| !occupied.contains(pos))
            .map(|pos| (*pos, score_tile(ctx.layout, ctx.terrain, *pos, class.move_type) as f64))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        let Some(&pos) = rng.pick_weighted(&scored) else {
            debug!(class = %class.name, "No tile for enemy slot, skipping");
            continue;
        };

        occupied.insert(pos);
        spawns.push(EnemySpawn {
            pos,
            class_name: class.name.clone(),
            level: rng.roll_inclusive(min_level as usize, max_level as usize) as u32,
            is_boss: false,
            sunder_weapon: roll_sunder(class, ctx.pool, rng),
            ai_mode: None,
            name: None,
        });
    }

    if ctx.objective == Objective::Seize {
        assign_guards(&mut spawns, ctx.layout.cols(), ctx.config.guard_fraction, rng);
    }

    Ok(spawns)
}

/// Boss for the act's table, or the strongest pool class at max level
fn pick_boss<R: Rng + ?Sized>(
    ctx: &EnemyContext,
    chooser: &ClassChooser,
    rng: &mut R,
) -> Result<Option<EnemySpawn>> {
    if let Some(boss) = ctx.units.bosses(ctx.act).choose(rng) {
        ctx.units.require_class(&boss.class)?;
        return Ok(Some(EnemySpawn {
            pos: GridPos::default(),
            class_name: boss.class.clone(),
            level: boss.level,
            is_boss: true,
            sunder_weapon: false,
            ai_mode: None,
            name: Some(boss.name.clone()),
        }));
    }

    debug!(act = ctx.act, "No boss table entry, promoting strongest pool class");
    Ok(chooser.strongest().map(|class| EnemySpawn {
        pos: GridPos::default(),
        class_name: class.name.clone(),
        level: ctx.level_range.1,
        is_boss: true,
        sunder_weapon: false,
        ai_mode: None,
        name: None,
    }))
}

fn roll_sunder<R: Rng + ?Sized>(class: &ClassDef, pool: &EnemyPool, rng: &mut R) -> bool {
    class.can_carry_sunder() && pool.sunder_chance > 0.0 && rng.gen::<f64>() < pool.sunder_chance
}

/// Put a random share of the boss's half on guard duty
///
/// Only non-boss enemies without a preset AI mode are eligible.
pub fn assign_guards<R: Rng + ?Sized>(
    spawns: &mut [EnemySpawn],
    cols: i32,
    fraction: (f64, f64),
    rng: &mut R,
) -> usize {
    let Some(boss) = spawns.iter().find(|s| s.is_boss) else {
        return 0;
    };
    let mid = cols / 2;
    let boss_right = boss.pos.col >= mid;

    let mut eligible: Vec<usize> = spawns
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_boss && s.ai_mode.is_none() && (s.pos.col >= mid) == boss_right)
        .map(|(idx, _)| idx)
        .collect();
    if eligible.is_empty() {
        return 0;
    }

    let (lo, hi) = fraction;
    let share = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
    let guards = (eligible.len() as f64 * share).round() as usize;

    eligible.shuffle(rng);
    for &idx in eligible.iter().take(guards) {
        spawns[idx].ai_mode = Some(AiMode::Guard);
    }
    guards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::terrain::{MoveCosts, TerrainKind};
    use crate::catalog::units::Proficiency;
    use crate::core::random::seeded_rng;

    fn terrain() -> TerrainTable {
        TerrainTable::new(vec![
            TerrainKind::new("Plain", MoveCosts::uniform(1)),
            TerrainKind::new("Forest", MoveCosts::uniform(2)),
            TerrainKind::new("Fort", MoveCosts::uniform(2)),
            TerrainKind::new("Wall", MoveCosts::default()),
        ])
        .unwrap()
    }

    fn spawn(col: i32, is_boss: bool) -> EnemySpawn {
        EnemySpawn {
            pos: GridPos::new(col, 0),
            class_name: "Fighter".into(),
            level: 1,
            is_boss,
            sunder_weapon: false,
            ai_mode: None,
            name: None,
        }
    }

    #[test]
    fn test_score_fort_beside_wall() {
        let table = terrain();
        let map = Layout::from_names(&table, &[&["Fort", "Wall"], &["Forest", "Plain"]]).unwrap();
        assert_eq!(score_tile(&map, &table, GridPos::new(0, 0), MoveType::Infantry), 4);
        assert_eq!(score_tile(&map, &table, GridPos::new(0, 1), MoveType::Infantry), 2);
        assert_eq!(score_tile(&map, &table, GridPos::new(1, 1), MoveType::Cavalry), 2);
    }

    #[test]
    fn test_score_floor_for_cavalry_in_forest() {
        let table = terrain();
        let map = Layout::from_names(&table, &[&["Forest", "Plain"]]).unwrap();
        assert_eq!(score_tile(&map, &table, GridPos::new(0, 0), MoveType::Cavalry), 1);
    }

    #[test]
    fn test_score_zero_when_impassable() {
        let table = terrain();
        let map = Layout::from_names(&table, &[&["Wall", "Plain"]]).unwrap();
        assert_eq!(score_tile(&map, &table, GridPos::new(0, 0), MoveType::Flying), 0);
        assert_eq!(score_tile(&map, &table, GridPos::new(9, 9), MoveType::Infantry), 0);
    }

    #[test]
    fn test_guards_only_on_boss_half() {
        let mut spawns = vec![spawn(9, true)];
        spawns.extend((0..10).map(|i| spawn(5 + (i % 5), false)));
        spawns.extend((0..10).map(|_| spawn(1, false)));
        let guards = assign_guards(&mut spawns, 10, (0.2, 0.2), &mut seeded_rng(1));
        assert_eq!(guards, 2);
        assert!(spawns
            .iter()
            .filter(|s| s.ai_mode == Some(AiMode::Guard))
            .all(|s| s.pos.col >= 5 && !s.is_boss));
    }

    #[test]
    fn test_preset_modes_not_overwritten() {
        let mut spawns = vec![spawn(9, true), spawn(8, false)];
        spawns[1].ai_mode = Some(AiMode::Chase);
        assert_eq!(assign_guards(&mut spawns, 10, (1.0, 1.0), &mut seeded_rng(1)), 0);
        assert_eq!(spawns[1].ai_mode, Some(AiMode::Chase));
    }

    #[test]
    fn test_sunder_only_for_weapon_families() {
        let pool = EnemyPool {
            base: vec!["Fighter".into()],
            promoted: Vec::new(),
            level_range: (1, 3),
            sunder_chance: 1.0,
        };
        let class = |name: &str, prof| ClassDef {
            name: name.into(),
            move_type: MoveType::Infantry,
            tier: Default::default(),
            proficiencies: vec![prof],
            mov: 5,
        };
        let mut rng = seeded_rng(4);
        assert!(roll_sunder(&class("Fighter", Proficiency::Axe), &pool, &mut rng));
        assert!(roll_sunder(&class("Archer", Proficiency::Bow), &pool, &mut rng));
        assert!(!roll_sunder(&class("Mage", Proficiency::Tome), &pool, &mut rng));

        let never = EnemyPool { sunder_chance: 0.0, ..pool };
        assert!(!roll_sunder(&class("Fighter", Proficiency::Axe), &never, &mut rng));
    }

    #[test]
    fn test_no_boss_no_guards() {
        let mut spawns = vec![spawn(8, false), spawn(9, false)];
        assert_eq!(assign_guards(&mut spawns, 10, (1.0, 1.0), &mut seeded_rng(1)), 0);
    }
}
