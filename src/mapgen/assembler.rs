//! Battle assembly: request in, immutable battlefield descriptor out
//!
//! Pipeline order matters for reproducibility; every random draw comes from
//! the caller's generator in this sequence:
//! size, template, terrain, features, player spawns, enemy count, enemies,
//! NPC, reachability, bridges.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ahash::AHashSet;

use crate::catalog::loader::GameData;
use crate::catalog::rules::Rules;
use crate::catalog::templates::{Template, TemplateCatalog, ZoneRole};
use crate::core::config::GenerationConfig;
use crate::core::error::{ForgeError, Result};
use crate::core::random::{seeded_rng, WeightedRng};
use crate::core::types::{GridPos, Objective, TileRect};
use crate::mapgen::enemies::{place_enemies, EnemyContext, EnemySpawn};
use crate::mapgen::layout::Layout;
use crate::mapgen::npc::{place_npc, NpcContext, NpcSpawn};
use crate::mapgen::reachability::{ensure_bridges, ensure_reachability};
use crate::mapgen::spawns::{enemy_zone, place_player_spawns, player_zone};
use crate::mapgen::terrain_builder::{apply_features, build_terrain};

/// Parameters of one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRequest {
    pub act: String,
    pub objective: Objective,
    /// Preferred template; unknown ids fall back to a random pick
    pub template_id: Option<String>,
    pub deploy_count: Option<usize>,
    /// Overrides the act pool's enemy level range
    pub level_range: Option<(u32, u32)>,
    /// Progression-map row, used by the enemy count table
    pub row: Option<u32>,
    pub is_boss: bool,
    /// First battle of a run: plain infantry melee enemies only
    pub fighters_only: bool,
    pub recruit_battle: bool,
    pub bonus_enemies: usize,
    pub used_recruit_names: AHashSet<String>,
}

impl Default for BattleRequest {
    fn default() -> Self {
        Self::new("act1", Objective::Rout)
    }
}

impl BattleRequest {
    pub fn new(act: impl Into<String>, objective: Objective) -> Self {
        Self {
            act: act.into(),
            objective,
            template_id: None,
            deploy_count: None,
            level_range: None,
            row: None,
            is_boss: false,
            fighters_only: false,
            recruit_battle: false,
            bonus_enemies: 0,
            used_recruit_names: AHashSet::new(),
        }
    }

    pub fn with_template(mut self, id: impl Into<String>) -> Self {
        self.template_id = Some(id.into());
        self
    }

    pub fn with_deploy_count(mut self, count: usize) -> Self {
        self.deploy_count = Some(count);
        self
    }

    pub fn with_level_range(mut self, min: u32, max: u32) -> Self {
        self.level_range = Some((min, max));
        self
    }

    pub fn with_row(mut self, row: u32) -> Self {
        self.row = Some(row);
        self
    }

    pub fn boss(mut self) -> Self {
        self.is_boss = true;
        self
    }

    pub fn fighters_only(mut self) -> Self {
        self.fighters_only = true;
        self
    }

    pub fn recruit(mut self) -> Self {
        self.recruit_battle = true;
        self
    }

    pub fn with_bonus_enemies(mut self, bonus: usize) -> Self {
        self.bonus_enemies = bonus;
        self
    }

    pub fn with_used_recruits<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.used_recruit_names.extend(names.into_iter().map(Into::into));
        self
    }
}

/// A finished battlefield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattlefieldDescriptor {
    pub template_id: String,
    pub objective: Objective,
    pub cols: i32,
    pub rows: i32,
    pub layout: Layout,
    pub player_spawns: Vec<GridPos>,
    pub enemy_spawns: Vec<EnemySpawn>,
    pub npc_spawn: Option<NpcSpawn>,
    pub throne_pos: Option<GridPos>,
}

impl BattlefieldDescriptor {
    /// Every occupied tile: players, enemies, then the NPC
    pub fn spawn_positions(&self) -> Vec<GridPos> {
        self.player_spawns
            .iter()
            .copied()
            .chain(self.enemy_spawns.iter().map(|e| e.pos))
            .chain(self.npc_spawn.iter().map(|n| n.pos))
            .collect()
    }

    pub fn boss(&self) -> Option<&EnemySpawn> {
        self.enemy_spawns.iter().find(|e| e.is_boss)
    }
}

/// Template for a request
///
/// An explicit id is honored when it exists in the objective's pool.
/// Otherwise templates listing the act (or no acts) are preferred, and
/// the whole pool is used if none fit.
pub fn pick_template<'a, R: Rng + ?Sized>(
    catalog: &'a TemplateCatalog,
    objective: Objective,
    act: &str,
    template_id: Option<&str>,
    rng: &mut R,
) -> Result<&'a Template> {
    let pool = catalog.pool(objective);
    if pool.is_empty() {
        return Err(ForgeError::NoTemplateForObjective(objective));
    }

    if let Some(id) = template_id {
        if let Some(template) = pool.iter().find(|t| t.id == id) {
            return Ok(template);
        }
        warn!(template = id, %objective, "Requested template not in pool, picking at random");
    }

    let fitting: Vec<&Template> = pool.iter().filter(|t| t.allows_act(act)).collect();
    let candidates: Vec<&Template> = if fitting.is_empty() {
        pool.iter().collect()
    } else {
        fitting
    };
    candidates
        .choose(rng)
        .copied()
        .ok_or(ForgeError::NoTemplateForObjective(objective))
}

/// Target enemy count before any slot is skipped
///
/// Deploy count plus the act's offset roll plus any bonus, one more for
/// recruit battles, then capped by map density.
pub fn roll_enemy_count<R: Rng + ?Sized>(
    rules: &Rules,
    request: &BattleRequest,
    deploy: usize,
    tiles: usize,
    config: &GenerationConfig,
    rng: &mut R,
) -> usize {
    let (lo, hi) = rules
        .enemy_offset(&request.act, request.row, request.is_boss)
        .unwrap_or(config.unmapped_enemy_offset);
    let recruit_extra = usize::from(request.recruit_battle);
    let count = deploy + rng.roll_inclusive(lo, hi) + request.bonus_enemies + recruit_extra;

    match rules.density_cap(tiles) {
        Some(cap) => count.min(cap),
        None => count,
    }
}

/// Column band searched for bridge placement
fn bridge_band(template: &Template, cols: i32, rows: i32, config: &GenerationConfig) -> TileRect {
    match template.zone_with_role(ZoneRole::River) {
        Some(zone) => {
            let rect = zone.tile_rect(cols, rows);
            TileRect::new(rect.start_col, rect.end_col, 0, rows)
        }
        None => TileRect::column_band(config.bridge_band.0, config.bridge_band.1, cols, rows),
    }
}

/// Generate a battlefield for `request`
///
/// Deterministic for a given generator state, request, data and config.
pub fn generate_battle<R: Rng + ?Sized>(
    request: &BattleRequest,
    data: &GameData,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<BattlefieldDescriptor> {
    let terrain = data.terrain.as_ref();
    let act = request.act.as_str();

    let size = data
        .rules
        .map_sizes_for(act)
        .choose(rng)
        .copied()
        .ok_or_else(|| ForgeError::InvalidData("no map sizes defined".into()))?;
    let (cols, rows) = (size.cols, size.rows);

    let template = pick_template(
        &data.templates,
        request.objective,
        act,
        request.template_id.as_deref(),
        rng,
    )?;

    let mut layout = build_terrain(template, cols, rows, terrain, config, rng)?;
    let throne = apply_features(&mut layout, template, terrain)?;

    let deploy = request
        .deploy_count
        .or_else(|| data.rules.deploy_limit(act).map(|limit| limit.max))
        .unwrap_or(config.default_deploy_count)
        .max(1);
    let reserved: Vec<GridPos> = throne.into_iter().collect();
    let players = place_player_spawns(
        &mut layout,
        player_zone(template, cols, rows, config),
        terrain,
        deploy,
        &reserved,
        rng,
    )?;

    let pool = data
        .units
        .pool(act)
        .ok_or_else(|| ForgeError::InvalidData(format!("no enemy pool for act '{}'", act)))?;
    let level_range = match request.level_range {
        Some((a, b)) => (a.min(b), a.max(b)),
        None => pool.level_range,
    };
    let enemy_count = roll_enemy_count(&data.rules, request, deploy, size.tiles(), config, rng);

    let mut occupied: AHashSet<GridPos> = players.iter().copied().collect();
    let enemy_ctx = EnemyContext {
        layout: &layout,
        terrain,
        template,
        units: &data.units,
        pool,
        act,
        objective: request.objective,
        throne,
        zone: enemy_zone(template, cols, rows, config),
        level_range,
        fighters_only: request.fighters_only,
        config,
    };
    let enemies = place_enemies(&enemy_ctx, enemy_count, &mut occupied, rng)?;
    if enemies.len() < enemy_count {
        debug!(placed = enemies.len(), target = enemy_count, "Enemy slots skipped");
    }

    let npc = match (request.recruit_battle, data.units.recruits(act)) {
        (true, Some(recruits)) => {
            let npc_ctx = NpcContext {
                terrain,
                units: &data.units,
                players: &players,
                enemies: &enemies,
                river: template.is_river(),
                config,
            };
            place_npc(&mut layout, &npc_ctx, recruits, &request.used_recruit_names, rng)?
        }
        (true, None) => {
            debug!(act, "No recruit pool for act, skipping NPC");
            None
        }
        (false, _) => None,
    };

    let targets: Vec<GridPos> = enemies
        .iter()
        .map(|e| e.pos)
        .chain(npc.iter().map(|n| n.pos))
        .chain(throne)
        .collect();
    let max_steps = config.carve_step_factor * (cols + rows) as usize;
    let carved = ensure_reachability(&mut layout, terrain, players[0], &targets, max_steps)?;

    if let Some(min_bridges) = template.min_bridges {
        let band = bridge_band(template, cols, rows, config);
        ensure_bridges(&mut layout, terrain, band, min_bridges)?;
    }

    info!(
        template = %template.id,
        act,
        objective = %request.objective,
        cols,
        rows,
        enemies = enemies.len(),
        npc = npc.is_some(),
        carved,
        "Generated battlefield"
    );

    Ok(BattlefieldDescriptor {
        template_id: template.id.clone(),
        objective: request.objective,
        cols,
        rows,
        layout,
        player_spawns: players,
        enemy_spawns: enemies,
        npc_spawn: npc,
        throne_pos: throne,
    })
}

/// `generate_battle` with a fresh generator seeded from `seed`
pub fn generate_seeded(
    request: &BattleRequest,
    data: &GameData,
    config: &GenerationConfig,
    seed: u64,
) -> Result<BattlefieldDescriptor> {
    let mut rng = seeded_rng(seed);
    generate_battle(request, data, config, &mut rng)
}
