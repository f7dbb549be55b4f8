//! Battlefield generator CLI
//!
//! Generates one battle and prints it as an ASCII map or JSON.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use fieldforge::catalog::{GameData, TerrainTable};
use fieldforge::core::{GenerationConfig, GridPos, Objective, Result};
use fieldforge::mapgen::{generate_seeded, BattleRequest, BattlefieldDescriptor};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Generate a tactics battlefield
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(about = "Generate a battlefield and print its layout and spawns")]
struct Args {
    /// Act id (act1, act2, act3, postAct, finalBoss)
    #[arg(long, default_value = "act1")]
    act: String,

    /// Win condition: rout or seize
    #[arg(long, default_value = "rout")]
    objective: Objective,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of player units to deploy
    #[arg(long)]
    deploy: Option<usize>,

    /// Preferred template id
    #[arg(long)]
    template: Option<String>,

    /// Progression-map row of the battle
    #[arg(long)]
    row: Option<u32>,

    /// Boss battle
    #[arg(long)]
    boss: bool,

    /// Place a recruitable NPC
    #[arg(long)]
    recruit: bool,

    /// Directory with terrain/templates/units/rules TOML files
    #[arg(long)]
    data: Option<PathBuf>,

    /// Generation tunables as TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fieldforge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let data = match &args.data {
        Some(dir) => GameData::load_dir(dir)?,
        None => GameData::builtin()?,
    };
    let config = match &args.config {
        Some(path) => GenerationConfig::from_toml(&std::fs::read_to_string(path)?)?,
        None => GenerationConfig::default(),
    };

    let mut request = BattleRequest::new(args.act.clone(), args.objective);
    request.template_id = args.template.clone();
    request.deploy_count = args.deploy;
    request.row = args.row;
    request.is_boss = args.boss;
    request.recruit_battle = args.recruit;

    let battle = generate_seeded(&request, &data, &config, seed)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&battle)?),
        OutputFormat::Text => print_battle(&battle, &data.terrain, seed),
    }
    Ok(())
}

/// One character per terrain, overridden by units
fn terrain_glyph(name: &str) -> char {
    match name {
        "Plain" => '.',
        "Forest" => 'f',
        "Mountain" => '^',
        "Fort" => 'F',
        "Throne" => 'T',
        "Wall" => '#',
        "Water" => '~',
        "Bridge" => '=',
        "Sand" => ',',
        "Village" => 'v',
        "Ice" => '*',
        "Lava Crack" => '%',
        _ => '?',
    }
}

fn print_battle(battle: &BattlefieldDescriptor, terrain: &TerrainTable, seed: u64) {
    println!(
        "=== {} ({}) {}x{} seed {} ===",
        battle.template_id, battle.objective, battle.cols, battle.rows, seed
    );

    for row in 0..battle.rows {
        let line: String = (0..battle.cols)
            .map(|col| {
                let pos = GridPos::new(col, row);
                if battle.player_spawns.contains(&pos) {
                    'P'
                } else if let Some(enemy) = battle.enemy_spawns.iter().find(|e| e.pos == pos) {
                    if enemy.is_boss {
                        'B'
                    } else {
                        'E'
                    }
                } else if battle.npc_spawn.as_ref().is_some_and(|n| n.pos == pos) {
                    'N'
                } else {
                    battle
                        .layout
                        .get(pos)
                        .map(|id| terrain_glyph(terrain.name(id)))
                        .unwrap_or(' ')
                }
            })
            .collect();
        println!("{}", line);
    }

    println!();
    println!("Players: {}", battle.player_spawns.len());
    for enemy in &battle.enemy_spawns {
        let mut tags = Vec::new();
        if enemy.is_boss {
            tags.push("boss".to_string());
        }
        if enemy.sunder_weapon {
            tags.push("sunder".to_string());
        }
        if let Some(mode) = enemy.ai_mode {
            tags.push(format!("{:?}", mode).to_lowercase());
        }
        println!(
            "  {} {} lv{} {} {}",
            enemy.pos,
            enemy.name.as_deref().unwrap_or(&enemy.class_name),
            enemy.level,
            enemy.class_name,
            tags.join(",")
        );
    }
    if let Some(npc) = &battle.npc_spawn {
        println!("Recruit: {} ({} lv{}) at {}", npc.name, npc.class_name, npc.level, npc.pos);
    }
}
