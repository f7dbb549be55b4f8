//! Grid engine integration tests against the built-in terrain table

use std::sync::Arc;

use fieldforge::catalog::{GameData, TerrainTable};
use fieldforge::core::{Faction, GenerationConfig, GridPos, MoveType, Objective};
use fieldforge::grid::{path_cost, GridEngine, Occupancy, VisibilityState, WeaponRange};
use fieldforge::mapgen::{generate_seeded, BattleRequest, Layout};

fn terrain() -> Arc<TerrainTable> {
    GameData::builtin().unwrap().terrain
}

fn engine(rows: &[&[&str]]) -> GridEngine {
    let terrain = terrain();
    let layout = Layout::from_names(&terrain, rows).unwrap();
    GridEngine::new(layout, terrain)
}

fn mixed_field() -> GridEngine {
    engine(&[
        &["Plain", "Forest", "Plain", "Plain", "Mountain", "Plain"],
        &["Plain", "Wall", "Wall", "Plain", "Water", "Plain"],
        &["Plain", "Sand", "Plain", "Forest", "Bridge", "Plain"],
        &["Forest", "Plain", "Fort", "Plain", "Water", "Plain"],
        &["Plain", "Plain", "Plain", "Mountain", "Plain", "Throne"],
    ])
}

#[test]
fn test_movement_cost_matches_path_cost() {
    let engine = mixed_field();
    let occupancy = Occupancy::new();
    let start = GridPos::new(0, 0);

    for move_type in MoveType::all() {
        let range = engine.movement_range(start, 99, move_type, &occupancy, Faction::Player);
        for (pos, reach) in range.iter() {
            let path = engine
                .find_path(start, pos, move_type, &occupancy, Faction::Player)
                .unwrap_or_else(|| panic!("{:?} reached {} without a path", move_type, pos));
            assert_eq!(path_cost(&engine, &path, move_type), Some(reach.cost), "{:?} to {}", move_type, pos);

            let walked = range.path_to(pos).unwrap();
            assert_eq!(path_cost(&engine, &walked, move_type), Some(reach.cost));
        }
    }
}

#[test]
fn test_path_exists_exactly_for_reachable_tiles() {
    let engine = mixed_field();
    let mut occupancy = Occupancy::new();
    occupancy.insert(GridPos::new(3, 2), Faction::Enemy);
    occupancy.insert(GridPos::new(2, 4), Faction::Player);
    let start = GridPos::new(0, 0);

    for move_type in MoveType::all() {
        let range = engine.movement_range(start, u32::MAX, move_type, &occupancy, Faction::Player);
        for row in 0..engine.rows() {
            for col in 0..engine.cols() {
                let goal = GridPos::new(col, row);
                let path = engine.find_path(start, goal, move_type, &occupancy, Faction::Player);
                assert_eq!(path.is_some(), range.contains(goal), "{:?} to {}", move_type, goal);
            }
        }
    }
}

#[test]
fn test_water_splits_grounded_units_but_not_fliers() {
    let engine = engine(&[
        &["Plain", "Water", "Plain"],
        &["Plain", "Water", "Plain"],
    ]);
    let occupancy = Occupancy::new();
    let start = GridPos::new(0, 0);
    let goal = GridPos::new(2, 1);

    assert!(engine.find_path(start, goal, MoveType::Infantry, &occupancy, Faction::Player).is_none());
    let path = engine.find_path(start, goal, MoveType::Flying, &occupancy, Faction::Player).unwrap();
    assert_eq!(path_cost(&engine, &path, MoveType::Flying), Some(3));
}

#[test]
fn test_ice_slide_example() {
    let engine = engine(&[&["Plain", "Ice", "Ice", "Ice", "Plain"]]);
    let path = vec![GridPos::new(0, 0), GridPos::new(1, 0)];

    let result = engine.effective_path(&path, MoveType::Infantry, &Occupancy::new());
    assert_eq!(result.destination(), Some(GridPos::new(4, 0)));
    assert_eq!(result.slide_start_index, Some(1));
    assert_eq!(result.effective_path.len(), 5);

    let flown = engine.effective_path(&path, MoveType::Flying, &Occupancy::new());
    assert_eq!(flown.destination(), Some(GridPos::new(1, 0)));
}

#[test]
fn test_ice_slide_halts_before_blocker() {
    let engine = engine(&[&["Plain", "Ice", "Ice", "Ice", "Plain"]]);
    let mut occupancy = Occupancy::new();
    occupancy.insert(GridPos::new(3, 0), Faction::Enemy);

    let path = vec![GridPos::new(0, 0), GridPos::new(1, 0)];
    let result = engine.effective_path(&path, MoveType::Armored, &occupancy);
    assert_eq!(result.destination(), Some(GridPos::new(2, 0)));
}

#[test]
fn test_fog_reveals_vision_radius_only() {
    let mut engine = engine(&vec![&["Plain"; 12][..]; 12]).with_fog(true);
    let viewer = GridPos::new(0, 0);
    let radius = fieldforge::grid::vision_range_for(MoveType::Infantry) as i32;

    assert!(!engine.is_visible(viewer));
    engine.update_fog([(viewer, MoveType::Infantry)]);

    assert!(engine.is_visible(GridPos::new(radius, 0)));
    assert!(engine.is_visible(GridPos::new(1, radius - 1)));
    assert!(!engine.is_visible(GridPos::new(radius + 1, 0)));
    assert!(!engine.is_visible(GridPos::new(radius, 1)));
    assert_eq!(engine.visibility(GridPos::new(11, 11)), VisibilityState::Unknown);

    engine.update_fog([(GridPos::new(11, 11), MoveType::Flying)]);
    assert_eq!(engine.visibility(viewer), VisibilityState::Remembered);
    assert_eq!(engine.visibility(GridPos::new(11, 11)), VisibilityState::Observed);
}

#[test]
fn test_fog_disabled_sees_everything() {
    let mut engine = engine(&[&["Plain", "Plain"], &["Plain", "Plain"]]);
    engine.update_fog(Vec::<(GridPos, MoveType)>::new());
    assert!(engine.is_visible(GridPos::new(1, 1)));
}

#[test]
fn test_temporary_wall_blocks_then_reverts() {
    let mut engine = engine(&[
        &["Plain", "Plain", "Plain"],
        &["Wall", "Plain", "Wall"],
        &["Plain", "Plain", "Plain"],
    ]);
    let occupancy = Occupancy::new();
    let start = GridPos::new(0, 0);
    let goal = GridPos::new(0, 2);
    let gap = GridPos::new(1, 1);

    assert!(engine.find_path(start, goal, MoveType::Infantry, &occupancy, Faction::Player).is_some());

    engine.set_temporary_terrain_named(gap, "Wall", 2).unwrap();
    assert!(engine.find_path(start, goal, MoveType::Infantry, &occupancy, Faction::Player).is_none());

    assert!(engine.tick_temporary_terrain().unwrap().is_empty());
    assert_eq!(engine.tick_temporary_terrain().unwrap(), vec![gap]);
    assert_eq!(engine.terrain_at(gap).unwrap().name, "Plain");
    assert!(engine.find_path(start, goal, MoveType::Infantry, &occupancy, Faction::Player).is_some());
}

#[test]
fn test_lava_hazard_on_builtin_terrain() {
    let engine = engine(&[&["Plain", "Lava Crack"]]);
    let outcome = fieldforge::grid::apply_tile_hazard(&engine, GridPos::new(1, 0), 4).unwrap();
    assert_eq!(outcome.next_hp, 1);
    assert_eq!(outcome.applied_damage, 3);
    assert!(fieldforge::grid::apply_tile_hazard(&engine, GridPos::new(0, 0), 4).is_none());
}

#[test]
fn test_bow_range_around_archer() {
    let engine = engine(&vec![&["Plain"; 5][..]; 5]);
    let tiles = engine.attack_range(GridPos::new(2, 2), "2".parse::<WeaponRange>().unwrap());
    assert_eq!(tiles.len(), 8);
    assert!(tiles.iter().all(|t| t.distance(&GridPos::new(2, 2)) == 2));
}

#[test]
fn test_engine_over_generated_battle() {
    let data = GameData::builtin().unwrap();
    let request = BattleRequest::new("act2", Objective::Rout);
    let battle = generate_seeded(&request, &data, &GenerationConfig::default(), 21).unwrap();
    let engine = GridEngine::from_descriptor(&battle, data.terrain.clone(), false);

    let mut occupancy: Occupancy = battle
        .player_spawns
        .iter()
        .map(|pos| (*pos, Faction::Player))
        .collect();
    for enemy in &battle.enemy_spawns {
        occupancy.insert(enemy.pos, Faction::Enemy);
    }

    let leader = battle.player_spawns[0];
    let range = engine.movement_range(leader, 5, MoveType::Infantry, &occupancy, Faction::Player);
    assert!(range.contains(leader));
    for pos in range.destinations() {
        assert!(occupancy.faction_at(pos) != Some(Faction::Enemy));
        assert!(range.cost(pos).unwrap() <= 5);
    }

    // Generation guarantees infantry reachability on the bare terrain.
    let empty = Occupancy::new();
    for enemy in &battle.enemy_spawns {
        let path = engine.find_path(leader, enemy.pos, MoveType::Infantry, &empty, Faction::Player);
        assert!(path.is_some(), "no path to enemy at {}", enemy.pos);
    }
}
