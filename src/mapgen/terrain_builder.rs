//! Paints a template's zones onto a fresh grid and applies features

use rand::Rng;
use tracing::debug;

use crate::catalog::templates::Template;
use crate::catalog::terrain::{TerrainId, TerrainTable};
use crate::core::config::GenerationConfig;
use crate::core::error::Result;
use crate::core::random::WeightedRng;
use crate::core::types::GridPos;
use crate::mapgen::layout::Layout;

/// Fill a grid from the template's weighted zones
///
/// Every tile starts as Plain. Zones are painted in ascending priority and
/// each tile in a zone is drawn independently, so later zones overwrite
/// earlier ones tile by tile. Excess forts are then demoted to Plain.
pub fn build_terrain<R: Rng + ?Sized>(
    template: &Template,
    cols: i32,
    rows: i32,
    terrain: &TerrainTable,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Layout> {
    let plain = terrain.key().plain;
    let mut layout = Layout::new(cols, rows, plain);

    for zone in template.zones_by_priority() {
        let weights = zone
            .weights()
            .into_iter()
            .map(|(name, weight)| terrain.require(name).map(|id| (id, weight)))
            .collect::<Result<Vec<(TerrainId, f64)>>>()?;
        if weights.is_empty() {
            continue;
        }

        for pos in zone.tile_rect(cols, rows).positions() {
            if let Some(id) = rng.pick_weighted(&weights) {
                layout.set(pos, *id)?;
            }
        }
    }

    if let Some(fort) = terrain.key().fort {
        let removed = cap_terrain_count(&mut layout, fort, plain, config.max_forts, rng)?;
        if removed > 0 {
            debug!(removed, "Demoted excess forts");
        }
    }

    Ok(layout)
}

/// Randomly demote tiles of `id` to `replacement` until at most `max` remain
pub fn cap_terrain_count<R: Rng + ?Sized>(
    layout: &mut Layout,
    id: TerrainId,
    replacement: TerrainId,
    max: usize,
    rng: &mut R,
) -> Result<usize> {
    let mut positions = layout.positions_of(id);
    let mut removed = 0;
    while positions.len() > max {
        let pos = positions.remove(rng.gen_range(0..positions.len()));
        layout.set(pos, replacement)?;
        removed += 1;
    }
    Ok(removed)
}

/// Stamp single-tile features; returns the throne position if one was placed
pub fn apply_features(
    layout: &mut Layout,
    template: &Template,
    terrain: &TerrainTable,
) -> Result<Option<GridPos>> {
    let mut throne = None;
    for feature in &template.features {
        let id = terrain.require(&feature.terrain)?;
        let pos = feature.position.resolve(layout.cols(), layout.rows());
        layout.set(pos, id)?;
        if Some(id) == terrain.key().throne {
            throne = Some(pos);
        }
    }
    Ok(throne)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::templates::{Feature, FeaturePosition, Zone};
    use crate::catalog::terrain::{MoveCosts, TerrainKind};
    use crate::core::random::seeded_rng;
    use std::collections::BTreeMap;

    fn terrain() -> TerrainTable {
        TerrainTable::new(vec![
            TerrainKind::new("Plain", MoveCosts::uniform(1)),
            TerrainKind::new("Forest", MoveCosts::uniform(2)),
            TerrainKind::new("Fort", MoveCosts::uniform(2)),
            TerrainKind::new("Throne", MoveCosts::uniform(1)),
        ])
        .unwrap()
    }

    fn zone(rect: [f64; 4], weights: &[(&str, f64)], priority: i32) -> Zone {
        Zone {
            rect,
            terrain: weights
                .iter()
                .map(|(n, w)| (n.to_string(), *w))
                .collect::<BTreeMap<_, _>>(),
            priority,
            role: None,
        }
    }

    fn template(zones: Vec<Zone>, features: Vec<Feature>) -> Template {
        Template {
            id: "t".into(),
            acts: vec![],
            zones,
            features,
            anchors: vec![],
            composition: BTreeMap::new(),
            min_bridges: None,
        }
    }

    #[test]
    fn test_higher_priority_zone_wins() {
        let table = terrain();
        let forest = table.require("Forest").unwrap();
        // Listed high-priority first to prove sorting
        let t = template(
            vec![
                zone([0.0, 0.0, 0.5, 1.0], &[("Forest", 1.0)], 2),
                zone([0.0, 0.0, 1.0, 1.0], &[("Plain", 1.0)], 1),
            ],
            vec![],
        );
        let mut rng = seeded_rng(1);
        let layout = build_terrain(&t, 10, 6, &table, &GenerationConfig::default(), &mut rng).unwrap();
        assert_eq!(layout.get(GridPos::new(4, 3)), Some(forest));
        assert_eq!(layout.get(GridPos::new(5, 3)), Some(table.key().plain));
    }

    #[test]
    fn test_forts_capped() {
        let table = terrain();
        let fort = table.require("Fort").unwrap();
        let t = template(vec![zone([0.0, 0.0, 1.0, 1.0], &[("Fort", 1.0)], 0)], vec![]);
        let mut rng = seeded_rng(5);
        let layout = build_terrain(&t, 8, 8, &table, &GenerationConfig::default(), &mut rng).unwrap();
        assert_eq!(layout.count(fort), 4);
        assert_eq!(layout.count(table.key().plain), 60);
    }

    #[test]
    fn test_throne_feature_recorded() {
        let table = terrain();
        let t = template(
            vec![zone([0.0, 0.0, 1.0, 1.0], &[("Forest", 100.0)], 0)],
            vec![Feature {
                terrain: "Throne".into(),
                position: FeaturePosition::Center,
            }],
        );
        let mut rng = seeded_rng(2);
        let mut layout = build_terrain(&t, 10, 8, &table, &GenerationConfig::default(), &mut rng).unwrap();
        let throne = apply_features(&mut layout, &t, &table).unwrap();
        assert_eq!(throne, Some(GridPos::new(5, 4)));
        assert_eq!(layout.get(GridPos::new(5, 4)), table.key().throne);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let table = terrain();
        let t = template(
            vec![zone([0.0, 0.0, 1.0, 1.0], &[("Plain", 3.0), ("Forest", 1.0)], 0)],
            vec![],
        );
        let config = GenerationConfig::default();
        let a = build_terrain(&t, 12, 9, &table, &config, &mut seeded_rng(42)).unwrap();
        let b = build_terrain(&t, 12, 9, &table, &config, &mut seeded_rng(42)).unwrap();
        assert_eq!(a, b);
    }
}
