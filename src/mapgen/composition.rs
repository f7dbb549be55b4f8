//! Enemy class choice
//!
//! Classification into composition categories happens once per class
//! (`catalog::units::classify`). Weighting folds the template's multipliers
//! over those categories by multiplication, so a class matching two boosted
//! categories is boosted twice.

use rand::Rng;

use crate::catalog::templates::Template;
use crate::catalog::units::{
    classify, ClassDef, CompositionCategory, EnemyPool, UnitCatalog,
};
use crate::core::config::GenerationConfig;
use crate::core::error::Result;
use crate::core::random::WeightedRng;

/// Product of every multiplier whose category the class carries
pub fn composition_weight(
    categories: &[CompositionCategory],
    multipliers: &[(CompositionCategory, f64)],
) -> f64 {
    multipliers
        .iter()
        .filter(|(cat, _)| categories.contains(cat))
        .map(|(_, m)| *m)
        .product()
}

/// Weighted class picker for one battle
#[derive(Debug, Clone)]
pub struct ClassChooser<'a> {
    base: Vec<(&'a ClassDef, f64)>,
    promoted: Vec<(&'a ClassDef, f64)>,
    promoted_chance: f64,
}

impl<'a> ClassChooser<'a> {
    /// Resolve the pool's classes and weight them by the template
    ///
    /// `fighters_only` keeps base-tier infantry melee classes (when the
    /// pool has any) and disables the promoted tier.
    pub fn new(
        pool: &EnemyPool,
        units: &'a UnitCatalog,
        template: &Template,
        fighters_only: bool,
        config: &GenerationConfig,
    ) -> Result<Self> {
        let multipliers = template.composition_weights()?;
        let weigh = |names: &[String]| -> Result<Vec<(&'a ClassDef, f64)>> {
            names
                .iter()
                .map(|name| {
                    let class = units.require_class(name)?;
                    Ok((class, composition_weight(&classify(class), &multipliers)))
                })
                .collect()
        };

        let mut base = weigh(&pool.base)?;
        let mut promoted = weigh(&pool.promoted)?;

        if fighters_only {
            let fighters: Vec<_> = base
                .iter()
                .copied()
                .filter(|(class, _)| CompositionCategory::InfantryMelee.matches(class))
                .collect();
            if !fighters.is_empty() {
                base = fighters;
            }
            promoted.clear();
        }

        Ok(Self {
            base,
            promoted,
            promoted_chance: config.promoted_chance,
        })
    }

    /// Draw a class: promoted tier with the configured chance, else base
    ///
    /// Falls back to the other tier when the drawn tier has no positive
    /// weight. Returns `None` only when no class can be drawn at all.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'a ClassDef> {
        let use_promoted = !self.promoted.is_empty() && rng.gen::<f64>() < self.promoted_chance;
        let (first, second) = if use_promoted {
            (&self.promoted, &self.base)
        } else {
            (&self.base, &self.promoted)
        };

        rng.pick_weighted(first)
            .or_else(|| rng.pick_weighted(second))
            .copied()
    }

    /// Stand-in for a missing boss or a class-less anchor
    ///
    /// Pools list classes weakest first, so this is the last promoted class,
    /// or the last base class when the act has no promoted tier.
    pub fn strongest(&self) -> Option<&'a ClassDef> {
        self.promoted
            .last()
            .or_else(|| self.base.last())
            .map(|(class, _)| *class)
    }

    pub fn weight_of(&self, name: &str) -> Option<f64> {
        self.base
            .iter()
            .chain(self.promoted.iter())
            .find(|(class, _)| class.name == name)
            .map(|(_, w)| *w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::units::{Proficiency, Tier};
    use crate::core::random::seeded_rng;
    use crate::core::types::MoveType;
    use std::collections::BTreeMap;

    fn class(name: &str, move_type: MoveType, tier: Tier, profs: &[Proficiency]) -> ClassDef {
        ClassDef {
            name: name.into(),
            move_type,
            tier,
            proficiencies: profs.to_vec(),
            mov: 5,
        }
    }

    fn catalog() -> UnitCatalog {
        UnitCatalog::new(
            vec![
                class("Fighter", MoveType::Infantry, Tier::Base, &[Proficiency::Axe]),
                class("Archer", MoveType::Infantry, Tier::Base, &[Proficiency::Bow]),
                class("Knight", MoveType::Armored, Tier::Base, &[Proficiency::Lance]),
                class("General", MoveType::Armored, Tier::Promoted, &[Proficiency::Lance]),
            ],
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
        )
        .unwrap()
    }

    fn pool() -> EnemyPool {
        EnemyPool {
            base: vec!["Fighter".into(), "Archer".into(), "Knight".into()],
            promoted: vec!["General".into()],
            level_range: (1, 3),
            sunder_chance: 0.0,
        }
    }

    fn template(composition: &[(&str, f64)]) -> Template {
        Template {
            id: "t".into(),
            acts: vec![],
            zones: vec![],
            features: vec![],
            anchors: vec![],
            composition: composition.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            min_bridges: None,
        }
    }

    #[test]
    fn test_multipliers_compound() {
        let cats = [CompositionCategory::Armored, CompositionCategory::LanceUser];
        let multipliers = [
            (CompositionCategory::Armored, 2.0),
            (CompositionCategory::LanceUser, 1.5),
            (CompositionCategory::Cavalry, 0.1),
        ];
        assert_eq!(composition_weight(&cats, &multipliers), 3.0);
        assert_eq!(composition_weight(&[], &multipliers), 1.0);
    }

    #[test]
    fn test_template_weights_applied() {
        let units = catalog();
        let t = template(&[("armored", 2.0), ("lance_user", 1.5)]);
        let chooser = ClassChooser::new(&pool(), &units, &t, false, &GenerationConfig::default()).unwrap();
        assert_eq!(chooser.weight_of("Knight"), Some(3.0));
        assert_eq!(chooser.weight_of("Fighter"), Some(1.0));
    }

    #[test]
    fn test_fighters_only_restricts_pool() {
        let units = catalog();
        let chooser = ClassChooser::new(&pool(), &units, &template(&[]), true, &GenerationConfig::default()).unwrap();
        let mut rng = seeded_rng(11);
        for _ in 0..50 {
            assert_eq!(chooser.choose(&mut rng).unwrap().name, "Fighter");
        }
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let units = catalog();
        let t = template(&[("archer", 0.0)]);
        let chooser = ClassChooser::new(&pool(), &units, &t, false, &GenerationConfig::default()).unwrap();
        let mut rng = seeded_rng(4);
        for _ in 0..200 {
            assert_ne!(chooser.choose(&mut rng).unwrap().name, "Archer");
        }
    }

    #[test]
    fn test_promoted_share_near_configured_chance() {
        let units = catalog();
        let chooser = ClassChooser::new(&pool(), &units, &template(&[]), false, &GenerationConfig::default()).unwrap();
        let mut rng = seeded_rng(8);
        let promoted = (0..2000)
            .filter(|_| chooser.choose(&mut rng).unwrap().tier == Tier::Promoted)
            .count();
        // Expect ~600
        assert!(promoted > 500 && promoted < 700, "promoted = {}", promoted);
    }

    #[test]
    fn test_strongest_prefers_promoted() {
        let units = catalog();
        let chooser = ClassChooser::new(&pool(), &units, &template(&[]), false, &GenerationConfig::default()).unwrap();
        assert_eq!(chooser.strongest().unwrap().name, "General");
    }
}
