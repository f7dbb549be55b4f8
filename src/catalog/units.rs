//! Unit classes and the per-act enemy, boss and recruit pools

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{ForgeError, Result};
use crate::core::types::MoveType;

/// Promotion tier of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Base,
    Promoted,
}

/// Weapon family a class can wield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Sword,
    Lance,
    Axe,
    Bow,
    Tome,
    Light,
    Staff,
}

impl Proficiency {
    /// Families that reach two tiles
    pub fn is_ranged(&self) -> bool {
        matches!(self, Proficiency::Bow | Proficiency::Tome | Proficiency::Light)
    }

    /// Families with a sunder weapon variant
    pub fn has_sunder_variant(&self) -> bool {
        matches!(
            self,
            Proficiency::Sword | Proficiency::Lance | Proficiency::Axe | Proficiency::Bow
        )
    }
}

/// Behavior flag handed to the enemy AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiMode {
    /// Holds position until a player unit comes within reach
    Guard,
    /// Advances on the nearest player unit every turn
    Chase,
}

/// A unit class definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub move_type: MoveType,
    #[serde(default)]
    pub tier: Tier,
    /// First entry is the primary weapon family
    #[serde(default)]
    pub proficiencies: Vec<Proficiency>,
    pub mov: u32,
}

impl ClassDef {
    pub fn primary_proficiency(&self) -> Option<Proficiency> {
        self.proficiencies.first().copied()
    }

    pub fn has_proficiency(&self, prof: Proficiency) -> bool {
        self.proficiencies.contains(&prof)
    }

    /// Longest weapon reach, before any cap
    pub fn weapon_reach(&self) -> u32 {
        if self.proficiencies.iter().any(Proficiency::is_ranged) {
            2
        } else {
            1
        }
    }

    pub fn can_carry_sunder(&self) -> bool {
        self.primary_proficiency()
            .is_some_and(|prof| prof.has_sunder_variant())
    }
}

/// Capability tags used by template composition weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionCategory {
    InfantryMelee,
    Cavalry,
    Archer,
    Mage,
    Armored,
    LanceUser,
}

impl CompositionCategory {
    pub fn all() -> [CompositionCategory; 6] {
        [
            CompositionCategory::InfantryMelee,
            CompositionCategory::Cavalry,
            CompositionCategory::Archer,
            CompositionCategory::Mage,
            CompositionCategory::Armored,
            CompositionCategory::LanceUser,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionCategory::InfantryMelee => "infantry_melee",
            CompositionCategory::Cavalry => "cavalry",
            CompositionCategory::Archer => "archer",
            CompositionCategory::Mage => "mage",
            CompositionCategory::Armored => "armored",
            CompositionCategory::LanceUser => "lance_user",
        }
    }

    /// Whether a class carries this tag
    pub fn matches(&self, class: &ClassDef) -> bool {
        use Proficiency::*;
        match self {
            CompositionCategory::InfantryMelee => {
                class.move_type == MoveType::Infantry
                    && [Sword, Lance, Axe].iter().any(|p| class.has_proficiency(*p))
            }
            CompositionCategory::Cavalry => class.move_type == MoveType::Cavalry,
            CompositionCategory::Archer => class.has_proficiency(Bow),
            CompositionCategory::Mage => class.has_proficiency(Tome) || class.has_proficiency(Light),
            CompositionCategory::Armored => class.move_type == MoveType::Armored,
            CompositionCategory::LanceUser => class.has_proficiency(Lance),
        }
    }
}

impl fmt::Display for CompositionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompositionCategory {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        CompositionCategory::all()
            .into_iter()
            .find(|cat| cat.as_str() == s)
            .ok_or_else(|| ForgeError::InvalidData(format!("unknown composition category: {}", s)))
    }
}

/// Every category a class belongs to
pub fn classify(class: &ClassDef) -> Vec<CompositionCategory> {
    CompositionCategory::all()
        .into_iter()
        .filter(|cat| cat.matches(class))
        .collect()
}

/// Ordinary enemies available in one act
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyPool {
    #[serde(default)]
    pub base: Vec<String>,
    #[serde(default)]
    pub promoted: Vec<String>,
    pub level_range: (u32, u32),
    #[serde(default)]
    pub sunder_chance: f64,
}

/// Named boss for seize battles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDef {
    pub name: String,
    pub class: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitDef {
    pub name: String,
    pub class: String,
}

/// Recruitable NPCs for one act
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitPool {
    pub level_range: (u32, u32),
    #[serde(default)]
    pub pool: Vec<RecruitDef>,
}

#[derive(Debug, Deserialize)]
struct UnitsFile {
    #[serde(rename = "class")]
    classes: Vec<ClassDef>,
    #[serde(default)]
    pools: BTreeMap<String, EnemyPool>,
    #[serde(default)]
    bosses: BTreeMap<String, Vec<BossDef>>,
    #[serde(default)]
    recruits: BTreeMap<String, RecruitPool>,
}

/// Classes plus per-act pools
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    classes: Vec<ClassDef>,
    by_name: HashMap<String, usize>,
    pools: BTreeMap<String, EnemyPool>,
    bosses: BTreeMap<String, Vec<BossDef>>,
    recruits: BTreeMap<String, RecruitPool>,
}

impl UnitCatalog {
    pub fn new(
        classes: Vec<ClassDef>,
        pools: BTreeMap<String, EnemyPool>,
        bosses: BTreeMap<String, Vec<BossDef>>,
        recruits: BTreeMap<String, RecruitPool>,
    ) -> Result<Self> {
        let mut by_name = HashMap::new();
        for (idx, class) in classes.iter().enumerate() {
            if by_name.insert(class.name.clone(), idx).is_some() {
                return Err(ForgeError::InvalidData(format!(
                    "duplicate class name: {}",
                    class.name
                )));
            }
        }

        let catalog = Self {
            classes,
            by_name,
            pools,
            bosses,
            recruits,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: UnitsFile = toml::from_str(content)?;
        Self::new(file.classes, file.pools, file.bosses, file.recruits)
    }

    /// Check that every pool entry names a known class
    fn validate(&self) -> Result<()> {
        for (act, pool) in &self.pools {
            if pool.base.is_empty() && pool.promoted.is_empty() {
                return Err(ForgeError::InvalidData(format!(
                    "enemy pool for {} has no classes",
                    act
                )));
            }
            for name in pool.base.iter().chain(pool.promoted.iter()) {
                self.require_class(name)?;
            }
            check_level_range(act, pool.level_range)?;
            if !(0.0..=1.0).contains(&pool.sunder_chance) {
                return Err(ForgeError::InvalidData(format!(
                    "sunder_chance for {} must be within [0, 1]",
                    act
                )));
            }
        }

        for boss in self.bosses.values().flatten() {
            self.require_class(&boss.class)?;
        }

        for (act, recruits) in &self.recruits {
            check_level_range(act, recruits.level_range)?;
            for recruit in &recruits.pool {
                self.require_class(&recruit.class)?;
            }
        }

        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.by_name.get(name).map(|&idx| &self.classes[idx])
    }

    pub fn require_class(&self, name: &str) -> Result<&ClassDef> {
        self.class(name)
            .ok_or_else(|| ForgeError::UnknownClass(name.to_string()))
    }

    pub fn classes(&self) -> &[ClassDef] {
        &self.classes
    }

    pub fn pool(&self, act: &str) -> Option<&EnemyPool> {
        self.pools.get(act)
    }

    pub fn bosses(&self, act: &str) -> &[BossDef] {
        self.bosses.get(act).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn recruits(&self, act: &str) -> Option<&RecruitPool> {
        self.recruits.get(act)
    }
}

fn check_level_range(act: &str, (min, max): (u32, u32)) -> Result<()> {
    if min == 0 || min > max {
        return Err(ForgeError::InvalidData(format!(
            "level range ({}, {}) for {} must satisfy 1 <= min <= max",
            min, max, act
        )));
    }
    Ok(())
}
