//! Mods - Ranked catalog mods and the nine-slot loadout

use serde::{Deserialize, Serialize};

use crate::source::EffectSource;
use crate::upgrade::{StatEffect, COMPATIBILITY_ANY};
use crate::weapon::Weapon;

/// Name of the empty slot placeholder
pub const EMPTY_MOD_NAME: &str = "+";
/// Name of the placeholder replaced by the build's riven
pub const RIVEN_MOD_NAME: &str = "Riven Mod";
/// Ordinal slots of a loadout, the exilus slot comes after
pub const ORDINAL_SLOTS: usize = 8;

/// Catalog mod with its rank-0 effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mod {
    pub name: String,
    pub compatibility: String,
    #[serde(default)]
    pub effects: Vec<StatEffect>,
    #[serde(default)]
    pub is_utility: bool,
    #[serde(default)]
    pub max_rank: u32,
}

impl Mod {
    fn placeholder(name: &str, is_utility: bool) -> Self {
        Mod {
            name: name.to_string(),
            compatibility: COMPATIBILITY_ANY.to_string(),
            effects: Vec::new(),
            is_utility,
            max_rank: 0,
        }
    }

    pub fn empty() -> Self {
        Mod::placeholder(EMPTY_MOD_NAME, true)
    }

    pub fn riven() -> Self {
        Mod::placeholder(RIVEN_MOD_NAME, false)
    }

    pub fn is_empty(&self) -> bool {
        self.name == EMPTY_MOD_NAME
    }

    pub fn is_riven(&self) -> bool {
        self.name == RIVEN_MOD_NAME
    }
}

/// A mod at a chosen rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledMod {
    pub item: Mod,
    pub rank: u32,
}

impl ScaledMod {
    pub fn new(item: Mod, rank: u32) -> Self {
        ScaledMod { item, rank }
    }

    /// The mod at its maximum rank
    pub fn max(item: Mod) -> Self {
        let rank = item.max_rank;
        ScaledMod { item, rank }
    }

    pub fn empty() -> Self {
        ScaledMod::new(Mod::empty(), 0)
    }

    pub fn is_riven(&self) -> bool {
        self.item.is_riven()
    }

    pub fn scaled_effects(&self) -> Vec<StatEffect> {
        self.item.effects.iter().map(|e| e.scale(self.rank)).collect()
    }
}

impl EffectSource for ScaledMod {
    fn id(&self) -> &str {
        &self.item.name
    }

    fn effects(&self, _weapon: &Weapon) -> Vec<StatEffect> {
        self.scaled_effects()
    }
}

/// Eight ordinal slots plus the exilus slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loadout {
    pub ordinal: [ScaledMod; ORDINAL_SLOTS],
    pub exilus: ScaledMod,
}

impl Default for Loadout {
    fn default() -> Self {
        Loadout::empty()
    }
}

impl Loadout {
    pub fn empty() -> Self {
        Loadout {
            ordinal: std::array::from_fn(|_| ScaledMod::empty()),
            exilus: ScaledMod::empty(),
        }
    }

    /// Build from 8 slots (exilus left empty) or 9 slots
    pub fn from_slots(mut slots: Vec<ScaledMod>) -> Option<Self> {
        let exilus = match slots.len() {
            ORDINAL_SLOTS => ScaledMod::empty(),
            n if n == ORDINAL_SLOTS + 1 => slots.pop()?,
            _ => return None,
        };
        let ordinal: [ScaledMod; ORDINAL_SLOTS] = slots.try_into().ok()?;
        Some(Loadout { ordinal, exilus })
    }

    /// Ordinal slots followed by the exilus slot
    pub fn iter(&self) -> impl Iterator<Item = &ScaledMod> {
        self.ordinal.iter().chain(std::iter::once(&self.exilus))
    }

    /// Whether an ordinal slot holds the riven placeholder
    pub fn has_riven(&self) -> bool {
        self.ordinal.iter().any(|m| m.is_riven())
    }
}

/// A fixed effect list acting as its own source
#[derive(Debug, Clone)]
pub struct EffectGroup<'a> {
    pub id: &'a str,
    pub effects: &'a [StatEffect],
}

impl EffectSource for EffectGroup<'_> {
    fn id(&self) -> &str {
        self.id
    }

    fn effects(&self, _weapon: &Weapon) -> Vec<StatEffect> {
        self.effects.to_vec()
    }
}
