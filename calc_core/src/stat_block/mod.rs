//! StatBlock - Resolved effects of one build against one weapon

mod aggregator;
mod computed;
mod stat_value;

pub use aggregator::EffectAccumulator;
pub use stat_value::StatValue;

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::damage::DamageDistribution;
use crate::types::Faction;
use crate::upgrade::EffectKind;

/// Failure while folding effects into a StatBlock
///
/// These indicate catalog bugs, never user input problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("Unsupported operation for {family} effect: {effect}")]
    CombinationPolicy { effect: String, family: String },
    #[error("Missing or invalid argument on effect: {effect}")]
    InvalidArgument { effect: String },
}

/// Aggregated effects, ready to be applied to base weapon stats
#[derive(Debug, Clone, Default)]
pub struct StatBlock {
    // === Plain numeric kinds ===
    stats: HashMap<EffectKind, StatValue>,

    // === Damage ===
    /// Merged, un-normalized damage map
    damage: DamageDistribution,

    // === Faction ===
    faction: BTreeMap<Faction, Decimal>,
}

impl StatBlock {
    pub fn new(
        stats: HashMap<EffectKind, StatValue>,
        damage: DamageDistribution,
        faction: BTreeMap<Faction, Decimal>,
    ) -> Self {
        StatBlock {
            stats,
            damage,
            faction,
        }
    }

    /// Accumulated tuple for a kind, if any effect touched it
    pub fn get(&self, kind: &EffectKind) -> Option<&StatValue> {
        self.stats.get(kind)
    }

    pub fn has(&self, kind: &EffectKind) -> bool {
        self.stats.contains_key(kind)
    }

    /// Resolve `kind` against `base`, floored at `min`
    ///
    /// An untouched kind returns `base` unchanged, without clamping.
    pub fn apply(&self, kind: &EffectKind, base: Decimal, min: Decimal) -> Decimal {
        match self.stats.get(kind) {
            Some(value) => value.apply(base, min),
            None => base,
        }
    }

    /// Resolve `kind` against `base`, clamped to `[min, max]`
    pub fn apply_clamped(&self, kind: &EffectKind, base: Decimal, min: Decimal, max: Decimal) -> Decimal {
        match self.stats.get(kind) {
            Some(value) => value.apply_clamped(base, min, max),
            None => base,
        }
    }

    pub fn damage(&self) -> &DamageDistribution {
        &self.damage
    }

    pub fn faction_modifiers(&self) -> &BTreeMap<Faction, Decimal> {
        &self.faction
    }

    pub fn faction_modifier(&self, faction: Faction) -> Option<Decimal> {
        self.faction.get(&faction).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upgrade::Operation;
    use rust_decimal_macros::dec;

    #[test]
    fn test_untouched_kind_passes_base_through() {
        let block = StatBlock::default();
        // No clamp applies when nothing touched the kind
        assert_eq!(block.apply(&EffectKind::SniperCombo, dec!(1), dec!(5)), dec!(1));
    }

    #[test]
    fn test_apply_with_values() {
        let mut stats = HashMap::new();
        let mut crit = StatValue::new();
        crit.accumulate(Operation::MulAdd, dec!(1.65));
        stats.insert(EffectKind::CritChance, crit);
        let block = StatBlock::new(stats, DamageDistribution::new(), BTreeMap::new());
        assert_eq!(block.apply(&EffectKind::CritChance, dec!(0.2), Decimal::ZERO), dec!(0.53));
        assert!(block.has(&EffectKind::CritChance));
        assert!(!block.has(&EffectKind::Multishot));
    }
}
