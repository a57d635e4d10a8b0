//! EffectAccumulator - Collects stat effects before resolving a StatBlock

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

use crate::damage::DamageDistribution;
use crate::stat_block::{CalcError, StatBlock, StatValue};
use crate::types::Faction;
use crate::upgrade::{EffectFamily, EffectKind, Operation, StatEffect, UpgradeEffect};
use crate::weapon::Weapon;

/// Accumulates effects from every source of one calculation
///
/// Sources are folded in the order they are added. Within one source the
/// effect list is walked back to front, which decides compound formation
/// when several elements are added by the same mod.
#[derive(Debug, Clone)]
pub struct EffectAccumulator<'w> {
    weapon: &'w Weapon,
    stats: HashMap<EffectKind, StatValue>,
    combining: DamageDistribution,
    non_combining: DamageDistribution,
    faction: BTreeMap<Faction, Decimal>,
}

impl<'w> EffectAccumulator<'w> {
    /// Create a new empty accumulator for `weapon`
    pub fn new(weapon: &'w Weapon) -> Self {
        EffectAccumulator {
            weapon,
            stats: HashMap::new(),
            combining: DamageDistribution::new(),
            non_combining: DamageDistribution::new(),
            faction: BTreeMap::new(),
        }
    }

    pub fn weapon(&self) -> &'w Weapon {
        self.weapon
    }

    /// Fold the effect list of one source
    pub fn add_source(&mut self, effects: &[StatEffect]) -> Result<(), CalcError> {
        for effect in effects.iter().rev() {
            self.apply_effect(effect)?;
        }
        Ok(())
    }

    /// Route a single effect into its family accumulator
    pub fn apply_effect(&mut self, effect: &StatEffect) -> Result<(), CalcError> {
        let upgrade = &effect.upgrade;
        if upgrade.is_placeholder() {
            return Ok(());
        }
        if let Some(tag) = &upgrade.compatibility {
            if !self.weapon.is_compatible(tag) {
                trace!(effect = %upgrade, "skipping incompatible effect");
                return Ok(());
            }
        }

        match upgrade.family() {
            EffectFamily::Elemental => {
                let damage_type = upgrade
                    .damage_type()
                    .ok_or_else(|| CalcError::invalid_argument(upgrade))?;
                match upgrade.operation {
                    Operation::MulAdd => {
                        let base = self.weapon.damage.get(&damage_type).copied().unwrap_or(Decimal::ZERO);
                        self.combining.add_physical(damage_type, effect.value, base);
                    }
                    Operation::Add => self.combining.add_elemental(damage_type, effect.value),
                    _ => return Err(CalcError::policy(upgrade)),
                }
            }
            EffectFamily::ElementalNoCombine => {
                if upgrade.operation != Operation::Add {
                    return Err(CalcError::policy(upgrade));
                }
                let damage_type = upgrade
                    .damage_type()
                    .ok_or_else(|| CalcError::invalid_argument(upgrade))?;
                self.non_combining.add_elemental(damage_type, effect.value);
            }
            EffectFamily::Faction => {
                if upgrade.operation != Operation::MulAdd {
                    return Err(CalcError::policy(upgrade));
                }
                let faction = upgrade
                    .faction_argument()
                    .ok_or_else(|| CalcError::invalid_argument(upgrade))?;
                *self.faction.entry(faction).or_insert(Decimal::ZERO) += effect.value;
            }
            EffectFamily::Plain => {
                self.stats
                    .entry(upgrade.kind.clone())
                    .or_default()
                    .accumulate(upgrade.operation, effect.value);
            }
            EffectFamily::Placeholder => {}
        }
        Ok(())
    }

    /// Fold the weapon's own damage, clean up and merge the non-combining map
    pub fn finish(mut self) -> StatBlock {
        self.combining.fold_weapon(&self.weapon.damage);
        self.combining.drop_non_positive();
        self.combining.merge(&self.non_combining);
        StatBlock::new(self.stats, self.combining, self.faction)
    }
}

impl CalcError {
    fn policy(upgrade: &UpgradeEffect) -> Self {
        CalcError::CombinationPolicy {
            effect: upgrade.tag(),
            family: format!("{:?}", upgrade.family()),
        }
    }

    fn invalid_argument(upgrade: &UpgradeEffect) -> Self {
        CalcError::InvalidArgument {
            effect: upgrade.tag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DamageType;
    use crate::weapon::Weapon;
    use rust_decimal_macros::dec;

    fn rifle() -> Weapon {
        let mut weapon = Weapon::test_weapon("Test Rifle");
        weapon.compatibility = vec!["Test Rifle".into(), "RIFLE".into(), "PRIMARY".into()];
        weapon.damage = [(DamageType::Impact, dec!(0.5)), (DamageType::Puncture, dec!(0.5))]
            .into_iter()
            .collect();
        weapon
    }

    fn effect(kind: EffectKind, op: Operation, value: Decimal) -> StatEffect {
        StatEffect::new(UpgradeEffect::new(kind, op), value)
    }

    #[test]
    fn test_plain_accumulation() {
        let weapon = rifle();
        let mut acc = EffectAccumulator::new(&weapon);
        acc.add_source(&[effect(EffectKind::Damage, Operation::MulAdd, dec!(1.65))]).unwrap();
        acc.add_source(&[effect(EffectKind::Damage, Operation::MulAdd, dec!(0.25))]).unwrap();
        let block = acc.finish();
        assert_eq!(block.apply(&EffectKind::Damage, dec!(1), Decimal::ZERO), dec!(2.9));
    }

    #[test]
    fn test_incompatible_effect_is_inert() {
        let weapon = rifle();
        let mut acc = EffectAccumulator::new(&weapon);
        let sniper = StatEffect::new(
            UpgradeEffect::new(EffectKind::Damage, Operation::MulAdd).with_compatibility("SNIPER"),
            dec!(0.5),
        );
        let any = StatEffect::new(
            UpgradeEffect::new(EffectKind::Damage, Operation::MulAdd).with_compatibility("xx_any"),
            dec!(0.5),
        );
        acc.add_source(&[sniper, any]).unwrap();
        let block = acc.finish();
        assert_eq!(block.apply(&EffectKind::Damage, dec!(1), Decimal::ZERO), dec!(1.5));
    }

    #[test]
    fn test_reverse_order_within_source() {
        // Listed Fire then Freeze then Electricity; walked backwards Electricity meets Freeze first
        let weapon = rifle();
        let mut acc = EffectAccumulator::new(&weapon);
        acc.add_source(&[
            StatEffect::new(UpgradeEffect::elemental(DamageType::Fire, Operation::Add), dec!(1)),
            StatEffect::new(UpgradeEffect::elemental(DamageType::Freeze, Operation::Add), dec!(1)),
            StatEffect::new(UpgradeEffect::elemental(DamageType::Electricity, Operation::Add), dec!(1)),
        ])
        .unwrap();
        let block = acc.finish();
        assert_eq!(block.damage().get(DamageType::Magnetic), Some(dec!(2)));
        assert_eq!(block.damage().get(DamageType::Fire), Some(dec!(1)));
    }

    #[test]
    fn test_physical_multiplier_uses_weapon_base() {
        let weapon = rifle();
        let mut acc = EffectAccumulator::new(&weapon);
        acc.add_source(&[StatEffect::new(
            UpgradeEffect::elemental(DamageType::Impact, Operation::MulAdd),
            dec!(1.2),
        )])
        .unwrap();
        let block = acc.finish();
        assert_eq!(block.damage().get(DamageType::Impact), Some(dec!(1.1)));
    }

    #[test]
    fn test_policy_violations_are_errors() {
        let weapon = rifle();
        let mut acc = EffectAccumulator::new(&weapon);
        let bad = StatEffect::new(UpgradeEffect::elemental(DamageType::Fire, Operation::Set), dec!(1));
        assert!(matches!(
            acc.add_source(&[bad]),
            Err(CalcError::CombinationPolicy { .. })
        ));

        let bad_faction = StatEffect::new(
            UpgradeEffect::new(EffectKind::FactionDamage, Operation::Add).with_argument("Grineer"),
            dec!(0.3),
        );
        assert!(acc.add_source(&[bad_faction]).is_err());
    }

    #[test]
    fn test_faction_and_placeholder() {
        let weapon = rifle();
        let mut acc = EffectAccumulator::new(&weapon);
        acc.add_source(&[
            StatEffect::new(UpgradeEffect::faction(Faction::Grineer), dec!(0.3)),
            StatEffect::new(UpgradeEffect::faction(Faction::Grineer), dec!(0.25)),
            effect(EffectKind::Placeholder("xx_noop".into()), Operation::Set, dec!(9)),
        ])
        .unwrap();
        let block = acc.finish();
        assert_eq!(block.faction_modifier(Faction::Grineer), Some(dec!(0.55)));
        assert_eq!(block.faction_modifier(Faction::Corpus), None);
    }
}
