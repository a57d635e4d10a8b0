//! Riven - Randomized affix mods and their expected roll values
//!
//! Expected magnitude per slot:
//! `value × roll_scale × rank_factor × fit_attenuation × disposition × slot_factor`
//!
//! | filled      | buff factor   | curse factor |
//! |-------------|---------------|--------------|
//! | 2 buffs     | 0.66          | -            |
//! | 2 + curse   | 0.66 × 1.25   | -0.33        |
//! | 3 buffs     | 0.5           | -            |
//! | 3 + curse   | 0.5 × 1.25    | -0.5         |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::RivenConstants;
use crate::decimal::{round_half_up, safe_div, to_fixed, truncate};
use crate::source::EffectSource;
use crate::types::RivenCategory;
use crate::upgrade::{EffectFamily, EffectKind, StatEffect, UpgradeEffect};
use crate::weapon::Weapon;

/// Slots of a riven: three buffs then the curse
pub const RIVEN_SLOTS: usize = 4;

/// Catalog affix: one effect, or two correlated effects of the same kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivenUpgrade {
    pub effects: Vec<UpgradeEffect>,
    /// Per-category base roll value
    #[serde(default)]
    pub values: BTreeMap<RivenCategory, Decimal>,
    /// Per-category catalog tags
    #[serde(default)]
    pub xtags: Vec<String>,
}

impl RivenUpgrade {
    /// Stable identifier: the argument of elemental and faction affixes, the kind otherwise
    pub fn tag(&self) -> String {
        match self.effects.first() {
            Some(first) => match first.family() {
                EffectFamily::Elemental | EffectFamily::Faction => {
                    first.argument.clone().unwrap_or_else(|| first.kind.name().to_string())
                }
                _ => first.kind.name().to_string(),
            },
            None => String::new(),
        }
    }

    pub fn value_for(&self, category: RivenCategory) -> Decimal {
        self.values.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    /// Check the effect group shape; only fire rate and crit chance come in pairs
    pub fn validate(&self) -> Result<(), String> {
        match self.effects.as_slice() {
            [] => Err("riven upgrade without effects".to_string()),
            [single] => single.validate(),
            [a, b] => {
                let paired = a.kind == b.kind
                    && matches!(a.kind, EffectKind::FireRate | EffectKind::CritChance);
                if !paired {
                    return Err(format!("unexpected riven upgrade group: {}, {}", a.tag(), b.tag()));
                }
                a.validate()?;
                b.validate()
            }
            _ => Err(format!("riven upgrade has {} effects", self.effects.len())),
        }
    }
}

/// One rolled slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RivenStat {
    pub upgrade: RivenUpgrade,
    pub value: Decimal,
}

impl RivenStat {
    pub fn new(upgrade: RivenUpgrade, value: Decimal) -> Self {
        RivenStat { upgrade, value }
    }
}

impl fmt::Display for RivenStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value > Decimal::ZERO { " +" } else { " " };
        match self.upgrade.effects.first() {
            Some(effect) => write!(f, "{}{}{}", effect, sign, to_fixed(self.value, 3)),
            None => f.write_str(&to_fixed(self.value, 3)),
        }
    }
}

/// A riven roll: slots 0-2 are buffs, slot 3 is the curse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RivenMod {
    pub slots: [Option<RivenStat>; RIVEN_SLOTS],
}

impl RivenMod {
    pub fn new(slots: [Option<RivenStat>; RIVEN_SLOTS]) -> Self {
        RivenMod { slots }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Every effect of every filled slot, carrying the slot's value
    pub fn stats(&self) -> Vec<StatEffect> {
        self.slots
            .iter()
            .flatten()
            .flat_map(|slot| {
                slot.upgrade
                    .effects
                    .iter()
                    .map(move |effect| StatEffect::new(effect.clone(), slot.value))
            })
            .collect()
    }
}

impl EffectSource for RivenMod {
    fn id(&self) -> &str {
        "riven"
    }

    fn effects(&self, _weapon: &Weapon) -> Vec<StatEffect> {
        self.stats()
    }
}

/// Expected roll value of each slot for `weapon`
///
/// # Arguments
/// * `weapon` - Supplies disposition and riven category
/// * `slots` - The affix chosen per slot, `None` when unused
///
/// # Returns
/// Zero for every slot unless the first two buff slots are filled
pub fn average_riven_stats(
    weapon: &Weapon,
    slots: [Option<&RivenUpgrade>; RIVEN_SLOTS],
    constants: &RivenConstants,
) -> [Decimal; RIVEN_SLOTS] {
    let mut out = [Decimal::ZERO; RIVEN_SLOTS];
    if slots[0].is_none() || slots[1].is_none() {
        return out;
    }

    let expected = |upgrade: &RivenUpgrade, factor: Decimal| {
        upgrade.value_for(weapon.riven_category)
            * constants.roll_scale
            * constants.rank_factor
            * constants.fit_attenuation
            * weapon.riven_disposition
            * factor
    };

    let three_buffs = slots[2].is_some();
    let cursed = slots[3].is_some();
    let (buff, curse) = match (three_buffs, cursed) {
        (false, false) => (constants.two_buff, Decimal::ZERO),
        (false, true) => (constants.curse_premium * constants.two_buff, constants.two_buff_curse),
        (true, false) => (constants.three_buff, Decimal::ZERO),
        (true, true) => (constants.curse_premium * constants.three_buff, constants.three_buff_curse),
    };

    for (i, slot) in slots.iter().enumerate().take(3) {
        if let Some(upgrade) = slot {
            out[i] = expected(upgrade, buff);
        }
    }
    if let Some(upgrade) = slots[3] {
        out[3] = expected(upgrade, curse);
    }
    out
}

/// Autofill with the expected value, half-up at 4 decimal places
pub fn autofill_average(expected: Decimal) -> Decimal {
    round_half_up(expected, 4)
}

/// Autofill with the top of the band, truncated at 4 decimal places
pub fn autofill_max(expected: Decimal, band: Decimal) -> Decimal {
    truncate(expected * (Decimal::ONE + band), 4)
}

/// Whether `|value|` lies within `band` of `|expected|`
pub fn is_plausible(value: Decimal, expected: Decimal, band: Decimal) -> bool {
    let v = value.abs();
    let e = expected.abs();
    (Decimal::ONE - band) * e <= v && v <= (Decimal::ONE + band) * e
}

/// Percent deviation of `|value|` from `|expected|`
pub fn deviation_percent(value: Decimal, expected: Decimal) -> Decimal {
    (safe_div(value.abs(), expected.abs()) - Decimal::ONE) * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DamageType, Faction};
    use crate::upgrade::Operation;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn upgrade(effect: UpgradeEffect, rifle: Decimal) -> RivenUpgrade {
        RivenUpgrade {
            effects: vec![effect],
            values: [(RivenCategory::Rifle, rifle)].into_iter().collect(),
            xtags: Vec::new(),
        }
    }

    fn damage() -> RivenUpgrade {
        upgrade(UpgradeEffect::new(EffectKind::Damage, Operation::MulAdd), dec!(0.0183))
    }

    fn multishot() -> RivenUpgrade {
        upgrade(UpgradeEffect::new(EffectKind::Multishot, Operation::MulAdd), dec!(0.0133))
    }

    fn zoom() -> RivenUpgrade {
        upgrade(UpgradeEffect::new(EffectKind::Zoom, Operation::MulAdd), dec!(0.0066))
    }

    #[test]
    fn test_tags() {
        assert_eq!(damage().tag(), "damage");
        let heat = upgrade(UpgradeEffect::elemental(DamageType::Fire, Operation::Add), dec!(0.01));
        assert_eq!(heat.tag(), "DT_FIRE");
        let grineer = upgrade(UpgradeEffect::faction(Faction::Grineer), dec!(0.005));
        assert_eq!(grineer.tag(), "Grineer");
    }

    #[test]
    fn test_validate_pairs() {
        let pair = RivenUpgrade {
            effects: vec![
                UpgradeEffect::new(EffectKind::FireRate, Operation::MulAdd),
                UpgradeEffect::new(EffectKind::FireRate, Operation::MulAdd).with_compatibility("BOW"),
            ],
            values: BTreeMap::new(),
            xtags: Vec::new(),
        };
        assert!(pair.validate().is_ok());

        let bad = RivenUpgrade {
            effects: vec![
                UpgradeEffect::new(EffectKind::Damage, Operation::MulAdd),
                UpgradeEffect::new(EffectKind::Damage, Operation::MulAdd),
            ],
            values: BTreeMap::new(),
            xtags: Vec::new(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_stats_expand_pairs() {
        let riven = RivenMod::new([Some(RivenStat::new(damage(), dec!(1.2))), None, None, None]);
        let stats = riven.stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].value, dec!(1.2));
        assert!(!riven.is_empty());
        assert!(RivenMod::default().is_empty());
    }

    #[test]
    fn test_average_requires_two_buffs() {
        let weapon = Weapon::test_weapon("Braton");
        let d = damage();
        let out = average_riven_stats(&weapon, [Some(&d), None, None, None], &RivenConstants::default());
        assert_eq!(out, [Decimal::ZERO; 4]);
    }

    #[test]
    fn test_average_two_buffs() {
        let weapon = Weapon::test_weapon("Braton");
        let (d, m) = (damage(), multishot());
        let out = average_riven_stats(&weapon, [Some(&d), Some(&m), None, None], &RivenConstants::default());
        // 0.0183 × 135 × 0.66
        assert_eq!(out[0], dec!(1.630530));
        assert_eq!(out[2], Decimal::ZERO);
        assert_eq!(out[3], Decimal::ZERO);
    }

    #[test]
    fn test_average_three_buffs_and_curse() {
        let weapon = Weapon::test_weapon("Braton");
        let (d, m, z) = (damage(), multishot(), zoom());
        let out = average_riven_stats(&weapon, [Some(&d), Some(&m), None, Some(&z)], &RivenConstants::default());
        // 0.0183 × 135 × 0.66 × 1.25, curse 0.0066 × 135 × -0.33
        assert_eq!(out[0], dec!(2.0381625));
        assert_eq!(out[3], dec!(-0.294030));

        let out = average_riven_stats(&weapon, [Some(&d), Some(&m), Some(&z), Some(&z)], &RivenConstants::default());
        assert_eq!(out[2], dec!(0.556875));
        assert_eq!(out[3], dec!(-0.4455));
    }

    #[test]
    fn test_autofill_and_band() {
        assert_eq!(autofill_average(dec!(1.630530)), dec!(1.6305));
        assert_eq!(autofill_average(dec!(0.12345)), dec!(0.1235));
        assert_eq!(autofill_max(dec!(1.630530), dec!(0.1)), dec!(1.7935));
        assert!(is_plausible(dec!(-0.3), dec!(-0.29403), dec!(0.1)));
        assert!(!is_plausible(dec!(2), dec!(1.6), dec!(0.1)));
        assert_eq!(deviation_percent(dec!(1.1), dec!(1)), dec!(10));
    }

    proptest! {
        #[test]
        fn autofilled_values_are_plausible(
            disposition in 50u32..=155,
            value in 1i64..500,
            third in any::<bool>(),
            curse in any::<bool>(),
        ) {
            let mut weapon = Weapon::test_weapon("Braton");
            weapon.riven_disposition = Decimal::new(disposition as i64, 2);
            let u = upgrade(UpgradeEffect::new(EffectKind::Damage, Operation::MulAdd), Decimal::new(value, 4));
            let slots = [Some(&u), Some(&u), if third { Some(&u) } else { None }, if curse { Some(&u) } else { None }];
            let constants = RivenConstants::default();
            let expected = average_riven_stats(&weapon, slots, &constants);
            for (slot, e) in slots.iter().zip(expected.iter()) {
                if slot.is_some() {
                    prop_assert!(is_plausible(autofill_average(*e), *e, constants.band));
                    prop_assert!(is_plausible(autofill_max(*e, constants.band), *e, constants.band));
                }
            }
        }
    }
}
