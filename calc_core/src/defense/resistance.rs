//! Resistance - Health class modifiers and the full mitigation pass
//!
//! Each health class lists a modifier per damage type; the damage multiplier
//! is `1 − modifier`, so negative modifiers are weaknesses.
//!
//! Formula per damage type:
//! - `a = amount × (1 − health[type])`
//! - with armor: `a × armor_damage_factor(armor, armorClass[type])`
//! - summed, then scaled by `1 + factionBonus`

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::armour::armor_damage_factor;
use crate::config::GameConstants;
use crate::enemy::Enemy;
use crate::types::{DamageType, Faction, HealthType};

use DamageType::*;

// Modifiers in hundredths
const FERRITE: &[(DamageType, i64)] = &[(Corrosive, -75), (Explosion, 25), (Puncture, -50), (Slash, 15)];
const CLONED_FLESH: &[(DamageType, i64)] =
    &[(Fire, -25), (Gas, 50), (Impact, 25), (Slash, -25), (Viral, -75)];
const FLESH: &[(DamageType, i64)] =
    &[(Gas, 25), (Impact, 25), (Poison, -50), (Slash, -25), (Viral, -50)];
const FOSSILIZED: &[(DamageType, i64)] = &[
    (Corrosive, -75),
    (Explosion, -50),
    (Freeze, 25),
    (Poison, 50),
    (Radiation, 75),
    (Slash, -15),
];
const PROTO_SHIELD: &[(DamageType, i64)] = &[
    (Corrosive, 50),
    (Fire, 50),
    (Impact, -15),
    (Magnetic, -75),
    (Poison, -25),
    (Puncture, 50),
];
const ALLOY: &[(DamageType, i64)] = &[
    (Electricity, 50),
    (Freeze, -25),
    (Magnetic, 50),
    (Puncture, -15),
    (Radiation, -75),
    (Slash, 50),
];
const INFESTED: &[(DamageType, i64)] =
    &[(Fire, -25), (Gas, -75), (Radiation, 50), (Slash, -25), (Viral, 50)];
const SINEW: &[(DamageType, i64)] = &[(Explosion, 50), (Freeze, -25), (Puncture, -25), (Radiation, -50)];
const INFESTED_FLESH: &[(DamageType, i64)] = &[(Fire, -50), (Freeze, 50), (Gas, -50), (Slash, -50)];
const MACHINERY: &[(DamageType, i64)] =
    &[(Electricity, -50), (Explosion, -75), (Impact, -25), (Poison, 25), (Viral, 25)];
const ROBOTIC: &[(DamageType, i64)] =
    &[(Electricity, -50), (Poison, 25), (Puncture, -25), (Radiation, -25), (Slash, 25)];
const SHIELD: &[(DamageType, i64)] =
    &[(Freeze, -50), (Impact, -50), (Magnetic, -75), (Puncture, 20), (Radiation, 25)];
const TENNO_SHIELD: &[(DamageType, i64)] = &[
    (Corrosive, 25),
    (Electricity, 25),
    (Explosion, 25),
    (Fire, 25),
    (Freeze, 25),
    (Gas, 25),
    (Impact, 25),
    (Magnetic, 25),
    (Poison, 25),
    (Puncture, 25),
    (Radiant, 25),
    (Radiation, 25),
    (Sentient, 25),
    (Slash, 25),
    (Viral, 25),
];
const NONE: &[(DamageType, i64)] = &[];

fn table(health: HealthType) -> &'static [(DamageType, i64)] {
    match health {
        HealthType::None | HealthType::TennoArmor | HealthType::TennoFlesh => NONE,
        HealthType::Armor => FERRITE,
        HealthType::ClonedFlesh => CLONED_FLESH,
        HealthType::Flesh => FLESH,
        HealthType::Fossilized => FOSSILIZED,
        HealthType::HeavyShield => PROTO_SHIELD,
        HealthType::HulkingArmor => ALLOY,
        HealthType::Infested => INFESTED,
        HealthType::InfestedArmour => SINEW,
        HealthType::InfestedFlesh => INFESTED_FLESH,
        HealthType::Machinery => MACHINERY,
        HealthType::Robotic => ROBOTIC,
        HealthType::Shield => SHIELD,
        HealthType::TennoShield => TENNO_SHIELD,
    }
}

/// Modifier of `health` against `damage`, zero when unlisted
pub fn resistance(health: HealthType, damage: DamageType) -> Decimal {
    table(health)
        .iter()
        .find(|(dt, _)| *dt == damage)
        .map(|(_, v)| Decimal::new(*v, 2))
        .unwrap_or(Decimal::ZERO)
}

/// Every listed modifier of a health class
pub fn resistance_entries(health: HealthType) -> Vec<(DamageType, Decimal)> {
    table(health).iter().map(|(dt, v)| (*dt, Decimal::new(*v, 2))).collect()
}

/// Display name with its weaknesses and resistances, e.g. `Ferrite Armor (Corrosive: +75%, ...)`
pub fn describe_health_type(health: HealthType) -> String {
    let parts: Vec<String> = resistance_entries(health)
        .into_iter()
        .map(|(dt, modifier)| {
            let percent = (-modifier * Decimal::ONE_HUNDRED).normalize();
            let sign = if percent > Decimal::ZERO { "+" } else { "" };
            format!("{}: {}{}%", dt.display_name(), sign, percent)
        })
        .collect();
    if parts.is_empty() {
        health.display_name().to_string()
    } else {
        format!("{} ({})", health.display_name(), parts.join(", "))
    }
}

/// Calculate total damage after health, armor and faction modifiers
///
/// # Arguments
/// * `damage` - Un-normalized damage map of the shot
/// * `enemy` - The target
/// * `faction_bonus` - Accumulated faction damage bonuses
///
/// # Returns
/// The summed damage; a faction bonus of -1 or less leaves the sum unchanged
pub fn apply_enemy_resistance(
    damage: &BTreeMap<DamageType, Decimal>,
    enemy: &Enemy,
    faction_bonus: &BTreeMap<Faction, Decimal>,
    constants: &GameConstants,
) -> Decimal {
    let armor = enemy.level_scaling(&constants.scaling).armor;
    let preset = enemy.preset();

    let sum: Decimal = damage
        .iter()
        .map(|(dt, amount)| {
            let after_health = *amount * (Decimal::ONE - resistance(preset.health_type, *dt));
            if armor > Decimal::ZERO {
                let armor_resist = resistance(preset.armor_type, *dt);
                after_health * armor_damage_factor(armor, armor_resist, constants.armor.divisor)
            } else {
                after_health
            }
        })
        .sum();

    match faction_bonus.get(&preset.faction) {
        Some(bonus) => {
            let bonus = if *bonus <= -Decimal::ONE { Decimal::ZERO } else { *bonus };
            sum * (Decimal::ONE + bonus)
        }
        None => sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::{CustomEnemyPreset, EnemyStats};
    use rust_decimal_macros::dec;

    fn enemy(health: HealthType, armor_base: Decimal, faction: Faction) -> Enemy {
        Enemy::new(EnemyStats::Custom(CustomEnemyPreset {
            armor_type: HealthType::Armor,
            armor_base,
            health_type: health,
            health_base: dec!(100),
            shield_type: HealthType::Shield,
            shield_base: Decimal::ZERO,
            faction,
            base_level: 1,
            default_level: 1,
            damage_mitigation: None,
            headshot_multiplier: Decimal::TWO,
        }))
    }

    #[test]
    fn test_table_lookup() {
        assert_eq!(resistance(HealthType::Armor, DamageType::Corrosive), dec!(-0.75));
        assert_eq!(resistance(HealthType::Shield, DamageType::Puncture), dec!(0.2));
        assert_eq!(resistance(HealthType::Armor, DamageType::Viral), Decimal::ZERO);
        assert_eq!(resistance(HealthType::TennoShield, DamageType::Radiant), dec!(0.25));
    }

    #[test]
    fn test_describe_health_type() {
        assert_eq!(
            describe_health_type(HealthType::Armor),
            "Ferrite Armor (Corrosive: +75%, Blast: -25%, Puncture: +50%, Slash: -15%)"
        );
        assert_eq!(describe_health_type(HealthType::None), "Untyped");
    }

    #[test]
    fn test_untyped_no_armor_is_identity() {
        let target = enemy(HealthType::None, Decimal::ZERO, Faction::Neutral);
        let damage: BTreeMap<_, _> = [(DamageType::Impact, dec!(10))].into_iter().collect();
        let out = apply_enemy_resistance(&damage, &target, &BTreeMap::new(), &GameConstants::default());
        assert_eq!(out, dec!(10));
    }

    #[test]
    fn test_health_modifier() {
        let target = enemy(HealthType::ClonedFlesh, Decimal::ZERO, Faction::Grineer);
        let damage: BTreeMap<_, _> = [(DamageType::Viral, dec!(10))].into_iter().collect();
        let out = apply_enemy_resistance(&damage, &target, &BTreeMap::new(), &GameConstants::default());
        assert_eq!(out, dec!(17.5));
    }

    #[test]
    fn test_faction_bonus() {
        let target = enemy(HealthType::None, Decimal::ZERO, Faction::Grineer);
        let damage: BTreeMap<_, _> = [(DamageType::Impact, dec!(10))].into_iter().collect();
        let mut bonus = BTreeMap::new();
        bonus.insert(Faction::Grineer, dec!(0.3));
        let constants = GameConstants::default();
        assert_eq!(apply_enemy_resistance(&damage, &target, &bonus, &constants), dec!(13));

        bonus.insert(Faction::Grineer, dec!(-1.5));
        assert_eq!(apply_enemy_resistance(&damage, &target, &bonus, &constants), dec!(10));
    }

    #[test]
    fn test_armor_applies() {
        // Level diff 0: armor equals base
        let target = enemy(HealthType::None, dec!(300), Faction::Neutral);
        let damage: BTreeMap<_, _> = [(DamageType::Impact, dec!(10))].into_iter().collect();
        let out = apply_enemy_resistance(&damage, &target, &BTreeMap::new(), &GameConstants::default());
        assert_eq!(out, dec!(5));
    }
}
