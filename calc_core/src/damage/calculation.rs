//! Damage calculation - turning a build and an environment into a CalcResult
//!
//! Order of the damage pipeline:
//! 1. Enemy resistance, armor and faction bonus on the merged damage map
//! 2. Headshot body-part multiplier
//! 3. Sniper combo, Roar, Eclipse, Void Strike
//! 4. Weapon damage amount, `damage`, then `damage_aimed`
//! 5. Flat boss multiplier

use rust_decimal::Decimal;
use tracing::debug;

use crate::build::{Build, Environment};
use crate::combat::{enumerate_steps, finalize_steps, split_charged_chamber, CalcResult, CritOutcomes};
use crate::config::GameConstants;
use crate::decimal::{round_half_up, safe_div};
use crate::defense::apply_enemy_resistance;
use crate::source::{EffectGroup, EffectSource};
use crate::stat_block::{CalcError, EffectAccumulator, StatBlock};
use crate::upgrade::EffectKind;

/// Fold every effect source of a build into a StatBlock
///
/// Sources, in order: loadout slots (the riven placeholder replaced by the
/// riven roll), local modifiers, global modifiers, innate weapon effects
/// when enabled, ability-strength effects.
pub fn aggregate(build: &Build, env: &Environment) -> Result<StatBlock, CalcError> {
    let weapon = &build.weapon;
    let mut acc = EffectAccumulator::new(weapon);

    for slot in build.loadout.iter() {
        if slot.is_riven() {
            build.riven.apply(&mut acc)?;
        } else {
            slot.apply(&mut acc)?;
        }
    }
    for modifier in &build.local_modifiers {
        modifier.apply(&mut acc)?;
    }
    for modifier in &env.global_modifiers {
        modifier.apply(&mut acc)?;
    }
    if env.switches.enable_innate_buffs {
        for effects in &weapon.innate_effects {
            EffectGroup { id: "innate", effects }.apply(&mut acc)?;
        }
    }
    if !weapon.ability_strength.is_empty() {
        let effects = weapon.ability_strength_effects(env.ability_strength);
        EffectGroup {
            id: "ability_strength",
            effects: &effects,
        }
        .apply(&mut acc)?;
    }

    Ok(acc.finish())
}

/// Resolve a build against an environment with the default constants
pub fn resolve(build: &Build, env: &Environment) -> Result<CalcResult, CalcError> {
    resolve_with_constants(build, env, &GameConstants::default())
}

/// Resolve a build against an environment
///
/// # Returns
/// The full result, or the first combination-policy violation found while
/// aggregating effects
pub fn resolve_with_constants(
    build: &Build,
    env: &Environment,
    constants: &GameConstants,
) -> Result<CalcResult, CalcError> {
    let weapon = &build.weapon;
    let enemy = &env.enemy;
    let block = aggregate(build, env)?;
    let headshot = block.is_headshot();
    let mitigation = enemy.preset().damage_mitigation.as_ref();

    // Step 1: Per-pellet base damage
    let mut scaled = apply_enemy_resistance(block.damage().as_map(), enemy, block.faction_modifiers(), constants);
    if headshot {
        scaled *= block.apply(&EffectKind::HeadshotBonus, enemy.preset().headshot_multiplier, Decimal::ZERO);
    }
    scaled *= block.apply(&EffectKind::SniperCombo, Decimal::ONE, Decimal::ONE);
    scaled *= block.additive_multiplier(&EffectKind::DamageMultiplyRoar);
    scaled *= block.additive_multiplier(&EffectKind::DamageMultiplyEclipse);
    scaled *= block.apply(&EffectKind::DamageMultiplyVoidStrike, Decimal::ONE, Decimal::ONE);

    let expected_base_damage = block.apply(
        &EffectKind::DamageAimed,
        block.apply(&EffectKind::Damage, scaled * weapon.damage_amount, Decimal::ZERO),
        Decimal::ZERO,
    );
    let mitigated_base_damage = match mitigation {
        Some(dm) => expected_base_damage * dm.multiplier,
        None => expected_base_damage,
    };

    // Step 2: Critical chance and multiplier
    let mut crit_chance = block.apply(&EffectKind::CritChance, weapon.crit_chance, Decimal::ZERO);
    if let Some(bonus) = block.harrow_bonus(headshot, constants.crit.harrow_headshot_factor) {
        crit_chance += bonus;
    }
    let mut crit_damage = block.apply(&EffectKind::CritDamage, weapon.crit_damage, Decimal::ZERO);
    if block.has(&EffectKind::CritDamageBuffVoltOdonata) {
        crit_damage *= constants.crit.shield_buff_factor;
    }
    if headshot && mitigation.map_or(true, |dm| dm.use_critical_headshot) {
        crit_damage *= constants.crit.headshot_factor;
    }

    // Step 3: Throughput stats
    let pellets = block.apply(&EffectKind::Multishot, weapon.pellets, Decimal::ZERO);
    let magazine_size = round_half_up(
        block.apply(&EffectKind::MagazineSize, weapon.magazine_size, Decimal::ONE),
        0,
    );
    let raw_fire_rate = block.apply(&EffectKind::FireRate, weapon.fire_rate, Decimal::ZERO);

    // Step 4: Shot distribution
    let vigilante = block.vigilante_chance(env.switches.enable_vigilante_buffs, constants.crit.vigilante_cap);
    let mut outcomes = CritOutcomes::new(crit_chance, crit_damage, vigilante);
    if let Some(dm) = mitigation {
        outcomes.apply_boss_mitigation(
            expected_base_damage,
            dm.threshold,
            raw_fire_rate,
            pellets,
            constants.mitigation.crit_factor,
            constants.mitigation.excess_factor,
        );
    }
    let mut steps = enumerate_steps(&outcomes, pellets, mitigated_base_damage);
    if block.has(&EffectKind::ChargedChamber) {
        let chamber = block.apply(&EffectKind::ChargedChamber, Decimal::ONE, Decimal::ZERO);
        steps = split_charged_chamber(steps, magazine_size, chamber);
    }
    let steps = finalize_steps(steps);

    // Step 5: DPS
    let reload_time = safe_div(
        weapon.reload_time,
        block.apply(&EffectKind::ReloadSpeed, Decimal::ONE, Decimal::ZERO),
    );
    let mut fire_rate = raw_fire_rate;
    if let Some(charge_time) = weapon.charge_time {
        let charge_rate = block.apply(&EffectKind::FireRate, safe_div(Decimal::ONE, charge_time), Decimal::ZERO);
        fire_rate = fire_rate.min(charge_rate);
    }
    let expected_multiplier: Decimal = steps.iter().map(|s| s.probability * s.multiplier).sum();
    let damage_per_shot = mitigated_base_damage * expected_multiplier;
    let cycle_time = safe_div(magazine_size - Decimal::ONE, fire_rate) + reload_time;
    let sustained_dps = safe_div(damage_per_shot * magazine_size, cycle_time);
    let burst_dps = if magazine_size > Decimal::ONE {
        damage_per_shot * fire_rate
    } else {
        sustained_dps
    };

    // Step 6: Status chance
    let proc_chance = block.apply(&EffectKind::StatusChance, weapon.proc_chance, Decimal::ZERO);

    debug!(
        weapon = %weapon.name,
        enemy = %enemy,
        steps = steps.len(),
        damage_per_shot = %damage_per_shot,
        burst_dps = %burst_dps,
        sustained_dps = %sustained_dps,
        "resolved build"
    );

    Ok(CalcResult {
        magazine_size,
        fire_rate,
        reload_time,
        crit_chance,
        crit_damage,
        damage_dist: block.damage().normalized(),
        damage_amount: mitigated_base_damage,
        pellets,
        proc_chance: proc_chance * block.multishot_multiplier(),
        proc_chance_per_pellet: safe_div(proc_chance, weapon.pellets),
        steps,
        damage_per_shot,
        burst_dps,
        sustained_dps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::{BossDamageMitigation, CustomEnemyPreset, Enemy, EnemyStats};
    use crate::source::{Loadout, Mod, Modifier, ModifierDefinition, ModifierEffect, RivenMod, RivenStat, RivenUpgrade, ScaledMod, Scaling};
    use crate::types::{DamageType, Faction, HealthType};
    use crate::upgrade::{Operation, StatEffect, UpgradeEffect};
    use crate::weapon::Weapon;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn item(name: &str, effects: Vec<StatEffect>) -> ScaledMod {
        ScaledMod::new(
            Mod {
                name: name.into(),
                compatibility: "RIFLE".into(),
                effects,
                is_utility: false,
                max_rank: 0,
            },
            0,
        )
    }

    fn effect(kind: EffectKind, op: Operation, value: Decimal) -> StatEffect {
        StatEffect::new(UpgradeEffect::new(kind, op), value)
    }

    fn build_with(mods: Vec<ScaledMod>) -> Build {
        let mut loadout = Loadout::empty();
        for (i, m) in mods.into_iter().enumerate() {
            loadout.ordinal[i] = m;
        }
        Build::new(Weapon::test_weapon("Braton")).with_loadout(loadout)
    }

    fn boss(threshold: Decimal, multiplier: Decimal) -> Enemy {
        Enemy::new(EnemyStats::Custom(CustomEnemyPreset {
            armor_type: HealthType::Armor,
            armor_base: Decimal::ZERO,
            health_type: HealthType::None,
            health_base: dec!(1000),
            shield_type: HealthType::Shield,
            shield_base: Decimal::ZERO,
            faction: Faction::Sentient,
            base_level: 1,
            default_level: 1,
            damage_mitigation: Some(BossDamageMitigation {
                threshold,
                multiplier,
                use_critical_headshot: false,
            }),
            headshot_multiplier: Decimal::ONE,
        }))
    }

    #[test]
    fn test_unmodded_weapon() {
        let result = resolve(&build_with(Vec::new()), &Environment::default()).unwrap();
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].probability, Decimal::ONE);
        assert_eq!(result.steps[0].multiplier, Decimal::ONE);
        assert_eq!(result.damage_amount, dec!(10));
        assert_eq!(result.damage_per_shot, dec!(10));
        // 10 × 10 / (9 / 1 + 2)
        assert_eq!(result.sustained_dps.round_dp(6), dec!(9.090909));
        assert_eq!(result.burst_dps, dec!(10));
        assert_eq!(result.damage_dist.get(&DamageType::Impact), Some(&Decimal::ONE));
    }

    #[test]
    fn test_guaranteed_crit() {
        let mut build = build_with(Vec::new());
        build.weapon.crit_chance = Decimal::ONE;
        let result = resolve(&build, &Environment::default()).unwrap();
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].probability, Decimal::ONE);
        assert_eq!(result.steps[0].multiplier, dec!(2));
        assert_eq!(result.damage_per_shot, dec!(20));
    }

    #[test]
    fn test_damage_and_multishot_mods() {
        let build = build_with(vec![
            item("Serration", vec![effect(EffectKind::Damage, Operation::MulAdd, dec!(1.65))]),
            item("Split Chamber", vec![effect(EffectKind::Multishot, Operation::MulAdd, dec!(0.9))]),
        ]);
        let result = resolve(&build, &Environment::default()).unwrap();
        assert_eq!(result.damage_amount, dec!(26.5));
        assert_eq!(result.pellets, dec!(1.9));
        // 0.1 × 1 + 0.9 × 2 = 1.9 pellets on average
        assert_eq!(result.damage_per_shot, dec!(50.35));
    }

    #[test]
    fn test_elemental_combination_order() {
        let heat = StatEffect::new(UpgradeEffect::elemental(DamageType::Fire, Operation::Add), dec!(0.9));
        let cold = StatEffect::new(UpgradeEffect::elemental(DamageType::Freeze, Operation::Add), dec!(0.9));
        let a = resolve(&build_with(vec![item("Hellfire", vec![heat.clone()]), item("Cryo Rounds", vec![cold.clone()])]), &Environment::default()).unwrap();
        let b = resolve(&build_with(vec![item("Cryo Rounds", vec![cold]), item("Hellfire", vec![heat])]), &Environment::default()).unwrap();
        assert_eq!(a.damage_dist, b.damage_dist);
        assert!(a.damage_dist.contains_key(&DamageType::Explosion));
        assert!(!a.damage_dist.contains_key(&DamageType::Fire));
    }

    #[test]
    fn test_riven_placeholder_substitution() {
        let upgrade = RivenUpgrade {
            effects: vec![UpgradeEffect::new(EffectKind::Damage, Operation::MulAdd)],
            values: Default::default(),
            xtags: Vec::new(),
        };
        let mut build = build_with(vec![ScaledMod::new(Mod::riven(), 0)]);
        build.riven = RivenMod::new([Some(RivenStat::new(upgrade, dec!(1))), None, None, None]);
        let result = resolve(&build, &Environment::default()).unwrap();
        assert_eq!(result.damage_amount, dec!(20));
    }

    #[test]
    fn test_headshot_and_sniper_combo() {
        let headshot = ModifierDefinition {
            id: "headshot".into(),
            name: "Headshot".into(),
            category: "Uncategorized".into(),
            value_description: None,
            default: None,
            gate: Default::default(),
            behavior: Default::default(),
            effects: vec![ModifierEffect {
                upgrade: UpgradeEffect::new(EffectKind::SwitchHeadshot, Operation::Set),
                value: Decimal::ONE,
                scaling: Scaling::Constant,
            }],
        };
        let mut build = build_with(Vec::new());
        build.weapon.crit_chance = Decimal::ONE;
        let env = Environment::default().with_modifier(Modifier::with_default(headshot));
        let result = resolve(&build, &env).unwrap();
        // body part ×2, crit multiplier doubled to 4
        assert_eq!(result.damage_amount, dec!(20));
        assert_eq!(result.crit_damage, dec!(4));
        assert_eq!(result.damage_per_shot, dec!(80));
    }

    #[test]
    fn test_vigilante_switch() {
        let build = {
            let mut b = build_with(vec![item(
                "Vigilante Armaments",
                vec![effect(EffectKind::Vigilante, Operation::Add, dec!(0.05))],
            )]);
            b.weapon.crit_chance = dec!(0.5);
            b
        };
        let on = resolve(&build, &Environment::default()).unwrap();
        let mut env = Environment::default();
        env.switches.enable_vigilante_buffs = false;
        let off = resolve(&build, &env).unwrap();
        assert_eq!(on.steps.len(), 3);
        assert_eq!(off.steps.len(), 2);
        assert!(on.damage_per_shot > off.damage_per_shot);
    }

    #[test]
    fn test_innate_buff_switch() {
        let mut build = build_with(Vec::new());
        build.weapon.innate_effects = vec![vec![effect(EffectKind::Damage, Operation::MulAdd, dec!(1))]];
        assert_eq!(resolve(&build, &Environment::default()).unwrap().damage_amount, dec!(20));
        let mut env = Environment::default();
        env.switches.enable_innate_buffs = false;
        assert_eq!(resolve(&build, &env).unwrap().damage_amount, dec!(10));
    }

    #[test]
    fn test_boss_threshold_closed_form() {
        let mut build = build_with(Vec::new());
        build.weapon.damage_amount = dec!(1000);
        let env = Environment::default().with_enemy(boss(dec!(300), dec!(0.4)));
        let result = resolve(&build, &env).unwrap();
        // (300 + 700 × 0.1) × 0.4
        assert_eq!(result.damage_amount, dec!(400));
        assert_eq!(result.damage_per_shot, dec!(148));
    }

    #[test]
    fn test_charged_chamber_and_magazine() {
        let build = build_with(vec![item(
            "Primed Chamber",
            vec![effect(EffectKind::ChargedChamber, Operation::MulAdd, dec!(1))],
        )]);
        let result = resolve(&build, &Environment::default()).unwrap();
        assert_eq!(result.steps.len(), 2);
        assert_eq!(result.steps[1].multiplier, dec!(2));
        assert_eq!(result.steps[1].probability, dec!(0.1));
        assert_eq!(result.damage_per_shot, dec!(11));
    }

    #[test]
    fn test_charge_time_limits_fire_rate() {
        let mut build = build_with(Vec::new());
        build.weapon.fire_rate = dec!(5);
        build.weapon.charge_time = Some(dec!(0.5));
        let result = resolve(&build, &Environment::default()).unwrap();
        assert_eq!(result.fire_rate, dec!(2));
    }

    #[test]
    fn test_policy_violation_fails() {
        let bad = StatEffect::new(UpgradeEffect::elemental(DamageType::Fire, Operation::Set), dec!(1));
        let err = resolve(&build_with(vec![item("Broken", vec![bad])]), &Environment::default()).unwrap_err();
        assert!(matches!(err, CalcError::CombinationPolicy { .. }));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let build = build_with(vec![item("Point Strike", vec![effect(EffectKind::CritChance, Operation::MulAdd, dec!(1.5))])]);
        let mut build = build;
        build.weapon.crit_chance = dec!(0.3);
        build.weapon.pellets = dec!(3);
        let env = Environment::default();
        assert_eq!(resolve(&build, &env).unwrap(), resolve(&build, &env).unwrap());
    }

    proptest! {
        #[test]
        fn plain_aggregation_order_independent(values in proptest::collection::vec(0u32..300, 1..6)) {
            let mods: Vec<ScaledMod> = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let kind = if i % 2 == 0 { EffectKind::Damage } else { EffectKind::CritChance };
                    item(&format!("m{}", i), vec![effect(kind, Operation::MulAdd, Decimal::new(*v as i64, 2))])
                })
                .collect();
            let mut reversed = mods.clone();
            reversed.reverse();
            let mut forward = build_with(mods);
            let mut backward = build_with(reversed);
            forward.weapon.crit_chance = dec!(0.2);
            backward.weapon.crit_chance = dec!(0.2);
            let env = Environment::default();
            prop_assert_eq!(resolve(&forward, &env).unwrap(), resolve(&backward, &env).unwrap());
        }

        #[test]
        fn step_probabilities_sum_to_one(crit in 0u32..300, multishot in 0u32..300, vig in 0u32..8) {
            let mut build = build_with(vec![
                item("a", vec![effect(EffectKind::Multishot, Operation::MulAdd, Decimal::new(multishot as i64, 2))]),
                item("b", vec![effect(EffectKind::Vigilante, Operation::Add, Decimal::new(vig as i64 * 5, 2))]),
            ]);
            build.weapon.crit_chance = Decimal::new(crit as i64, 2);
            let result = resolve(&build, &Environment::default()).unwrap();
            prop_assert!((result.probability_sum() - Decimal::ONE).abs() < dec!(0.0000000001));
        }
    }
}
