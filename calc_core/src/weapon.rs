//! Weapon - Static weapon stats and their catalog records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{AttackType, DamageType, RivenCategory};
use crate::upgrade::{StatEffect, UpgradeEffect, COMPATIBILITY_ANY};

/// Shots fired per trigger pull
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Burst {
    pub count: u32,
    pub delay: Decimal,
}

/// Effects granted while aiming at one zoom level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomLevel {
    pub zoom: Decimal,
    #[serde(default)]
    pub effects: Vec<StatEffect>,
}

/// Effect whose magnitude is `offset + factor × ability strength`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScaling {
    #[serde(flatten)]
    pub upgrade: UpgradeEffect,
    #[serde(default)]
    pub offset: Decimal,
    #[serde(default)]
    pub factor: Decimal,
}

impl AbilityScaling {
    pub fn effect(&self, strength: Decimal) -> StatEffect {
        StatEffect::new(self.upgrade.clone(), self.offset + self.factor * strength)
    }
}

/// One firing mode of a weapon, flattened into its own record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    // === Identity ===
    /// `"Name (Mode)"` for secondary modes, the base name otherwise
    pub name: String,
    pub basename: String,
    /// Compatibility chain, most specific first
    pub compatibility: Vec<String>,
    pub riven_category: RivenCategory,
    pub attack_type: AttackType,

    // === Damage ===
    pub crit_chance: Decimal,
    pub crit_damage: Decimal,
    /// Base damage fractions per type
    pub damage: BTreeMap<DamageType, Decimal>,
    /// Total base damage per pellet
    pub damage_amount: Decimal,
    pub pellets: Decimal,
    pub proc_chance: Decimal,

    // === Throughput ===
    /// Shots per second
    pub fire_rate: Decimal,
    pub charge_time: Option<Decimal>,
    pub magazine_size: Decimal,
    pub reload_time: Decimal,
    pub burst: Option<Burst>,

    // === Upgrades ===
    pub zoom_levels: Vec<ZoomLevel>,
    /// Innate effect groups, each folded as its own source
    pub innate_effects: Vec<Vec<StatEffect>>,
    pub ability_strength: Vec<AbilityScaling>,
    pub riven_disposition: Decimal,
}

impl Weapon {
    /// Whether an effect tagged `tag` applies to this weapon
    pub fn is_compatible(&self, tag: &str) -> bool {
        tag == COMPATIBILITY_ANY || self.compatibility.iter().any(|c| c == tag)
    }

    pub fn has_zoom_levels(&self) -> bool {
        !self.zoom_levels.is_empty()
    }

    /// Effects driven by the caster's ability strength
    pub fn ability_strength_effects(&self, strength: Decimal) -> Vec<StatEffect> {
        self.ability_strength.iter().map(|a| a.effect(strength)).collect()
    }

    #[cfg(test)]
    pub(crate) fn test_weapon(name: &str) -> Weapon {
        use rust_decimal_macros::dec;
        Weapon {
            name: name.to_string(),
            basename: name.to_string(),
            compatibility: vec![name.to_string(), "RIFLE".into(), "PRIMARY".into()],
            riven_category: RivenCategory::Rifle,
            attack_type: AttackType::Hitscan,
            crit_chance: Decimal::ZERO,
            crit_damage: dec!(2),
            damage: [(DamageType::Impact, Decimal::ONE)].into_iter().collect(),
            damage_amount: dec!(10),
            pellets: Decimal::ONE,
            proc_chance: Decimal::ZERO,
            fire_rate: Decimal::ONE,
            charge_time: None,
            magazine_size: dec!(10),
            reload_time: dec!(2),
            burst: None,
            zoom_levels: Vec::new(),
            innate_effects: Vec::new(),
            ability_strength: Vec::new(),
            riven_disposition: Decimal::ONE,
        }
    }
}

/// Weapon entry as stored in `weapons.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct WeaponRecord {
    pub name: String,
    pub compatibility: Vec<String>,
    pub riven_category: RivenCategory,
    pub magazine_size: Decimal,
    pub riven_disposition: Decimal,
    #[serde(default)]
    pub zoom_levels: Vec<ZoomLevel>,
    #[serde(default)]
    pub innate_effects: Vec<Vec<StatEffect>>,
    #[serde(default)]
    pub ability_strength: Vec<AbilityScaling>,
    pub modes: Vec<ModeRecord>,
}

/// Firing mode entry of a [`WeaponRecord`]
#[derive(Debug, Clone, Deserialize)]
pub struct ModeRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub attack_type: AttackType,
    pub critical_chance: Decimal,
    pub critical_multiplier: Decimal,
    pub damage: BTreeMap<DamageType, Decimal>,
    pub damage_amount: Decimal,
    #[serde(default = "default_fire_iterations")]
    pub fire_iterations: Decimal,
    pub proc_chance: Decimal,
    /// Shots per minute
    pub fire_rate: Decimal,
    #[serde(default)]
    pub charge_time: Option<Decimal>,
    pub reload_time: Decimal,
    #[serde(default)]
    pub burst_num_shots: Option<u32>,
    #[serde(default)]
    pub burst_delay: Option<Decimal>,
}

fn default_fire_iterations() -> Decimal {
    Decimal::ONE
}

impl WeaponRecord {
    /// One weapon per firing mode
    pub fn into_weapons(self) -> Vec<Weapon> {
        let sixty = Decimal::from(60);
        self.modes
            .iter()
            .map(|mode| Weapon {
                name: match &mode.name {
                    Some(m) => format!("{} ({})", self.name, m),
                    None => self.name.clone(),
                },
                basename: self.name.clone(),
                compatibility: self.compatibility.clone(),
                riven_category: self.riven_category,
                attack_type: mode.attack_type,
                crit_chance: mode.critical_chance,
                crit_damage: mode.critical_multiplier,
                damage: mode.damage.clone(),
                damage_amount: mode.damage_amount,
                pellets: mode.fire_iterations,
                proc_chance: mode.proc_chance,
                fire_rate: mode.fire_rate / sixty,
                charge_time: mode.charge_time.filter(|c| !c.is_zero()),
                magazine_size: self.magazine_size,
                reload_time: mode.reload_time,
                burst: mode.burst_num_shots.map(|count| Burst {
                    count,
                    delay: mode.burst_delay.unwrap_or(Decimal::ZERO),
                }),
                zoom_levels: self.zoom_levels.clone(),
                innate_effects: self.innate_effects.clone(),
                ability_strength: self.ability_strength.clone(),
                riven_disposition: self.riven_disposition,
            })
            .collect()
    }
}
