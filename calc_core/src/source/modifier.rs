//! Modifiers - Buffs outside the mod loadout (auras, arcanes, abilities)
//!
//! A definition is pure data: a gate deciding whether it applies to a
//! weapon, and a behavior producing effects from the user's parameter.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::source::EffectSource;
use crate::upgrade::{StatEffect, UpgradeEffect};
use crate::weapon::Weapon;

/// User parameter of a modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierValue {
    Flag(bool),
    Number(Decimal),
}

impl ModifierValue {
    pub fn as_number(self) -> Decimal {
        match self {
            ModifierValue::Flag(true) => Decimal::ONE,
            ModifierValue::Flag(false) => Decimal::ZERO,
            ModifierValue::Number(n) => n,
        }
    }

    pub fn as_flag(self) -> bool {
        match self {
            ModifierValue::Flag(b) => b,
            ModifierValue::Number(n) => !n.is_zero(),
        }
    }
}

/// When a definition applies to a weapon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierGate {
    #[default]
    Always,
    /// Weapon's compatibility chain contains the tag
    Compatible(String),
    HasZoomLevels,
}

impl ModifierGate {
    pub fn allows(&self, weapon: &Weapon) -> bool {
        match self {
            ModifierGate::Always => true,
            ModifierGate::Compatible(tag) => weapon.is_compatible(tag),
            ModifierGate::HasZoomLevels => weapon.has_zoom_levels(),
        }
    }
}

/// How an effect's magnitude depends on the parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    #[default]
    Constant,
    /// `value × parameter`
    ByValue,
    /// `value × factor` when the parameter is set
    WhenEnabled(Decimal),
}

/// One effect template of a definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierEffect {
    #[serde(flatten)]
    pub upgrade: UpgradeEffect,
    pub value: Decimal,
    #[serde(default)]
    pub scaling: Scaling,
}

impl ModifierEffect {
    pub fn resolve(&self, parameter: ModifierValue) -> StatEffect {
        let value = match self.scaling {
            Scaling::Constant => self.value,
            Scaling::ByValue => self.value * parameter.as_number(),
            Scaling::WhenEnabled(factor) if parameter.as_flag() => self.value * factor,
            Scaling::WhenEnabled(_) => self.value,
        };
        StatEffect::new(self.upgrade.clone(), value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierBehavior {
    /// Produce the definition's effect templates
    #[default]
    Effects,
    /// Take the weapon's zoom table entry selected by the parameter
    ZoomLevel,
}

/// Catalog modifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierDefinition {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub value_description: Option<String>,
    #[serde(default)]
    pub default: Option<ModifierValue>,
    #[serde(default)]
    pub gate: ModifierGate,
    #[serde(default)]
    pub behavior: ModifierBehavior,
    #[serde(default)]
    pub effects: Vec<ModifierEffect>,
}

impl ModifierDefinition {
    pub fn is_applicable(&self, weapon: &Weapon) -> bool {
        self.gate.allows(weapon)
    }

    /// Effects for a parameter, ignoring the gate
    pub fn produce(&self, parameter: ModifierValue, weapon: &Weapon) -> Vec<StatEffect> {
        match self.behavior {
            ModifierBehavior::Effects => self.effects.iter().map(|e| e.resolve(parameter)).collect(),
            ModifierBehavior::ZoomLevel => {
                let level = parameter.as_number().trunc().to_usize().unwrap_or(0);
                if level == 0 || weapon.zoom_levels.is_empty() {
                    return Vec::new();
                }
                let index = level.min(weapon.zoom_levels.len()) - 1;
                weapon.zoom_levels[index].effects.clone()
            }
        }
    }
}

/// A definition with the user's parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub definition: ModifierDefinition,
    pub value: Option<ModifierValue>,
}

impl Modifier {
    pub fn new(definition: ModifierDefinition, value: Option<ModifierValue>) -> Self {
        Modifier { definition, value }
    }

    /// The definition with its default parameter
    pub fn with_default(definition: ModifierDefinition) -> Self {
        let value = definition.default;
        Modifier { definition, value }
    }

    /// Parameter in effect: the user's, else the default, else zero
    pub fn parameter(&self) -> ModifierValue {
        self.value
            .or(self.definition.default)
            .unwrap_or(ModifierValue::Number(Decimal::ZERO))
    }
}

impl EffectSource for Modifier {
    fn id(&self) -> &str {
        &self.definition.id
    }

    fn effects(&self, weapon: &Weapon) -> Vec<StatEffect> {
        if !self.definition.is_applicable(weapon) {
            return Vec::new();
        }
        self.definition.produce(self.parameter(), weapon)
    }
}
