//! Upgrade algebra - effect descriptors and their combination families

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::to_fixed;
use crate::types::{DamageType, Faction};

/// Compatibility tag that matches every weapon
pub const COMPATIBILITY_ANY: &str = "xx_any";

/// The stat an effect targets
///
/// Kinds prefixed with `xx_` in catalog data parse into [`EffectKind::Placeholder`]
/// and never contribute to a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EffectKind {
    Damage,
    Multishot,
    CritChance,
    CritDamage,
    CritDamageBuffVoltOdonata,
    Elemental,
    DamageAimed,
    ChargedChamber,
    HeadshotBonus,
    Vigilante,

    FireRate,
    MagazineSize,
    ReloadSpeed,
    StatusChance,
    StatusDuration,
    Zoom,
    Recoil,
    ProjectileSpeed,
    FactionDamage,
    AmmoMax,
    PunchThrough,

    // === Internal kinds produced by modifiers ===
    SniperCombo,
    DamageMultiplyRoar,
    DamageMultiplyEclipse,
    DamageMultiplyVoidStrike,
    BuffHarrow,
    SwitchHeadshot,
    ElementalNocombine,

    // === Melee (accumulated, never read) ===
    MeleeComboDuration,
    MeleeComboExtra,
    MeleeComboMiss,
    MeleeComboInitialBonus,
    MeleeComboEfficiency,
    MeleeChannelingEfficiency,
    MeleeChannelingDamage,
    MeleeFinisherDamage,
    MeleeRange,

    /// Inert catalog entry, keeps its raw name
    Placeholder(String),
}

/// Combination family an effect kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectFamily {
    /// Accumulates into a `(ADD, MUL_ADD, MUL, SET)` tuple
    Plain,
    /// Feeds the combining damage distribution
    Elemental,
    /// Feeds the separate non-combining distribution
    ElementalNoCombine,
    /// Per-faction additive bonus
    Faction,
    /// Skipped entirely
    Placeholder,
}

const NAMED_KINDS: &[(EffectKind, &str)] = &[
    (EffectKind::Damage, "damage"),
    (EffectKind::Multishot, "multishot"),
    (EffectKind::CritChance, "crit_chance"),
    (EffectKind::CritDamage, "crit_damage"),
    (EffectKind::CritDamageBuffVoltOdonata, "crit_damage_buff_volt_odonata"),
    (EffectKind::Elemental, "elemental"),
    (EffectKind::DamageAimed, "damage_aimed"),
    (EffectKind::ChargedChamber, "charged_chamber"),
    (EffectKind::HeadshotBonus, "headshot_bonus"),
    (EffectKind::Vigilante, "vigilante"),
    (EffectKind::FireRate, "fire_rate"),
    (EffectKind::MagazineSize, "magazine_size"),
    (EffectKind::ReloadSpeed, "reload_speed"),
    (EffectKind::StatusChance, "status_chance"),
    (EffectKind::StatusDuration, "status_duration"),
    (EffectKind::Zoom, "zoom"),
    (EffectKind::Recoil, "recoil"),
    (EffectKind::ProjectileSpeed, "projectile_speed"),
    (EffectKind::FactionDamage, "faction_damage"),
    (EffectKind::AmmoMax, "ammo_max"),
    (EffectKind::PunchThrough, "punch_through"),
    (EffectKind::SniperCombo, "sniper_combo"),
    (EffectKind::DamageMultiplyRoar, "damage_multiply_roar"),
    (EffectKind::DamageMultiplyEclipse, "damage_multiply_eclipse"),
    (EffectKind::DamageMultiplyVoidStrike, "damage_multiply_void_strike"),
    (EffectKind::BuffHarrow, "buff_harrow"),
    (EffectKind::SwitchHeadshot, "switch_headshot"),
    (EffectKind::ElementalNocombine, "elemental_nocombine"),
    (EffectKind::MeleeComboDuration, "melee_combo_duration"),
    (EffectKind::MeleeComboExtra, "melee_combo_extra"),
    (EffectKind::MeleeComboMiss, "melee_combo_miss"),
    (EffectKind::MeleeComboInitialBonus, "melee_combo_initial_bonus"),
    (EffectKind::MeleeComboEfficiency, "melee_combo_efficiency"),
    (EffectKind::MeleeChannelingEfficiency, "melee_channeling_efficiency"),
    (EffectKind::MeleeChannelingDamage, "melee_channeling_damage"),
    (EffectKind::MeleeFinisherDamage, "melee_finisher_damage"),
    (EffectKind::MeleeRange, "melee_range"),
];

impl EffectKind {
    /// Catalog name of this kind
    pub fn name(&self) -> &str {
        if let EffectKind::Placeholder(raw) = self {
            return raw;
        }
        NAMED_KINDS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, name)| *name)
            .unwrap_or("")
    }

    pub fn family(&self) -> EffectFamily {
        match self {
            EffectKind::Elemental => EffectFamily::Elemental,
            EffectKind::ElementalNocombine => EffectFamily::ElementalNoCombine,
            EffectKind::FactionDamage => EffectFamily::Faction,
            EffectKind::Placeholder(_) => EffectFamily::Placeholder,
            _ => EffectFamily::Plain,
        }
    }

    /// Whether the magnitude grows with mod rank
    pub fn is_scalable(&self) -> bool {
        !matches!(self, EffectKind::Vigilante)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, EffectKind::Placeholder(_))
    }

    /// Human readable label used in effect descriptions
    pub fn display_name(&self) -> &str {
        match self {
            EffectKind::Damage => "Damage",
            EffectKind::Multishot => "Multishot",
            EffectKind::CritChance => "Critical Chance",
            EffectKind::CritDamage => "Critical Damage",
            EffectKind::CritDamageBuffVoltOdonata => "Double Critical Damage (Non-stacking)",
            EffectKind::Elemental => "Elemental Damage",
            EffectKind::DamageAimed => "Dead Aim",
            EffectKind::ChargedChamber => "Charged Chamber",
            EffectKind::HeadshotBonus => "Headshot Multiplier",
            EffectKind::Vigilante => "Vigilante Set Mod Buff",
            EffectKind::FireRate => "Fire Rate",
            EffectKind::MagazineSize => "Magazine Capacity",
            EffectKind::ReloadSpeed => "Reload Speed",
            EffectKind::StatusChance => "Status Chance",
            EffectKind::StatusDuration => "Status Duration",
            EffectKind::Zoom => "Zoom",
            EffectKind::Recoil => "Recoil",
            EffectKind::ProjectileSpeed => "Projectile Flight Speed",
            EffectKind::FactionDamage => "Faction Damage",
            EffectKind::AmmoMax => "Ammo Maximum",
            EffectKind::PunchThrough => "Punch Through",
            EffectKind::SniperCombo => "Combo Multiplier",
            EffectKind::DamageMultiplyRoar => "Damage Multiplier (Rhino Roar)",
            EffectKind::DamageMultiplyEclipse => "Damage Multiplier (Mirage Eclipse)",
            EffectKind::DamageMultiplyVoidStrike => "Damage Multiplier (Void Strike)",
            EffectKind::BuffHarrow => "Harrow's Covenant",
            EffectKind::SwitchHeadshot => "Headshot",
            EffectKind::ElementalNocombine => "Elemental Damage (Non-Combining)",
            EffectKind::MeleeComboDuration => "Combo Duration",
            EffectKind::MeleeChannelingEfficiency => "Channeling Efficiency",
            EffectKind::MeleeChannelingDamage => "Channeling Damage",
            EffectKind::MeleeFinisherDamage => "Finisher Damage",
            EffectKind::MeleeRange => "Range",
            other => other.name(),
        }
    }
}

impl FromStr for EffectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("xx_") {
            return Ok(EffectKind::Placeholder(s.to_string()));
        }
        NAMED_KINDS
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(kind, _)| kind.clone())
            .ok_or_else(|| format!("unknown upgrade type: {}", s))
    }
}

impl TryFrom<String> for EffectKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EffectKind> for String {
    fn from(kind: EffectKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an effect's magnitude combines with others of the same kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "ADD")]
    Add,
    #[serde(rename = "MUL_ADD")]
    MulAdd,
    #[serde(rename = "MUL")]
    Mul,
    #[serde(rename = "SET")]
    Set,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "ADD",
            Operation::MulAdd => "MUL_ADD",
            Operation::Mul => "MUL",
            Operation::Set => "SET",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed effect descriptor without a magnitude
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeEffect {
    pub kind: EffectKind,
    #[serde(rename = "op")]
    pub operation: Operation,
    /// Damage type or faction name for elemental and faction kinds
    #[serde(rename = "arg", default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,
    /// Weapon compatibility tag required for the effect to apply
    #[serde(rename = "compat", default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,
}

impl UpgradeEffect {
    pub fn new(kind: EffectKind, operation: Operation) -> Self {
        UpgradeEffect {
            kind,
            operation,
            argument: None,
            compatibility: None,
        }
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    pub fn with_compatibility(mut self, compatibility: impl Into<String>) -> Self {
        self.compatibility = Some(compatibility.into());
        self
    }

    /// Elemental effect targeting a damage type
    pub fn elemental(damage_type: DamageType, operation: Operation) -> Self {
        UpgradeEffect::new(EffectKind::Elemental, operation).with_argument(damage_type.wire_name())
    }

    /// Faction damage bonus
    pub fn faction(faction: Faction) -> Self {
        UpgradeEffect::new(EffectKind::FactionDamage, Operation::MulAdd)
            .with_argument(faction.wire_name())
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind.is_placeholder()
    }

    pub fn family(&self) -> EffectFamily {
        self.kind.family()
    }

    /// Identity string `kind/op/arg`
    pub fn tag(&self) -> String {
        format!(
            "{}/{}/{}",
            self.kind,
            self.operation,
            self.argument.as_deref().unwrap_or("")
        )
    }

    /// Damage type argument, if it names one
    pub fn damage_type(&self) -> Option<DamageType> {
        self.argument.as_deref().and_then(|a| a.parse().ok())
    }

    /// Faction argument, if it names one
    pub fn faction_argument(&self) -> Option<Faction> {
        self.argument.as_deref().and_then(|a| a.parse().ok())
    }

    /// Check that the effect's operation and argument fit its family
    pub fn validate(&self) -> Result<(), String> {
        match self.family() {
            EffectFamily::Elemental => {
                if !matches!(self.operation, Operation::Add | Operation::MulAdd) {
                    return Err(format!("{}: elemental effect must be ADD or MUL_ADD", self.tag()));
                }
                if self.damage_type().is_none() {
                    return Err(format!("{}: elemental effect needs a damage type", self.tag()));
                }
            }
            EffectFamily::ElementalNoCombine => {
                if self.operation != Operation::Add {
                    return Err(format!("{}: non-combining elemental must be ADD", self.tag()));
                }
                if self.damage_type().is_none() {
                    return Err(format!("{}: elemental effect needs a damage type", self.tag()));
                }
            }
            EffectFamily::Faction => {
                if self.operation != Operation::MulAdd {
                    return Err(format!("{}: faction damage must be MUL_ADD", self.tag()));
                }
                if self.faction_argument().is_none() {
                    return Err(format!("{}: faction damage needs a faction", self.tag()));
                }
            }
            EffectFamily::Plain | EffectFamily::Placeholder => {}
        }
        Ok(())
    }
}

impl fmt::Display for UpgradeEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(compat) = &self.compatibility {
            write!(f, "[{}] ", compat)?;
        }
        match self.kind {
            EffectKind::Elemental => f.write_str(&self.argument_label()),
            EffectKind::ElementalNocombine => {
                write!(f, "{} (Non-Combining)", self.argument_label())
            }
            EffectKind::FactionDamage => write!(
                f,
                "{} ({})",
                self.kind.display_name(),
                self.argument.as_deref().unwrap_or("")
            ),
            _ => {
                let suffix = match self.operation {
                    Operation::MulAdd => String::new(),
                    Operation::Set => " :=".to_string(),
                    other => format!(" ({})", other),
                };
                write!(f, "{}{}", self.kind.display_name(), suffix)
            }
        }
    }
}

impl UpgradeEffect {
    fn argument_label(&self) -> String {
        match self.damage_type() {
            Some(dt) => dt.display_name().to_string(),
            None => self.argument.clone().unwrap_or_default(),
        }
    }
}

/// An effect paired with its magnitude
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEffect {
    #[serde(flatten)]
    pub upgrade: UpgradeEffect,
    pub value: Decimal,
}

impl StatEffect {
    pub fn new(upgrade: UpgradeEffect, value: Decimal) -> Self {
        StatEffect { upgrade, value }
    }

    /// Magnitude at a mod rank: `value × (rank + 1)` unless the kind is non-scalable
    pub fn scale(&self, rank: u32) -> StatEffect {
        if !self.upgrade.kind.is_scalable() {
            return self.clone();
        }
        StatEffect {
            upgrade: self.upgrade.clone(),
            value: self.value * Decimal::from(rank + 1),
        }
    }
}

impl fmt::Display for StatEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value > Decimal::ZERO { " +" } else { " " };
        write!(f, "{}{}{}", self.upgrade, sign, to_fixed(self.value, 3))
    }
}
