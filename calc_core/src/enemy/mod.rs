//! Enemy - Presets, custom enemies and per-build decorations

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ScalingConstants;
use crate::defense::{level_scaling, LevelScaling};
use crate::types::{Faction, HealthType};

/// Flat multiplier plus excess-damage threshold applied to bosses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossDamageMitigation {
    /// Damage per second above which hits are reduced
    pub threshold: Decimal,
    pub multiplier: Decimal,
    /// Whether headshots still double the crit multiplier
    #[serde(default)]
    pub use_critical_headshot: bool,
}

/// Stats of an enemy without identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEnemyPreset {
    pub armor_type: HealthType,
    pub armor_base: Decimal,
    pub health_type: HealthType,
    pub health_base: Decimal,
    pub shield_type: HealthType,
    pub shield_base: Decimal,
    pub faction: Faction,
    pub base_level: u32,
    #[serde(default = "default_level")]
    pub default_level: u32,
    #[serde(default)]
    pub damage_mitigation: Option<BossDamageMitigation>,
    #[serde(default = "default_headshot_multiplier")]
    pub headshot_multiplier: Decimal,
}

fn default_level() -> u32 {
    100
}

fn default_headshot_multiplier() -> Decimal {
    Decimal::TWO
}

/// Catalog enemy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyPreset {
    pub name: String,
    pub unique_name: String,
    #[serde(flatten)]
    pub stats: CustomEnemyPreset,
}

/// Either a catalog preset or user-entered stats
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnemyStats {
    Preset(EnemyPreset),
    Custom(CustomEnemyPreset),
}

impl EnemyStats {
    pub fn stats(&self) -> &CustomEnemyPreset {
        match self {
            EnemyStats::Preset(p) => &p.stats,
            EnemyStats::Custom(c) => c,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EnemyStats::Preset(p) => &p.name,
            EnemyStats::Custom(_) => "Custom",
        }
    }
}

/// An enemy as targeted by a calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub stats: EnemyStats,
    /// Overrides the preset's default level
    pub level: Option<u32>,
    pub armor_multiplier: Decimal,
    pub armor_subtraction: Decimal,
}

impl Enemy {
    pub fn new(stats: EnemyStats) -> Self {
        Enemy {
            stats,
            level: None,
            armor_multiplier: Decimal::ONE,
            armor_subtraction: Decimal::ZERO,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Untyped health 1, no armor, neutral faction
    pub fn empty() -> Self {
        Enemy::new(EnemyStats::Custom(CustomEnemyPreset {
            health_type: HealthType::None,
            health_base: Decimal::ONE,
            armor_type: HealthType::Armor,
            armor_base: Decimal::ZERO,
            shield_type: HealthType::Shield,
            shield_base: Decimal::ZERO,
            faction: Faction::Neutral,
            base_level: 1,
            default_level: 100,
            damage_mitigation: None,
            headshot_multiplier: Decimal::TWO,
        }))
    }

    pub fn preset(&self) -> &CustomEnemyPreset {
        self.stats.stats()
    }

    /// Current level; zero counts as unset
    pub fn effective_level(&self) -> u32 {
        match self.level {
            Some(level) if level > 0 => level,
            _ => self.preset().default_level,
        }
    }

    /// Armor base after flat subtraction and multiplier, floored at zero
    pub fn reduced_armor_base(&self) -> Decimal {
        ((self.preset().armor_base - self.armor_subtraction) * self.armor_multiplier).max(Decimal::ZERO)
    }

    /// Armor, health and shield at the current level
    ///
    /// Shield scales from the preset's `shield_base`.
    pub fn level_scaling(&self, constants: &ScalingConstants) -> LevelScaling {
        let preset = self.preset();
        let level_diff = self.effective_level().saturating_sub(preset.base_level);
        level_scaling(
            Decimal::from(level_diff),
            self.reduced_armor_base(),
            preset.health_base,
            preset.shield_base,
            constants,
        )
    }
}

impl Default for Enemy {
    fn default() -> Self {
        Enemy::empty()
    }
}

impl fmt::Display for Enemy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preset = self.preset();
        let mut s = preset.health_type.display_name().to_string();
        if preset.armor_base - self.armor_subtraction > Decimal::ZERO {
            s.push_str(" + ");
            s.push_str(preset.armor_type.display_name());
        }
        match &self.stats {
            EnemyStats::Preset(p) => write!(f, "{} ({})", p.name, s),
            EnemyStats::Custom(_) => f.write_str(&s),
        }
    }
}

/// Per-name adjustments applied while loading presets
#[derive(Debug, Clone, Deserialize)]
pub struct PresetOverride {
    pub name: String,
    #[serde(default)]
    pub default_level: Option<u32>,
    #[serde(default)]
    pub damage_mitigation: Option<BossDamageMitigation>,
    #[serde(default)]
    pub headshot_multiplier: Option<Decimal>,
}

impl PresetOverride {
    pub fn apply(&self, preset: &mut EnemyPreset) {
        if let Some(level) = self.default_level {
            preset.stats.default_level = level;
        }
        if let Some(dm) = &self.damage_mitigation {
            preset.stats.damage_mitigation = Some(dm.clone());
        }
        if let Some(hs) = self.headshot_multiplier {
            preset.stats.headshot_multiplier = hs;
        }
    }
}

/// Derived preset cloned from an existing one
#[derive(Debug, Clone, Deserialize)]
pub struct PresetVariant {
    /// Unique name of the preset to copy
    pub base: String,
    /// Appended to the display name after a space
    pub name_suffix: String,
    /// Appended to the unique name after `|`
    pub id_suffix: String,
    #[serde(default)]
    pub health_base: Option<Decimal>,
}

impl PresetVariant {
    pub fn derive(&self, base: &EnemyPreset) -> EnemyPreset {
        let mut preset = base.clone();
        preset.name = format!("{} {}", base.name, self.name_suffix);
        preset.unique_name = format!("{}|{}", base.unique_name, self.id_suffix);
        if let Some(health) = self.health_base {
            preset.stats.health_base = health;
        }
        preset
    }
}
