//! calc_core - Weapon damage calculation engine
//!
//! This library provides:
//! - Upgrade algebra: typed effects and how they combine
//! - StatBlock: Aggregated effects of one build against one weapon
//! - DamageDistribution: Elemental combination and per-type shares
//! - Enemy model: Level scaling, resistances, armor and boss mitigation
//! - Crit/status probability model and the `resolve` entry point
//! - Riven averaging, the TOML catalog and the share-string codec

pub mod build;
pub mod combat;
pub mod config;
pub mod damage;
pub mod decimal;
pub mod defense;
pub mod enemy;
pub mod persist;
pub mod prelude;
pub mod source;
pub mod stat_block;
pub mod types;
pub mod upgrade;
pub mod weapon;

// Re-export core types for convenience
pub use build::{Build, Environment, Switches};
pub use combat::{CalcResult, DamageStep};
pub use config::{Catalog, ConfigError, GameConstants, ModdingTemplate};
pub use damage::{aggregate, resolve, resolve_with_constants, DamageDistribution};
pub use enemy::{BossDamageMitigation, CustomEnemyPreset, Enemy, EnemyPreset, EnemyStats};
pub use persist::{PersistError, SharedState};
pub use source::{
    EffectSource, Loadout, Mod, Modifier, ModifierDefinition, ModifierValue, RivenMod, RivenStat,
    RivenUpgrade, ScaledMod,
};
pub use stat_block::{CalcError, EffectAccumulator, StatBlock, StatValue};
pub use types::{AttackType, DamageType, Faction, HealthType, RivenCategory};
pub use upgrade::{EffectFamily, EffectKind, Operation, StatEffect, UpgradeEffect};
pub use weapon::{Burst, Weapon, ZoomLevel};
