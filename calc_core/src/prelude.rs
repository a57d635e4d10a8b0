//! Prelude module for convenient imports
//!
//! ```rust
//! use calc_core::prelude::*;
//! ```

// Inputs
pub use crate::build::{Build, Environment, Switches};
pub use crate::enemy::{Enemy, EnemyStats};
pub use crate::source::{Loadout, Modifier, ModifierValue, RivenMod, RivenStat, ScaledMod};
pub use crate::weapon::Weapon;

// Catalog
pub use crate::config::{Catalog, GameConstants};

// Engine
pub use crate::damage::{resolve, resolve_with_constants};
pub use crate::combat::{CalcResult, DamageStep};
pub use crate::stat_block::{CalcError, StatBlock};

// Core types
pub use crate::types::{DamageType, Faction, HealthType};
pub use crate::upgrade::{EffectKind, Operation, StatEffect};

// Share strings
pub use crate::persist::{decode, encode, SharedState};
