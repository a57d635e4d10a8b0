//! EffectSource - Trait and implementations for effect providers

mod modifier;
mod mods;
mod riven;

pub use modifier::{
    Modifier, ModifierBehavior, ModifierDefinition, ModifierEffect, ModifierGate, ModifierValue,
    Scaling,
};
pub use mods::{EffectGroup, Loadout, Mod, ScaledMod, EMPTY_MOD_NAME, ORDINAL_SLOTS, RIVEN_MOD_NAME};
pub use riven::{
    autofill_average, autofill_max, average_riven_stats, deviation_percent, is_plausible, RivenMod,
    RivenStat, RivenUpgrade, RIVEN_SLOTS,
};

use crate::stat_block::{CalcError, EffectAccumulator};
use crate::upgrade::StatEffect;
use crate::weapon::Weapon;

/// Anything that contributes one effect list to a calculation
///
/// Each source is folded as a unit; the accumulator walks its list back to
/// front.
pub trait EffectSource {
    /// Identifier used in logs
    fn id(&self) -> &str;

    /// Effects contributed against `weapon`
    fn effects(&self, weapon: &Weapon) -> Vec<StatEffect>;

    /// Fold this source's effects into the accumulator
    fn apply(&self, acc: &mut EffectAccumulator) -> Result<(), CalcError> {
        let effects = self.effects(acc.weapon());
        acc.add_source(&effects)
    }
}
