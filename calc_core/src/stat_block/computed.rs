//! Derived lookups on StatBlock used by the resolver

use rust_decimal::Decimal;

use crate::stat_block::StatBlock;
use crate::upgrade::EffectKind;

impl StatBlock {
    /// Whether a headshot switch effect is active
    pub fn is_headshot(&self) -> bool {
        self.apply(&EffectKind::SwitchHeadshot, Decimal::ZERO, Decimal::ZERO) > Decimal::ZERO
    }

    /// Multiplier applied as `1 + value`, as Roar and Eclipse are
    pub fn additive_multiplier(&self, kind: &EffectKind) -> Decimal {
        Decimal::ONE + self.apply(kind, Decimal::ZERO, Decimal::ZERO)
    }

    /// Chance of a vigilante tier upgrade, capped at `cap`
    pub fn vigilante_chance(&self, enabled: bool, cap: Decimal) -> Decimal {
        if !enabled {
            return Decimal::ZERO;
        }
        self.apply_clamped(&EffectKind::Vigilante, Decimal::ZERO, Decimal::ZERO, cap)
    }

    /// Multishot as a multiplier of the base pellet count
    pub fn multishot_multiplier(&self) -> Decimal {
        self.apply(&EffectKind::Multishot, Decimal::ONE, Decimal::ZERO)
    }

    /// Harrow crit bonus, scaled on headshots
    pub fn harrow_bonus(&self, headshot: bool, headshot_factor: Decimal) -> Option<Decimal> {
        if !self.has(&EffectKind::BuffHarrow) {
            return None;
        }
        let value = self.apply(&EffectKind::BuffHarrow, Decimal::ZERO, Decimal::ZERO);
        Some(if headshot { value * headshot_factor } else { value })
    }
}
