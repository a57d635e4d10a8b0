//! Level scaling - Armor, health and shield growth with enemy level
//!
//! Two power curves are blended with a smoothstep between level differences
//! 70 and 80:
//! - `s = clamp01((d − 70) / 10)`, eased as `3s² − 2s³`
//! - `low = c_low × d^e_low`, `high = c_high × d^e_high`
//! - `factor = (1 − eased) × low + eased × high + 1`

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{ScalingConstants, ScalingCurve};
use crate::decimal::{pow, safe_div};

/// Scaled defensive values of an enemy at its current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelScaling {
    pub armor: Decimal,
    pub health: Decimal,
    pub shield: Decimal,
}

/// Curve value (without the `+ 1`) for a level difference
pub fn scale_curve(level_diff: Decimal, curve: &ScalingCurve, blend_start: Decimal, blend_width: Decimal) -> Decimal {
    if level_diff <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let s = safe_div(level_diff - blend_start, blend_width)
        .max(Decimal::ZERO)
        .min(Decimal::ONE);
    let eased = Decimal::from(3) * s * s - Decimal::TWO * s * s * s;
    let low = curve.c_low * pow(level_diff, curve.e_low);
    let high = curve.c_high * pow(level_diff, curve.e_high);
    (Decimal::ONE - eased) * low + eased * high
}

/// Scale armor, health and shield bases by the level difference
///
/// # Arguments
/// * `level_diff` - Current level minus base level, negative treated as zero
/// * `armor_base` - Effective armor base after subtraction and multiplier
///
/// # Returns
/// Each base multiplied by `1 + curve(level_diff)` for its own curve
pub fn level_scaling(
    level_diff: Decimal,
    armor_base: Decimal,
    health_base: Decimal,
    shield_base: Decimal,
    constants: &ScalingConstants,
) -> LevelScaling {
    let factor = |curve: &ScalingCurve| {
        scale_curve(level_diff, curve, constants.blend_start, constants.blend_width) + Decimal::ONE
    };
    LevelScaling {
        armor: factor(&constants.armor) * armor_base.max(Decimal::ZERO),
        health: factor(&constants.health) * health_base,
        // Shield grows from its own base, not the health base
        shield: factor(&constants.shield) * shield_base,
    }
}
