//! Monte-Carlo sampling of a resolved shot distribution

use rand::Rng;
use rust_decimal::Decimal;

use super::result::CalcResult;
use crate::decimal::safe_div;

const DRAW_SCALE: u32 = 12;

/// Uniform draw in `[0, 1)` with 12 decimal places
fn uniform(rng: &mut impl Rng) -> Decimal {
    Decimal::new(rng.gen_range(0..10i64.pow(DRAW_SCALE)), DRAW_SCALE)
}

/// Damage of one sampled shot
pub fn sample_shot(result: &CalcResult, rng: &mut impl Rng) -> Decimal {
    let Some(last) = result.steps.last() else {
        return Decimal::ZERO;
    };
    let roll = uniform(rng);
    let mut cumulative = Decimal::ZERO;
    for step in &result.steps {
        cumulative += step.probability;
        if roll < cumulative {
            return result.damage_amount * step.multiplier;
        }
    }
    result.damage_amount * last.multiplier
}

/// Mean damage over `shots` sampled shots
pub fn simulate_mean_damage(result: &CalcResult, shots: u32, rng: &mut impl Rng) -> Decimal {
    let total: Decimal = (0..shots).map(|_| sample_shot(result, rng)).sum();
    safe_div(total, Decimal::from(shots))
}
