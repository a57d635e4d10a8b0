//! Boss damage mitigation - Excess damage reduction above a threshold
//!
//! The threshold is given per second of fire; it is spread over shots and
//! pellets before being compared to the per-pellet damage of each crit tier.
//! Damage below the threshold is untouched; the excess keeps `excess_factor`
//! (10%) of its value.

use rust_decimal::Decimal;

use crate::decimal::safe_div;

/// Threshold for a single pellet of a single shot
pub fn per_pellet_threshold(threshold: Decimal, fire_rate: Decimal, pellets: Decimal) -> Decimal {
    safe_div(safe_div(threshold, fire_rate), pellets)
}

/// Reduce a tier multiplier whose damage exceeds the threshold
///
/// # Arguments
/// * `multiplier` - Tier damage multiplier (already doubled for crits)
/// * `base_damage` - Expected base damage before the flat boss multiplier
/// * `threshold` - Per-pellet threshold from [`per_pellet_threshold`]
/// * `excess_factor` - Fraction of the excess that is kept
///
/// # Returns
/// `(multiplier − rt) × excess_factor + rt` with `rt = threshold / base_damage`
/// when `base_damage × multiplier > threshold`, else the multiplier unchanged
pub fn cap_excess_damage(
    multiplier: Decimal,
    base_damage: Decimal,
    threshold: Decimal,
    excess_factor: Decimal,
) -> Decimal {
    if base_damage * multiplier <= threshold {
        return multiplier;
    }
    let rt = safe_div(threshold, base_damage);
    (multiplier - rt) * excess_factor + rt
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_per_pellet_threshold() {
        assert_eq!(per_pellet_threshold(dec!(300), dec!(2), dec!(5)), dec!(30));
        assert_eq!(per_pellet_threshold(dec!(300), Decimal::ZERO, dec!(5)), Decimal::ZERO);
    }

    #[test]
    fn test_below_threshold_untouched() {
        assert_eq!(cap_excess_damage(dec!(1), dec!(200), dec!(300), dec!(0.1)), dec!(1));
    }

    #[test]
    fn test_excess_reduced_to_tenth() {
        // 1000 raw vs 300: 300 + 700 × 0.1 = 370
        let m = cap_excess_damage(dec!(1), dec!(1000), dec!(300), dec!(0.1));
        assert_eq!(m * dec!(1000), dec!(370));
    }

    #[test]
    fn test_doubled_crit_tier() {
        // 2 × 1000 = 2000 raw: 300 + 1700 × 0.1 = 470
        let m = cap_excess_damage(dec!(2), dec!(1000), dec!(300), dec!(0.1));
        assert_eq!(m * dec!(1000), dec!(470));
    }
}
