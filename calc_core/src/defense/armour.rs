//! Armour - Diminishing-return damage reduction from scaled armor
//!
//! Formula:
//! `damage × (1 − armorResist) / (armor × (1 + armorResist) / divisor + 1)`
//!
//! `armorResist` is the armor class modifier for the damage type, so a
//! negative value both raises the numerator and weakens the armor.

use rust_decimal::Decimal;

use crate::decimal::safe_div;

/// Factor applied to damage of one type by scaled armor
///
/// # Arguments
/// * `armor` - The enemy's scaled armor value
/// * `armor_resist` - Armor class modifier for the damage type
/// * `divisor` - Armor divisor constant (300)
pub fn armor_damage_factor(armor: Decimal, armor_resist: Decimal, divisor: Decimal) -> Decimal {
    if armor <= Decimal::ZERO {
        return Decimal::ONE;
    }
    let denominator = safe_div(armor * (Decimal::ONE + armor_resist), divisor) + Decimal::ONE;
    safe_div(Decimal::ONE - armor_resist, denominator)
}

/// Calculate damage after armor reduction
///
/// # Returns
/// The damage after armor; unchanged when armor is zero
pub fn calculate_armor_reduction(
    damage: Decimal,
    armor: Decimal,
    armor_resist: Decimal,
    divisor: Decimal,
) -> Decimal {
    damage * armor_damage_factor(armor, armor_resist, divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_armor_passes_through() {
        assert_eq!(calculate_armor_reduction(dec!(100), Decimal::ZERO, dec!(0.25), dec!(300)), dec!(100));
    }

    #[test]
    fn test_armor_reduction_basic() {
        // 300 armor, neutral modifier: 100 / 2 = 50
        assert_eq!(calculate_armor_reduction(dec!(100), dec!(300), Decimal::ZERO, dec!(300)), dec!(50));
    }

    #[test]
    fn test_negative_modifier_pierces() {
        // Corrosive vs ferrite: 1.75 / (300 × 0.25 / 300 + 1) = 1.4
        let factor = armor_damage_factor(dec!(300), dec!(-0.75), dec!(300));
        assert_eq!(factor, dec!(1.4));
    }

    #[test]
    fn test_more_armor_means_less_damage() {
        let low = calculate_armor_reduction(dec!(100), dec!(100), dec!(0.15), dec!(300));
        let high = calculate_armor_reduction(dec!(100), dec!(1000), dec!(0.15), dec!(300));
        assert!(high < low);
    }
}
