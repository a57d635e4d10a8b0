//! StatValue - The `(ADD, MUL_ADD, MUL, SET)` accumulator for one effect kind

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::upgrade::Operation;

/// Accumulated modifiers for a single plain-numeric effect kind
///
/// Final value for a base `v` is calculated as:
/// `SET` if present, otherwise `MUL × v × (1 + MUL_ADD) + ADD`
///
/// - `add`: Sum of all ADD magnitudes
/// - `mul_add`: Sum of all MUL_ADD magnitudes (0.15 = +15%)
/// - `mul`: Starts at 1, MUL magnitudes are summed into it
/// - `set`: Last SET magnitude seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    pub add: Decimal,
    pub mul_add: Decimal,
    pub mul: Decimal,
    pub set: Option<Decimal>,
}

impl Default for StatValue {
    fn default() -> Self {
        StatValue {
            add: Decimal::ZERO,
            mul_add: Decimal::ZERO,
            mul: Decimal::ONE,
            set: None,
        }
    }
}

impl StatValue {
    pub fn new() -> Self {
        StatValue::default()
    }

    /// Fold one magnitude into the accumulator
    pub fn accumulate(&mut self, operation: Operation, value: Decimal) {
        match operation {
            Operation::Add => self.add += value,
            Operation::MulAdd => self.mul_add += value,
            Operation::Mul => self.mul += value,
            // Last write wins
            Operation::Set => self.set = Some(value),
        }
    }

    /// Resolve against `base`, floored at `min`
    pub fn apply(&self, base: Decimal, min: Decimal) -> Decimal {
        self.compute(base).max(min)
    }

    /// Resolve against `base`, clamped to `[min, max]`
    pub fn apply_clamped(&self, base: Decimal, min: Decimal, max: Decimal) -> Decimal {
        self.compute(base).max(min).min(max)
    }

    /// Unclamped value
    pub fn compute(&self, base: Decimal) -> Decimal {
        match self.set {
            Some(value) => value,
            None => self.mul * base * (Decimal::ONE + self.mul_add) + self.add,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compute_basic() {
        let stat = StatValue::new();
        assert_eq!(stat.compute(dec!(100)), dec!(100));
    }

    #[test]
    fn test_compute_full_formula() {
        // 1.5 × 10 × (1 + 0.9) + 2 = 30.5
        let mut stat = StatValue::new();
        stat.accumulate(Operation::MulAdd, dec!(0.6));
        stat.accumulate(Operation::MulAdd, dec!(0.3));
        stat.accumulate(Operation::Mul, dec!(0.5));
        stat.accumulate(Operation::Add, dec!(2));
        assert_eq!(stat.compute(dec!(10)), dec!(30.5));
    }

    #[test]
    fn test_set_overrides_everything() {
        let mut stat = StatValue::new();
        stat.accumulate(Operation::MulAdd, dec!(2));
        stat.accumulate(Operation::Set, dec!(0.5));
        stat.accumulate(Operation::Set, dec!(2));
        assert_eq!(stat.compute(dec!(10)), dec!(2));
    }

    #[test]
    fn test_clamping() {
        let mut stat = StatValue::new();
        stat.accumulate(Operation::MulAdd, dec!(-3));
        assert_eq!(stat.apply(dec!(1), Decimal::ZERO), Decimal::ZERO);

        let mut vig = StatValue::new();
        vig.accumulate(Operation::Add, dec!(0.4));
        assert_eq!(vig.apply_clamped(Decimal::ZERO, Decimal::ZERO, dec!(0.3)), dec!(0.3));
    }
}
