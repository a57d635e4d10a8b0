//! Crit/vigilante outcome model and shot step enumeration
//!
//! Crit chance `c` splits into a guaranteed tier `cm = floor(c)` and a carry
//! `cc = c − cm`. Each pellet lands in one of three tiers:
//! - nc: tier `cm`
//! - cc: tier `cm + 1`
//! - cv: tier `cm + 2` (vigilante upgrade of a crit)
//!
//! With `cm = 0` a non-crit cannot be upgraded by vigilante; above that it can.
//! Tier multiplier: `tier × (critMultiplier − 1) + 1`, floored at 0.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::result::DamageStep;
use crate::decimal::{safe_div, to_fixed};
use crate::defense::{cap_excess_damage, per_pellet_threshold};

/// Per-pellet tier probabilities and multipliers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CritOutcomes {
    /// Guaranteed crit tier
    pub tier: i64,
    pub nc_prob: Decimal,
    pub cc_prob: Decimal,
    pub cv_prob: Decimal,
    pub nc_dmg: Decimal,
    pub cc_dmg: Decimal,
    pub cv_dmg: Decimal,
}

fn tier_multiplier(tier: Decimal, crit_multiplier: Decimal) -> Decimal {
    (tier * (crit_multiplier - Decimal::ONE) + Decimal::ONE).max(Decimal::ZERO)
}

impl CritOutcomes {
    /// # Arguments
    /// * `crit_chance` - Modded crit chance, may exceed 1
    /// * `crit_multiplier` - Modded crit multiplier
    /// * `vigilante` - Chance to upgrade one tier further, already capped
    pub fn new(crit_chance: Decimal, crit_multiplier: Decimal, vigilante: Decimal) -> Self {
        let cm = crit_chance.floor();
        let cc = crit_chance - cm;
        let sub_cc = Decimal::ONE - cc;
        let sub_vig = Decimal::ONE - vigilante;

        let (nc_prob, cc_prob) = if cm.is_zero() {
            (sub_cc, cc * sub_vig)
        } else {
            (sub_cc * sub_vig, sub_cc * vigilante + cc * sub_vig)
        };

        CritOutcomes {
            tier: cm.to_i64().unwrap_or(0),
            nc_prob,
            cc_prob,
            cv_prob: cc * vigilante,
            nc_dmg: tier_multiplier(cm, crit_multiplier),
            cc_dmg: tier_multiplier(cm + Decimal::ONE, crit_multiplier),
            cv_dmg: tier_multiplier(cm + Decimal::TWO, crit_multiplier),
        }
    }

    /// Double crit tiers, then cap each tier's excess over the per-pellet threshold
    ///
    /// # Arguments
    /// * `base_damage` - Expected base damage before the flat boss multiplier
    /// * `threshold` - Boss threshold per second of fire
    pub fn apply_boss_mitigation(
        &mut self,
        base_damage: Decimal,
        threshold: Decimal,
        fire_rate: Decimal,
        pellets: Decimal,
        crit_factor: Decimal,
        excess_factor: Decimal,
    ) {
        let threshold = per_pellet_threshold(threshold, fire_rate, pellets);
        if self.tier != 0 {
            self.nc_dmg *= crit_factor;
        }
        self.cc_dmg *= crit_factor;
        self.cv_dmg *= crit_factor;

        self.nc_dmg = cap_excess_damage(self.nc_dmg, base_damage, threshold, excess_factor);
        self.cc_dmg = cap_excess_damage(self.cc_dmg, base_damage, threshold, excess_factor);
        self.cv_dmg = cap_excess_damage(self.cv_dmg, base_damage, threshold, excess_factor);
    }
}

/// Decimal with a separate power-of-ten exponent
///
/// Multinomial coefficients outgrow `Decimal` long before the per-pellet
/// powers underflow it, so partition terms are built as `mantissa × 10^exp`
/// with `|mantissa|` kept in `[1, 10)`.
#[derive(Debug, Clone, Copy)]
struct Scaled {
    mantissa: Decimal,
    exp: i32,
}

impl Scaled {
    const ONE: Scaled = Scaled {
        mantissa: Decimal::ONE,
        exp: 0,
    };

    fn new(value: Decimal) -> Self {
        Scaled {
            mantissa: value,
            exp: 0,
        }
        .normalized()
    }

    fn normalized(mut self) -> Self {
        if self.mantissa.is_zero() {
            return Scaled {
                mantissa: Decimal::ZERO,
                exp: 0,
            };
        }
        while self.mantissa.abs() >= Decimal::TEN {
            self.mantissa /= Decimal::TEN;
            self.exp += 1;
        }
        while self.mantissa.abs() < Decimal::ONE {
            self.mantissa *= Decimal::TEN;
            self.exp -= 1;
        }
        self
    }

    fn mul(self, other: Scaled) -> Self {
        Scaled {
            mantissa: self.mantissa * other.mantissa,
            exp: self.exp + other.exp,
        }
        .normalized()
    }

    /// `self × num / den`, `den` non-zero
    fn ratio(self, num: u64, den: u64) -> Self {
        let num = Scaled::new(Decimal::from(num));
        let den = Scaled::new(Decimal::from(den));
        Scaled {
            mantissa: self.mantissa * num.mantissa / den.mantissa,
            exp: self.exp + num.exp - den.exp,
        }
        .normalized()
    }

    /// Back to a plain decimal; below `Decimal`'s resolution this is zero
    fn to_decimal(self) -> Decimal {
        if self.mantissa.is_zero() || self.exp < -28 {
            return Decimal::ZERO;
        }
        if self.exp < 0 {
            return self.mantissa * Decimal::new(1, self.exp.unsigned_abs());
        }
        u32::try_from(self.exp)
            .ok()
            .and_then(|e| 10i128.checked_pow(e))
            .and_then(|f| Decimal::try_from_i128_with_scale(f, 0).ok())
            .and_then(|f| self.mantissa.checked_mul(f))
            .unwrap_or(Decimal::MAX)
    }
}

/// `p^0 ..= p^n`
fn power_table(p: Decimal, n: u64) -> Vec<Scaled> {
    let p = Scaled::new(p);
    let mut table = Vec::with_capacity(n as usize + 1);
    let mut acc = Scaled::ONE;
    table.push(acc);
    for _ in 0..n {
        acc = acc.mul(p);
        table.push(acc);
    }
    table
}

/// Enumerate every tier partition of `bullets` pellets, weighted by `base_prob`
///
/// Multinomial coefficients are carried as running ratios across `cv` and
/// then `cc`. Partitions too unlikely to register as a `Decimal` are skipped.
fn enumerate_bullets(
    outcomes: &CritOutcomes,
    base_prob: Decimal,
    bullets: i64,
    base_damage: Decimal,
    steps: &mut Vec<DamageStep>,
) {
    if base_prob.is_zero() || bullets < 0 {
        return;
    }
    let n = bullets as u64;
    let nc_pow = power_table(outcomes.nc_prob, n);
    let cc_pow = power_table(outcomes.cc_prob, n);
    let cv_pow = power_table(outcomes.cv_prob, n);
    let base = Scaled::new(base_prob);

    let mut cv_coeff = Scaled::ONE;
    for cv_num in 0..=n {
        if cv_num > 0 {
            if outcomes.cv_prob.is_zero() {
                break;
            }
            cv_coeff = cv_coeff.ratio(n - cv_num + 1, cv_num);
        }

        let mut coeff = cv_coeff;
        for cc_num in 0..=(n - cv_num) {
            let nc_num = n - cv_num - cc_num;
            if cc_num > 0 {
                if outcomes.cc_prob.is_zero() {
                    break;
                }
                coeff = coeff.ratio(nc_num + 1, cc_num);
            }

            let probability = base
                .mul(coeff)
                .mul(nc_pow[nc_num as usize])
                .mul(cc_pow[cc_num as usize])
                .mul(cv_pow[cv_num as usize])
                .to_decimal();
            if probability.is_zero() {
                continue;
            }
            let multiplier = outcomes.nc_dmg * Decimal::from(nc_num)
                + outcomes.cc_dmg * Decimal::from(cc_num)
                + outcomes.cv_dmg * Decimal::from(cv_num);

            let mut step = DamageStep::new(probability, multiplier, step_label(outcomes.tier, bullets, nc_num, cc_num, cv_num));
            if nc_num > 0 {
                step.details.push(tier_detail(outcomes.tier, nc_num, outcomes.nc_dmg * base_damage));
            }
            if cc_num > 0 {
                step.details.push(tier_detail(outcomes.tier + 1, cc_num, outcomes.cc_dmg * base_damage));
            }
            if cv_num > 0 {
                step.details.push(tier_detail(outcomes.tier + 2, cv_num, outcomes.cv_dmg * base_damage));
            }
            steps.push(step);
        }
    }
}

fn step_label(tier: i64, bullets: i64, nc: u64, cc: u64, cv: u64) -> String {
    let mut label = format!("Bullets={}", bullets);
    if nc > 0 {
        if tier > 0 {
            label.push_str(&format!(", {}-Crit={}", tier, nc));
        } else {
            label.push_str(&format!(", Non-Crit={}", nc));
        }
    }
    if cc > 0 {
        label.push_str(&format!(", {}-Crit={}", tier + 1, cc));
    }
    if cv > 0 {
        label.push_str(&format!(", {}-Crit={}", tier + 2, cv));
    }
    label
}

fn tier_detail(tier: i64, count: u64, pellet_damage: Decimal) -> String {
    format!("{}-Crit: {}x {}", tier, count, to_fixed(pellet_damage, 1))
}

/// Steps of one shot for a possibly fractional pellet count
///
/// `floor(pellets)` and `floor(pellets) + 1` bullets are weighted by the
/// fractional remainder. Negative multishot yields the single step `Bullets=0`.
pub fn enumerate_steps(outcomes: &CritOutcomes, pellets: Decimal, base_damage: Decimal) -> Vec<DamageStep> {
    let whole = pellets.floor();
    let fraction = pellets - whole;
    let bullets = whole.to_i64().unwrap_or(0);

    let mut steps = Vec::new();
    enumerate_bullets(outcomes, Decimal::ONE - fraction, bullets, base_damage, &mut steps);
    enumerate_bullets(outcomes, fraction, bullets + 1, base_damage, &mut steps);

    if steps.is_empty() {
        steps.push(DamageStep::new(Decimal::ONE, Decimal::ZERO, "Bullets=0"));
    }
    steps
}

/// Split each step into a chamber proc (chance `1 / magazine`) and a plain shot
pub fn split_charged_chamber(steps: Vec<DamageStep>, magazine_size: Decimal, chamber_multiplier: Decimal) -> Vec<DamageStep> {
    let p1 = safe_div(Decimal::ONE, magazine_size);
    let p2 = Decimal::ONE - p1;
    let mut out = Vec::with_capacity(steps.len() * 2);
    for step in steps {
        out.push(DamageStep {
            probability: step.probability * p1,
            multiplier: step.multiplier * chamber_multiplier,
            label: format!("{}, Charged Chamber", step.label),
            details: step.details.clone(),
        });
        out.push(DamageStep {
            probability: step.probability * p2,
            ..step
        });
    }
    out
}

/// Drop impossible steps and sort ascending by multiplier, keeping ties in order
pub fn finalize_steps(mut steps: Vec<DamageStep>) -> Vec<DamageStep> {
    steps.retain(|s| !s.probability.is_zero());
    steps.sort_by(|a, b| a.multiplier.cmp(&b.multiplier));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn sum(steps: &[DamageStep]) -> Decimal {
        steps.iter().map(|s| s.probability).sum()
    }

    #[test]
    fn test_outcomes_below_one() {
        let o = CritOutcomes::new(dec!(0.25), dec!(2), dec!(0.1));
        assert_eq!(o.tier, 0);
        assert_eq!(o.nc_prob, dec!(0.75));
        assert_eq!(o.cc_prob, dec!(0.225));
        assert_eq!(o.cv_prob, dec!(0.025));
        assert_eq!(o.nc_dmg, dec!(1));
        assert_eq!(o.cc_dmg, dec!(2));
        assert_eq!(o.cv_dmg, dec!(3));
    }

    #[test]
    fn test_outcomes_above_one() {
        let o = CritOutcomes::new(dec!(1.5), dec!(3), dec!(0.2));
        assert_eq!(o.tier, 1);
        assert_eq!(o.nc_prob, dec!(0.4));
        assert_eq!(o.cc_prob, dec!(0.5));
        assert_eq!(o.cv_prob, dec!(0.1));
        assert_eq!(o.nc_prob + o.cc_prob + o.cv_prob, Decimal::ONE);
        assert_eq!(o.nc_dmg, dec!(3));
        assert_eq!(o.cc_dmg, dec!(5));
    }

    #[test]
    fn test_negative_tier_multiplier_floors() {
        let o = CritOutcomes::new(dec!(1), dec!(-1), Decimal::ZERO);
        assert_eq!(o.nc_dmg, Decimal::ZERO);
    }

    #[test]
    fn test_guaranteed_crit_single_step() {
        let o = CritOutcomes::new(dec!(1), dec!(2), Decimal::ZERO);
        let steps = finalize_steps(enumerate_steps(&o, dec!(1), dec!(10)));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].probability, Decimal::ONE);
        assert_eq!(steps[0].multiplier, dec!(2));
        assert_eq!(steps[0].label, "Bullets=1, 1-Crit=1");
        assert_eq!(steps[0].details, vec!["1-Crit: 1x 20.0".to_string()]);
    }

    #[test]
    fn test_no_crit_single_step() {
        let o = CritOutcomes::new(Decimal::ZERO, dec!(2), dec!(0.05));
        let steps = finalize_steps(enumerate_steps(&o, dec!(1), dec!(10)));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].label, "Bullets=1, Non-Crit=1");
        assert_eq!(steps[0].details, vec!["0-Crit: 1x 10.0".to_string()]);
    }

    #[test]
    fn test_fractional_pellets() {
        let o = CritOutcomes::new(Decimal::ZERO, dec!(2), Decimal::ZERO);
        let steps = finalize_steps(enumerate_steps(&o, dec!(1.5), dec!(10)));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].probability, dec!(0.5));
        assert_eq!(steps[0].multiplier, dec!(1));
        assert_eq!(steps[1].multiplier, dec!(2));
        assert_eq!(steps[1].label, "Bullets=2, Non-Crit=2");
    }

    #[test]
    fn test_binomial_two_pellets() {
        let o = CritOutcomes::new(dec!(0.5), dec!(2), Decimal::ZERO);
        let steps = finalize_steps(enumerate_steps(&o, dec!(2), dec!(10)));
        let probs: Vec<Decimal> = steps.iter().map(|s| s.probability).collect();
        assert_eq!(probs, vec![dec!(0.25), dec!(0.5), dec!(0.25)]);
        assert_eq!(steps[1].label, "Bullets=2, Non-Crit=1, 1-Crit=1");
    }

    #[test]
    fn test_negative_multishot() {
        let o = CritOutcomes::new(dec!(0.5), dec!(2), Decimal::ZERO);
        let steps = enumerate_steps(&o, dec!(-2), dec!(10));
        assert_eq!(steps, vec![DamageStep::new(Decimal::ONE, Decimal::ZERO, "Bullets=0")]);
    }

    #[test]
    fn test_charged_chamber_split() {
        let o = CritOutcomes::new(Decimal::ZERO, dec!(2), Decimal::ZERO);
        let steps = enumerate_steps(&o, dec!(1), dec!(10));
        let split = finalize_steps(split_charged_chamber(steps, dec!(4), dec!(1.4)));
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].probability, dec!(0.75));
        assert_eq!(split[1].probability, dec!(0.25));
        assert_eq!(split[1].multiplier, dec!(1.4));
        assert!(split[1].label.ends_with(", Charged Chamber"));
    }

    #[test]
    fn test_boss_mitigation_caps_excess() {
        // 1000 base, 1 pellet, 1 shot/s, threshold 300
        let mut o = CritOutcomes::new(Decimal::ZERO, dec!(2), Decimal::ZERO);
        o.apply_boss_mitigation(dec!(1000), dec!(300), dec!(1), dec!(1), dec!(2), dec!(0.1));
        assert_eq!(o.nc_dmg * dec!(1000), dec!(370));
        // crit tier doubled: 4 × 1000 raw → 300 + 3700 × 0.1
        assert_eq!(o.cc_dmg * dec!(1000), dec!(670));
    }

    #[test]
    fn test_boss_mitigation_doubles_guaranteed_tier() {
        // tier 1 guaranteed: nc is a crit and is doubled too
        let mut o = CritOutcomes::new(dec!(1.5), dec!(2), Decimal::ZERO);
        assert_eq!(o.nc_dmg, dec!(2));
        assert_eq!(o.cc_dmg, dec!(3));
        o.apply_boss_mitigation(dec!(1000), dec!(300), dec!(1), dec!(1), dec!(2), dec!(0.1));
        // 4 × 1000 raw → 300 + 3700 × 0.1
        assert_eq!(o.nc_dmg * dec!(1000), dec!(670));
        // 6 × 1000 raw → 300 + 5700 × 0.1
        assert_eq!(o.cc_dmg * dec!(1000), dec!(870));
    }

    #[test]
    fn test_many_pellets() {
        let o = CritOutcomes::new(dec!(0.5), dec!(2), Decimal::ZERO);
        let steps = finalize_steps(enumerate_steps(&o, dec!(120), dec!(10)));
        assert!((sum(&steps) - Decimal::ONE).abs() < dec!(0.000000001), "sum = {}", sum(&steps));
        let mean: Decimal = steps.iter().map(|s| s.probability * s.multiplier).sum();
        // 120 × (0.5 × 1 + 0.5 × 2)
        assert!((mean - dec!(180)).abs() < dec!(0.000001), "mean = {}", mean);
        // the all-crit partition is below decimal resolution and dropped
        assert!(steps.len() < 121);
    }

    #[test]
    fn test_many_pellets_with_vigilante() {
        let o = CritOutcomes::new(dec!(0.5), dec!(2), dec!(0.3));
        let steps = finalize_steps(enumerate_steps(&o, dec!(70.5), dec!(10)));
        assert!((sum(&steps) - Decimal::ONE).abs() < dec!(0.000000001), "sum = {}", sum(&steps));
        assert!(steps.iter().all(|s| s.probability > Decimal::ZERO));
    }

    #[test]
    fn test_scaled_keeps_huge_coefficients() {
        // C(200, 100) ≈ 9.05e58 overflows Decimal on its own
        let mut coeff = Scaled::ONE;
        for k in 1..=100u64 {
            coeff = coeff.ratio(200 - k + 1, k);
        }
        assert_eq!(coeff.exp, 58);
        let half = power_table(dec!(0.5), 200);
        let term = coeff.mul(half[200]).to_decimal();
        // C(200, 100) / 2^200 ≈ 0.0563
        assert_eq!(term.round_dp(4), dec!(0.0563));
        assert_eq!(Scaled::new(dec!(0.001)).mul(Scaled::new(Decimal::new(1, 27))).to_decimal(), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn probabilities_sum_to_one(
            crit in 0u32..400,
            vig in 0u32..=30,
            pellets in 0u32..1200,
        ) {
            let o = CritOutcomes::new(Decimal::new(crit as i64, 2), dec!(2.5), Decimal::new(vig as i64, 2));
            let steps = finalize_steps(enumerate_steps(&o, Decimal::new(pellets as i64, 2), dec!(10)));
            let total = sum(&steps);
            prop_assert!((total - Decimal::ONE).abs() < dec!(0.0000000001), "sum = {}", total);
            prop_assert!(steps.windows(2).all(|w| w[0].multiplier <= w[1].multiplier));
        }
    }
}
