//! Game constants configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tunable game constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameConstants {
    #[serde(default)]
    pub scaling: ScalingConstants,
    #[serde(default)]
    pub armor: ArmorConstants,
    #[serde(default)]
    pub crit: CritConstants,
    #[serde(default)]
    pub mitigation: MitigationConstants,
    #[serde(default)]
    pub riven: RivenConstants,
}

/// Blend of a low-level and a high-level power curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingCurve {
    pub e_low: Decimal,
    pub c_low: Decimal,
    pub e_high: Decimal,
    pub c_high: Decimal,
}

impl ScalingCurve {
    pub const fn new(e_low: Decimal, c_low: Decimal, e_high: Decimal, c_high: Decimal) -> Self {
        ScalingCurve { e_low, c_low, e_high, c_high }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingConstants {
    #[serde(default = "default_armor_curve")]
    pub armor: ScalingCurve,
    #[serde(default = "default_health_curve")]
    pub health: ScalingCurve,
    #[serde(default = "default_shield_curve")]
    pub shield: ScalingCurve,
    /// Level difference where the blend toward the high curve starts
    #[serde(default = "default_blend_start")]
    pub blend_start: Decimal,
    /// Level span of the blend
    #[serde(default = "default_blend_width")]
    pub blend_width: Decimal,
}

impl Default for ScalingConstants {
    fn default() -> Self {
        ScalingConstants {
            armor: default_armor_curve(),
            health: default_health_curve(),
            shield: default_shield_curve(),
            blend_start: default_blend_start(),
            blend_width: default_blend_width(),
        }
    }
}

fn default_armor_curve() -> ScalingCurve {
    ScalingCurve::new(dec!(1.75), dec!(0.005), dec!(0.75), dec!(0.4))
}
fn default_health_curve() -> ScalingCurve {
    ScalingCurve::new(dec!(2), dec!(0.015), dec!(0.5), dec!(10.7331))
}
fn default_shield_curve() -> ScalingCurve {
    ScalingCurve::new(dec!(1.75), dec!(0.02), dec!(0.75), dec!(1.6))
}
fn default_blend_start() -> Decimal {
    dec!(70)
}
fn default_blend_width() -> Decimal {
    dec!(10)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorConstants {
    /// Formula constant: factor = (1 − m) / (armor × (1 + m) / divisor + 1)
    #[serde(default = "default_armor_divisor")]
    pub divisor: Decimal,
}

impl Default for ArmorConstants {
    fn default() -> Self {
        ArmorConstants {
            divisor: default_armor_divisor(),
        }
    }
}

fn default_armor_divisor() -> Decimal {
    dec!(300)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritConstants {
    /// Crit multiplier factor on headshots
    #[serde(default = "default_headshot_crit_factor")]
    pub headshot_factor: Decimal,
    /// Upper bound of the vigilante upgrade chance
    #[serde(default = "default_vigilante_cap")]
    pub vigilante_cap: Decimal,
    /// Crit multiplier factor of the Volt/Odonata shield buff
    #[serde(default = "default_shield_buff_factor")]
    pub shield_buff_factor: Decimal,
    /// Harrow's crit chance bonus factor on headshots
    #[serde(default = "default_harrow_headshot_factor")]
    pub harrow_headshot_factor: Decimal,
}

impl Default for CritConstants {
    fn default() -> Self {
        CritConstants {
            headshot_factor: default_headshot_crit_factor(),
            vigilante_cap: default_vigilante_cap(),
            shield_buff_factor: default_shield_buff_factor(),
            harrow_headshot_factor: default_harrow_headshot_factor(),
        }
    }
}

fn default_headshot_crit_factor() -> Decimal {
    Decimal::TWO
}
fn default_vigilante_cap() -> Decimal {
    dec!(0.3)
}
fn default_shield_buff_factor() -> Decimal {
    Decimal::TWO
}
fn default_harrow_headshot_factor() -> Decimal {
    dec!(4)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationConstants {
    /// Fraction of damage above the threshold that is kept
    #[serde(default = "default_excess_factor")]
    pub excess_factor: Decimal,
    /// Crit tier multiplier factor against mitigated bosses
    #[serde(default = "default_boss_crit_factor")]
    pub crit_factor: Decimal,
}

impl Default for MitigationConstants {
    fn default() -> Self {
        MitigationConstants {
            excess_factor: default_excess_factor(),
            crit_factor: default_boss_crit_factor(),
        }
    }
}

fn default_excess_factor() -> Decimal {
    dec!(0.1)
}
fn default_boss_crit_factor() -> Decimal {
    Decimal::TWO
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RivenConstants {
    #[serde(default = "default_roll_scale")]
    pub roll_scale: Decimal,
    /// Mod rank 8 of 8
    #[serde(default = "default_rank_factor")]
    pub rank_factor: Decimal,
    #[serde(default = "default_fit_attenuation")]
    pub fit_attenuation: Decimal,
    #[serde(default = "default_two_buff")]
    pub two_buff: Decimal,
    #[serde(default = "default_three_buff")]
    pub three_buff: Decimal,
    /// Buff premium when a curse is present
    #[serde(default = "default_curse_premium")]
    pub curse_premium: Decimal,
    #[serde(default = "default_two_buff_curse")]
    pub two_buff_curse: Decimal,
    #[serde(default = "default_three_buff_curse")]
    pub three_buff_curse: Decimal,
    /// Relative half-width of the plausible roll band
    #[serde(default = "default_band")]
    pub band: Decimal,
}

impl Default for RivenConstants {
    fn default() -> Self {
        RivenConstants {
            roll_scale: default_roll_scale(),
            rank_factor: default_rank_factor(),
            fit_attenuation: default_fit_attenuation(),
            two_buff: default_two_buff(),
            three_buff: default_three_buff(),
            curse_premium: default_curse_premium(),
            two_buff_curse: default_two_buff_curse(),
            three_buff_curse: default_three_buff_curse(),
            band: default_band(),
        }
    }
}

fn default_roll_scale() -> Decimal {
    dec!(10)
}
fn default_rank_factor() -> Decimal {
    dec!(9)
}
fn default_fit_attenuation() -> Decimal {
    dec!(1.5)
}
fn default_two_buff() -> Decimal {
    dec!(0.66)
}
fn default_three_buff() -> Decimal {
    dec!(0.5)
}
fn default_curse_premium() -> Decimal {
    dec!(1.25)
}
fn default_two_buff_curse() -> Decimal {
    dec!(-0.33)
}
fn default_three_buff_curse() -> Decimal {
    dec!(-0.5)
}
fn default_band() -> Decimal {
    dec!(0.1)
}
