//! CalcResult - Outcome of resolving one build against one environment

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::DamageType;

/// One crit/vigilante partition of a shot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageStep {
    pub probability: Decimal,
    /// Sum of the per-pellet tier multipliers
    pub multiplier: Decimal,
    /// e.g. `Bullets=2, Non-Crit=1, 1-Crit=1`
    pub label: String,
    /// Per-tier breakdown, e.g. `1-Crit: 1x 52.5`
    pub details: Vec<String>,
}

impl DamageStep {
    pub fn new(probability: Decimal, multiplier: Decimal, label: impl Into<String>) -> Self {
        DamageStep {
            probability,
            multiplier,
            label: label.into(),
            details: Vec::new(),
        }
    }
}

/// Resolved weapon stats and shot distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcResult {
    // === Throughput ===
    pub magazine_size: Decimal,
    /// Effective shots per second
    pub fire_rate: Decimal,
    pub reload_time: Decimal,

    // === Critical ===
    pub crit_chance: Decimal,
    pub crit_damage: Decimal,

    // === Damage ===
    /// Normalized damage type fractions
    pub damage_dist: BTreeMap<DamageType, Decimal>,
    /// Mitigated base damage of one pellet
    pub damage_amount: Decimal,
    pub pellets: Decimal,

    // === Status ===
    pub proc_chance: Decimal,
    pub proc_chance_per_pellet: Decimal,

    // === Distribution ===
    /// Sorted ascending by multiplier
    pub steps: Vec<DamageStep>,
    pub damage_per_shot: Decimal,
    pub burst_dps: Decimal,
    pub sustained_dps: Decimal,
}

impl CalcResult {
    pub fn probability_sum(&self) -> Decimal {
        self.steps.iter().map(|s| s.probability).sum()
    }

    /// `Σ probability × multiplier`
    pub fn expected_multiplier(&self) -> Decimal {
        self.steps.iter().map(|s| s.probability * s.multiplier).sum()
    }
}
