//! DamageDistribution - Per-type damage amounts with compound formation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decimal::safe_div;
use crate::types::DamageType;

/// Compound damage types and the two base elements forming them
///
/// Table order decides which compound wins when several could form.
pub const COMPOUNDS: [(DamageType, [DamageType; 2]); 6] = [
    (DamageType::Explosion, [DamageType::Fire, DamageType::Freeze]),
    (DamageType::Gas, [DamageType::Fire, DamageType::Poison]),
    (DamageType::Radiation, [DamageType::Fire, DamageType::Electricity]),
    (DamageType::Viral, [DamageType::Freeze, DamageType::Poison]),
    (DamageType::Magnetic, [DamageType::Freeze, DamageType::Electricity]),
    (DamageType::Corrosive, [DamageType::Poison, DamageType::Electricity]),
];

/// The compound formed by two base elements, if any
pub fn compound_of(a: DamageType, b: DamageType) -> Option<DamageType> {
    COMPOUNDS
        .iter()
        .find(|(_, pair)| (pair[0] == a && pair[1] == b) || (pair[0] == b && pair[1] == a))
        .map(|(compound, _)| *compound)
}

/// Mutable `type → amount` map built while folding effects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDistribution {
    amounts: BTreeMap<DamageType, Decimal>,
}

impl DamageDistribution {
    pub fn new() -> Self {
        DamageDistribution::default()
    }

    pub fn get(&self, damage_type: DamageType) -> Option<Decimal> {
        self.amounts.get(&damage_type).copied()
    }

    pub fn contains(&self, damage_type: DamageType) -> bool {
        self.amounts.contains_key(&damage_type)
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DamageType, Decimal)> + '_ {
        self.amounts.iter().map(|(k, v)| (*k, *v))
    }

    pub fn as_map(&self) -> &BTreeMap<DamageType, Decimal> {
        &self.amounts
    }

    /// Add an amount without compound formation
    pub fn add_plain(&mut self, damage_type: DamageType, amount: Decimal) {
        *self.amounts.entry(damage_type).or_insert(Decimal::ZERO) += amount;
    }

    /// `amount += weapon_base × multiplier`
    pub fn add_physical(&mut self, damage_type: DamageType, multiplier: Decimal, weapon_base: Decimal) {
        self.add_plain(damage_type, weapon_base * multiplier);
    }

    /// Add an elemental amount, forming compounds
    ///
    /// 1. an existing compound containing `damage_type` absorbs the amount
    /// 2. otherwise a standalone partner is replaced by the compound holding `partner + amount`
    /// 3. otherwise the amount lands on `damage_type` itself
    pub fn add_elemental(&mut self, damage_type: DamageType, amount: Decimal) {
        let candidates: Vec<(DamageType, DamageType)> = COMPOUNDS
            .iter()
            .filter(|(_, pair)| pair.contains(&damage_type))
            .map(|(compound, pair)| {
                let partner = if pair[0] == damage_type { pair[1] } else { pair[0] };
                (*compound, partner)
            })
            .collect();

        if let Some((compound, _)) = candidates.iter().find(|(c, _)| self.contains(*c)) {
            self.add_plain(*compound, amount);
            return;
        }

        for (compound, partner) in &candidates {
            if let Some(existing) = self.amounts.remove(partner) {
                self.amounts.insert(*compound, existing + amount);
                return;
            }
        }

        self.add_plain(damage_type, amount);
    }

    /// Fold a weapon's base damage map, which applies after every effect
    pub fn fold_weapon(&mut self, base: &BTreeMap<DamageType, Decimal>) {
        for (damage_type, amount) in base {
            if damage_type.is_base_elemental() {
                self.add_elemental(*damage_type, *amount);
            } else {
                self.add_plain(*damage_type, *amount);
            }
        }
    }

    /// Drop every entry whose amount is not positive
    pub fn drop_non_positive(&mut self) {
        self.amounts.retain(|_, amount| *amount > Decimal::ZERO);
    }

    /// Merge another distribution additively, never forming compounds
    pub fn merge(&mut self, other: &DamageDistribution) {
        for (damage_type, amount) in other.iter() {
            self.add_plain(damage_type, amount);
        }
    }

    pub fn total(&self) -> Decimal {
        self.amounts.values().copied().sum()
    }

    /// Fractions of the total, empty-safe
    pub fn normalized(&self) -> BTreeMap<DamageType, Decimal> {
        let total = self.total();
        self.amounts
            .iter()
            .map(|(k, v)| (*k, safe_div(*v, total)))
            .collect()
    }
}

impl FromIterator<(DamageType, Decimal)> for DamageDistribution {
    fn from_iter<I: IntoIterator<Item = (DamageType, Decimal)>>(iter: I) -> Self {
        DamageDistribution {
            amounts: iter.into_iter().collect(),
        }
    }
}
