//! Core enumerations shared by the catalog, the engine and the share-string codec

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Damage types carried by a shot
///
/// Declared in wire-name order so that ordered maps iterate the same way the
/// extracted catalog lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DamageType {
    #[serde(rename = "DT_CORROSIVE")]
    Corrosive,
    #[serde(rename = "DT_ELECTRICITY")]
    Electricity,
    #[serde(rename = "DT_EXPLOSION")]
    Explosion,
    #[serde(rename = "DT_FIRE")]
    Fire,
    #[serde(rename = "DT_FREEZE")]
    Freeze,
    #[serde(rename = "DT_GAS")]
    Gas,
    #[serde(rename = "DT_IMPACT")]
    Impact,
    #[serde(rename = "DT_MAGNETIC")]
    Magnetic,
    #[serde(rename = "DT_POISON")]
    Poison,
    #[serde(rename = "DT_PUNCTURE")]
    Puncture,
    #[serde(rename = "DT_RADIANT")]
    Radiant,
    #[serde(rename = "DT_RADIATION")]
    Radiation,
    #[serde(rename = "DT_SENTIENT")]
    Sentient,
    #[serde(rename = "DT_SLASH")]
    Slash,
    #[serde(rename = "DT_VIRAL")]
    Viral,
}

impl DamageType {
    /// Get all damage types
    pub fn all() -> &'static [DamageType] {
        &[
            DamageType::Corrosive,
            DamageType::Electricity,
            DamageType::Explosion,
            DamageType::Fire,
            DamageType::Freeze,
            DamageType::Gas,
            DamageType::Impact,
            DamageType::Magnetic,
            DamageType::Poison,
            DamageType::Puncture,
            DamageType::Radiant,
            DamageType::Radiation,
            DamageType::Sentient,
            DamageType::Slash,
            DamageType::Viral,
        ]
    }

    /// Name used in catalogs and share strings
    pub fn wire_name(self) -> &'static str {
        match self {
            DamageType::Corrosive => "DT_CORROSIVE",
            DamageType::Electricity => "DT_ELECTRICITY",
            DamageType::Explosion => "DT_EXPLOSION",
            DamageType::Fire => "DT_FIRE",
            DamageType::Freeze => "DT_FREEZE",
            DamageType::Gas => "DT_GAS",
            DamageType::Impact => "DT_IMPACT",
            DamageType::Magnetic => "DT_MAGNETIC",
            DamageType::Poison => "DT_POISON",
            DamageType::Puncture => "DT_PUNCTURE",
            DamageType::Radiant => "DT_RADIANT",
            DamageType::Radiation => "DT_RADIATION",
            DamageType::Sentient => "DT_SENTIENT",
            DamageType::Slash => "DT_SLASH",
            DamageType::Viral => "DT_VIRAL",
        }
    }

    /// In-game display name
    pub fn display_name(self) -> &'static str {
        match self {
            DamageType::Corrosive => "Corrosive",
            DamageType::Electricity => "Electricity",
            DamageType::Explosion => "Blast",
            DamageType::Fire => "Heat",
            DamageType::Freeze => "Cold",
            DamageType::Gas => "Gas",
            DamageType::Impact => "Impact",
            DamageType::Magnetic => "Magnetic",
            DamageType::Poison => "Toxin",
            DamageType::Puncture => "Puncture",
            DamageType::Radiant => "Void",
            DamageType::Radiation => "Radiation",
            DamageType::Sentient => "Sentient",
            DamageType::Slash => "Slash",
            DamageType::Viral => "Viral",
        }
    }

    /// Base elemental types take part in compound formation when folded
    pub fn is_base_elemental(self) -> bool {
        matches!(
            self,
            DamageType::Fire | DamageType::Freeze | DamageType::Electricity | DamageType::Poison
        )
    }
}

impl FromStr for DamageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DamageType::all()
            .iter()
            .copied()
            .find(|t| t.wire_name() == s)
            .ok_or_else(|| format!("unknown damage type: {}", s))
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Health, armor and shield classes of an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthType {
    #[serde(rename = "RK_NONE")]
    None,
    #[serde(rename = "RK_ARMOR")]
    Armor,
    #[serde(rename = "RK_CLONED_FLESH")]
    ClonedFlesh,
    #[serde(rename = "RK_FLESH")]
    Flesh,
    #[serde(rename = "RK_FOSSILIZED")]
    Fossilized,
    #[serde(rename = "RK_HEAVY_SHIELD")]
    HeavyShield,
    #[serde(rename = "RK_HULKING_ARMOR")]
    HulkingArmor,
    #[serde(rename = "RK_INFESTED")]
    Infested,
    #[serde(rename = "RK_INFESTED_ARMOUR")]
    InfestedArmour,
    #[serde(rename = "RK_INFESTED_FLESH")]
    InfestedFlesh,
    #[serde(rename = "RK_MACHINERY")]
    Machinery,
    #[serde(rename = "RK_ROBOTIC")]
    Robotic,
    #[serde(rename = "RK_SHIELD")]
    Shield,
    #[serde(rename = "RK_TENNO_ARMOR")]
    TennoArmor,
    #[serde(rename = "RK_TENNO_FLESH")]
    TennoFlesh,
    #[serde(rename = "RK_TENNO_SHIELD")]
    TennoShield,
}

impl HealthType {
    pub fn display_name(self) -> &'static str {
        match self {
            HealthType::None => "Untyped",
            HealthType::Armor => "Ferrite Armor",
            HealthType::ClonedFlesh => "Cloned Flesh",
            HealthType::Flesh => "Flesh",
            HealthType::Fossilized => "Fossilized",
            HealthType::HeavyShield => "Proto Shield",
            HealthType::HulkingArmor => "Alloy Armor",
            HealthType::Infested => "Infested",
            HealthType::InfestedArmour => "Infested Sinew",
            HealthType::InfestedFlesh => "Infested Flesh",
            HealthType::Machinery => "Machinery",
            HealthType::Robotic => "Robotic",
            HealthType::Shield => "Shield",
            HealthType::TennoArmor => "Tenno Armor",
            HealthType::TennoFlesh => "Tenno Flesh",
            HealthType::TennoShield => "Tenno Shield",
        }
    }
}

impl fmt::Display for HealthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Enemy factions, keyed by faction-damage effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    Corpus,
    Grineer,
    Infestation,
    Neutral,
    Predator,
    Prey,
    Orokin,
    Sentient,
    #[serde(rename = "TENNO")]
    Tenno,
    #[serde(rename = "Red Veil")]
    RedVeil,
    Stalker,
}

impl Faction {
    pub fn all() -> &'static [Faction] {
        &[
            Faction::Corpus,
            Faction::Grineer,
            Faction::Infestation,
            Faction::Neutral,
            Faction::Predator,
            Faction::Prey,
            Faction::Orokin,
            Faction::Sentient,
            Faction::Tenno,
            Faction::RedVeil,
            Faction::Stalker,
        ]
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Faction::Corpus => "Corpus",
            Faction::Grineer => "Grineer",
            Faction::Infestation => "Infestation",
            Faction::Neutral => "Neutral",
            Faction::Predator => "Predator",
            Faction::Prey => "Prey",
            Faction::Orokin => "Orokin",
            Faction::Sentient => "Sentient",
            Faction::Tenno => "TENNO",
            Faction::RedVeil => "Red Veil",
            Faction::Stalker => "Stalker",
        }
    }
}

impl FromStr for Faction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Faction::all()
            .iter()
            .copied()
            .find(|f| f.wire_name() == s)
            .ok_or_else(|| format!("unknown faction: {}", s))
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Riven roll tables are split by weapon category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RivenCategory {
    Rifle,
    Shotgun,
    Pistol,
    Amp,
    Melee,
    Archgun,
}

/// How a weapon mode delivers its damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    Hitscan,
    Beam,
    Projectile,
    ChargedProjectile,
    ProjectileExplosive,
}

impl AttackType {
    pub fn display_name(self) -> &'static str {
        match self {
            AttackType::Hitscan => "Hitscan",
            AttackType::Beam => "Beam",
            AttackType::Projectile => "Projectile",
            AttackType::ChargedProjectile => "Projectile (Charged)",
            AttackType::ProjectileExplosive => "Projectile (Explosive)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_type_wire_names_round_trip() {
        for dt in DamageType::all() {
            assert_eq!(dt.wire_name().parse::<DamageType>(), Ok(*dt));
        }
        assert!("DT_BOGUS".parse::<DamageType>().is_err());
    }

    #[test]
    fn test_damage_type_order_follows_wire_names() {
        let names: Vec<&str> = DamageType::all().iter().map(|d| d.wire_name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_faction_serde_names() {
        let json = serde_json::to_string(&Faction::RedVeil).unwrap();
        assert_eq!(json, "\"Red Veil\"");
        assert_eq!("TENNO".parse::<Faction>(), Ok(Faction::Tenno));
    }
}
