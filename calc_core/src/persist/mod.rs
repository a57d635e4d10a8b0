//! Persist - Share-string codec for builds and their environment
//!
//! A share string is the JSON document
//! `{builds: [...], modifiers: {enemy, switches, modifiers}}` encoded as
//! URL-safe base64 without padding. Decoding also accepts padded input, the
//! standard alphabet, a leading `#`, and the legacy multi-build form
//! `b0=<build>&b1=<build>` which carries builds only.
//!
//! Older documents may lack the description, the exilus slot, ranks, or the
//! critical-headshot flag of a boss; those fall back to defaults.

use base64::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::build::{Build, Environment, Switches};
use crate::config::Catalog;
use crate::enemy::{BossDamageMitigation, CustomEnemyPreset, Enemy, EnemyStats};
use crate::source::{Loadout, Modifier, ModifierValue, RivenMod, RivenStat, ScaledMod, RIVEN_SLOTS};
use crate::types::{Faction, HealthType};

/// Share-string decoding error
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid number of serialized mods: {0}")]
    ModCount(usize),
    #[error("Invalid riven mod stats length: {0}")]
    RivenCount(usize),
    #[error("Unknown {kind}: {id}")]
    UnknownId { kind: &'static str, id: String },
}

fn unknown(kind: &'static str, id: &str) -> PersistError {
    PersistError::UnknownId {
        kind,
        id: id.to_string(),
    }
}

/// Builds plus the environment they are compared in
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SharedState {
    pub builds: Vec<Build>,
    pub environment: Environment,
}

impl SharedState {
    pub fn new(builds: Vec<Build>, environment: Environment) -> Self {
        SharedState {
            builds,
            environment,
        }
    }
}

// =============================================================================
// Wire layout
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct SavedData {
    builds: Vec<SavedBuild>,
    modifiers: SavedModifiers,
}

type SavedModifier = (String, Option<ModifierValue>);

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedBuild {
    #[serde(default)]
    description: String,
    weapon: String,
    mods: Vec<SavedMod>,
    #[serde(default = "empty_riven")]
    riven: Vec<Option<(String, Decimal)>>,
    #[serde(default)]
    local_modifiers: Vec<SavedModifier>,
}

fn empty_riven() -> Vec<Option<(String, Decimal)>> {
    vec![None; RIVEN_SLOTS]
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum SavedMod {
    Ranked { name: String, rank: u32 },
    /// Name only; taken at max rank
    Legacy(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedModifiers {
    enemy: SavedEnemy,
    #[serde(default)]
    switches: BTreeMap<String, bool>,
    #[serde(default)]
    modifiers: Vec<SavedModifier>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedEnemy {
    stats: SavedEnemyStats,
    #[serde(default)]
    level: Option<u32>,
    #[serde(default)]
    armor_multiplier: Value,
    #[serde(default)]
    armor_subtraction: Value,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum SavedEnemyStats {
    /// Unique name of a catalog preset
    Preset(String),
    Custom(SavedCustomEnemy),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedCustomEnemy {
    armor_type: HealthType,
    armor_base: Decimal,
    health_type: HealthType,
    health_base: Decimal,
    shield_type: HealthType,
    shield_base: Decimal,
    faction: Faction,
    base_level: u32,
    #[serde(default = "default_level")]
    default_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    damage_mitigation: Option<SavedMitigation>,
    #[serde(default = "default_headshot_multiplier")]
    headshot_multiplier: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedMitigation {
    threshold: Decimal,
    multiplier: Decimal,
    #[serde(default)]
    use_critical_headshot: bool,
}

fn default_level() -> u32 {
    100
}

fn default_headshot_multiplier() -> Decimal {
    Decimal::TWO
}

impl From<&CustomEnemyPreset> for SavedCustomEnemy {
    fn from(c: &CustomEnemyPreset) -> Self {
        SavedCustomEnemy {
            armor_type: c.armor_type,
            armor_base: c.armor_base,
            health_type: c.health_type,
            health_base: c.health_base,
            shield_type: c.shield_type,
            shield_base: c.shield_base,
            faction: c.faction,
            base_level: c.base_level,
            default_level: c.default_level,
            damage_mitigation: c.damage_mitigation.as_ref().map(|dm| SavedMitigation {
                threshold: dm.threshold,
                multiplier: dm.multiplier,
                use_critical_headshot: dm.use_critical_headshot,
            }),
            headshot_multiplier: c.headshot_multiplier,
        }
    }
}

impl From<SavedCustomEnemy> for CustomEnemyPreset {
    fn from(s: SavedCustomEnemy) -> Self {
        CustomEnemyPreset {
            armor_type: s.armor_type,
            armor_base: s.armor_base,
            health_type: s.health_type,
            health_base: s.health_base,
            shield_type: s.shield_type,
            shield_base: s.shield_base,
            faction: s.faction,
            base_level: s.base_level,
            default_level: s.default_level,
            damage_mitigation: s.damage_mitigation.map(|dm| BossDamageMitigation {
                threshold: dm.threshold,
                multiplier: dm.multiplier,
                use_critical_headshot: dm.use_critical_headshot,
            }),
            headshot_multiplier: s.headshot_multiplier,
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Serialize to the share-string JSON document
pub fn to_json(state: &SharedState) -> Result<String, PersistError> {
    let data = SavedData {
        builds: state.builds.iter().map(save_build).collect(),
        modifiers: save_environment(&state.environment),
    };
    Ok(serde_json::to_string(&data)?)
}

/// Serialize and encode as URL-safe base64 without padding
pub fn encode(state: &SharedState) -> Result<String, PersistError> {
    let json = to_json(state)?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

fn save_build(build: &Build) -> SavedBuild {
    SavedBuild {
        description: build.description.clone(),
        weapon: build.weapon.name.clone(),
        mods: build
            .loadout
            .iter()
            .map(|slot| SavedMod::Ranked {
                name: slot.item.name.clone(),
                rank: slot.rank,
            })
            .collect(),
        riven: build
            .riven
            .slots
            .iter()
            .map(|slot| slot.as_ref().map(|s| (s.upgrade.tag(), s.value)))
            .collect(),
        local_modifiers: build.local_modifiers.iter().map(save_modifier).collect(),
    }
}

fn save_modifier(modifier: &Modifier) -> SavedModifier {
    (modifier.definition.id.clone(), modifier.value)
}

fn save_environment(env: &Environment) -> SavedModifiers {
    let enemy = &env.enemy;
    let stats = match &enemy.stats {
        EnemyStats::Preset(p) => SavedEnemyStats::Preset(p.unique_name.clone()),
        EnemyStats::Custom(c) => SavedEnemyStats::Custom(c.into()),
    };
    let mut switches = BTreeMap::new();
    switches.insert("enableInnateBuffs".to_string(), env.switches.enable_innate_buffs);
    switches.insert("enableVigilanteBuffs".to_string(), env.switches.enable_vigilante_buffs);
    SavedModifiers {
        enemy: SavedEnemy {
            stats,
            level: enemy.level,
            armor_multiplier: Value::String(enemy.armor_multiplier.to_string()),
            armor_subtraction: Value::String(enemy.armor_subtraction.to_string()),
        },
        switches,
        modifiers: env.global_modifiers.iter().map(save_modifier).collect(),
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a share string against the catalog
pub fn decode(share: &str, catalog: &Catalog) -> Result<SharedState, PersistError> {
    let share = share.trim().trim_start_matches('#');
    if let Some(pairs) = legacy_pairs(share) {
        let builds = pairs
            .into_iter()
            .map(|encoded| {
                let json = decode_text(encoded)?;
                let saved: SavedBuild = serde_json::from_str(&json)?;
                load_build(saved, catalog)
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(builds = builds.len(), "decoded legacy share string");
        return Ok(SharedState::new(builds, Environment::default()));
    }
    let json = decode_text(share)?;
    from_json(&json, catalog)
}

/// Parse the share-string JSON document
pub fn from_json(json: &str, catalog: &Catalog) -> Result<SharedState, PersistError> {
    let data: SavedData = serde_json::from_str(json)?;
    let environment = load_environment(data.modifiers, catalog)?;
    let builds = data
        .builds
        .into_iter()
        .map(|b| load_build(b, catalog))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(builds = builds.len(), "decoded share string");
    Ok(SharedState::new(builds, environment))
}

fn decode_text(encoded: &str) -> Result<String, PersistError> {
    let normalized: String = encoded
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(normalized.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

/// Encoded builds of a `b0=...&b1=...` string, `None` for any other shape
fn legacy_pairs(share: &str) -> Option<Vec<&str>> {
    share
        .split('&')
        .map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let index = key.strip_prefix('b')?;
            let numeric = !index.is_empty() && index.chars().all(|c| c.is_ascii_digit());
            numeric.then_some(value)
        })
        .collect()
}

fn load_build(saved: SavedBuild, catalog: &Catalog) -> Result<Build, PersistError> {
    let weapon = catalog
        .weapon(&saved.weapon)
        .ok_or_else(|| unknown("weapon", &saved.weapon))?
        .clone();

    let count = saved.mods.len();
    let slots = saved
        .mods
        .into_iter()
        .map(|m| {
            let (name, rank) = match m {
                SavedMod::Ranked { name, rank } => (name, Some(rank)),
                SavedMod::Legacy(name) => (name, None),
            };
            let item = catalog.mod_by_name(&name).ok_or_else(|| unknown("mod", &name))?;
            Ok(match rank {
                Some(rank) => ScaledMod::new(item.clone(), rank),
                None => ScaledMod::max(item.clone()),
            })
        })
        .collect::<Result<Vec<_>, PersistError>>()?;
    let loadout = Loadout::from_slots(slots).ok_or(PersistError::ModCount(count))?;

    if saved.riven.len() != RIVEN_SLOTS {
        return Err(PersistError::RivenCount(saved.riven.len()));
    }
    let mut riven = RivenMod::default();
    for (slot, entry) in riven.slots.iter_mut().zip(saved.riven) {
        if let Some((tag, value)) = entry {
            let upgrade = catalog
                .riven_upgrade(&tag)
                .ok_or_else(|| unknown("riven upgrade", &tag))?;
            *slot = Some(RivenStat::new(upgrade.clone(), value));
        }
    }

    let local_modifiers = saved
        .local_modifiers
        .into_iter()
        .map(|m| load_modifier(m, catalog))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Build {
        description: saved.description,
        weapon,
        loadout,
        riven,
        local_modifiers,
    })
}

fn load_modifier((id, value): SavedModifier, catalog: &Catalog) -> Result<Modifier, PersistError> {
    let definition = catalog
        .modifier_definition(&id)
        .ok_or_else(|| unknown("modifier definition", &id))?;
    Ok(Modifier::new(definition.clone(), value))
}

fn load_environment(saved: SavedModifiers, catalog: &Catalog) -> Result<Environment, PersistError> {
    let stats = match saved.enemy.stats {
        SavedEnemyStats::Preset(id) => EnemyStats::Preset(
            catalog.enemy(&id).ok_or_else(|| unknown("enemy preset", &id))?.clone(),
        ),
        SavedEnemyStats::Custom(custom) => EnemyStats::Custom(custom.into()),
    };
    let mut enemy = Enemy::new(stats);
    enemy.level = saved.enemy.level;
    enemy.armor_multiplier = number_or(&saved.enemy.armor_multiplier, Decimal::ONE, "armorMultiplier");
    enemy.armor_subtraction =
        number_or(&saved.enemy.armor_subtraction, Decimal::ZERO, "armorSubtraction");

    let mut switches = Switches::default();
    for (name, value) in &saved.switches {
        switches.set(name, *value);
    }

    let global_modifiers = saved
        .modifiers
        .into_iter()
        .map(|m| load_modifier(m, catalog))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Environment {
        enemy,
        switches,
        ability_strength: Decimal::ONE,
        global_modifiers,
    })
}

/// A number or numeric string, else `fallback`
fn number_or(value: &Value, fallback: Decimal, field: &str) -> Decimal {
    let parsed = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Null => return fallback,
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        warn!(field, value = %value, "not a number, using default");
        fallback
    })
}
