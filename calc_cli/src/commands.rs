//! Command implementations; each returns the text to print

use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use calc_core::config::{Catalog, ConfigError};
use calc_core::enemy::{Enemy, EnemyPreset, EnemyStats};
use calc_core::persist::{self, PersistError, SharedState};
use calc_core::source::{
    average_riven_stats, Loadout, Modifier, RivenUpgrade, ScaledMod, ORDINAL_SLOTS, RIVEN_SLOTS,
};
use calc_core::stat_block::CalcError;
use calc_core::{resolve_with_constants, Build, Environment};

use crate::report;
use crate::BuildArgs;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Persist(#[from] PersistError),
    #[error("{0}")]
    Calc(#[from] CalcError),
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown {kind}: {name}")]
    NotFound { kind: &'static str, name: String },
    #[error("{0}")]
    InvalidArgument(String),
}

fn not_found(kind: &'static str, name: &str) -> CliError {
    CliError::NotFound {
        kind,
        name: name.to_string(),
    }
}

pub fn load_catalog(dir: Option<&Path>) -> Result<Catalog, CliError> {
    let catalog = match dir {
        Some(dir) => {
            info!(dir = %dir.display(), "loading catalog");
            Catalog::load_from_dir(dir)?
        }
        None => Catalog::builtin()?,
    };
    Ok(catalog)
}

pub fn run_weapons(catalog: &Catalog, filter: Option<&str>) -> Result<String, CliError> {
    let needle = filter.map(str::to_lowercase);
    let mut out = String::new();
    for weapon in catalog.weapons() {
        if let Some(needle) = &needle {
            if !weapon.name.to_lowercase().contains(needle.as_str()) {
                continue;
            }
        }
        out.push_str(&weapon.name);
        out.push('\n');
    }
    Ok(out)
}

pub fn run_resolve_state(catalog: &Catalog, share: &str, json: bool) -> Result<String, CliError> {
    let state = persist::decode(share, catalog)?;
    resolve_all(catalog, &state, json)
}

pub fn run_resolve_args(catalog: &Catalog, args: &BuildArgs, json: bool) -> Result<String, CliError> {
    let state = state_from_args(catalog, args)?;
    resolve_all(catalog, &state, json)
}

pub fn run_encode(catalog: &Catalog, args: &BuildArgs) -> Result<String, CliError> {
    let state = state_from_args(catalog, args)?;
    let share = persist::encode(&state)?;
    Ok(format!("{}\n", share))
}

pub fn run_riven(catalog: &Catalog, weapon: &str, tags: &[String]) -> Result<String, CliError> {
    let weapon = catalog.weapon(weapon).ok_or_else(|| not_found("weapon", weapon))?;
    if tags.len() > RIVEN_SLOTS {
        return Err(CliError::InvalidArgument(format!(
            "a riven has at most {} slots",
            RIVEN_SLOTS
        )));
    }
    let mut slots: [Option<&RivenUpgrade>; RIVEN_SLOTS] = [None; RIVEN_SLOTS];
    for (slot, tag) in slots.iter_mut().zip(tags) {
        let upgrade = catalog
            .riven_upgrade(tag)
            .or_else(|| catalog.riven_upgrade_by_xtag(tag))
            .ok_or_else(|| not_found("riven upgrade", tag))?;
        *slot = Some(upgrade);
    }
    let expected = average_riven_stats(weapon, slots, &catalog.constants.riven);
    Ok(report::riven_table(weapon, &slots, &expected, catalog.constants.riven.band))
}

fn resolve_all(catalog: &Catalog, state: &SharedState, json: bool) -> Result<String, CliError> {
    let results = state
        .builds
        .iter()
        .map(|build| resolve_with_constants(build, &state.environment, &catalog.constants))
        .collect::<Result<Vec<_>, _>>()?;
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&results)?));
    }
    let mut out = String::new();
    for (build, result) in state.builds.iter().zip(&results) {
        out.push_str(&report::result_table(build, &state.environment, result));
        out.push('\n');
    }
    Ok(out)
}

/// Assemble a single build and its environment from command-line arguments
pub fn state_from_args(catalog: &Catalog, args: &BuildArgs) -> Result<SharedState, CliError> {
    let name = args
        .weapon
        .as_deref()
        .ok_or_else(|| CliError::InvalidArgument("--weapon or --state is required".to_string()))?;
    let weapon = catalog.weapon(name).ok_or_else(|| not_found("weapon", name))?;

    let build = Build::new(weapon.clone()).with_loadout(loadout_from_args(catalog, &args.mods)?);

    let mut environment = Environment::default();
    if let Some(id) = &args.enemy {
        let preset = find_enemy(catalog, id).ok_or_else(|| not_found("enemy preset", id))?;
        environment.enemy = Enemy::new(EnemyStats::Preset(preset.clone()));
    }
    environment.enemy.level = args.level;
    if args.headshot {
        let definition = catalog
            .modifier_definition("headshot")
            .ok_or_else(|| not_found("modifier definition", "headshot"))?;
        environment = environment.with_modifier(Modifier::with_default(definition.clone()));
    }
    debug!(weapon = %build.weapon.name, enemy = %environment.enemy, "assembled build");
    Ok(SharedState::new(vec![build], environment))
}

fn loadout_from_args(catalog: &Catalog, specs: &[String]) -> Result<Loadout, CliError> {
    if specs.len() > ORDINAL_SLOTS + 1 {
        return Err(CliError::InvalidArgument(format!(
            "at most {} mods fit a loadout",
            ORDINAL_SLOTS + 1
        )));
    }
    let mut slots = specs
        .iter()
        .map(|spec| parse_mod_spec(catalog, spec))
        .collect::<Result<Vec<_>, _>>()?;
    while slots.len() < ORDINAL_SLOTS {
        slots.push(ScaledMod::empty());
    }
    let count = slots.len();
    Loadout::from_slots(slots)
        .ok_or_else(|| CliError::InvalidArgument(format!("invalid number of mods: {}", count)))
}

/// `NAME` at max rank, or `NAME:RANK`
fn parse_mod_spec(catalog: &Catalog, spec: &str) -> Result<ScaledMod, CliError> {
    let (name, rank) = match spec.rsplit_once(':') {
        Some((name, rank)) => {
            let rank = rank
                .parse::<u32>()
                .map_err(|_| CliError::InvalidArgument(format!("invalid rank in {}", spec)))?;
            (name, Some(rank))
        }
        None => (spec, None),
    };
    let item = catalog.mod_by_name(name).ok_or_else(|| not_found("mod", name))?.clone();
    Ok(match rank {
        Some(rank) => ScaledMod::new(item, rank),
        None => ScaledMod::max(item),
    })
}

fn find_enemy<'a>(catalog: &'a Catalog, id: &str) -> Option<&'a EnemyPreset> {
    catalog.enemy(id).or_else(|| {
        catalog
            .enemies()
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(weapon: &str, mods: &[&str]) -> BuildArgs {
        BuildArgs {
            weapon: Some(weapon.to_string()),
            mods: mods.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_mod_spec() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(parse_mod_spec(&catalog, "Serration").unwrap().rank, 10);
        assert_eq!(parse_mod_spec(&catalog, "Serration:3").unwrap().rank, 3);
        assert!(matches!(
            parse_mod_spec(&catalog, "Serration:x"),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_mod_spec(&catalog, "Nope"),
            Err(CliError::NotFound { kind: "mod", .. })
        ));
    }

    #[test]
    fn test_state_from_args() {
        let catalog = Catalog::builtin().unwrap();
        let mut build_args = args("Lanka", &["Serration", "Split Chamber:2"]);
        build_args.enemy = Some("lancer".to_string());
        build_args.level = Some(30);
        build_args.headshot = true;
        let state = state_from_args(&catalog, &build_args).unwrap();

        let build = &state.builds[0];
        assert_eq!(build.loadout.ordinal[1].rank, 2);
        assert!(build.loadout.ordinal[2].item.is_empty());
        assert_eq!(state.environment.enemy.stats.name(), "LANCER");
        assert_eq!(state.environment.enemy.effective_level(), 30);
        assert_eq!(state.environment.global_modifiers[0].definition.id, "headshot");
    }

    #[test]
    fn test_too_many_mods() {
        let catalog = Catalog::builtin().unwrap();
        let build_args = args("Lanka", &["+"; 10]);
        assert!(matches!(
            state_from_args(&catalog, &build_args),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_weapons_filter() {
        let catalog = Catalog::builtin().unwrap();
        let out = run_weapons(&catalog, Some("lanka")).unwrap();
        assert_eq!(out, "Lanka\nLanka (Uncharged)\n");
    }
}
