//! Catalog - Weapons, mods, riven affixes, enemies, modifiers and templates
//!
//! Every table is a TOML file under `config/`. The built-in catalog embeds
//! them; `load_from_dir` reads the same file names from disk.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

use super::{load_toml, parse_toml, ConfigError, GameConstants};
use crate::enemy::{EnemyPreset, PresetOverride, PresetVariant};
use crate::source::{
    Loadout, Mod, ModifierDefinition, RivenUpgrade, ScaledMod, EMPTY_MOD_NAME, ORDINAL_SLOTS,
    RIVEN_MOD_NAME,
};
use crate::types::Faction;
use crate::upgrade::StatEffect;
use crate::weapon::{Weapon, WeaponRecord};

pub const CONSTANTS_FILE: &str = "constants.toml";
pub const WEAPONS_FILE: &str = "weapons.toml";
pub const MODS_FILE: &str = "mods.toml";
pub const RIVEN_UPGRADES_FILE: &str = "riven_upgrades.toml";
pub const ENEMIES_FILE: &str = "enemies.toml";
pub const MODIFIERS_FILE: &str = "modifiers.toml";
pub const TEMPLATES_FILE: &str = "templates.toml";

// =============================================================================
// File layouts
// =============================================================================

#[derive(Debug, Deserialize)]
struct WeaponsFile {
    weapons: Vec<WeaponRecord>,
}

#[derive(Debug, Deserialize)]
struct ModsFile {
    mods: Vec<Mod>,
}

#[derive(Debug, Deserialize)]
struct RivenUpgradesFile {
    upgrades: Vec<RivenUpgrade>,
}

#[derive(Debug, Deserialize)]
struct EnemiesFile {
    presets: Vec<EnemyPreset>,
    #[serde(default)]
    overrides: Vec<PresetOverride>,
    #[serde(default)]
    variants: Vec<PresetVariant>,
}

#[derive(Debug, Deserialize)]
struct ModifiersFile {
    definitions: Vec<ModifierDefinition>,
}

#[derive(Debug, Deserialize)]
struct TemplatesFile {
    categories: Vec<TemplateCategory>,
}

#[derive(Debug, Deserialize)]
struct TemplateCategory {
    category: String,
    #[serde(default)]
    templates: Vec<TemplateRecord>,
}

#[derive(Debug, Deserialize)]
struct TemplateRecord {
    name: String,
    mods: Vec<String>,
}

/// Parsed but not yet validated tables
struct RawCatalog {
    constants: GameConstants,
    weapons: WeaponsFile,
    mods: ModsFile,
    riven_upgrades: RivenUpgradesFile,
    enemies: EnemiesFile,
    modifiers: ModifiersFile,
    templates: TemplatesFile,
}

/// A named starting loadout for a weapon category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModdingTemplate {
    pub name: String,
    pub loadout: Loadout,
}

// =============================================================================
// Catalog
// =============================================================================

/// Validated, indexed catalog data
#[derive(Debug, Clone)]
pub struct Catalog {
    pub constants: GameConstants,
    weapons: Vec<Weapon>,
    weapon_index: HashMap<String, usize>,
    mods: Vec<Mod>,
    mod_index: HashMap<String, usize>,
    empty_mod: Mod,
    riven_mod: Mod,
    riven_upgrades: Vec<RivenUpgrade>,
    riven_by_tag: HashMap<String, usize>,
    riven_by_xtag: HashMap<String, usize>,
    enemies: Vec<EnemyPreset>,
    enemy_index: HashMap<String, usize>,
    modifiers: Vec<ModifierDefinition>,
    modifier_index: HashMap<String, usize>,
    templates: HashMap<String, Vec<ModdingTemplate>>,
}

impl Catalog {
    /// The catalog embedded in the library
    pub fn builtin() -> Result<Self, ConfigError> {
        Catalog::assemble(RawCatalog {
            constants: parse_toml(include_str!("../../config/constants.toml"))?,
            weapons: parse_toml(include_str!("../../config/weapons.toml"))?,
            mods: parse_toml(include_str!("../../config/mods.toml"))?,
            riven_upgrades: parse_toml(include_str!("../../config/riven_upgrades.toml"))?,
            enemies: parse_toml(include_str!("../../config/enemies.toml"))?,
            modifiers: parse_toml(include_str!("../../config/modifiers.toml"))?,
            templates: parse_toml(include_str!("../../config/templates.toml"))?,
        })
    }

    /// Load every catalog file from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        Catalog::assemble(RawCatalog {
            constants: load_toml(&dir.join(CONSTANTS_FILE))?,
            weapons: load_toml(&dir.join(WEAPONS_FILE))?,
            mods: load_toml(&dir.join(MODS_FILE))?,
            riven_upgrades: load_toml(&dir.join(RIVEN_UPGRADES_FILE))?,
            enemies: load_toml(&dir.join(ENEMIES_FILE))?,
            modifiers: load_toml(&dir.join(MODIFIERS_FILE))?,
            templates: load_toml(&dir.join(TEMPLATES_FILE))?,
        })
    }

    fn assemble(raw: RawCatalog) -> Result<Self, ConfigError> {
        // Weapons: one entry per mode, sorted by name
        let mut weapons: Vec<Weapon> = raw
            .weapons
            .weapons
            .into_iter()
            .flat_map(WeaponRecord::into_weapons)
            .collect();
        weapons.sort_by(|a, b| a.name.cmp(&b.name));
        for weapon in &weapons {
            for level in &weapon.zoom_levels {
                check_effects(&weapon.name, &level.effects)?;
            }
            for group in &weapon.innate_effects {
                check_effects(&weapon.name, group)?;
            }
            for scaling in &weapon.ability_strength {
                scaling
                    .upgrade
                    .validate()
                    .map_err(|e| invalid(&weapon.name, e))?;
            }
        }
        let weapon_index = index_unique(weapons.iter().map(|w| w.name.as_str()), "weapon")?;

        // Mods, sorted by name; placeholder names are reserved
        let mut mods = raw.mods.mods;
        mods.sort_by(|a, b| a.name.cmp(&b.name));
        for item in &mods {
            if item.is_empty() || item.is_riven() {
                return Err(ConfigError::ValidationError(format!(
                    "mod name is reserved: {}",
                    item.name
                )));
            }
            check_effects(&item.name, &item.effects)?;
        }
        let mod_index = index_unique(mods.iter().map(|m| m.name.as_str()), "mod")?;

        // Riven affixes by tag and by catalog tag
        let riven_upgrades = raw.riven_upgrades.upgrades;
        let mut riven_by_xtag = HashMap::new();
        for (i, upgrade) in riven_upgrades.iter().enumerate() {
            upgrade.validate().map_err(|e| invalid("riven upgrade", e))?;
            for xtag in &upgrade.xtags {
                if riven_by_xtag.insert(xtag.clone(), i).is_some() {
                    return Err(duplicate("riven xtag", xtag));
                }
            }
        }
        let tags: Vec<String> = riven_upgrades.iter().map(RivenUpgrade::tag).collect();
        let riven_by_tag = index_unique(tags.iter().map(String::as_str), "riven upgrade")?;

        // Enemies: overrides by display name, then variants appended
        let mut enemies = raw.enemies.presets;
        for patch in &raw.enemies.overrides {
            let mut matched = false;
            for preset in enemies.iter_mut().filter(|p| p.name == patch.name) {
                patch.apply(preset);
                matched = true;
            }
            if !matched {
                warn!(preset = %patch.name, "override matches no enemy preset");
            }
        }
        for variant in &raw.enemies.variants {
            let base = enemies
                .iter()
                .find(|p| p.unique_name == variant.base)
                .ok_or_else(|| invalid("enemy variant", format!("unknown base preset: {}", variant.base)))?;
            let derived = variant.derive(base);
            enemies.push(derived);
        }
        let enemy_index = index_unique(enemies.iter().map(|e| e.unique_name.as_str()), "enemy")?;

        // Modifier definitions
        let modifiers = raw.modifiers.definitions;
        for definition in &modifiers {
            for effect in &definition.effects {
                effect
                    .upgrade
                    .validate()
                    .map_err(|e| invalid(&definition.id, e))?;
            }
        }
        let modifier_index = index_unique(modifiers.iter().map(|m| m.id.as_str()), "modifier")?;

        let mut catalog = Catalog {
            constants: raw.constants,
            weapons,
            weapon_index,
            mods,
            mod_index,
            empty_mod: Mod::empty(),
            riven_mod: Mod::riven(),
            riven_upgrades,
            riven_by_tag,
            riven_by_xtag,
            enemies,
            enemy_index,
            modifiers,
            modifier_index,
            templates: HashMap::new(),
        };

        // Templates last: they reference mods by name
        let mut templates = HashMap::new();
        for category in raw.templates.categories {
            let mut list = Vec::with_capacity(category.templates.len());
            for record in category.templates {
                list.push(catalog.build_template(record)?);
            }
            if templates.insert(category.category.clone(), list).is_some() {
                return Err(duplicate("template category", &category.category));
            }
        }
        catalog.templates = templates;

        info!(
            weapons = catalog.weapons.len(),
            mods = catalog.mods.len(),
            riven_upgrades = catalog.riven_upgrades.len(),
            enemies = catalog.enemies.len(),
            modifiers = catalog.modifiers.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    fn build_template(&self, record: TemplateRecord) -> Result<ModdingTemplate, ConfigError> {
        if record.mods.len() != ORDINAL_SLOTS {
            return Err(invalid(
                &record.name,
                format!("template needs {} mods, got {}", ORDINAL_SLOTS, record.mods.len()),
            ));
        }
        let mut slots = Vec::with_capacity(ORDINAL_SLOTS);
        for name in &record.mods {
            let item = self
                .mod_by_name(name)
                .ok_or_else(|| invalid(&record.name, format!("unknown mod: {}", name)))?;
            slots.push(ScaledMod::max(item.clone()));
        }
        let loadout = Loadout::from_slots(slots)
            .ok_or_else(|| invalid(&record.name, "malformed template".to_string()))?;
        Ok(ModdingTemplate {
            name: record.name,
            loadout,
        })
    }

    // === Weapons ===

    /// All weapons, sorted by name
    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    /// Look up by full name, falling back to the first mode of a base name
    pub fn weapon(&self, name: &str) -> Option<&Weapon> {
        match self.weapon_index.get(name) {
            Some(&i) => Some(&self.weapons[i]),
            None => self.weapons.iter().find(|w| w.basename == name),
        }
    }

    // === Mods ===

    /// Catalog mods sorted by name, placeholders excluded
    pub fn mods(&self) -> &[Mod] {
        &self.mods
    }

    /// Look up a mod, including the `+` and `Riven Mod` placeholders
    pub fn mod_by_name(&self, name: &str) -> Option<&Mod> {
        match name {
            EMPTY_MOD_NAME => Some(&self.empty_mod),
            RIVEN_MOD_NAME => Some(&self.riven_mod),
            _ => self.mod_index.get(name).map(|&i| &self.mods[i]),
        }
    }

    /// Mods whose compatibility tag is in the weapon's chain
    pub fn mods_for<'a>(&'a self, weapon: &'a Weapon) -> impl Iterator<Item = &'a Mod> + 'a {
        self.mods.iter().filter(move |m| weapon.is_compatible(&m.compatibility))
    }

    // === Riven affixes ===

    pub fn riven_upgrades(&self) -> &[RivenUpgrade] {
        &self.riven_upgrades
    }

    /// Look up by stable tag (`damage`, `DT_FIRE`, `Grineer`, ...)
    pub fn riven_upgrade(&self, tag: &str) -> Option<&RivenUpgrade> {
        self.riven_by_tag.get(tag).map(|&i| &self.riven_upgrades[i])
    }

    /// Look up by the catalog's per-category tag
    pub fn riven_upgrade_by_xtag(&self, xtag: &str) -> Option<&RivenUpgrade> {
        self.riven_by_xtag.get(xtag).map(|&i| &self.riven_upgrades[i])
    }

    // === Enemies ===

    pub fn enemies(&self) -> &[EnemyPreset] {
        &self.enemies
    }

    /// Look up by unique name
    pub fn enemy(&self, unique_name: &str) -> Option<&EnemyPreset> {
        self.enemy_index.get(unique_name).map(|&i| &self.enemies[i])
    }

    /// Presets grouped by faction, in listing order
    pub fn enemies_by_faction(&self) -> BTreeMap<Faction, Vec<&EnemyPreset>> {
        let mut map: BTreeMap<Faction, Vec<&EnemyPreset>> = BTreeMap::new();
        for preset in &self.enemies {
            map.entry(preset.stats.faction).or_default().push(preset);
        }
        map
    }

    // === Modifiers ===

    pub fn modifier_definitions(&self) -> &[ModifierDefinition] {
        &self.modifiers
    }

    pub fn modifier_definition(&self, id: &str) -> Option<&ModifierDefinition> {
        self.modifier_index.get(id).map(|&i| &self.modifiers[i])
    }

    /// Definitions grouped by category, in listing order
    pub fn modifier_categories(&self) -> Vec<(&str, Vec<&ModifierDefinition>)> {
        let mut groups: Vec<(&str, Vec<&ModifierDefinition>)> = Vec::new();
        for definition in &self.modifiers {
            match groups.iter_mut().find(|(c, _)| *c == definition.category) {
                Some((_, list)) => list.push(definition),
                None => groups.push((definition.category.as_str(), vec![definition])),
            }
        }
        groups
    }

    // === Templates ===

    /// Templates of the broadest category in the weapon's chain that has an entry
    pub fn modding_templates(&self, weapon: &Weapon) -> Option<&[ModdingTemplate]> {
        weapon
            .compatibility
            .iter()
            .rev()
            .find_map(|c| self.templates.get(c))
            .map(Vec::as_slice)
    }
}

fn check_effects(owner: &str, effects: &[StatEffect]) -> Result<(), ConfigError> {
    for effect in effects {
        effect.upgrade.validate().map_err(|e| invalid(owner, e))?;
    }
    Ok(())
}

fn index_unique<'a>(
    keys: impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<HashMap<String, usize>, ConfigError> {
    let mut index = HashMap::new();
    for (i, key) in keys.enumerate() {
        if index.insert(key.to_string(), i).is_some() {
            return Err(duplicate(what, key));
        }
    }
    Ok(index)
}

fn invalid(owner: &str, message: String) -> ConfigError {
    ConfigError::ValidationError(format!("{}: {}", owner, message))
}

fn duplicate(what: &str, key: &str) -> ConfigError {
    ConfigError::ValidationError(format!("duplicate {}: {}", what, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upgrade::EffectKind;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn test_builtin_loads() {
        let catalog = catalog();
        assert!(!catalog.weapons().is_empty());
        assert!(!catalog.mods().is_empty());
        assert!(!catalog.riven_upgrades().is_empty());
        assert!(!catalog.enemies().is_empty());
        assert!(!catalog.modifier_definitions().is_empty());
        assert_eq!(catalog.constants, GameConstants::default());
    }

    #[test]
    fn test_weapons_sorted_and_modes_flattened() {
        let catalog = catalog();
        let names: Vec<&str> = catalog.weapons().iter().map(|w| w.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);

        let uncharged = catalog.weapon("Lanka (Uncharged)").unwrap();
        assert_eq!(uncharged.basename, "Lanka");
        assert_eq!(uncharged.fire_rate, dec!(2));
        assert_eq!(catalog.weapon("Lanka").unwrap().name, "Lanka");
        // Base name resolves to the first mode in sorted order
        assert_eq!(catalog.weapon("Gara Shattered Lash").unwrap().name, "Gara Shattered Lash (Puncture)");
        assert!(catalog.weapon("Nonexistent").is_none());
    }

    #[test]
    fn test_mod_placeholders() {
        let catalog = catalog();
        assert!(catalog.mod_by_name("+").unwrap().is_empty());
        assert!(catalog.mod_by_name("Riven Mod").unwrap().is_riven());
        assert!(catalog.mods().iter().all(|m| !m.is_empty() && !m.is_riven()));
        let serration = catalog.mod_by_name("Serration").unwrap();
        assert_eq!(ScaledMod::max(serration.clone()).scaled_effects()[0].value, dec!(1.65));
    }

    #[test]
    fn test_blood_rush_at_max_rank() {
        let catalog = catalog();
        let blood_rush = ScaledMod::max(catalog.mod_by_name("Blood Rush").unwrap().clone());
        assert_eq!(blood_rush.scaled_effects()[0].value, dec!(4.4));
    }

    #[test]
    fn test_mods_for_weapon() {
        let catalog = catalog();
        let hek = catalog.weapon("Hek").unwrap();
        let names: Vec<&str> = catalog.mods_for(hek).map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"Hell's Chamber"));
        assert!(names.contains(&"Vigilante Armaments"));
        assert!(!names.contains(&"Serration"));
    }

    #[test]
    fn test_riven_lookup() {
        let catalog = catalog();
        let damage = catalog.riven_upgrade("damage").unwrap();
        assert_eq!(damage.effects[0].kind, EffectKind::Damage);
        let fire = catalog.riven_upgrade("DT_FIRE").unwrap();
        assert_eq!(fire.tag(), "DT_FIRE");
        let grineer = catalog.riven_upgrade("Grineer").unwrap();
        assert_eq!(grineer.effects[0].kind, EffectKind::FactionDamage);
        assert_eq!(
            catalog.riven_upgrade_by_xtag("WeaponPistolDamageAmountMod"),
            Some(damage)
        );
        // Fire rate doubles for bows
        assert_eq!(catalog.riven_upgrade("fire_rate").unwrap().effects.len(), 2);
    }

    #[test]
    fn test_enemy_overrides_and_variants() {
        let catalog = catalog();
        let teralyst = catalog
            .enemy("/Lotus/Types/Enemies/Sentients/Eidolon/SentientTeralystAvatar")
            .unwrap();
        assert_eq!(teralyst.stats.default_level, 50);
        assert_eq!(teralyst.stats.headshot_multiplier, Decimal::ONE);
        let dm = teralyst.stats.damage_mitigation.as_ref().unwrap();
        assert_eq!(dm.threshold, dec!(300));
        assert_eq!(dm.multiplier, dec!(0.4));
        assert!(!dm.use_critical_headshot);

        let synovia = catalog
            .enemy("/Lotus/Types/Enemies/Sentients/Eidolon/SentientTeralystAvatar|Synovia")
            .unwrap();
        assert_eq!(synovia.name, "EIDOLON TERALYST SYNOVIA");
        assert_eq!(synovia.stats.health_base, dec!(2200));
        assert_eq!(synovia.stats.default_level, 50);

        let lancer = catalog.enemies().iter().find(|e| e.name == "LANCER").unwrap();
        assert_eq!(lancer.stats.default_level, 100);
        assert!(lancer.stats.damage_mitigation.is_none());

        let by_faction = catalog.enemies_by_faction();
        assert_eq!(by_faction[&Faction::Sentient].len(), 7);
    }

    #[test]
    fn test_modifier_lookup_and_categories() {
        let catalog = catalog();
        assert!(catalog.modifier_definition("headshot").is_some());
        assert!(catalog.modifier_definition("sniper-zoom-level").is_some());
        let categories: Vec<&str> = catalog.modifier_categories().iter().map(|(c, _)| *c).collect();
        assert_eq!(
            categories,
            vec!["Aura Mods", "Warframe Arcanes", "Warframe Abilities", "Uncategorized"]
        );
    }

    #[test]
    fn test_modding_templates() {
        let catalog = catalog();
        let rifle = catalog.modding_templates(catalog.weapon("Braton Prime").unwrap()).unwrap();
        assert_eq!(rifle.len(), 2);
        assert_eq!(rifle[0].name, "Critical, Radiation");
        assert!(rifle[0].loadout.has_riven());
        assert!(rifle[0].loadout.exilus.item.is_empty());
        assert_eq!(rifle[0].loadout.ordinal[0].rank, 10);

        let shotgun = catalog.modding_templates(catalog.weapon("Hek").unwrap()).unwrap();
        assert_eq!(shotgun[1].name, "Status, Corrosive & Cold");

        let melee = catalog.modding_templates(catalog.weapon("Khora Whipclaw").unwrap()).unwrap();
        assert!(melee.is_empty());
    }

    #[test]
    fn test_validation_rejects_bad_mod() {
        let mut raw = raw_builtin();
        raw.mods = parse_toml(
            r#"
[[mods]]
name = "Broken"
compatibility = "RIFLE"
effects = [{ kind = "elemental", op = "SET", arg = "DT_FIRE", value = 0.1 }]
"#,
        )
        .unwrap();
        raw.templates = TemplatesFile { categories: Vec::new() };
        assert!(matches!(
            Catalog::assemble(raw),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_unknown_template_mod() {
        let mut raw = raw_builtin();
        raw.templates = parse_toml(
            r#"
[[categories]]
category = "RIFLE"

[[categories.templates]]
name = "Bad"
mods = ["Serration", "Nope", "+", "+", "+", "+", "+", "+"]
"#,
        )
        .unwrap();
        assert!(Catalog::assemble(raw).is_err());
    }

    #[test]
    fn test_unknown_kind_fails_to_parse() {
        let result: Result<ModsFile, ConfigError> = parse_toml(
            r#"
[[mods]]
name = "Mystery"
compatibility = "RIFLE"
effects = [{ kind = "not_a_kind", op = "ADD", value = 1 }]
"#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    fn raw_builtin() -> RawCatalog {
        RawCatalog {
            constants: GameConstants::default(),
            weapons: parse_toml(include_str!("../../config/weapons.toml")).unwrap(),
            mods: parse_toml(include_str!("../../config/mods.toml")).unwrap(),
            riven_upgrades: parse_toml(include_str!("../../config/riven_upgrades.toml")).unwrap(),
            enemies: parse_toml(include_str!("../../config/enemies.toml")).unwrap(),
            modifiers: parse_toml(include_str!("../../config/modifiers.toml")).unwrap(),
            templates: parse_toml(include_str!("../../config/templates.toml")).unwrap(),
        }
    }
}
