//! Build and Environment - The two inputs of a calculation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::enemy::Enemy;
use crate::source::{Loadout, Modifier, RivenMod};
use crate::weapon::Weapon;

/// A weapon with everything the player put on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    pub description: String,
    pub weapon: Weapon,
    pub loadout: Loadout,
    pub riven: RivenMod,
    pub local_modifiers: Vec<Modifier>,
}

impl Build {
    /// Unmodded build of `weapon`
    pub fn new(weapon: Weapon) -> Self {
        Build {
            description: String::new(),
            weapon,
            loadout: Loadout::empty(),
            riven: RivenMod::default(),
            local_modifiers: Vec::new(),
        }
    }

    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = loadout;
        self
    }

    pub fn with_riven(mut self, riven: RivenMod) -> Self {
        self.riven = riven;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.local_modifiers.push(modifier);
        self
    }

    /// User description, else `"<weapon> Build"` with `" w/ Riven"` when a riven slot is used
    pub fn description_formatted(&self) -> String {
        if !self.description.is_empty() {
            return self.description.clone();
        }
        let mut s = format!("{} Build", self.weapon.name);
        if self.loadout.has_riven() {
            s.push_str(" w/ Riven");
        }
        s
    }
}

/// Feature switches of the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Switches {
    #[serde(default = "enabled")]
    pub enable_innate_buffs: bool,
    #[serde(default = "enabled")]
    pub enable_vigilante_buffs: bool,
}

fn enabled() -> bool {
    true
}

impl Default for Switches {
    fn default() -> Self {
        Switches {
            enable_innate_buffs: true,
            enable_vigilante_buffs: true,
        }
    }
}

impl Switches {
    /// Switch names with their descriptions
    pub const DESCRIPTIONS: [(&'static str, &'static str); 2] = [
        ("enableInnateBuffs", "Use Weapon's Innate Buffs (Max Level)"),
        (
            "enableVigilanteBuffs",
            "Use Vigilante Set Mod bonus (chance to increase Critical Hit tier; 5% per Mod)",
        ),
    ];

    /// Set a switch by its wire name; unknown names are logged and ignored
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        match name {
            "enableInnateBuffs" => self.enable_innate_buffs = value,
            "enableVigilanteBuffs" => self.enable_vigilante_buffs = value,
            _ => {
                warn!(switch = name, "unknown switch ignored");
                return false;
            }
        }
        true
    }
}

/// Everything outside the build: target, switches and team buffs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub enemy: Enemy,
    pub switches: Switches,
    pub ability_strength: Decimal,
    pub global_modifiers: Vec<Modifier>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            enemy: Enemy::empty(),
            switches: Switches::default(),
            ability_strength: Decimal::ONE,
            global_modifiers: Vec::new(),
        }
    }
}

impl Environment {
    pub fn with_enemy(mut self, enemy: Enemy) -> Self {
        self.enemy = enemy;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.global_modifiers.push(modifier);
        self
    }
}
