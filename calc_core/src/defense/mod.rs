//! Defense system - Level scaling, Resistances, Armor, Boss mitigation

mod armour;
mod mitigation;
mod resistance;
mod scaling;

pub use armour::{armor_damage_factor, calculate_armor_reduction};
pub use mitigation::{cap_excess_damage, per_pellet_threshold};
pub use resistance::{
    apply_enemy_resistance, describe_health_type, resistance, resistance_entries,
};
pub use scaling::{level_scaling, scale_curve, LevelScaling};
