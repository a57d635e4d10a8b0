//! Plain-text tables for resolved builds and riven estimates

use rust_decimal::Decimal;
use std::fmt::Write;

use calc_core::decimal::to_fixed;
use calc_core::source::{autofill_average, autofill_max, RivenUpgrade, RIVEN_SLOTS};
use calc_core::{Build, CalcResult, Environment, Weapon};

fn percent(value: Decimal) -> String {
    format!("{}%", to_fixed(value * Decimal::ONE_HUNDRED, 2))
}

/// Summary, damage split and shot distribution of one build
pub fn result_table(build: &Build, env: &Environment, result: &CalcResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", build.description_formatted());
    let _ = writeln!(
        out,
        "Target: {} at level {}",
        env.enemy,
        env.enemy.effective_level()
    );
    for slot in build.loadout.iter().filter(|m| !m.item.is_empty()) {
        let _ = writeln!(out, "  mod: {} (rank {})", slot.item.name, slot.rank);
    }
    for stat in build.riven.slots.iter().flatten() {
        let _ = writeln!(out, "  riven:{}", stat);
    }

    let rows = [
        ("Damage / shot", to_fixed(result.damage_per_shot, 1)),
        ("Burst DPS", to_fixed(result.burst_dps, 1)),
        ("Sustained DPS", to_fixed(result.sustained_dps, 1)),
        ("Base damage", to_fixed(result.damage_amount, 1)),
        ("Multishot", to_fixed(result.pellets, 2)),
        ("Critical chance", percent(result.crit_chance)),
        ("Critical multiplier", format!("{}x", to_fixed(result.crit_damage, 2))),
        ("Status / shot", percent(result.proc_chance)),
        ("Status / pellet", percent(result.proc_chance_per_pellet)),
        ("Fire rate", to_fixed(result.fire_rate, 3)),
        ("Magazine", to_fixed(result.magazine_size, 0)),
        ("Reload", format!("{}s", to_fixed(result.reload_time, 2))),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{:<20} {:>12}", label, value);
    }

    out.push_str("Damage types:\n");
    for (dt, share) in &result.damage_dist {
        let _ = writeln!(out, "  {:<18} {:>10}", dt.display_name(), percent(*share));
    }

    out.push_str("Shot distribution:\n");
    for step in &result.steps {
        let _ = writeln!(
            out,
            "  {:>8}  x{:<8} {}",
            percent(step.probability),
            to_fixed(step.multiplier, 2),
            step.label
        );
        for detail in &step.details {
            let _ = writeln!(out, "            {}", detail);
        }
    }
    out
}

/// Expected value, autofill values and plausible band per slot
pub fn riven_table(
    weapon: &Weapon,
    slots: &[Option<&RivenUpgrade>; RIVEN_SLOTS],
    expected: &[Decimal; RIVEN_SLOTS],
    band: Decimal,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (disposition {})",
        weapon.name,
        to_fixed(weapon.riven_disposition, 2)
    );
    if slots[0].is_none() || slots[1].is_none() {
        out.push_str("At least two buffs are needed for an estimate\n");
    }
    let _ = writeln!(
        out,
        "{:<6} {:<28} {:>10} {:>10} {:>10}",
        "slot", "affix", "average", "low", "max"
    );
    for (i, (slot, value)) in slots.iter().zip(expected).enumerate() {
        let Some(upgrade) = slot else { continue };
        let role = if i + 1 == RIVEN_SLOTS { "curse" } else { "buff" };
        let affix = upgrade
            .effects
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| upgrade.tag());
        let low = *value * (Decimal::ONE - band);
        let _ = writeln!(
            out,
            "{:<6} {:<28} {:>10} {:>10} {:>10}",
            role,
            affix,
            to_fixed(autofill_average(*value), 4),
            to_fixed(low, 4),
            to_fixed(autofill_max(*value, band), 4)
        );
    }
    out
}
