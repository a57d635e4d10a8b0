//! Combat - Crit outcome model, shot distribution and sampling

mod probability;
mod result;
mod sample;

pub use probability::{enumerate_steps, finalize_steps, split_charged_chamber, CritOutcomes};
pub use result::{CalcResult, DamageStep};
pub use sample::{sample_shot, simulate_mean_damage};
