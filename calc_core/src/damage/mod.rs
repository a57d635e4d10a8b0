//! Damage system - Damage type distribution and the build resolver

mod calculation;
mod distribution;

pub use calculation::{aggregate, resolve, resolve_with_constants};
pub use distribution::{compound_of, DamageDistribution, COMPOUNDS};
