//! Cost calculators for the content creators.
//!
//! - [`power`] -- energy and training-point cost of powers and techniques.
//! - [`item`] -- item points, training points, currency and rarity of items.
//! - [`creature`] -- point budgets for creature stat blocks.

pub mod creature;
pub mod item;
pub mod power;

pub use creature::{assess_creature, CreatureDesign, CreatureReport};
pub use item::{calculate_item_cost, ItemCost, ItemDesign, PropertyDef, Rarity};
pub use power::{calculate_power_cost, ActionType, PartDef, PowerCost, PowerDesign};

/// Round up after discarding float noise below six decimal places, so that
/// sums like `0.1 + 0.2` do not tip an exact integer over to the next one.
pub(crate) fn ceil_clean(value: f64) -> i32 {
    let cleaned = (value * 1_000_000.0).round() / 1_000_000.0;
    cleaned.ceil() as i32
}

/// Floor with the same noise handling as [`ceil_clean`].
pub(crate) fn floor_clean(value: f64) -> i32 {
    let cleaned = (value * 1_000_000.0).round() / 1_000_000.0;
    cleaned.floor() as i32
}
