// src/strategy/traits.rs

use std::fmt::Debug;

/// Turns a full-precision quantity into the figure shown to a buyer.
///
/// Calculations never round; a policy is applied once, when a
/// recommendation is presented or exported.
///
/// We require `Send` + `Sync` so one policy can serve concurrent exports.
pub trait RoundingPolicy: Debug + Send + Sync {
    /// Rounds a non-negative quantity in the item's unit of measure.
    fn round_quantity(&self, quantity: f64) -> f64;

    /// Short name used in report headers and logs.
    fn name(&self) -> &'static str;
}
