// src/strategy/implementations.rs

use crate::strategy::traits::RoundingPolicy;

// =========================================================================
// 1. Ceiling Rounding
// =========================================================================

/// Rounds up to whole units. Never under-orders and never under-protects,
/// which is what buyers expect for reorder points and safety stock.
#[derive(Debug, Clone, Default)]
pub struct CeilingRounding;

impl CeilingRounding {
    pub fn new() -> Self {
        Self
    }
}

impl RoundingPolicy for CeilingRounding {
    fn round_quantity(&self, quantity: f64) -> f64 {
        // Guard against 12.000000001 turning into 13.
        let nearest = quantity.round();
        if (quantity - nearest).abs() < 1e-9 {
            nearest
        } else {
            quantity.ceil()
        }
    }

    fn name(&self) -> &'static str {
        "ceiling"
    }
}

// =========================================================================
// 2. Nearest Rounding
// =========================================================================

/// Rounds half away from zero to whole units.
#[derive(Debug, Clone, Default)]
pub struct NearestRounding;

impl NearestRounding {
    pub fn new() -> Self {
        Self
    }
}

impl RoundingPolicy for NearestRounding {
    fn round_quantity(&self, quantity: f64) -> f64 {
        quantity.round()
    }

    fn name(&self) -> &'static str {
        "nearest"
    }
}

// =========================================================================
// 3. No Rounding
// =========================================================================

/// Keeps two decimals. For items sold by weight or volume.
#[derive(Debug, Clone, Default)]
pub struct NoRounding;

impl NoRounding {
    pub fn new() -> Self {
        Self
    }
}

impl RoundingPolicy for NoRounding {
    fn round_quantity(&self, quantity: f64) -> f64 {
        (quantity * 100.0).round() / 100.0
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
