// src/planning/config.rs

use crate::errors::ConfigError;
use crate::strategy::demand::{DemandFallback, MAX_WINDOW_DAYS, MIN_WINDOW_DAYS};
use crate::strategy::implementations::{CeilingRounding, NearestRounding, NoRounding};
use crate::strategy::traits::RoundingPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inputs to one calculation run, supplied by the settings screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplenishmentParameters {
    /// Probability of not stocking out during the lead time, in (0, 1).
    pub target_service_level: f64,
    /// Cost of placing one order.
    pub ordering_cost: f64,
    /// Fraction of unit cost spent per year to hold one unit.
    pub holding_cost_rate: f64,
    pub minimum_order_qty: f64,
    pub review_period_days: f64,
    /// Fraction of unit cost lost per unit of uncovered safety stock per year.
    pub stockout_penalty_rate: f64,
}

impl Default for ReplenishmentParameters {
    fn default() -> Self {
        Self {
            target_service_level: 0.95,
            ordering_cost: 50.0,
            holding_cost_rate: 0.2,
            minimum_order_qty: 0.0,
            review_period_days: 7.0,
            stockout_penalty_rate: 0.5,
        }
    }
}

/// Thresholds of the risk and action rules. Changes are fractions of the
/// current value (0.10 = 10%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Changes up to this are low risk for non-critical items.
    pub low_change: f64,
    /// Changes above this are high risk.
    pub high_change: f64,
    /// Critical items changing by more than this are high risk.
    pub trivial_change: f64,
    /// Shortfall of current against target service level still tolerated
    /// for a low-risk rating.
    pub service_gap_tolerance: f64,
    /// Savings at or below this count as none.
    pub savings_epsilon: f64,
    /// High-risk changes must save more than this to be piloted.
    pub minimum_benefit: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            low_change: 0.10,
            high_change: 0.30,
            trivial_change: 0.01,
            service_gap_tolerance: 0.05,
            savings_epsilon: 0.01,
            minimum_benefit: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadStockThresholds {
    /// Stock beyond this many days of demand is excess.
    pub coverage_horizon_days: f64,
    pub reduce_cover_days: f64,
    pub liquidate_cover_days: f64,
    pub writeoff_after_days: i64,
}

impl Default for DeadStockThresholds {
    fn default() -> Self {
        Self {
            coverage_horizon_days: 60.0,
            reduce_cover_days: 90.0,
            liquidate_cover_days: 180.0,
            writeoff_after_days: 365,
        }
    }
}

/// How quantities are rounded for presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    #[default]
    Ceiling,
    Nearest,
    #[serde(rename = "none")]
    Unrounded,
}

impl RoundingMode {
    pub fn policy(self) -> Box<dyn RoundingPolicy> {
        match self {
            RoundingMode::Ceiling => Box::new(CeilingRounding::new()),
            RoundingMode::Nearest => Box::new(NearestRounding::new()),
            RoundingMode::Unrounded => Box::new(NoRounding::new()),
        }
    }
}

/// Everything a calculation run needs besides the data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub parameters: ReplenishmentParameters,
    pub risk: ClassifierThresholds,
    pub dead_stock: DeadStockThresholds,
    pub history_window_days: u32,
    pub demand_fallback: DemandFallback,
    pub rounding: RoundingMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parameters: ReplenishmentParameters::default(),
            risk: ClassifierThresholds::default(),
            dead_stock: DeadStockThresholds::default(),
            history_window_days: 90,
            demand_fallback: DemandFallback::default(),
            rounding: RoundingMode::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Rejects settings no run could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.parameters;
        if !(p.target_service_level > 0.0 && p.target_service_level < 1.0) {
            return Err(invalid(format!(
                "target_service_level must be in (0, 1), got {}",
                p.target_service_level
            )));
        }
        for (name, value) in [
            ("holding_cost_rate", p.holding_cost_rate),
            ("ordering_cost", p.ordering_cost),
        ] {
            if !(value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        for (name, value) in [
            ("minimum_order_qty", p.minimum_order_qty),
            ("review_period_days", p.review_period_days),
            ("stockout_penalty_rate", p.stockout_penalty_rate),
        ] {
            if !(value >= 0.0) {
                return Err(invalid(format!("{name} must be non-negative, got {value}")));
            }
        }

        if !(MIN_WINDOW_DAYS..=MAX_WINDOW_DAYS).contains(&self.history_window_days) {
            return Err(invalid(format!(
                "history_window_days must be within {MIN_WINDOW_DAYS}..={MAX_WINDOW_DAYS}, got {}",
                self.history_window_days
            )));
        }

        let r = &self.risk;
        if !(r.low_change >= 0.0 && r.low_change <= r.high_change) {
            return Err(invalid(format!(
                "risk thresholds must satisfy 0 <= low_change <= high_change, got {} and {}",
                r.low_change, r.high_change
            )));
        }

        let d = &self.dead_stock;
        if !(d.reduce_cover_days <= d.liquidate_cover_days) {
            return Err(invalid(format!(
                "dead_stock.reduce_cover_days ({}) exceeds liquidate_cover_days ({})",
                d.reduce_cover_days, d.liquidate_cover_days
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid { message }
}
