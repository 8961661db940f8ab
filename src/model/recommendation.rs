// src/model/recommendation.rs

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What to do with a replenishment recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Implement,
    Pilot,
    Monitor,
    Reject,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Implement => "implement",
            ActionType::Pilot => "pilot",
            ActionType::Monitor => "monitor",
            ActionType::Reject => "reject",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What to do with slow or non-moving stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadStockAction {
    Continue,
    Reduce,
    Liquidate,
    Return,
    Writeoff,
}

impl DeadStockAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadStockAction::Continue => "continue",
            DeadStockAction::Reduce => "reduce",
            DeadStockAction::Liquidate => "liquidate",
            DeadStockAction::Return => "return",
            DeadStockAction::Writeoff => "writeoff",
        }
    }
}

impl fmt::Display for DeadStockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Output of one calculation run for one item at one location.
///
/// Quantities are kept at full precision; rounding happens when the record
/// is presented (see `RoundingPolicy`). A later run produces a new record
/// instead of mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentRecommendation {
    // Identity (denormalized for search)
    pub item_id: String,
    pub location_id: String,
    pub code: String,
    pub name: String,
    pub category: String,

    // Demand
    pub daily_demand_mean: f64,
    pub daily_demand_std_dev: f64,
    pub lead_time_days: f64,

    // Current vs recommended
    pub current_rop: f64,
    pub recommended_rop: f64,
    pub current_eoq: f64,
    pub recommended_eoq: f64,
    pub current_safety_stock: f64,
    pub recommended_safety_stock: f64,
    pub par_level: f64,

    // Service
    pub current_service_level: f64,
    pub target_service_level: f64,

    // Outcome
    pub current_stock: f64,
    pub days_of_cover: Option<f64>,
    pub needs_reorder: bool,
    pub change_magnitude: f64,
    pub projected_annual_savings: f64,
    pub risk_level: RiskLevel,
    pub action_type: ActionType,
}

/// Slow-moving stock analysis for one item at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadStockAssessment {
    pub item_id: String,
    pub location_id: String,
    pub code: String,
    pub name: String,
    pub category: String,

    pub current_stock: f64,
    pub daily_demand_mean: f64,
    pub days_of_cover: Option<f64>,
    pub days_since_last_movement: Option<i64>,
    pub excess_quantity: f64,
    pub value_at_risk: f64,
    pub risk_level: RiskLevel,
    pub action: DeadStockAction,
}
