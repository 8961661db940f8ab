// src/model/item.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The replenishment settings an item runs with today.
///
/// These are the "current" side of every recommendation: savings and change
/// magnitude are measured against them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentPolicy {
    pub reorder_point: f64,
    pub order_quantity: f64,
    pub safety_stock: f64,
}

/// A stocked product at one location.
///
/// Read-only to this crate; produced by inventory ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    // Identity
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub category: String,
    pub location_id: String,
    pub unit_of_measure: String,

    // Stock position
    pub current_stock: f64,
    pub unit_cost: f64,

    // Supply
    pub lead_time_days: f64,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub returnable: bool,

    #[serde(default)]
    pub current: CurrentPolicy,
}

impl StockItem {
    /// Key that ties an item to its consumption history.
    pub fn key(&self) -> (&str, &str) {
        (&self.product_id, &self.location_id)
    }
}

/// One day's (or one movement's) consumption of an item at a location.
///
/// Several records on the same date are summed by the demand estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub product_id: String,
    pub location_id: String,
    pub date: NaiveDate,
    pub quantity: f64,
}

/// Date/quantity pair fed to the demand estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub quantity: f64,
}

impl From<&ConsumptionRecord> for Observation {
    fn from(record: &ConsumptionRecord) -> Self {
        Self {
            date: record.date,
            quantity: record.quantity,
        }
    }
}
