// src/io/history.rs

use crate::errors::IoError;
use crate::model::item::{ConsumptionRecord, CurrentPolicy, StockItem};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// One line of the stock items CSV. The current policy is spread over
/// three flat columns.
#[derive(Debug, Clone, Deserialize)]
pub struct StockItemRow {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub category: String,
    pub location_id: String,
    pub unit_of_measure: String,
    pub current_stock: f64,
    pub unit_cost: f64,
    pub lead_time_days: f64,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub returnable: bool,
    #[serde(default)]
    pub current_rop: f64,
    #[serde(default)]
    pub current_order_qty: f64,
    #[serde(default)]
    pub current_safety_stock: f64,
}

impl From<StockItemRow> for StockItem {
    fn from(row: StockItemRow) -> Self {
        StockItem {
            product_id: row.product_id,
            code: row.code,
            name: row.name,
            category: row.category,
            location_id: row.location_id,
            unit_of_measure: row.unit_of_measure,
            current_stock: row.current_stock,
            unit_cost: row.unit_cost,
            lead_time_days: row.lead_time_days,
            critical: row.critical,
            returnable: row.returnable,
            current: CurrentPolicy {
                reorder_point: row.current_rop,
                order_quantity: row.current_order_qty,
                safety_stock: row.current_safety_stock,
            },
        }
    }
}

/// Reads stock items from any CSV source with a header row.
pub fn read_stock_items<R: std::io::Read>(reader: R) -> Result<Vec<StockItem>, IoError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut items = Vec::new();
    for row in rdr.deserialize::<StockItemRow>() {
        items.push(StockItem::from(row?));
    }
    debug!(rows = items.len(), "stock items loaded");
    Ok(items)
}

/// Reads consumption history (`product_id,location_id,date,quantity`,
/// dates as `YYYY-MM-DD`).
pub fn read_consumption<R: std::io::Read>(reader: R) -> Result<Vec<ConsumptionRecord>, IoError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let records = rdr
        .deserialize::<ConsumptionRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    debug!(rows = records.len(), "consumption history loaded");
    Ok(records)
}

pub fn load_stock_items(path: impl AsRef<Path>) -> Result<Vec<StockItem>, IoError> {
    read_stock_items(std::fs::File::open(path)?)
}

pub fn load_consumption(path: impl AsRef<Path>) -> Result<Vec<ConsumptionRecord>, IoError> {
    read_consumption(std::fs::File::open(path)?)
}
