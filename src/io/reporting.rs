// src/io/reporting.rs

use crate::errors::IoError;
use crate::filtering::{DeadStockSummary, RecommendationSummary};
use crate::model::recommendation::{ActionType, ReplenishmentRecommendation, RiskLevel};
use crate::planning::engine::ItemFailure;
use crate::strategy::traits::RoundingPolicy;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// A recommendation as a buyer reads it: quantities rounded by the
/// configured policy, money to cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub item_id: String,
    pub location_id: String,
    pub code: String,
    pub name: String,
    pub current_rop: f64,
    pub recommended_rop: f64,
    pub current_eoq: f64,
    pub recommended_eoq: f64,
    pub current_safety_stock: f64,
    pub recommended_safety_stock: f64,
    pub par_level: f64,
    pub current_stock: f64,
    pub needs_reorder: bool,
    pub projected_annual_savings: f64,
    pub risk_level: RiskLevel,
    pub action_type: ActionType,
}

fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

impl ReportRow {
    pub fn new(record: &ReplenishmentRecommendation, rounding: &dyn RoundingPolicy) -> Self {
        Self {
            item_id: record.item_id.clone(),
            location_id: record.location_id.clone(),
            code: record.code.clone(),
            name: record.name.clone(),
            current_rop: record.current_rop,
            recommended_rop: rounding.round_quantity(record.recommended_rop),
            current_eoq: record.current_eoq,
            recommended_eoq: rounding.round_quantity(record.recommended_eoq),
            current_safety_stock: record.current_safety_stock,
            recommended_safety_stock: rounding.round_quantity(record.recommended_safety_stock),
            par_level: rounding.round_quantity(record.par_level),
            current_stock: record.current_stock,
            needs_reorder: record.needs_reorder,
            projected_annual_savings: cents(record.projected_annual_savings),
            risk_level: record.risk_level,
            action_type: record.action_type,
        }
    }
}

/// Writes recommendations as CSV to any writer.
pub fn write_recommendations<W: std::io::Write>(
    writer: W,
    records: &[&ReplenishmentRecommendation],
    rounding: &dyn RoundingPolicy,
) -> Result<(), IoError> {
    let mut wtr = csv::Writer::from_writer(writer);

    for record in records {
        wtr.serialize(ReportRow::new(record, rounding))?;
    }

    // Flush the buffer to ensure all data is written
    wtr.flush()?;
    Ok(())
}

/// Writes the recommendation report to a CSV file.
///
/// # Arguments
/// * `file_path` - The path to save the file (e.g., "reports/reorder.csv").
/// * `records` - The recommendations to export, in display order.
/// * `rounding` - How quantities are presented.
pub fn write_recommendation_report(
    file_path: impl AsRef<Path>,
    records: &[&ReplenishmentRecommendation],
    rounding: &dyn RoundingPolicy,
) -> Result<(), IoError> {
    let path = file_path.as_ref();
    write_recommendations(std::fs::File::create(path)?, records, rounding)?;

    info!(
        rows = records.len(),
        path = %path.display(),
        rounding = rounding.name(),
        "recommendation report written"
    );
    Ok(())
}

/// Rollups of one run, as written to the summary JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub as_of: NaiveDate,
    pub replenishment: &'a RecommendationSummary,
    pub dead_stock: &'a DeadStockSummary,
    pub failures: &'a [ItemFailure],
}

pub fn write_summary_json(file_path: impl AsRef<Path>, summary: &RunSummary<'_>) -> Result<(), IoError> {
    let path = file_path.as_ref();
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    info!(path = %path.display(), "run summary written");
    Ok(())
}
