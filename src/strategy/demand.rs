// src/strategy/demand.rs

//! Demand estimation from consumption history.
//!
//! History is bucketed into calendar days. Days inside the observed span
//! with no consumption count as zero demand, so a product used twice a week
//! does not look like a daily mover.
//!
//! The standard deviation is the *sample* standard deviation (divisor
//! `n - 1`). A single observed day has a standard deviation of 0.

use crate::errors::{CalcError, CalcResult};
use crate::model::item::Observation;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const MIN_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 365;

/// Statistics of daily consumption over the estimation window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandEstimate {
    pub daily_demand_mean: f64,
    pub daily_demand_std_dev: f64,
    pub demand_variability_percent: f64,
    /// Number of daily buckets the statistics were computed over.
    pub observed_days: u32,
    pub last_movement: Option<NaiveDate>,
}

impl DemandEstimate {
    /// No demand at all. Used by the `ZeroDemand` fallback.
    pub fn zero() -> Self {
        Self {
            daily_demand_mean: 0.0,
            daily_demand_std_dev: 0.0,
            demand_variability_percent: 0.0,
            observed_days: 0,
            last_movement: None,
        }
    }

    pub fn annual_demand(&self) -> f64 {
        self.daily_demand_mean * 365.0
    }
}

/// Demand statistics plus the supply parameters they are used with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandProfile {
    pub estimate: DemandEstimate,
    pub lead_time_days: f64,
    pub historical_window_days: u32,
}

impl DemandProfile {
    pub fn new(estimate: DemandEstimate, lead_time_days: f64, historical_window_days: u32) -> Self {
        Self {
            estimate,
            lead_time_days,
            historical_window_days,
        }
    }

    pub fn mean(&self) -> f64 {
        self.estimate.daily_demand_mean
    }

    pub fn std_dev(&self) -> f64 {
        self.estimate.daily_demand_std_dev
    }
}

/// What to do when an item has no usable history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandFallback {
    /// Report `InsufficientData` for the item.
    #[default]
    Fail,
    /// Treat the item as having no demand.
    ZeroDemand,
}

impl DemandFallback {
    /// Applies the fallback to an estimation result. Errors other than
    /// `InsufficientData` always pass through.
    pub fn resolve(self, result: CalcResult<DemandEstimate>) -> CalcResult<DemandEstimate> {
        match (self, result) {
            (DemandFallback::ZeroDemand, Err(CalcError::InsufficientData)) => {
                Ok(DemandEstimate::zero())
            }
            (_, result) => result,
        }
    }
}

/// Estimates daily demand over the `window_days` ending at `as_of`
/// (inclusive).
///
/// Observations after `as_of` or before the window are ignored. The
/// statistics cover the days from the first observation in the window up
/// to `as_of`, so a product introduced mid-window is not diluted by days
/// it did not exist.
///
/// # Errors
/// * `InvalidHistoryWindow` if `window_days` is outside 30..=365.
/// * `NegativeConsumption` if any observation in the window is negative
///   or not finite.
/// * `InsufficientData` if no observation falls inside the window.
pub fn estimate_demand(
    observations: &[Observation],
    window_days: u32,
    as_of: NaiveDate,
) -> CalcResult<DemandEstimate> {
    if !(MIN_WINDOW_DAYS..=MAX_WINDOW_DAYS).contains(&window_days) {
        return Err(CalcError::InvalidHistoryWindow(window_days));
    }

    let window_start = as_of - Duration::days(i64::from(window_days) - 1);
    let in_window: Vec<&Observation> = observations
        .iter()
        .filter(|obs| obs.date >= window_start && obs.date <= as_of)
        .collect();

    if let Some(bad) = in_window
        .iter()
        .find(|obs| !obs.quantity.is_finite() || obs.quantity < 0.0)
    {
        return Err(CalcError::NegativeConsumption {
            date: bad.date,
            quantity: bad.quantity,
        });
    }

    let first = match in_window.iter().map(|obs| obs.date).min() {
        Some(date) => date,
        None => return Err(CalcError::InsufficientData),
    };

    let span = (as_of - first).num_days() as usize + 1;
    let mut daily = vec![0.0_f64; span];
    let mut last_movement: Option<NaiveDate> = None;

    for obs in &in_window {
        let offset = (obs.date - first).num_days() as usize;
        daily[offset] += obs.quantity;
        if obs.quantity > 0.0 && last_movement.map_or(true, |last| obs.date > last) {
            last_movement = Some(obs.date);
        }
    }

    let (mean, std_dev) = mean_and_sample_std_dev(&daily);
    let variability = if mean > 0.0 {
        std_dev / mean * 100.0
    } else {
        0.0
    };

    Ok(DemandEstimate {
        daily_demand_mean: mean,
        daily_demand_std_dev: std_dev,
        demand_variability_percent: variability,
        observed_days: span as u32,
        last_movement,
    })
}

/// Mean and sample standard deviation. One value has a deviation of 0.
fn mean_and_sample_std_dev(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n == 1 {
        return (mean, 0.0);
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, (sum_sq / (n - 1) as f64).sqrt())
}
