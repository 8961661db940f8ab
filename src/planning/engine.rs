// src/planning/engine.rs

use crate::errors::{CalcError, CalcResult, FilterError};
use crate::filtering::{DeadStockView, Query, RecommendationView};
use crate::model::item::{ConsumptionRecord, Observation, StockItem};
use crate::model::recommendation::{DeadStockAssessment, ReplenishmentRecommendation};
use crate::planning::config::EngineConfig;
use crate::strategy::classifier::{
    assess_dead_stock, classify_action, classify_risk, relative_change, RiskInputs,
};
use crate::strategy::demand::{estimate_demand, DemandProfile};
use crate::strategy::optimization::{
    economic_order_quantity, implied_service_level, par_level, projected_savings, reorder_point,
    safety_stock, CostInputs, PolicyPoint,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Who is asking and for when. Passed explicitly instead of being read
/// from session state.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Last day of history taken into account.
    pub as_of: NaiveDate,
    /// Restrict the run to one location; `None` covers all of them.
    pub location_id: Option<String>,
}

impl RunContext {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            location_id: None,
        }
    }

    pub fn for_location(as_of: NaiveDate, location_id: &str) -> Self {
        Self {
            as_of,
            location_id: Some(location_id.to_owned()),
        }
    }

    fn covers(&self, item: &StockItem) -> bool {
        self.location_id
            .as_deref()
            .map_or(true, |location| location == item.location_id)
    }
}

/// Both analyses for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub recommendation: ReplenishmentRecommendation,
    pub dead_stock: DeadStockAssessment,
}

/// An item the run could not calculate, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    pub item_id: String,
    pub location_id: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: CalcError,
}

fn serialize_error<S: serde::Serializer>(error: &CalcError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Result of one run. Superseded, never mutated, by the next run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub as_of: NaiveDate,
    pub recommendations: Vec<ReplenishmentRecommendation>,
    pub dead_stock: Vec<DeadStockAssessment>,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    /// Filtered recommendations with their rollup and the failed items.
    pub fn view(&self, query: &Query) -> Result<RecommendationView<'_>, FilterError> {
        RecommendationView::build(&self.recommendations, &self.failures, query)
    }

    pub fn dead_stock_view(&self, query: &Query) -> Result<DeadStockView<'_>, FilterError> {
        DeadStockView::build(&self.dead_stock, query)
    }
}

/// Stateless calculator. Holds only its configuration, so one instance can
/// serve any number of concurrent runs.
#[derive(Debug, Clone)]
pub struct ReplenishmentEngine {
    config: EngineConfig,
}

impl ReplenishmentEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs every item covered by `context`. A failing item is reported in
    /// `failures` and does not stop the others.
    pub fn run(
        &self,
        items: &[StockItem],
        history: &[ConsumptionRecord],
        context: &RunContext,
    ) -> BatchReport {
        info!(
            items_count = items.len(),
            history_rows = history.len(),
            as_of = %context.as_of,
            location = context.location_id.as_deref().unwrap_or("all"),
            "starting replenishment run"
        );

        // =================================================================
        // PHASE 1: Group history per (item, location)
        // =================================================================
        let mut grouped: HashMap<(&str, &str), Vec<Observation>> = HashMap::new();
        for record in history {
            grouped
                .entry((record.product_id.as_str(), record.location_id.as_str()))
                .or_default()
                .push(Observation::from(record));
        }

        // =================================================================
        // PHASE 2: Calculate each item independently
        // =================================================================
        let mut report = BatchReport {
            as_of: context.as_of,
            recommendations: Vec::with_capacity(items.len()),
            dead_stock: Vec::with_capacity(items.len()),
            failures: Vec::new(),
        };

        for item in items.iter().filter(|item| context.covers(item)) {
            let observations = grouped.get(&item.key()).map(Vec::as_slice).unwrap_or(&[]);

            match self.recommend(item, observations, context.as_of) {
                Ok(outcome) => {
                    debug!(
                        item_id = %item.product_id,
                        location_id = %item.location_id,
                        risk = %outcome.recommendation.risk_level,
                        action = %outcome.recommendation.action_type,
                        "item calculated"
                    );
                    report.recommendations.push(outcome.recommendation);
                    report.dead_stock.push(outcome.dead_stock);
                }
                Err(error) => {
                    // No demand inside the window still says something about
                    // stock that has stopped moving.
                    if error == CalcError::InsufficientData {
                        report
                            .dead_stock
                            .push(self.assess_idle(item, observations, context.as_of));
                    }
                    warn!(
                        item_id = %item.product_id,
                        location_id = %item.location_id,
                        %error,
                        "item skipped"
                    );
                    report.failures.push(ItemFailure {
                        item_id: item.product_id.clone(),
                        location_id: item.location_id.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            calculated = report.recommendations.len(),
            failed = report.failures.len(),
            "replenishment run finished"
        );
        report
    }

    /// Calculates one item from its own history.
    pub fn recommend(
        &self,
        item: &StockItem,
        observations: &[Observation],
        as_of: NaiveDate,
    ) -> CalcResult<ItemOutcome> {
        let params = &self.config.parameters;
        let window = self.config.history_window_days;

        // 1. Demand
        let estimate = self
            .config
            .demand_fallback
            .resolve(estimate_demand(observations, window, as_of))?;
        let profile = DemandProfile::new(estimate, item.lead_time_days, window);
        let mean = profile.mean();
        let lead_time = profile.lead_time_days;

        // 2. Safety stock, reorder point, par level
        let recommended_ss = safety_stock(profile.std_dev(), lead_time, params.target_service_level)?;
        let recommended_rop = reorder_point(mean, lead_time, recommended_ss)?;
        let par = par_level(mean, lead_time, params.review_period_days, recommended_ss)?;

        // 3. Order quantity and savings
        let costs = CostInputs::from_daily(mean, params.ordering_cost, params.holding_cost_rate, item.unit_cost);
        let recommended_eoq = economic_order_quantity(&costs, params.minimum_order_qty)?;

        let current = item.current;
        let savings = projected_savings(
            &costs,
            PolicyPoint {
                order_quantity: current.order_quantity,
                safety_stock: current.safety_stock,
            },
            PolicyPoint {
                order_quantity: recommended_eoq,
                safety_stock: recommended_ss,
            },
            params.stockout_penalty_rate,
        )?;

        // 4. Risk and action
        let current_service_level = implied_service_level(current.safety_stock, profile.std_dev(), lead_time);
        let change_magnitude = relative_change(current.reorder_point, recommended_rop)
            .max(relative_change(current.order_quantity, recommended_eoq));
        let risk_level = classify_risk(
            &RiskInputs {
                service_level_gap: params.target_service_level - current_service_level,
                change_magnitude,
                critical: item.critical,
            },
            &self.config.risk,
        );
        let action_type = classify_action(risk_level, savings, &self.config.risk);

        let recommendation = ReplenishmentRecommendation {
            item_id: item.product_id.clone(),
            location_id: item.location_id.clone(),
            code: item.code.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            daily_demand_mean: mean,
            daily_demand_std_dev: profile.std_dev(),
            lead_time_days: lead_time,
            current_rop: current.reorder_point,
            recommended_rop,
            current_eoq: current.order_quantity,
            recommended_eoq,
            current_safety_stock: current.safety_stock,
            recommended_safety_stock: recommended_ss,
            par_level: par,
            current_service_level,
            target_service_level: params.target_service_level,
            current_stock: item.current_stock,
            days_of_cover: (mean > 0.0).then(|| item.current_stock / mean),
            needs_reorder: recommended_eoq > 0.0 && item.current_stock <= recommended_rop,
            change_magnitude,
            projected_annual_savings: savings,
            risk_level,
            action_type,
        };

        // 5. Dead stock, against movement over the whole history
        let dead_stock = assess_dead_stock(
            item,
            mean,
            last_movement(observations, as_of),
            as_of,
            &self.config.dead_stock,
        );

        Ok(ItemOutcome {
            recommendation,
            dead_stock,
        })
    }

    /// Dead-stock assessment for an item with no demand in the window.
    pub fn assess_idle(
        &self,
        item: &StockItem,
        observations: &[Observation],
        as_of: NaiveDate,
    ) -> DeadStockAssessment {
        assess_dead_stock(
            item,
            0.0,
            last_movement(observations, as_of),
            as_of,
            &self.config.dead_stock,
        )
    }
}

/// Most recent day with actual consumption, up to `as_of`.
fn last_movement(observations: &[Observation], as_of: NaiveDate) -> Option<NaiveDate> {
    observations
        .iter()
        .filter(|obs| obs.quantity > 0.0 && obs.date <= as_of)
        .map(|obs| obs.date)
        .max()
}
