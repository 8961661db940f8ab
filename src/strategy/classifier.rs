// src/strategy/classifier.rs

//! Threshold rules that turn numbers into a risk level and an action.
//!
//! Both classifiers are total: every input, NaN included, lands in exactly
//! one bucket. Where rules overlap the higher-risk outcome wins.

use crate::model::item::StockItem;
use crate::model::recommendation::{ActionType, DeadStockAction, DeadStockAssessment, RiskLevel};
use crate::planning::config::{ClassifierThresholds, DeadStockThresholds};
use chrono::NaiveDate;

/// What the risk rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskInputs {
    /// Target service level minus the level the current settings achieve.
    /// Positive means the item is under-protected today.
    pub service_level_gap: f64,
    /// Relative size of the recommended change (0.05 = 5%).
    pub change_magnitude: f64,
    pub critical: bool,
}

/// Relative change from `current` to `recommended`.
///
/// From nothing to something counts as a full (100%) change.
pub fn relative_change(current: f64, recommended: f64) -> f64 {
    if current.abs() > f64::EPSILON {
        (recommended - current).abs() / current.abs()
    } else if recommended.abs() > f64::EPSILON {
        1.0
    } else {
        0.0
    }
}

/// Rates how risky it is to adopt a recommendation.
///
/// * `High`: the change exceeds `high_change`, or the item is critical and
///   the change exceeds `trivial_change`.
/// * `Low`: the change is within `low_change`, the item is not critical and
///   the service gap is within tolerance.
/// * `Medium`: everything else.
pub fn classify_risk(inputs: &RiskInputs, thresholds: &ClassifierThresholds) -> RiskLevel {
    let change = inputs.change_magnitude;

    // NaN change fails every comparison and falls into High.
    let large_change = !(change <= thresholds.high_change);
    let critical_change = inputs.critical && change > thresholds.trivial_change;
    if large_change || critical_change {
        return RiskLevel::High;
    }

    let small_change = change <= thresholds.low_change;
    let service_ok = inputs.service_level_gap <= thresholds.service_gap_tolerance;
    if small_change && !inputs.critical && service_ok {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    }
}

/// Picks the action for a recommendation.
///
/// * High risk: `Pilot` only when savings exceed `minimum_benefit`,
///   otherwise `Reject`.
/// * No savings (at or below `savings_epsilon`): `Monitor`.
/// * Low risk with savings: `Implement`.
/// * Medium risk with savings: `Pilot`.
pub fn classify_action(
    risk: RiskLevel,
    projected_savings: f64,
    thresholds: &ClassifierThresholds,
) -> ActionType {
    let savings = if projected_savings.is_nan() {
        0.0
    } else {
        projected_savings
    };

    match risk {
        RiskLevel::High if savings > thresholds.minimum_benefit => ActionType::Pilot,
        RiskLevel::High => ActionType::Reject,
        _ if savings <= thresholds.savings_epsilon => ActionType::Monitor,
        RiskLevel::Low => ActionType::Implement,
        RiskLevel::Medium => ActionType::Pilot,
    }
}

/// Rates one item's stock against its demand.
///
/// Rules, first match wins:
/// 1. stock on hand with no movement for `writeoff_after_days`: writeoff
/// 2. stock on hand with no demand, or cover beyond `liquidate_cover_days`:
///    return (returnable items) or liquidate
/// 3. cover beyond `reduce_cover_days`: reduce
/// 4. otherwise: continue
pub fn assess_dead_stock(
    item: &StockItem,
    daily_demand_mean: f64,
    last_movement: Option<NaiveDate>,
    as_of: NaiveDate,
    thresholds: &DeadStockThresholds,
) -> DeadStockAssessment {
    let stock = item.current_stock.max(0.0);
    let demand = daily_demand_mean.max(0.0);

    let days_of_cover = if demand > 0.0 {
        Some(stock / demand)
    } else {
        None
    };
    let days_since_last_movement = last_movement.map(|date| (as_of - date).num_days());

    let excess_quantity = (stock - demand * thresholds.coverage_horizon_days).max(0.0);
    let value_at_risk = excess_quantity * item.unit_cost.max(0.0);

    let stale = days_since_last_movement.is_some_and(|days| days >= thresholds.writeoff_after_days);
    let overstocked = days_of_cover.map_or(true, |cover| cover > thresholds.liquidate_cover_days);

    let (risk_level, action) = if stock > 0.0 && stale {
        (RiskLevel::High, DeadStockAction::Writeoff)
    } else if stock > 0.0 && overstocked {
        let action = if item.returnable {
            DeadStockAction::Return
        } else {
            DeadStockAction::Liquidate
        };
        (RiskLevel::High, action)
    } else if days_of_cover.is_some_and(|cover| cover > thresholds.reduce_cover_days) {
        (RiskLevel::Medium, DeadStockAction::Reduce)
    } else {
        (RiskLevel::Low, DeadStockAction::Continue)
    };

    DeadStockAssessment {
        item_id: item.product_id.clone(),
        location_id: item.location_id.clone(),
        code: item.code.clone(),
        name: item.name.clone(),
        category: item.category.clone(),
        current_stock: item.current_stock,
        daily_demand_mean: demand,
        days_of_cover,
        days_since_last_movement,
        excess_quantity,
        value_at_risk,
        risk_level,
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::CurrentPolicy;

    fn thresholds() -> ClassifierThresholds {
        ClassifierThresholds::default()
    }

    fn inputs(change: f64, critical: bool) -> RiskInputs {
        RiskInputs {
            service_level_gap: 0.0,
            change_magnitude: change,
            critical,
        }
    }

    #[test]
    fn small_change_on_ordinary_item_is_low_and_implemented() {
        let risk = classify_risk(&inputs(0.05, false), &thresholds());
        assert_eq!(risk, RiskLevel::Low);
        assert_eq!(classify_action(risk, 42.0, &thresholds()), ActionType::Implement);
    }

    #[test]
    fn boundaries_are_inclusive_on_the_lower_bucket() {
        let t = thresholds();
        assert_eq!(classify_risk(&inputs(0.10, false), &t), RiskLevel::Low);
        assert_eq!(classify_risk(&inputs(0.1001, false), &t), RiskLevel::Medium);
        assert_eq!(classify_risk(&inputs(0.30, false), &t), RiskLevel::Medium);
        assert_eq!(classify_risk(&inputs(0.3001, false), &t), RiskLevel::High);
    }

    #[test]
    fn thresholds_are_configurable() {
        let t = ClassifierThresholds {
            low_change: 0.02,
            high_change: 0.05,
            ..ClassifierThresholds::default()
        };
        assert_eq!(classify_risk(&inputs(0.03, false), &t), RiskLevel::Medium);
        assert_eq!(classify_risk(&inputs(0.06, false), &t), RiskLevel::High);
    }

    #[test]
    fn critical_items_are_never_low() {
        let t = thresholds();
        assert_eq!(classify_risk(&inputs(0.0, true), &t), RiskLevel::Medium);
        assert_eq!(classify_risk(&inputs(0.01, true), &t), RiskLevel::Medium);
        assert_eq!(classify_risk(&inputs(0.05, true), &t), RiskLevel::High);
    }

    #[test]
    fn service_gap_beyond_tolerance_lifts_low_to_medium() {
        let under_protected = RiskInputs {
            service_level_gap: 0.2,
            change_magnitude: 0.02,
            critical: false,
        };
        assert_eq!(classify_risk(&under_protected, &thresholds()), RiskLevel::Medium);
    }

    #[test]
    fn nan_inputs_still_classify() {
        let t = thresholds();
        assert_eq!(classify_risk(&inputs(f64::NAN, false), &t), RiskLevel::High);
        let nan_gap = RiskInputs {
            service_level_gap: f64::NAN,
            change_magnitude: 0.0,
            critical: false,
        };
        assert_eq!(classify_risk(&nan_gap, &t), RiskLevel::Medium);
        assert_eq!(classify_action(RiskLevel::Low, f64::NAN, &t), ActionType::Monitor);
    }

    #[test]
    fn risk_classification_is_total_over_a_grid() {
        let t = thresholds();
        let changes = [0.0, 0.005, 0.01, 0.05, 0.1, 0.2, 0.3, 0.5, 1.0, 10.0, f64::INFINITY];
        let gaps = [-0.5, 0.0, 0.05, 0.06, 0.5];
        for &change in &changes {
            for &gap in &gaps {
                for critical in [false, true] {
                    let risk = classify_risk(
                        &RiskInputs {
                            service_level_gap: gap,
                            change_magnitude: change,
                            critical,
                        },
                        &t,
                    );
                    // Deterministic: same input, same answer.
                    let again = classify_risk(
                        &RiskInputs {
                            service_level_gap: gap,
                            change_magnitude: change,
                            critical,
                        },
                        &t,
                    );
                    assert_eq!(risk, again);
                    if change > t.high_change {
                        assert_eq!(risk, RiskLevel::High);
                    }
                }
            }
        }
    }

    #[test]
    fn actions_follow_risk_and_savings() {
        let t = thresholds();
        assert_eq!(classify_action(RiskLevel::Medium, 20.0, &t), ActionType::Pilot);
        assert_eq!(classify_action(RiskLevel::Medium, 0.0, &t), ActionType::Monitor);
        assert_eq!(classify_action(RiskLevel::Low, 0.005, &t), ActionType::Monitor);
        assert_eq!(classify_action(RiskLevel::High, 100.0, &t), ActionType::Reject);
        assert_eq!(classify_action(RiskLevel::High, 100.5, &t), ActionType::Pilot);
        assert_eq!(classify_action(RiskLevel::High, 0.0, &t), ActionType::Reject);
    }

    #[test]
    fn relative_change_handles_zero_baseline() {
        assert_eq!(relative_change(0.0, 0.0), 0.0);
        assert_eq!(relative_change(0.0, 5.0), 1.0);
        assert!((relative_change(40.0, 42.0) - 0.05).abs() < 1e-12);
        assert!((relative_change(40.0, 30.0) - 0.25).abs() < 1e-12);
    }

    fn item(stock: f64, returnable: bool) -> StockItem {
        StockItem {
            product_id: "P-100".to_owned(),
            code: "FLR-25".to_owned(),
            name: "Flour 25kg".to_owned(),
            category: "Dry goods".to_owned(),
            location_id: "LOC-1".to_owned(),
            unit_of_measure: "bag".to_owned(),
            current_stock: stock,
            unit_cost: 20.0,
            lead_time_days: 5.0,
            critical: false,
            returnable,
            current: CurrentPolicy::default(),
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn healthy_cover_continues() {
        let t = DeadStockThresholds::default();
        let assessment = assess_dead_stock(&item(30.0, false), 2.0, Some(as_of()), as_of(), &t);
        assert_eq!(assessment.action, DeadStockAction::Continue);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert_eq!(assessment.days_of_cover, Some(15.0));
        assert_eq!(assessment.excess_quantity, 0.0);
        assert_eq!(assessment.value_at_risk, 0.0);
    }

    #[test]
    fn long_cover_is_reduced_and_excess_priced() {
        let t = DeadStockThresholds::default();
        // 100 days of cover, 40 units beyond the 60-day horizon.
        let assessment = assess_dead_stock(&item(100.0, false), 1.0, Some(as_of()), as_of(), &t);
        assert_eq!(assessment.action, DeadStockAction::Reduce);
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
        assert_eq!(assessment.excess_quantity, 40.0);
        assert_eq!(assessment.value_at_risk, 800.0);
    }

    #[test]
    fn no_demand_with_stock_is_returned_or_liquidated() {
        let t = DeadStockThresholds::default();
        let returned = assess_dead_stock(&item(10.0, true), 0.0, None, as_of(), &t);
        assert_eq!(returned.action, DeadStockAction::Return);
        assert_eq!(returned.days_of_cover, None);

        let liquidated = assess_dead_stock(&item(10.0, false), 0.0, None, as_of(), &t);
        assert_eq!(liquidated.action, DeadStockAction::Liquidate);
        assert_eq!(liquidated.risk_level, RiskLevel::High);
        assert_eq!(liquidated.value_at_risk, 200.0);
    }

    #[test]
    fn stale_stock_is_written_off_before_anything_else() {
        let t = DeadStockThresholds::default();
        let last = as_of() - chrono::Duration::days(400);
        let assessment = assess_dead_stock(&item(10.0, true), 0.0, Some(last), as_of(), &t);
        assert_eq!(assessment.action, DeadStockAction::Writeoff);
        assert_eq!(assessment.days_since_last_movement, Some(400));
    }

    #[test]
    fn empty_shelf_is_never_dead_stock() {
        let t = DeadStockThresholds::default();
        let assessment = assess_dead_stock(&item(0.0, false), 0.0, None, as_of(), &t);
        assert_eq!(assessment.action, DeadStockAction::Continue);
    }
}
