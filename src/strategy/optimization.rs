// src/strategy/optimization.rs

//! Replenishment arithmetic: service-level quantiles, safety stock,
//! reorder point, economic order quantity and the annual cost model used to
//! price a change of policy.
//!
//! Every function here returns full-precision values. Rounding to whole
//! units belongs to whoever presents the numbers.

use crate::errors::{CalcError, CalcResult};

const DAYS_PER_YEAR: f64 = 365.0;

/// Inverse CDF (quantile function) of the standard normal distribution.
///
/// Acklam's rational approximation; relative error below 1.2e-9 across
/// the open interval. Callers validate `p` first.
fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    // Tails share one rational function; the upper tail is mirrored.
    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// CDF of the standard normal distribution.
///
/// Based on Abramowitz and Stegun formula 7.1.26 for erf.
/// The absolute error is less than 1.5e-7.
pub fn normal_cdf(x: f64) -> f64 {
    let z = x.abs() / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + 0.327_591_1 * z);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    let erf = 1.0 - poly * (-z * z).exp();

    if x >= 0.0 {
        0.5 * (1.0 + erf)
    } else {
        0.5 * (1.0 - erf)
    }
}

/// Z-score for a target service level (probability of no stockout during
/// the lead time).
///
/// Accepts any level strictly between 0 and 1.
pub fn z_score(service_level: f64) -> CalcResult<f64> {
    if !(service_level > 0.0 && service_level < 1.0) {
        return Err(CalcError::InvalidServiceLevel(service_level));
    }
    Ok(inverse_normal_cdf(service_level))
}

fn check_lead_time(lead_time_days: f64) -> CalcResult<f64> {
    if lead_time_days.is_finite() && lead_time_days >= 0.0 {
        Ok(lead_time_days)
    } else {
        Err(CalcError::InvalidLeadTime(lead_time_days))
    }
}

fn check_positive(name: &'static str, value: f64) -> CalcResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CalcError::InvalidCostParameter { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> CalcResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CalcError::InvalidCostParameter { name, value })
    }
}

/// Safety stock for a target service level.
///
/// # Formula
/// SafetyStock = Z(service_level) * StdDev_daily * sqrt(LeadTimeDays)
///
/// Service levels below 0.5 have a negative Z; the result is floored at 0.
pub fn safety_stock(
    daily_demand_std_dev: f64,
    lead_time_days: f64,
    service_level: f64,
) -> CalcResult<f64> {
    let z = z_score(service_level)?;
    let lead_time = check_lead_time(lead_time_days)?;
    let sigma = daily_demand_std_dev.max(0.0);

    Ok((z * sigma * lead_time.sqrt()).max(0.0))
}

/// Reorder point: expected demand over the lead time plus safety stock.
pub fn reorder_point(
    daily_demand_mean: f64,
    lead_time_days: f64,
    safety_stock: f64,
) -> CalcResult<f64> {
    let lead_time = check_lead_time(lead_time_days)?;
    Ok(daily_demand_mean * lead_time + safety_stock)
}

/// Order-up-to (par) level for a periodic review.
///
/// Covers demand over the lead time plus one review period, plus safety
/// stock.
pub fn par_level(
    daily_demand_mean: f64,
    lead_time_days: f64,
    review_period_days: f64,
    safety_stock: f64,
) -> CalcResult<f64> {
    let lead_time = check_lead_time(lead_time_days)?;
    let review = review_period_days.max(0.0);
    Ok(daily_demand_mean * (lead_time + review) + safety_stock)
}

/// Cost inputs shared by the EOQ and the annual cost model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostInputs {
    pub annual_demand: f64,
    pub ordering_cost: f64,
    /// Fraction of unit cost per year.
    pub holding_cost_rate: f64,
    pub unit_cost: f64,
}

impl CostInputs {
    pub fn from_daily(
        daily_demand_mean: f64,
        ordering_cost: f64,
        holding_cost_rate: f64,
        unit_cost: f64,
    ) -> Self {
        Self {
            annual_demand: daily_demand_mean * DAYS_PER_YEAR,
            ordering_cost,
            holding_cost_rate,
            unit_cost,
        }
    }

    fn validate(&self) -> CalcResult<()> {
        check_positive("holding_cost_rate", self.holding_cost_rate)?;
        check_positive("unit_cost", self.unit_cost)?;
        check_positive("ordering_cost", self.ordering_cost)?;
        check_non_negative("annual_demand", self.annual_demand)?;
        Ok(())
    }

    /// Holding cost of one unit for one year.
    fn unit_holding_cost(&self) -> f64 {
        self.holding_cost_rate * self.unit_cost
    }
}

/// Economic order quantity, floored at `minimum_order_qty`.
///
/// # Formula
/// EOQ = sqrt(2 * AnnualDemand * OrderingCost / (HoldingCostRate * UnitCost))
///
/// With no annual demand nothing needs ordering and the result is 0; the
/// minimum order quantity only applies to an order that is actually placed.
///
/// # Errors
/// `InvalidCostParameter` if the ordering cost, holding cost rate or unit
/// cost is not positive, or the demand is negative.
pub fn economic_order_quantity(costs: &CostInputs, minimum_order_qty: f64) -> CalcResult<f64> {
    costs.validate()?;

    if costs.annual_demand == 0.0 {
        return Ok(0.0);
    }

    let eoq = (2.0 * costs.annual_demand * costs.ordering_cost / costs.unit_holding_cost()).sqrt();
    Ok(eoq.max(minimum_order_qty.max(0.0)))
}

/// Yearly ordering plus holding cost of running with a given order quantity
/// and safety stock.
///
/// Returns `None` when demand is positive but the order quantity is 0:
/// such a policy never replenishes and has no finite ordering cost.
pub fn annual_cost(costs: &CostInputs, order_quantity: f64, safety_stock: f64) -> Option<f64> {
    let holding = costs.unit_holding_cost() * (order_quantity.max(0.0) / 2.0 + safety_stock.max(0.0));

    if costs.annual_demand == 0.0 {
        return Some(holding);
    }
    if order_quantity <= 0.0 {
        return None;
    }
    Some(costs.ordering_cost * costs.annual_demand / order_quantity + holding)
}

/// A policy as far as the cost model is concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyPoint {
    pub order_quantity: f64,
    pub safety_stock: f64,
}

/// Projected yearly savings of moving from `current` to `recommended`.
///
/// Two contributions, each floored at 0:
/// * holding delta: annual cost of the current policy minus the
///   recommended one;
/// * stockout delta: extra safety stock valued at
///   `unit_cost * stockout_penalty_rate` per unit.
pub fn projected_savings(
    costs: &CostInputs,
    current: PolicyPoint,
    recommended: PolicyPoint,
    stockout_penalty_rate: f64,
) -> CalcResult<f64> {
    costs.validate()?;
    let penalty = check_non_negative("stockout_penalty_rate", stockout_penalty_rate)?;

    let holding_delta = match (
        annual_cost(costs, current.order_quantity, current.safety_stock),
        annual_cost(costs, recommended.order_quantity, recommended.safety_stock),
    ) {
        (Some(now), Some(next)) => (now - next).max(0.0),
        _ => 0.0,
    };

    let stockout_delta =
        (recommended.safety_stock - current.safety_stock).max(0.0) * costs.unit_cost * penalty;

    Ok(holding_delta + stockout_delta)
}

/// Service level implied by holding `safety_stock` against the given
/// demand variability over the lead time.
///
/// Without variability the reorder point covers lead-time demand exactly,
/// so any non-negative safety stock gives full service.
pub fn implied_service_level(
    safety_stock: f64,
    daily_demand_std_dev: f64,
    lead_time_days: f64,
) -> f64 {
    let sigma_l = daily_demand_std_dev.max(0.0) * lead_time_days.max(0.0).sqrt();
    if sigma_l == 0.0 {
        return if safety_stock >= 0.0 { 1.0 } else { 0.0 };
    }
    normal_cdf(safety_stock / sigma_l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn z_scores_match_configuration_levels() {
        assert!(close(z_score(0.90).unwrap(), 1.2816, 1e-4));
        assert!(close(z_score(0.95).unwrap(), 1.6449, 1e-4));
        assert!(close(z_score(0.99).unwrap(), 2.3263, 1e-4));
        assert!(close(z_score(0.5).unwrap(), 0.0, 1e-9));
        assert!(close(z_score(0.01).unwrap(), -2.3263, 1e-4));
    }

    #[test]
    fn service_level_outside_open_interval_fails() {
        for level in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(
                z_score(level),
                Err(CalcError::InvalidServiceLevel(_))
            ));
            assert!(safety_stock(1.0, 7.0, level).is_err());
        }
    }

    #[test]
    fn normal_cdf_inverts_the_quantile() {
        for p in [0.05, 0.3, 0.5, 0.9, 0.975, 0.995] {
            let z = z_score(p).unwrap();
            assert!(close(normal_cdf(z), p, 1e-6), "p = {p}");
        }
    }

    #[test]
    fn safety_stock_and_reorder_point_scenario() {
        let ss = safety_stock(1.0, 7.0, 0.95).unwrap();
        assert!(close(ss, 1.645 * 7.0_f64.sqrt(), 1e-3));
        assert!(close(ss, 4.35, 0.01));

        let rop = reorder_point(5.0, 7.0, ss).unwrap();
        assert_eq!(rop, 5.0 * 7.0 + ss);
        assert!(close(rop, 39.35, 0.01));
    }

    #[test]
    fn low_service_level_does_not_go_negative() {
        assert_eq!(safety_stock(3.0, 4.0, 0.2).unwrap(), 0.0);
    }

    #[test]
    fn negative_lead_time_is_rejected() {
        assert_eq!(
            safety_stock(1.0, -1.0, 0.95),
            Err(CalcError::InvalidLeadTime(-1.0))
        );
        assert!(reorder_point(1.0, f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn eoq_textbook_scenario() {
        let costs = CostInputs {
            annual_demand: 1000.0,
            ordering_cost: 50.0,
            holding_cost_rate: 0.2,
            unit_cost: 10.0,
        };
        let eoq = economic_order_quantity(&costs, 0.0).unwrap();
        assert!(close(eoq, 50_000.0_f64.sqrt(), 1e-9));
        assert!(close(eoq, 223.6, 0.01));
    }

    #[test]
    fn zero_holding_rate_is_an_error_not_infinity() {
        let costs = CostInputs {
            annual_demand: 1000.0,
            ordering_cost: 50.0,
            holding_cost_rate: 0.0,
            unit_cost: 10.0,
        };
        assert_eq!(
            economic_order_quantity(&costs, 0.0),
            Err(CalcError::InvalidCostParameter {
                name: "holding_cost_rate",
                value: 0.0
            })
        );
    }

    #[test]
    fn non_positive_unit_cost_is_an_error() {
        let costs = CostInputs {
            annual_demand: 10.0,
            ordering_cost: 5.0,
            holding_cost_rate: 0.25,
            unit_cost: -3.0,
        };
        assert!(matches!(
            economic_order_quantity(&costs, 0.0),
            Err(CalcError::InvalidCostParameter { name: "unit_cost", .. })
        ));
    }

    #[test]
    fn zero_demand_needs_no_order() {
        let costs = CostInputs {
            annual_demand: 0.0,
            ordering_cost: 50.0,
            holding_cost_rate: 0.2,
            unit_cost: 10.0,
        };
        assert_eq!(economic_order_quantity(&costs, 24.0).unwrap(), 0.0);
    }

    #[test]
    fn minimum_order_quantity_floors_the_eoq() {
        let costs = CostInputs {
            annual_demand: 10.0,
            ordering_cost: 1.0,
            holding_cost_rate: 0.2,
            unit_cost: 10.0,
        };
        assert_eq!(economic_order_quantity(&costs, 48.0).unwrap(), 48.0);
    }

    #[test]
    fn eoq_never_below_minimum_for_random_valid_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let costs = CostInputs {
                annual_demand: rng.gen_range(0.01..100_000.0),
                ordering_cost: rng.gen_range(0.01..500.0),
                holding_cost_rate: rng.gen_range(0.001..1.0),
                unit_cost: rng.gen_range(0.01..1_000.0),
            };
            let minimum = rng.gen_range(0.0..200.0);
            let eoq = economic_order_quantity(&costs, minimum).unwrap();
            assert!(eoq.is_finite());
            assert!(eoq > 0.0);
            assert!(eoq >= minimum, "{costs:?} min {minimum} -> {eoq}");
        }
    }

    #[test]
    fn safety_stock_never_decreases_with_service_level() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2_000 {
            let sigma = rng.gen_range(0.0..50.0);
            let lead = rng.gen_range(0.0..60.0);
            let a: f64 = rng.gen_range(0.001..0.999);
            let b: f64 = rng.gen_range(0.001..0.999);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

            let ss_lo = safety_stock(sigma, lead, lo).unwrap();
            let ss_hi = safety_stock(sigma, lead, hi).unwrap();
            assert!(ss_lo >= 0.0);
            assert!(ss_hi + 1e-9 >= ss_lo, "sigma {sigma} lead {lead}: {lo}->{ss_lo}, {hi}->{ss_hi}");
        }
    }

    #[test]
    fn reorder_point_identity_holds_exactly() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let mean = rng.gen_range(0.0..100.0);
            let lead = rng.gen_range(0.0..30.0);
            let ss = rng.gen_range(0.0..40.0);
            assert_eq!(reorder_point(mean, lead, ss).unwrap(), mean * lead + ss);
        }
    }

    #[test]
    fn par_level_adds_the_review_period() {
        assert_eq!(par_level(5.0, 7.0, 7.0, 4.0).unwrap(), 74.0);
    }

    #[test]
    fn savings_are_zero_when_policies_match() {
        let costs = CostInputs::from_daily(4.0, 25.0, 0.2, 8.0);
        let point = PolicyPoint {
            order_quantity: 120.0,
            safety_stock: 10.0,
        };
        assert_eq!(projected_savings(&costs, point, point, 0.5).unwrap(), 0.0);
    }

    #[test]
    fn savings_combine_holding_and_stockout_deltas() {
        let costs = CostInputs {
            annual_demand: 1000.0,
            ordering_cost: 50.0,
            holding_cost_rate: 0.2,
            unit_cost: 10.0,
        };
        let current = PolicyPoint {
            order_quantity: 500.0,
            safety_stock: 0.0,
        };
        let recommended = PolicyPoint {
            order_quantity: 50_000.0_f64.sqrt(),
            safety_stock: 5.0,
        };
        // current: 50*1000/500 + 2*(250) = 100 + 500 = 600
        // recommended: 2*sqrt(50000)... + 2*5 = 447.21 + 10 = 457.21
        let savings = projected_savings(&costs, current, recommended, 0.3).unwrap();
        let expected_holding = 600.0 - (2.0 * 50_000.0_f64.sqrt() + 10.0);
        let expected_stockout = 5.0 * 10.0 * 0.3;
        assert!(close(savings, expected_holding + expected_stockout, 1e-9));
    }

    #[test]
    fn savings_never_negative() {
        let costs = CostInputs::from_daily(2.0, 40.0, 0.25, 12.0);
        let good = PolicyPoint {
            order_quantity: 100.0,
            safety_stock: 5.0,
        };
        let bad = PolicyPoint {
            order_quantity: 5.0,
            safety_stock: 0.0,
        };
        assert_eq!(projected_savings(&costs, good, bad, 0.5).unwrap(), 0.0);
    }

    #[test]
    fn implied_service_level_handles_zero_variability() {
        assert_eq!(implied_service_level(0.0, 0.0, 7.0), 1.0);
        assert_eq!(implied_service_level(3.0, 0.0, 7.0), 1.0);
        assert_eq!(implied_service_level(-1.0, 0.0, 7.0), 0.0);
        let ss = safety_stock(2.0, 9.0, 0.95).unwrap();
        assert!(close(implied_service_level(ss, 2.0, 9.0), 0.95, 1e-6));
    }
}
