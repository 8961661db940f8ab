// src/io/demand.rs

use crate::model::item::{ConsumptionRecord, CurrentPolicy, StockItem};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal, NormalError};

/// Generates `days` of consumption ending at `as_of`, every day the same.
/// Useful for checking that steady demand needs no safety stock.
pub fn generate_constant_history(
    item: &StockItem,
    days: u32,
    as_of: NaiveDate,
    quantity: f64,
) -> Vec<ConsumptionRecord> {
    (0..i64::from(days))
        .map(|offset| record(item, as_of - Duration::days(offset), quantity))
        .collect()
}

/// Generates `days` of consumption ending at `as_of` from a Normal (Bell
/// Curve) distribution.
///
/// # Arguments
/// * `mean` - The average daily consumption (e.g., 10.0).
/// * `std_dev` - The standard deviation (volatility) (e.g., 2.0).
pub fn generate_normal_history<R: Rng>(
    item: &StockItem,
    days: u32,
    as_of: NaiveDate,
    mean: f64,
    std_dev: f64,
    rng: &mut R,
) -> Result<Vec<ConsumptionRecord>, NormalError> {
    let normal = Normal::new(mean, std_dev)?;

    let mut history = Vec::with_capacity(days as usize);
    for offset in (0..i64::from(days)).rev() {
        // Consumption cannot be negative.
        let quantity = normal.sample(rng).round().max(0.0);
        history.push(record(item, as_of - Duration::days(offset), quantity));
    }
    Ok(history)
}

fn record(item: &StockItem, date: NaiveDate, quantity: f64) -> ConsumptionRecord {
    ConsumptionRecord {
        product_id: item.product_id.clone(),
        location_id: item.location_id.clone(),
        date,
        quantity,
    }
}

/// A small kitchen catalogue for demo runs: (code, name, category, cost,
/// lead time, mean daily use, std dev, critical, returnable).
const DEMO_CATALOGUE: &[(&str, &str, &str, f64, f64, f64, f64, bool, bool)] = &[
    ("TOM-CAN", "Chopped tomatoes 2.5kg", "Dry goods", 4.2, 5.0, 6.0, 2.0, false, true),
    ("MOZ-1KG", "Mozzarella 1kg", "Dairy", 9.8, 3.0, 8.0, 3.5, true, false),
    ("FLR-25", "Flour 25kg", "Dry goods", 21.0, 7.0, 1.5, 0.6, true, false),
    ("BSL-BCH", "Basil bunch", "Produce", 1.1, 2.0, 12.0, 5.0, false, false),
    ("OIL-5L", "Olive oil 5L", "Dry goods", 32.0, 10.0, 0.8, 0.5, false, true),
    ("TRF-OIL", "Truffle oil 250ml", "Specialty", 24.0, 14.0, 0.0, 0.0, false, true),
];

/// Demo items plus normally distributed history for each of them.
pub fn demo_dataset<R: Rng>(
    location_id: &str,
    days: u32,
    as_of: NaiveDate,
    rng: &mut R,
) -> Result<(Vec<StockItem>, Vec<ConsumptionRecord>), NormalError> {
    let mut items = Vec::new();
    let mut history = Vec::new();

    for (index, &(code, name, category, cost, lead, mean, sd, critical, returnable)) in
        DEMO_CATALOGUE.iter().enumerate()
    {
        // Current settings are a rough guess a buyer might have made.
        let guess_ss = (sd * 1.5).round();
        let item = StockItem {
            product_id: format!("P{:03}", index + 1),
            code: code.to_owned(),
            name: name.to_owned(),
            category: category.to_owned(),
            location_id: location_id.to_owned(),
            unit_of_measure: "each".to_owned(),
            current_stock: rng.gen_range(0.0..60.0_f64).round(),
            unit_cost: cost,
            lead_time_days: lead,
            critical,
            returnable,
            current: CurrentPolicy {
                reorder_point: (mean * lead).round() + guess_ss,
                order_quantity: (mean * 14.0).round().max(1.0),
                safety_stock: guess_ss,
            },
        };

        if mean > 0.0 {
            history.extend(generate_normal_history(&item, days, as_of, mean, sd, rng)?);
        }
        items.push(item);
    }

    Ok((items, history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn normal_history_is_non_negative_and_dated_up_to_as_of() {
        let mut rng = StdRng::seed_from_u64(1);
        let (items, _) = demo_dataset("L1", 10, as_of(), &mut rng).unwrap();
        let history = generate_normal_history(&items[0], 90, as_of(), 2.0, 4.0, &mut rng).unwrap();

        assert_eq!(history.len(), 90);
        assert!(history.iter().all(|r| r.quantity >= 0.0));
        assert_eq!(history.last().unwrap().date, as_of());
        assert_eq!(history[0].date, as_of() - Duration::days(89));
    }

    #[test]
    fn invalid_std_dev_is_reported() {
        let mut rng = StdRng::seed_from_u64(1);
        let (items, _) = demo_dataset("L1", 10, as_of(), &mut rng).unwrap();
        assert!(generate_normal_history(&items[0], 5, as_of(), 2.0, f64::NAN, &mut rng).is_err());
    }

    #[test]
    fn demo_items_without_demand_get_no_history() {
        let mut rng = StdRng::seed_from_u64(5);
        let (items, history) = demo_dataset("L1", 30, as_of(), &mut rng).unwrap();
        let silent = items.iter().find(|i| i.code == "TRF-OIL").unwrap();
        assert!(history.iter().all(|r| r.product_id != silent.product_id));
        assert_eq!(history.len(), 30 * (items.len() - 1));
    }

    #[test]
    fn constant_history_repeats_the_quantity() {
        let mut rng = StdRng::seed_from_u64(2);
        let (items, _) = demo_dataset("L1", 1, as_of(), &mut rng).unwrap();
        let history = generate_constant_history(&items[0], 30, as_of(), 4.0);
        assert_eq!(history.len(), 30);
        assert!(history.iter().all(|r| r.quantity == 4.0));
    }
}
