// src/filtering.rs

//! Search, filter, sort and roll up result sets.
//!
//! One condition builder for every list screen. Conditions arrive as plain
//! `(field, operator, value)` strings, are validated up front, and are
//! ANDed in the order given. Field names are accepted in snake_case or
//! camelCase (`risk_level`, `riskLevel`).
//!
//! Numeric operators parse both sides as numbers and fail closed: a value
//! that does not parse never satisfies `greaterThan` or `lessThan`.

use crate::errors::FilterError;
use crate::model::recommendation::{
    ActionType, DeadStockAction, DeadStockAssessment, ReplenishmentRecommendation, RiskLevel,
};
use crate::planning::engine::ItemFailure;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

/// A field as seen by the filter: number, text, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Empty,
}

impl FieldValue {
    fn text(value: impl ToString) -> Self {
        FieldValue::Text(value.to_string())
    }

    fn optional(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Empty, FieldValue::Number)
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if !n.is_nan() => Some(*n),
            FieldValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    fn display(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Empty => String::new(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// A record the facade can filter, search and sort.
pub trait Filterable {
    /// Every field name `field` answers to, in snake_case.
    const FIELDS: &'static [&'static str];

    /// Value of a snake_case field, `None` for unknown names.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Text the free-text search looks at.
    fn search_text(&self) -> Vec<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Contains,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "contains" => Ok(FilterOperator::Contains),
            "equals" => Ok(FilterOperator::Equals),
            "notEquals" | "not_equals" => Ok(FilterOperator::NotEquals),
            "greaterThan" | "greater_than" => Ok(FilterOperator::GreaterThan),
            "lessThan" | "less_than" => Ok(FilterOperator::LessThan),
            "isEmpty" | "is_empty" => Ok(FilterOperator::IsEmpty),
            "isNotEmpty" | "is_not_empty" => Ok(FilterOperator::IsNotEmpty),
            other => Err(FilterError::InvalidFilterOperator(other.to_owned())),
        }
    }
}

/// One condition as the condition builder sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: String,
}

impl FilterCondition {
    pub fn new(field: &str, operator: &str, value: &str) -> Self {
        Self {
            field: field.to_owned(),
            operator: operator.to_owned(),
            value: value.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: SortDirection::Desc,
        }
    }
}

/// Search, conditions and sort order for one list view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub search: Option<String>,
    pub conditions: Vec<FilterCondition>,
    pub sort: Vec<SortKey>,
}

impl Query {
    pub fn with_search(mut self, text: &str) -> Self {
        self.search = Some(text.to_owned());
        self
    }

    pub fn with_condition(mut self, field: &str, operator: &str, value: &str) -> Self {
        self.conditions.push(FilterCondition::new(field, operator, value));
        self
    }

    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }
}

/// `riskLevel` -> `risk_level`, `currentROP` -> `current_rop`.
fn normalize_field_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        out.push(ch.to_ascii_lowercase());
    }
    out
}

fn resolve_field<T: Filterable>(raw: &str) -> Result<String, FilterError> {
    let name = normalize_field_name(raw);
    if T::FIELDS.contains(&name.as_str()) {
        Ok(name)
    } else {
        Err(FilterError::UnknownField(raw.to_owned()))
    }
}

#[derive(Debug, Clone)]
struct CompiledCondition {
    field: String,
    operator: FilterOperator,
    value: String,
}

fn compile<T: Filterable>(conditions: &[FilterCondition]) -> Result<Vec<CompiledCondition>, FilterError> {
    conditions
        .iter()
        .map(|condition| {
            Ok(CompiledCondition {
                operator: condition.operator.parse()?,
                field: resolve_field::<T>(&condition.field)?,
                value: condition.value.clone(),
            })
        })
        .collect()
}

impl CompiledCondition {
    fn matches<T: Filterable>(&self, record: &T) -> bool {
        let actual = record.field(&self.field).unwrap_or(FieldValue::Empty);

        match self.operator {
            FilterOperator::Contains => {
                !actual.is_empty()
                    && actual
                        .display()
                        .to_lowercase()
                        .contains(&self.value.trim().to_lowercase())
            }
            FilterOperator::Equals => values_equal(&actual, &self.value),
            FilterOperator::NotEquals => !values_equal(&actual, &self.value),
            FilterOperator::GreaterThan => match (actual.as_number(), parse_number(&self.value)) {
                (Some(a), Some(b)) => a > b,
                _ => false,
            },
            FilterOperator::LessThan => match (actual.as_number(), parse_number(&self.value)) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
            FilterOperator::IsEmpty => actual.is_empty(),
            FilterOperator::IsNotEmpty => !actual.is_empty(),
        }
    }
}

fn values_equal(actual: &FieldValue, expected: &str) -> bool {
    match actual {
        FieldValue::Number(n) => parse_number(expected).is_some_and(|e| (n - e).abs() < 1e-9),
        FieldValue::Text(s) => s.trim().eq_ignore_ascii_case(expected.trim()),
        FieldValue::Empty => expected.trim().is_empty(),
    }
}

fn matches_search<T: Filterable>(record: &T, needle: &str) -> bool {
    record
        .search_text()
        .iter()
        .any(|text| text.to_lowercase().contains(needle))
}

/// Applies the conditions, ANDed in order. No conditions returns every
/// record in its original order.
pub fn filter_records<'a, T: Filterable>(
    records: &'a [T],
    conditions: &[FilterCondition],
) -> Result<Vec<&'a T>, FilterError> {
    let compiled = compile::<T>(conditions)?;
    Ok(records
        .iter()
        .filter(|record| compiled.iter().all(|condition| condition.matches(*record)))
        .collect())
}

fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (FieldValue::Text(x), FieldValue::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
        (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
        (FieldValue::Empty, FieldValue::Empty) => Ordering::Equal,
        // Empty values are handled by the caller.
        (FieldValue::Empty, _) => Ordering::Greater,
        (_, FieldValue::Empty) => Ordering::Less,
    }
}

/// Stable multi-key sort. Empty values go last in either direction.
pub fn sort_records<T: Filterable>(records: &mut [&T], keys: &[SortKey]) -> Result<(), FilterError> {
    let resolved = keys
        .iter()
        .map(|key| Ok((resolve_field::<T>(&key.field)?, key.direction)))
        .collect::<Result<Vec<_>, FilterError>>()?;

    records.sort_by(|a, b| {
        for (field, direction) in &resolved {
            let left = a.field(field).unwrap_or(FieldValue::Empty);
            let right = b.field(field).unwrap_or(FieldValue::Empty);
            let ordering = match (left.is_empty(), right.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let natural = compare_values(&left, &right);
                    match direction {
                        SortDirection::Asc => natural,
                        SortDirection::Desc => natural.reverse(),
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(())
}

/// Runs a full query: search, then conditions, then sort.
pub fn apply_query<'a, T: Filterable>(records: &'a [T], query: &Query) -> Result<Vec<&'a T>, FilterError> {
    let mut selected = filter_records(records, &query.conditions)?;

    if let Some(needle) = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
    {
        selected.retain(|record| matches_search(*record, &needle));
    }

    sort_records(&mut selected, &query.sort)?;
    Ok(selected)
}

// =========================================================================
// Rollups
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationSummary {
    pub count: usize,
    pub total_savings: f64,
    pub reorder_now: usize,
    pub by_action: BTreeMap<ActionType, usize>,
    pub by_risk: BTreeMap<RiskLevel, usize>,
}

impl RecommendationSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ReplenishmentRecommendation>) -> Self {
        records.into_iter().fold(Self::default(), |mut summary, record| {
            summary.count += 1;
            summary.total_savings += record.projected_annual_savings;
            if record.needs_reorder {
                summary.reorder_now += 1;
            }
            *summary.by_action.entry(record.action_type).or_insert(0) += 1;
            *summary.by_risk.entry(record.risk_level).or_insert(0) += 1;
            summary
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeadStockSummary {
    pub count: usize,
    pub total_value_at_risk: f64,
    pub by_action: BTreeMap<DeadStockAction, usize>,
    pub by_risk: BTreeMap<RiskLevel, usize>,
}

impl DeadStockSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DeadStockAssessment>) -> Self {
        records.into_iter().fold(Self::default(), |mut summary, record| {
            summary.count += 1;
            summary.total_value_at_risk += record.value_at_risk;
            *summary.by_action.entry(record.action).or_insert(0) += 1;
            *summary.by_risk.entry(record.risk_level).or_insert(0) += 1;
            summary
        })
    }
}

/// A filtered list of recommendations with its rollup, plus the items
/// that could not be calculated.
#[derive(Debug, Clone)]
pub struct RecommendationView<'a> {
    pub records: Vec<&'a ReplenishmentRecommendation>,
    pub summary: RecommendationSummary,
    pub failures: &'a [ItemFailure],
}

impl<'a> RecommendationView<'a> {
    pub fn build(
        recommendations: &'a [ReplenishmentRecommendation],
        failures: &'a [ItemFailure],
        query: &Query,
    ) -> Result<Self, FilterError> {
        let records = apply_query(recommendations, query)?;
        let summary = RecommendationSummary::from_records(records.iter().copied());
        Ok(Self {
            records,
            summary,
            failures,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DeadStockView<'a> {
    pub records: Vec<&'a DeadStockAssessment>,
    pub summary: DeadStockSummary,
}

impl<'a> DeadStockView<'a> {
    pub fn build(assessments: &'a [DeadStockAssessment], query: &Query) -> Result<Self, FilterError> {
        let records = apply_query(assessments, query)?;
        let summary = DeadStockSummary::from_records(records.iter().copied());
        Ok(Self { records, summary })
    }
}

// =========================================================================
// Field access
// =========================================================================

impl Filterable for ReplenishmentRecommendation {
    const FIELDS: &'static [&'static str] = &[
        "item_id",
        "location_id",
        "code",
        "name",
        "category",
        "daily_demand_mean",
        "daily_demand_std_dev",
        "lead_time_days",
        "current_rop",
        "recommended_rop",
        "current_eoq",
        "recommended_eoq",
        "current_safety_stock",
        "recommended_safety_stock",
        "par_level",
        "current_service_level",
        "target_service_level",
        "current_stock",
        "days_of_cover",
        "needs_reorder",
        "change_magnitude",
        "projected_annual_savings",
        "risk_level",
        "action_type",
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "item_id" => FieldValue::text(&self.item_id),
            "location_id" => FieldValue::text(&self.location_id),
            "code" => FieldValue::text(&self.code),
            "name" => FieldValue::text(&self.name),
            "category" => FieldValue::text(&self.category),
            "daily_demand_mean" => FieldValue::Number(self.daily_demand_mean),
            "daily_demand_std_dev" => FieldValue::Number(self.daily_demand_std_dev),
            "lead_time_days" => FieldValue::Number(self.lead_time_days),
            "current_rop" => FieldValue::Number(self.current_rop),
            "recommended_rop" => FieldValue::Number(self.recommended_rop),
            "current_eoq" => FieldValue::Number(self.current_eoq),
            "recommended_eoq" => FieldValue::Number(self.recommended_eoq),
            "current_safety_stock" => FieldValue::Number(self.current_safety_stock),
            "recommended_safety_stock" => FieldValue::Number(self.recommended_safety_stock),
            "par_level" => FieldValue::Number(self.par_level),
            "current_service_level" => FieldValue::Number(self.current_service_level),
            "target_service_level" => FieldValue::Number(self.target_service_level),
            "current_stock" => FieldValue::Number(self.current_stock),
            "days_of_cover" => FieldValue::optional(self.days_of_cover),
            "needs_reorder" => FieldValue::text(self.needs_reorder),
            "change_magnitude" => FieldValue::Number(self.change_magnitude),
            "projected_annual_savings" => FieldValue::Number(self.projected_annual_savings),
            "risk_level" => FieldValue::text(self.risk_level),
            "action_type" => FieldValue::text(self.action_type),
            _ => return None,
        };
        Some(value)
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.item_id.as_str(),
            self.location_id.as_str(),
            self.code.as_str(),
            self.name.as_str(),
            self.category.as_str(),
        ]
    }
}

impl Filterable for DeadStockAssessment {
    const FIELDS: &'static [&'static str] = &[
        "item_id",
        "location_id",
        "code",
        "name",
        "category",
        "current_stock",
        "daily_demand_mean",
        "days_of_cover",
        "days_since_last_movement",
        "excess_quantity",
        "value_at_risk",
        "risk_level",
        "action",
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "item_id" => FieldValue::text(&self.item_id),
            "location_id" => FieldValue::text(&self.location_id),
            "code" => FieldValue::text(&self.code),
            "name" => FieldValue::text(&self.name),
            "category" => FieldValue::text(&self.category),
            "current_stock" => FieldValue::Number(self.current_stock),
            "daily_demand_mean" => FieldValue::Number(self.daily_demand_mean),
            "days_of_cover" => FieldValue::optional(self.days_of_cover),
            "days_since_last_movement" => {
                FieldValue::optional(self.days_since_last_movement.map(|d| d as f64))
            }
            "excess_quantity" => FieldValue::Number(self.excess_quantity),
            "value_at_risk" => FieldValue::Number(self.value_at_risk),
            "risk_level" => FieldValue::text(self.risk_level),
            "action" => FieldValue::text(self.action),
            _ => return None,
        };
        Some(value)
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.item_id.as_str(),
            self.location_id.as_str(),
            self.code.as_str(),
            self.name.as_str(),
            self.category.as_str(),
        ]
    }
}
