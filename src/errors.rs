// src/errors.rs

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of a single item's calculation.
///
/// None of these abort a batch: the engine records them next to the item
/// and carries on with the rest.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalcError {
    #[error("no consumption history inside the estimation window")]
    InsufficientData,

    #[error("service level {0} is outside (0, 1)")]
    InvalidServiceLevel(f64),

    #[error("cost parameter {name} must be positive, got {value}")]
    InvalidCostParameter { name: &'static str, value: f64 },

    #[error("history window of {0} days is outside 30..=365")]
    InvalidHistoryWindow(u32),

    #[error("lead time must be non-negative and finite, got {0}")]
    InvalidLeadTime(f64),

    #[error("negative consumption {quantity} recorded on {date}")]
    NegativeConsumption { date: NaiveDate, quantity: f64 },
}

/// Failures while compiling a filter chain. These are caller errors and
/// reject the whole query before any record is examined.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unrecognized filter operator '{0}'")]
    InvalidFilterOperator(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Error)]
pub enum IoError {
    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CalcResult<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_parameter_message_names_the_parameter() {
        let err = CalcError::InvalidCostParameter {
            name: "holding_cost_rate",
            value: 0.0,
        };
        assert_eq!(
            err.to_string(),
            "cost parameter holding_cost_rate must be positive, got 0"
        );
    }

    #[test]
    fn filter_operator_message_keeps_the_raw_operator() {
        let err = FilterError::InvalidFilterOperator("between".to_owned());
        assert_eq!(err.to_string(), "unrecognized filter operator 'between'");
    }
}
