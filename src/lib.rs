//! Reorder and dead-stock decision engine for a multi-location kitchen
//! inventory.
//!
//! Consumption history goes in; reorder points, order quantities, safety
//! stock, risk ratings and recommended actions come out, ready to be
//! filtered and rolled up for a list screen. Everything is synchronous and
//! free of shared state.

pub mod errors;
pub mod filtering;
pub mod io;
pub mod logging;
pub mod model;
pub mod planning;
pub mod strategy;

pub use errors::{CalcError, ConfigError, FilterError, IoError};
pub use filtering::{FilterCondition, Query, SortKey};
pub use planning::config::EngineConfig;
pub use planning::engine::{BatchReport, ReplenishmentEngine, RunContext};
