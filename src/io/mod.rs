pub mod demand;
pub mod history;
pub mod reporting;
