pub mod classifier;
pub mod demand;
pub mod implementations;
pub mod optimization;
pub mod traits;
