pub mod metrics;
pub mod performance;
