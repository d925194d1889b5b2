//! Command implementations.

pub mod plan;
pub mod rate;
pub mod utilization;

pub use plan::run_plan;
pub use rate::run_rate;
pub use utilization::run_utilization;
