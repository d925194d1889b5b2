//! Fixed-Rate Installment Simulation SDK
//!
//! This crate reproduces, off-chain, the fixed-point arithmetic and
//! interest-rate model a fixed-rate lending protocol runs on-chain, and uses
//! it to split a borrow into several fixed-rate installments.
//!
//! # Overview
//!
//! The SDK allows you to:
//! - Compute WAD fixed-point products, quotients, logarithms and exponentials
//!   with the exact rounding of the contracts
//! - Evaluate the `a / (u_max - u) + b` rate curve at a point or over a
//!   utilization interval
//! - Derive maturity pool and floating pool utilizations from a snapshot
//! - Split a borrow across consecutive maturities so their rates converge
//!
//! # Example
//!
//! ```rust
//! use installments_sim::{
//!     solve_installments, CurveParameters, GlobalMarketState, InstallmentRequest, PoolState, WAD,
//! };
//! use alloy_primitives::{I256, U256};
//!
//! let milli = |x: u64| U256::from(x) * U256::from(1_000_000_000_000_000u64);
//! let curve = CurveParameters::new(milli(10), I256::from_raw(milli(5)), milli(900)).unwrap();
//! let market = GlobalMarketState::from_totals(U256::from(10_000) * WAD, U256::ZERO, U256::ZERO);
//!
//! let pools = vec![
//!     PoolState::new(1_702_419_200, U256::ZERO, U256::from(1_000) * WAD, U256::MAX),
//!     PoolState::new(1_704_838_400, U256::ZERO, U256::from(4_000) * WAD, U256::MAX),
//! ];
//! let request = InstallmentRequest::new(U256::from(2_000) * WAD, 2, 1_702_419_200, 2_419_200);
//!
//! let plan = solve_installments(&request, &pools, &market, &curve, 1_700_000_000).unwrap();
//! assert_eq!(plan.total_principal(), U256::from(2_000) * WAD);
//! assert!(plan.total_repay() > plan.total_principal());
//! ```

pub mod curve;
pub mod error;
pub mod installments;
pub mod market;
pub mod math;

// Re-export commonly used types
pub use error::{CurveError, MathError, SolveError};

// Curve exports
pub use curve::{average_rate, curve_slope, evaluate_curve, CurveParameters, PRECISION_THRESHOLD};

// Market exports
pub use market::{
    fixed_utilization, floating_utilization, global_utilization, GlobalMarketState, PoolState,
};

// Math exports
pub use math::{SECONDS_PER_YEAR, WAD};

// Solver exports
pub use installments::{
    installment_fee, solve_installments, solve_installments_with, InstallmentPlan,
    InstallmentRequest, MarginalRate, Rebalance, SlopeProportional, SolverConfig,
    DEFAULT_MAX_ITERATIONS, DEFAULT_RATE_TOLERANCE, DEFAULT_SLOPE_EPSILON,
};
