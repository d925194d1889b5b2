//! Error types for the installment preview library.
//!
//! Each layer has its own enum so callers can decide per kind how to render
//! a failure. Lower-level errors convert into higher-level ones with `?`.

use alloy_primitives::U256;
use thiserror::Error;

/// Errors raised by the WAD fixed-point kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// A ratio denominator was zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Logarithm of a non-positive value
    #[error("Undefined: logarithm argument must be strictly positive")]
    Undefined,

    /// Result does not fit in 256 bits (or exceeds the exponential domain)
    #[error("Arithmetic overflow")]
    Overflow,
}

/// Errors raised while evaluating an interest-rate curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CurveError {
    /// The curve is only defined strictly below its maximum utilization
    #[error("Utilization rate exceeded: {utilization} >= max {max}")]
    UtilizationExceeded { utilization: U256, max: U256 },

    /// The signed offset pushed the rate below zero
    #[error("Curve produced a negative rate")]
    NegativeRate,

    /// Utilization interval runs backwards
    #[error("Invalid utilization interval: {from} > {to}")]
    InvalidInterval { from: U256, to: U256 },

    /// Curve parameters cannot describe a valid curve
    #[error("Invalid curve parameters: {0}")]
    InvalidParameters(&'static str),

    /// Kernel failure while evaluating the curve
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Errors raised by the installment solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The request itself is malformed
    #[error("Invalid installment request: {0}")]
    InvalidRequest(String),

    /// No maturity pools were supplied
    #[error("No maturity pools available")]
    NoPools,

    /// A scheduled maturity has no matching pool in the snapshot
    #[error("No pool found for maturity {maturity}")]
    MaturityNotFound { maturity: u64 },

    /// A scheduled maturity is not in the future
    #[error("Maturity {maturity} is not after current time {now}")]
    MaturedPool { maturity: u64, now: u64 },

    /// The amount cannot be placed across the selected pools
    #[error("Insufficient capacity: requested {requested}, capacity {capacity}")]
    InsufficientCapacity { requested: U256, capacity: U256 },

    /// A rebalancing strategy returned the wrong number of allocations
    #[error("Rebalance produced {actual} allocations for {expected} installments")]
    InvalidAllocation { expected: usize, actual: usize },

    /// Curve evaluation failed
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Kernel failure inside the solver
    #[error(transparent)]
    Math(#[from] MathError),
}
