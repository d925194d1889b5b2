//! Fixed-rate interest curve.
//!
//! Each pool type prices borrows with a three-parameter hyperbolic curve:
//!
//! ```text
//! rate(u) = a / (u_max - u) + b
//! ```
//!
//! The curve is only defined strictly below `u_max`; the contract reverts for
//! utilizations at or above it and so does [`evaluate_curve`]. Rates are
//! annualized and WAD-scaled (`0.05 WAD` = 5% per year).
//!
//! A borrow moves utilization from `u_before` to `u_after`, so the contract
//! charges the mean of the curve over that interval rather than the point
//! rate. [`average_rate`] reproduces that calculation:
//!
//! | Interval | Formula |
//! |----------|---------|
//! | `δ / α < 7.5e-4` | Simpson's rule `(a/α + 4a/(α - δ/2) + a/(α - δ)) / 6 + b` |
//! | otherwise | `a * ln(α / (α - δ)) / δ + b` |
//!
//! with `α = u_max - u_before` and `δ = u_after - u_before`.
//!
//! # Example
//!
//! ```rust
//! use installments_sim::curve::{evaluate_curve, CurveParameters};
//! use alloy_primitives::{I256, U256};
//!
//! let curve = CurveParameters::new(
//!     U256::from(10_000_000_000_000_000u64),             // a = 0.01
//!     I256::from_raw(U256::from(5_000_000_000_000_000u64)), // b = 0.005
//!     U256::from(900_000_000_000_000_000u64),            // u_max = 0.9
//! )
//! .unwrap();
//!
//! // 40% utilization: 0.01 / 0.5 + 0.005 = 2.5%
//! let rate = evaluate_curve(&curve, U256::from(400_000_000_000_000_000u64)).unwrap();
//! assert_eq!(rate, U256::from(25_000_000_000_000_000u64));
//!
//! // The curve is undefined at its ceiling
//! assert!(evaluate_curve(&curve, curve.u_max).is_err());
//! ```

use alloy_primitives::{uint, I256, U256};

use crate::error::CurveError;
use crate::math::{abs, div_wad, ln_wad, mul_div_down, to_signed, zero_floor_sub, WAD};

/// Interval width (relative to the distance from `u_max`) below which the
/// average rate is integrated numerically instead of through `ln`.
pub const PRECISION_THRESHOLD: U256 = uint!(750_000_000_000_000_U256);

/// Parameters of a `a / (u_max - u) + b` curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveParameters {
    /// Curve steepness (WAD)
    pub a: U256,
    /// Signed rate offset (WAD)
    pub b: I256,
    /// Utilization ceiling, exclusive (WAD)
    pub u_max: U256,
}

impl CurveParameters {
    /// Creates validated curve parameters.
    pub fn new(a: U256, b: I256, u_max: U256) -> Result<Self, CurveError> {
        let params = Self { a, b, u_max };
        params.validate()?;
        Ok(params)
    }

    /// Checks that the parameters describe a strictly increasing curve.
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.u_max.is_zero() {
            return Err(CurveError::InvalidParameters("u_max must be positive"));
        }
        if self.a.is_zero() {
            return Err(CurveError::InvalidParameters("a must be positive"));
        }
        Ok(())
    }

    /// Rate at the given utilization. See [`evaluate_curve`].
    pub fn rate(&self, utilization: U256) -> Result<U256, CurveError> {
        evaluate_curve(self, utilization)
    }
}

fn apply_offset(base: U256, b: I256) -> Result<U256, CurveError> {
    if b.is_negative() {
        base.checked_sub(abs(b)).ok_or(CurveError::NegativeRate)
    } else {
        base.checked_add(abs(b))
            .ok_or(CurveError::Math(crate::error::MathError::Overflow))
    }
}

/// Evaluates `a / (u_max - u) + b` at `utilization`.
///
/// Fails with [`CurveError::UtilizationExceeded`] when `utilization >= u_max`.
pub fn evaluate_curve(params: &CurveParameters, utilization: U256) -> Result<U256, CurveError> {
    if utilization >= params.u_max {
        return Err(CurveError::UtilizationExceeded {
            utilization,
            max: params.u_max,
        });
    }
    let base = div_wad(params.a, params.u_max - utilization)?;
    apply_offset(base, params.b)
}

/// Mean rate of the curve between two utilizations.
///
/// This is the fixed rate the contract charges for a borrow that moves a
/// pool's utilization from `u_before` to `u_after`.
pub fn average_rate(
    params: &CurveParameters,
    u_before: U256,
    u_after: U256,
) -> Result<U256, CurveError> {
    if u_after < u_before {
        return Err(CurveError::InvalidInterval {
            from: u_before,
            to: u_after,
        });
    }
    if u_after >= params.u_max {
        return Err(CurveError::UtilizationExceeded {
            utilization: u_after,
            max: params.u_max,
        });
    }
    if u_after == u_before {
        return evaluate_curve(params, u_before);
    }

    let alpha = params.u_max - u_before;
    let delta = u_after - u_before;

    let base = if div_wad(delta, alpha)? < PRECISION_THRESHOLD {
        let start = div_wad(params.a, alpha)?;
        let middle = mul_div_down(
            params.a,
            U256::from(4u8) * WAD,
            alpha - delta / U256::from(2u8),
        )?;
        let end = div_wad(params.a, alpha - delta)?;
        let sum = start
            .checked_add(middle)
            .and_then(|s| s.checked_add(end))
            .ok_or(CurveError::Math(crate::error::MathError::Overflow))?;
        sum / U256::from(6u8)
    } else {
        // alpha / (alpha - delta) >= 1, so the log is non-negative
        let ratio = div_wad(alpha, alpha - delta)?;
        let log = ln_wad(to_signed(ratio)?)?;
        mul_div_down(params.a, abs(log), delta)?
    };

    apply_offset(base, params.b)
}

/// Local slope of the curve, `d rate / d u`, by finite difference.
///
/// Uses the forward difference `(rate(u + ε) - rate(u)) / ε`, or the backward
/// difference when `u + ε` reaches the ceiling.
pub fn curve_slope(
    params: &CurveParameters,
    utilization: U256,
    epsilon: U256,
) -> Result<U256, CurveError> {
    if epsilon.is_zero() {
        return Err(CurveError::InvalidParameters("slope epsilon must be positive"));
    }
    let rate = evaluate_curve(params, utilization)?;

    match utilization.checked_add(epsilon) {
        Some(next) if next < params.u_max => {
            let next_rate = evaluate_curve(params, next)?;
            Ok(div_wad(zero_floor_sub(next_rate, rate), epsilon)?)
        }
        _ => {
            let previous = utilization.checked_sub(epsilon).ok_or(
                CurveError::InvalidParameters("slope epsilon wider than the curve domain"),
            )?;
            let previous_rate = evaluate_curve(params, previous)?;
            Ok(div_wad(zero_floor_sub(rate, previous_rate), epsilon)?)
        }
    }
}
