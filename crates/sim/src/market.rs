//! Pool snapshots and utilization ratios.
//!
//! A fixed-rate maturity pool is backed by its own supply first and by the
//! floating pool for the rest. The floating pool lends the shortfall as
//! "backup" liquidity, so a maturity pool's utilization is measured against
//! the floating pool's deposits:
//!
//! ```text
//! fixed_utilization  = max(borrowed - supplied, 0) / deposits      (rounded up)
//! global_utilization = 1 - (deposits - borrows - backup) / deposits
//! ```
//!
//! Every ratio is undefined when deposits are zero and fails with
//! [`MathError::DivisionByZero`] rather than reporting 0.

use alloy_primitives::U256;

use crate::curve::CurveParameters;
use crate::error::MathError;
use crate::math::{div_wad, div_wad_up, min, mul_div_down, zero_floor_sub, WAD};

/// Snapshot of one fixed-rate maturity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    /// Settlement timestamp (seconds)
    pub maturity: u64,
    /// Assets deposited into the pool at a fixed rate
    pub supplied: U256,
    /// Assets borrowed from the pool at a fixed rate
    pub borrowed: U256,
    /// Remaining borrowable liquidity, a hard cap on new principal
    pub available: U256,
}

impl PoolState {
    /// Creates a pool snapshot.
    pub fn new(maturity: u64, supplied: U256, borrowed: U256, available: U256) -> Self {
        Self {
            maturity,
            supplied,
            borrowed,
            available,
        }
    }

    /// Borrows the pool's own supply does not cover.
    pub fn backup_borrowed(&self) -> U256 {
        zero_floor_sub(self.borrowed, self.supplied)
    }

    /// Pool utilization before any new borrow.
    pub fn utilization(&self, deposits: U256) -> Result<U256, MathError> {
        fixed_utilization(self.supplied, self.borrowed, deposits)
    }

    /// Pool utilization once `principal` more has been borrowed.
    pub fn utilization_after(&self, principal: U256, deposits: U256) -> Result<U256, MathError> {
        let borrowed = self.borrowed.checked_add(principal).ok_or(MathError::Overflow)?;
        fixed_utilization(self.supplied, borrowed, deposits)
    }

    /// Largest new principal the pool accepts.
    ///
    /// Bounded by `available` and by the curve: the post-borrow utilization
    /// must stay strictly below `u_max`.
    pub fn capacity(&self, curve: &CurveParameters, deposits: U256) -> Result<U256, MathError> {
        if deposits.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if curve.u_max.is_zero() {
            return Ok(U256::ZERO);
        }
        // ceil(x * WAD / deposits) <= u_max - 1  <=>  x <= floor((u_max - 1) * deposits / WAD)
        let headroom = mul_div_down(curve.u_max - U256::from(1u8), deposits, WAD)?;
        let ceiling = self.supplied.saturating_add(headroom);
        Ok(min(self.available, zero_floor_sub(ceiling, self.borrowed)))
    }
}

/// Snapshot of the floating pool that backs every maturity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobalMarketState {
    /// Floating pool utilization (WAD), `None` while deposits are zero
    pub floating_utilization: Option<U256>,
    /// Total deposits in the floating pool
    pub total_floating_deposits: U256,
    /// Variable-rate borrows from the floating pool
    pub total_floating_borrows: U256,
    /// Floating liquidity lent to maturity pools
    pub floating_backup_borrowed: U256,
}

impl GlobalMarketState {
    /// Builds a snapshot from raw totals, deriving the floating utilization.
    ///
    /// With zero deposits the utilization is undefined and left as `None`.
    pub fn from_totals(deposits: U256, borrows: U256, backup_borrowed: U256) -> Self {
        let floating_utilization = floating_utilization(deposits, borrows).ok();
        Self {
            floating_utilization,
            total_floating_deposits: deposits,
            total_floating_borrows: borrows,
            floating_backup_borrowed: backup_borrowed,
        }
    }

    /// Deposits not lent out as floating or backup borrows.
    pub fn free_liquidity(&self) -> U256 {
        zero_floor_sub(
            self.total_floating_deposits,
            self.total_floating_borrows
                .saturating_add(self.floating_backup_borrowed),
        )
    }

    /// Protocol-wide utilization of the floating pool.
    pub fn global_utilization(&self) -> Result<U256, MathError> {
        global_utilization(
            self.total_floating_deposits,
            self.total_floating_borrows,
            self.floating_backup_borrowed,
        )
    }
}

/// Utilization of a maturity pool as seen by the fixed-rate curve.
///
/// Zero when the pool's own supply covers its borrows.
pub fn fixed_utilization(
    supplied: U256,
    borrowed: U256,
    deposits: U256,
) -> Result<U256, MathError> {
    if deposits.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    if borrowed <= supplied {
        return Ok(U256::ZERO);
    }
    div_wad_up(borrowed - supplied, deposits)
}

/// Share of floating deposits lent out, as floating borrows or backup.
///
/// Exceeds `WAD` when borrows overrun deposits.
pub fn global_utilization(
    deposits: U256,
    borrows: U256,
    backup_borrowed: U256,
) -> Result<U256, MathError> {
    if deposits.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let used = borrows
        .checked_add(backup_borrowed)
        .ok_or(MathError::Overflow)?;
    if used <= deposits {
        Ok(WAD - div_wad(deposits - used, deposits)?)
    } else {
        WAD.checked_add(div_wad(used - deposits, deposits)?)
            .ok_or(MathError::Overflow)
    }
}

/// Utilization of the floating pool from variable-rate borrows alone.
pub fn floating_utilization(deposits: U256, borrows: U256) -> Result<U256, MathError> {
    if deposits.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    div_wad_up(borrows, deposits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::I256;

    fn wad(x: u64) -> U256 {
        U256::from(x) * WAD
    }

    fn milli(x: u64) -> U256 {
        U256::from(x) * U256::from(1_000_000_000_000_000u64)
    }

    fn test_curve() -> CurveParameters {
        CurveParameters::new(milli(10), I256::from_raw(milli(5)), milli(900)).unwrap()
    }

    #[test]
    fn test_fixed_utilization() {
        assert_eq!(
            fixed_utilization(U256::ZERO, wad(1_000), wad(10_000)).unwrap(),
            milli(100)
        );
        assert_eq!(
            fixed_utilization(wad(500), wad(4_500), wad(10_000)).unwrap(),
            milli(400)
        );
        // Own supply covers borrows
        assert_eq!(
            fixed_utilization(wad(5_000), wad(4_000), wad(10_000)).unwrap(),
            U256::ZERO
        );
    }

    #[test]
    fn test_fixed_utilization_rounds_up() {
        // 1 / 3 rounds up in the last place
        assert_eq!(
            fixed_utilization(U256::ZERO, wad(1), wad(3)).unwrap(),
            U256::from(333_333_333_333_333_334u64)
        );
    }

    #[test]
    fn test_zero_deposits_is_undefined() {
        assert_eq!(
            fixed_utilization(U256::ZERO, wad(1), U256::ZERO),
            Err(MathError::DivisionByZero)
        );
        assert_eq!(
            global_utilization(U256::ZERO, U256::ZERO, U256::ZERO),
            Err(MathError::DivisionByZero)
        );
        assert_eq!(
            floating_utilization(U256::ZERO, U256::ZERO),
            Err(MathError::DivisionByZero)
        );
    }

    #[test]
    fn test_global_utilization() {
        assert_eq!(
            global_utilization(wad(10_000), wad(3_000), wad(2_000)).unwrap(),
            milli(500)
        );
        assert_eq!(
            global_utilization(wad(10_000), U256::ZERO, U256::ZERO).unwrap(),
            U256::ZERO
        );
        assert_eq!(
            global_utilization(wad(10_000), wad(6_000), wad(4_000)).unwrap(),
            WAD
        );
        // Borrows overrunning deposits push the ratio above one
        assert_eq!(
            global_utilization(wad(10_000), wad(9_000), wad(3_000)).unwrap(),
            milli(1_200)
        );
    }

    #[test]
    fn test_floating_utilization() {
        assert_eq!(
            floating_utilization(wad(10_000), wad(2_500)).unwrap(),
            milli(250)
        );
    }

    #[test]
    fn test_market_state() {
        let market = GlobalMarketState::from_totals(wad(10_000), wad(3_000), wad(2_000));
        assert_eq!(market.floating_utilization, Some(milli(300)));
        assert_eq!(market.free_liquidity(), wad(5_000));
        assert_eq!(market.global_utilization().unwrap(), milli(500));

        let drained = GlobalMarketState::from_totals(wad(10_000), wad(9_000), wad(3_000));
        assert_eq!(drained.free_liquidity(), U256::ZERO);
    }

    #[test]
    fn test_empty_market_utilization_is_undefined() {
        let empty = GlobalMarketState::from_totals(U256::ZERO, U256::from(5u8), U256::ZERO);
        assert_eq!(empty.floating_utilization, None);
        assert_eq!(empty.global_utilization(), Err(MathError::DivisionByZero));
        assert_eq!(empty.free_liquidity(), U256::ZERO);
    }

    #[test]
    fn test_pool_utilization_after() {
        let pool = PoolState::new(1_000, wad(500), wad(1_500), wad(10_000));
        assert_eq!(pool.backup_borrowed(), wad(1_000));
        assert_eq!(pool.utilization(wad(10_000)).unwrap(), milli(100));
        assert_eq!(
            pool.utilization_after(wad(2_000), wad(10_000)).unwrap(),
            milli(300)
        );
    }

    #[test]
    fn test_pool_capacity() {
        let curve = test_curve();
        let deposits = wad(10_000);

        // Curve-bound: utilization must stay below 0.9
        let pool = PoolState::new(1_000, U256::ZERO, wad(7_000), U256::MAX);
        let capacity = pool.capacity(&curve, deposits).unwrap();
        assert!(capacity < wad(2_000));
        assert!(capacity > wad(1_999));
        let at_capacity = pool.utilization_after(capacity, deposits).unwrap();
        assert!(at_capacity < curve.u_max);
        assert!(curve.rate(at_capacity).is_ok());
        let beyond = pool
            .utilization_after(capacity + U256::from(1u8), deposits)
            .unwrap();
        assert!(beyond >= curve.u_max);

        // Liquidity-bound
        let shallow = PoolState::new(1_000, U256::ZERO, wad(1_000), wad(250));
        assert_eq!(shallow.capacity(&curve, deposits).unwrap(), wad(250));

        // Already past the ceiling
        let full = PoolState::new(1_000, U256::ZERO, wad(9_500), U256::MAX);
        assert_eq!(full.capacity(&curve, deposits).unwrap(), U256::ZERO);
    }
}
