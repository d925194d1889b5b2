//! Installment solver.
//!
//! Splits one borrow into sequential fixed-rate installments, one per
//! maturity, so the rates charged across maturities end up close to each
//! other. A pool with low utilization is cheap to borrow from but gets more
//! expensive as it absorbs principal, so the solver moves principal from
//! expensive pools to cheap ones until the rates meet.
//!
//! # Algorithm
//!
//! 1. Select the maturities `first + j * interval`. Nominal maturities past
//!    the last pool are folded into the last pool's installment.
//! 2. Split the amount evenly, clamp every installment to its pool's
//!    capacity and spread the excess over pools with room left.
//! 3. Price each installment on the curve at its post-borrow utilization.
//! 4. While the rate spread exceeds the tolerance, ask the [`Rebalance`]
//!    strategy for a better allocation.
//! 5. Emit principals, fees and repayments.
//!
//! The rate spread only counts pools that can actually move: the most
//! expensive installment holding principal against the cheapest one with
//! capacity left. A capped cheap pool beside an expensive one is therefore a
//! solved allocation.
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
//! let interval = 2_419_200;
//! let now = 1_700_000_000;
//! let pools: Vec<PoolState> = (1..=3)
//!     .map(|i| PoolState::new(now + i * interval, U256::ZERO, U256::from(i * 1_000) * WAD, U256::MAX))
//!     .collect();
//!
//! let request = InstallmentRequest::new(U256::from(3_000) * WAD, 3, now + interval, interval);
//! let plan = solve_installments(&request, &pools, &market, &curve, now).unwrap();
//!
//! assert_eq!(plan.total_principal(), U256::from(3_000) * WAD);
//! assert!(plan.principals[0] > plan.principals[2]);
//! ```

use alloy_primitives::{uint, U256};
use tracing::{debug, trace, warn};

use crate::curve::{curve_slope, evaluate_curve, CurveParameters};
use crate::error::{MathError, SolveError};
use crate::market::{global_utilization, GlobalMarketState, PoolState};
use crate::math::{
    exp_wad, ln_wad, max, max_of, min, min_of, mul_div_down, mul_div_signed, mul_wad, to_signed,
    zero_floor_sub, SECONDS_PER_YEAR, WAD,
};

/// Default cap on rebalancing rounds
pub const DEFAULT_MAX_ITERATIONS: u32 = 128;

/// Default finite-difference step for curve slopes (1e-6)
pub const DEFAULT_SLOPE_EPSILON: U256 = uint!(1_000_000_000_000_U256);

/// Default acceptable rate spread (0.1%)
pub const DEFAULT_RATE_TOLERANCE: U256 = uint!(1_000_000_000_000_000_U256);

/// A borrow to be split across maturities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentRequest {
    /// Principal to borrow in total
    pub total_amount: U256,
    /// Number of installments
    pub installment_count: u32,
    /// Maturity of the first installment
    pub first_maturity: u64,
    /// Seconds between consecutive maturities
    pub maturity_interval: u64,
    /// Largest acceptable gap between installment rates (WAD)
    pub rate_tolerance: U256,
}

impl InstallmentRequest {
    /// Creates a request with the default rate tolerance.
    pub fn new(
        total_amount: U256,
        installment_count: u32,
        first_maturity: u64,
        maturity_interval: u64,
    ) -> Self {
        Self {
            total_amount,
            installment_count,
            first_maturity,
            maturity_interval,
            rate_tolerance: DEFAULT_RATE_TOLERANCE,
        }
    }

    /// Set the largest acceptable rate gap between installments.
    pub fn with_rate_tolerance(mut self, tolerance: U256) -> Self {
        self.rate_tolerance = tolerance;
        self
    }
}

/// Solver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Maximum number of rebalancing rounds
    pub max_iterations: u32,
    /// Utilization step used to estimate curve slopes
    pub slope_epsilon: U256,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            slope_epsilon: DEFAULT_SLOPE_EPSILON,
        }
    }
}

impl SolverConfig {
    /// Creates a config with the default iteration cap and slope step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of rebalancing rounds.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the finite-difference step for slope estimates.
    pub fn with_slope_epsilon(mut self, epsilon: U256) -> Self {
        self.slope_epsilon = epsilon;
        self
    }
}

/// The solved repayment schedule.
///
/// All per-installment vectors share one length and are ordered by maturity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallmentPlan {
    /// Principal borrowed at each maturity
    pub principals: Vec<U256>,
    /// Principal plus fee owed at each maturity
    pub repay_amounts: Vec<U256>,
    /// Maturity timestamps, strictly increasing
    pub maturities: Vec<u64>,
    /// Annualized rate of the plan as a whole (WAD)
    pub effective_rate: U256,
    /// Fixed rate of each installment (WAD), zero where the pool is closed
    pub rates: Vec<U256>,
    /// Fee charged on each installment
    pub fees: Vec<U256>,
    /// Pool utilization after each installment (WAD)
    pub utilizations: Vec<U256>,
    /// Floating pool utilization once the plan's backup borrows are drawn
    pub global_utilization: U256,
    /// Rebalancing rounds performed
    pub iterations: u32,
    /// Final rate spread between movable installments
    pub rate_spread: U256,
    /// Whether the spread reached the requested tolerance
    pub converged: bool,
}

impl InstallmentPlan {
    /// Number of distinct maturities in the plan.
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    /// Whether the plan has no installments.
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }

    /// Sum of principals, equal to the requested amount.
    pub fn total_principal(&self) -> U256 {
        self.principals.iter().copied().sum()
    }

    /// Sum of principal plus fees owed across all maturities.
    pub fn total_repay(&self) -> U256 {
        self.repay_amounts.iter().copied().sum()
    }

    /// Sum of fees across all maturities.
    pub fn total_fees(&self) -> U256 {
        self.fees.iter().copied().sum()
    }
}

/// Marginal pricing of one installment at its current principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginalRate {
    /// Pool utilization after the installment
    pub utilization: U256,
    /// Curve rate at that utilization
    pub rate: U256,
    /// Curve slope at that utilization
    pub slope: U256,
    /// Largest principal the pool accepts
    pub capacity: U256,
    /// Principal that moves the rate by one WAD, `deposits / slope`
    pub principal_per_rate: U256,
}

impl MarginalRate {
    /// Pricing of an installment whose pool accepts no principal.
    ///
    /// Zero rate and sensitivity, so it neither gives nor takes principal.
    fn closed(utilization: U256) -> Self {
        Self {
            utilization,
            rate: U256::ZERO,
            slope: U256::ZERO,
            capacity: U256::ZERO,
            principal_per_rate: U256::ZERO,
        }
    }

    /// Whether the pool accepts no principal.
    pub fn is_closed(&self) -> bool {
        self.capacity.is_zero()
    }
}

/// Strategy that proposes a better allocation of principal.
///
/// Receives the current principals and their marginal pricing, and returns
/// one principal per installment. The solver clamps the proposal to pool
/// capacities and settles rounding so the total is preserved, so strategies
/// may be approximate. Returning the input unchanged ends the search.
pub trait Rebalance {
    fn rebalance(
        &self,
        principals: &[U256],
        marginals: &[MarginalRate],
        tolerance: U256,
    ) -> Result<Vec<U256>, SolveError>;
}

/// Moves principal toward a common target rate, in proportion to each pool's
/// rate sensitivity.
///
/// With `c_i` the principal that moves pool `i` by one unit of rate, the
/// target `T` solves `Σ (p_i + c_i (T - r_i)) = total`. Installments pushed
/// below zero or above capacity are pinned there and the target is solved
/// again for the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlopeProportional;

impl Rebalance for SlopeProportional {
    fn rebalance(
        &self,
        principals: &[U256],
        marginals: &[MarginalRate],
        _tolerance: U256,
    ) -> Result<Vec<U256>, SolveError> {
        if principals.len() != marginals.len() {
            return Err(SolveError::InvalidAllocation {
                expected: marginals.len(),
                actual: principals.len(),
            });
        }
        let count = principals.len();
        let total: U256 = principals.iter().copied().sum();
        let caps: Vec<U256> = marginals.iter().map(|m| m.capacity).collect();

        let mut pinned: Vec<Option<U256>> = vec![None; count];
        let mut proposal = principals.to_vec();

        for round in 0..=count {
            let free: Vec<usize> = (0..count).filter(|&i| pinned[i].is_none()).collect();
            if free.is_empty() {
                break;
            }

            let pinned_total: U256 = pinned.iter().flatten().copied().sum();
            let free_total = zero_floor_sub(total, pinned_total);
            let mut sensitivity = U256::ZERO;
            let mut free_principal = U256::ZERO;
            let mut weighted_rate = U256::ZERO;
            for &i in &free {
                let c = marginals[i].principal_per_rate;
                sensitivity += c;
                free_principal += principals[i];
                weighted_rate += mul_wad(c, marginals[i].rate)?;
            }
            if sensitivity.is_zero() {
                break;
            }

            let weighted_rate = to_signed(weighted_rate)?;
            let numerator = to_signed(free_total)?
                .checked_sub(to_signed(free_principal)?)
                .and_then(|n| n.checked_add(weighted_rate))
                .ok_or(MathError::Overflow)?;
            let target = mul_div_signed(numerator, WAD, sensitivity)?;
            trace!(round, target = %target, free = free.len(), "solved target rate");

            let mut pinned_any = false;
            for &i in &free {
                let gap = target
                    .checked_sub(to_signed(marginals[i].rate)?)
                    .ok_or(MathError::Overflow)?;
                let shift = mul_div_signed(gap, marginals[i].principal_per_rate, WAD)?;
                let candidate = to_signed(principals[i])?
                    .checked_add(shift)
                    .ok_or(MathError::Overflow)?;

                if candidate.is_negative() {
                    pinned[i] = Some(U256::ZERO);
                    pinned_any = true;
                } else if candidate.into_raw() > caps[i] {
                    pinned[i] = Some(caps[i]);
                    pinned_any = true;
                } else {
                    proposal[i] = candidate.into_raw();
                }
            }
            if !pinned_any {
                break;
            }
        }

        for (slot, pin) in proposal.iter_mut().zip(&pinned) {
            if let Some(value) = pin {
                *slot = *value;
            }
        }
        settle(&mut proposal, &caps, total)?;
        Ok(proposal)
    }
}

/// One installment of the schedule: the pool it borrows from and how many
/// nominal installments were folded into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledInstallment {
    pool: usize,
    shares: u32,
}

/// Borrow fee for `principal` at an annual `rate` over `maturity - now`.
pub fn installment_fee(
    principal: U256,
    rate: U256,
    maturity: u64,
    now: u64,
) -> Result<U256, MathError> {
    let elapsed = U256::from(maturity.saturating_sub(now));
    let period_rate = mul_div_down(rate, elapsed, U256::from(SECONDS_PER_YEAR))?;
    mul_wad(principal, period_rate)
}

/// Solves with the default configuration and [`SlopeProportional`].
pub fn solve_installments(
    request: &InstallmentRequest,
    pools: &[PoolState],
    market: &GlobalMarketState,
    curve: &CurveParameters,
    now: u64,
) -> Result<InstallmentPlan, SolveError> {
    solve_installments_with(
        request,
        pools,
        market,
        curve,
        now,
        &SolverConfig::default(),
        &SlopeProportional,
    )
}

/// Splits `request` across `pools` and returns the repayment schedule.
///
/// `pools` must be sorted by strictly ascending maturity.
pub fn solve_installments_with<R: Rebalance + ?Sized>(
    request: &InstallmentRequest,
    pools: &[PoolState],
    market: &GlobalMarketState,
    curve: &CurveParameters,
    now: u64,
    config: &SolverConfig,
    strategy: &R,
) -> Result<InstallmentPlan, SolveError> {
    validate(request, pools, config)?;
    let schedule = select_schedule(request, pools, now)?;
    let deposits = market.total_floating_deposits;
    if deposits.is_zero() {
        return Err(MathError::DivisionByZero.into());
    }
    curve.validate()?;

    let maturities: Vec<u64> = schedule.iter().map(|s| pools[s.pool].maturity).collect();
    let total = request.total_amount;

    if total.is_zero() {
        let zeros = vec![U256::ZERO; schedule.len()];
        return Ok(InstallmentPlan {
            principals: zeros.clone(),
            repay_amounts: zeros.clone(),
            maturities,
            effective_rate: U256::ZERO,
            rates: zeros.clone(),
            fees: zeros.clone(),
            utilizations: zeros,
            global_utilization: market.global_utilization()?,
            iterations: 0,
            rate_spread: U256::ZERO,
            converged: true,
        });
    }

    let caps = schedule
        .iter()
        .map(|s| pools[s.pool].capacity(curve, deposits))
        .collect::<Result<Vec<_>, _>>()?;
    let capacity: U256 = caps.iter().fold(U256::ZERO, |acc, c| acc.saturating_add(*c));
    if capacity < total {
        return Err(SolveError::InsufficientCapacity {
            requested: total,
            capacity,
        });
    }

    let mut principals = equal_split(total, &schedule, request.installment_count);
    fit_to_capacity(&mut principals, &caps, total)?;

    let price = |principals: &[U256]| {
        price_installments(&schedule, pools, principals, &caps, curve, deposits, config)
    };

    let mut marginals = price(&principals)?;
    let mut spread = rate_spread(&principals, &marginals);
    let mut best = (principals.clone(), marginals.clone(), spread);
    let mut iterations = 0u32;
    debug!(
        installments = schedule.len(),
        spread = %spread,
        "initial allocation"
    );

    if schedule.len() > 1 {
        while spread > request.rate_tolerance && iterations < config.max_iterations {
            let proposal = strategy.rebalance(&principals, &marginals, request.rate_tolerance)?;
            let next = normalize(proposal, &caps, total)?;
            iterations += 1;
            if next == principals {
                debug!(iteration = iterations, "rebalance made no change");
                break;
            }

            principals = next;
            marginals = price(&principals)?;
            spread = rate_spread(&principals, &marginals);
            debug!(iteration = iterations, spread = %spread, "rebalanced installments");

            if spread < best.2 {
                best = (principals.clone(), marginals.clone(), spread);
            }
        }
    }

    let converged = spread <= request.rate_tolerance;
    if !converged {
        warn!(
            iterations,
            spread = %best.2,
            tolerance = %request.rate_tolerance,
            "installment solver did not converge, using best allocation"
        );
        (principals, marginals, spread) = best;
    }

    let mut fees = Vec::with_capacity(schedule.len());
    let mut repay_amounts = Vec::with_capacity(schedule.len());
    for ((&principal, marginal), &maturity) in principals.iter().zip(&marginals).zip(&maturities) {
        let fee = installment_fee(principal, marginal.rate, maturity, now)?;
        fees.push(fee);
        repay_amounts.push(principal.checked_add(fee).ok_or(MathError::Overflow)?);
    }

    let rates: Vec<U256> = marginals.iter().map(|m| m.rate).collect();
    let equal_periods = request.first_maturity.saturating_sub(now) == request.maturity_interval
        && schedule.len() == request.installment_count as usize;
    let effective_rate = if equal_periods {
        arithmetic_mean_rate(&principals, &rates, total)?
    } else {
        compounded_mean_rate(&principals, &rates, &maturities, now)?
    };

    let mut added_backup = U256::ZERO;
    for (slot, &principal) in schedule.iter().zip(&principals) {
        let pool = &pools[slot.pool];
        let after = zero_floor_sub(pool.borrowed.saturating_add(principal), pool.supplied);
        added_backup = added_backup.saturating_add(after - pool.backup_borrowed());
    }
    let global = global_utilization(
        deposits,
        market.total_floating_borrows,
        market
            .floating_backup_borrowed
            .checked_add(added_backup)
            .ok_or(MathError::Overflow)?,
    )?;

    debug!(
        iterations,
        converged,
        effective_rate = %effective_rate,
        "solved installment plan"
    );

    Ok(InstallmentPlan {
        principals,
        repay_amounts,
        maturities,
        effective_rate,
        rates,
        fees,
        utilizations: marginals.iter().map(|m| m.utilization).collect(),
        global_utilization: global,
        iterations,
        rate_spread: spread,
        converged,
    })
}

fn validate(
    request: &InstallmentRequest,
    pools: &[PoolState],
    config: &SolverConfig,
) -> Result<(), SolveError> {
    if request.installment_count == 0 {
        return Err(SolveError::InvalidRequest(
            "installment count must be at least 1".into(),
        ));
    }
    if request.maturity_interval == 0 {
        return Err(SolveError::InvalidRequest(
            "maturity interval must be positive".into(),
        ));
    }
    if config.slope_epsilon.is_zero() {
        return Err(SolveError::InvalidRequest(
            "slope epsilon must be positive".into(),
        ));
    }
    if pools.is_empty() {
        return Err(SolveError::NoPools);
    }
    if pools.windows(2).any(|w| w[0].maturity >= w[1].maturity) {
        return Err(SolveError::InvalidRequest(
            "pools must be sorted by strictly ascending maturity".into(),
        ));
    }
    Ok(())
}

fn select_schedule(
    request: &InstallmentRequest,
    pools: &[PoolState],
    now: u64,
) -> Result<Vec<ScheduledInstallment>, SolveError> {
    let last = pools.len() - 1;
    let last_maturity = pools[last].maturity;
    let mut schedule: Vec<ScheduledInstallment> = Vec::new();

    for j in 0..u64::from(request.installment_count) {
        let nominal = request
            .maturity_interval
            .checked_mul(j)
            .and_then(|offset| request.first_maturity.checked_add(offset))
            .ok_or_else(|| SolveError::InvalidRequest("maturity schedule overflows".into()))?;

        let pool = if nominal > last_maturity {
            if j == 0 {
                return Err(SolveError::MaturityNotFound { maturity: nominal });
            }
            last
        } else {
            pools
                .binary_search_by_key(&nominal, |p| p.maturity)
                .map_err(|_| SolveError::MaturityNotFound { maturity: nominal })?
        };

        match schedule.last_mut() {
            Some(slot) if slot.pool == pool => slot.shares += 1,
            _ => {
                let maturity = pools[pool].maturity;
                if maturity <= now {
                    return Err(SolveError::MaturedPool { maturity, now });
                }
                schedule.push(ScheduledInstallment { pool, shares: 1 });
            }
        }
    }

    if schedule.len() < request.installment_count as usize {
        trace!(
            nominal = request.installment_count,
            distinct = schedule.len(),
            "folded maturities past the last pool"
        );
    }
    Ok(schedule)
}

fn equal_split(total: U256, schedule: &[ScheduledInstallment], count: u32) -> Vec<U256> {
    let count = U256::from(count);
    let base = total / count;
    let remainder = total - base * count;

    let mut principals: Vec<U256> = schedule
        .iter()
        .map(|s| base * U256::from(s.shares))
        .collect();
    if let Some(first) = principals.first_mut() {
        *first += remainder;
    }
    principals
}

/// Clamps to capacity and spreads the overflow evenly over installments with
/// room left.
fn fit_to_capacity(principals: &mut [U256], caps: &[U256], total: U256) -> Result<(), SolveError> {
    for (p, &cap) in principals.iter_mut().zip(caps) {
        *p = min(*p, cap);
    }
    let mut missing = zero_floor_sub(total, principals.iter().copied().sum());

    while !missing.is_zero() {
        let open: Vec<usize> = (0..principals.len())
            .filter(|&i| principals[i] < caps[i])
            .collect();
        if open.is_empty() {
            return Err(SolveError::InsufficientCapacity {
                requested: total,
                capacity: caps.iter().copied().sum(),
            });
        }
        let share = max(missing / U256::from(open.len()), U256::from(1u8));
        for i in open {
            let give = min(min(share, caps[i] - principals[i]), missing);
            principals[i] += give;
            missing -= give;
            if missing.is_zero() {
                break;
            }
        }
    }
    Ok(())
}

/// Makes the allocation sum to exactly `total` without breaking capacities.
///
/// Shortfalls go to the largest installments with room first; excess comes
/// off the largest installments first.
fn settle(principals: &mut [U256], caps: &[U256], total: U256) -> Result<(), SolveError> {
    let sum: U256 = principals.iter().copied().sum();
    if sum == total {
        return Ok(());
    }

    let mut order: Vec<usize> = (0..principals.len()).collect();
    order.sort_by(|&a, &b| principals[b].cmp(&principals[a]));

    if sum < total {
        let mut missing = total - sum;
        for i in order {
            let give = min(zero_floor_sub(caps[i], principals[i]), missing);
            principals[i] += give;
            missing -= give;
            if missing.is_zero() {
                return Ok(());
            }
        }
        Err(SolveError::InsufficientCapacity {
            requested: total,
            capacity: caps.iter().copied().sum(),
        })
    } else {
        let mut excess = sum - total;
        for i in order {
            let take = min(principals[i], excess);
            principals[i] -= take;
            excess -= take;
            if excess.is_zero() {
                break;
            }
        }
        Ok(())
    }
}

fn normalize(proposal: Vec<U256>, caps: &[U256], total: U256) -> Result<Vec<U256>, SolveError> {
    if proposal.len() != caps.len() {
        return Err(SolveError::InvalidAllocation {
            expected: caps.len(),
            actual: proposal.len(),
        });
    }
    let mut principals: Vec<U256> = proposal
        .into_iter()
        .zip(caps)
        .map(|(p, &cap)| min(p, cap))
        .collect();
    settle(&mut principals, caps, total)?;
    Ok(principals)
}

fn price_installments(
    schedule: &[ScheduledInstallment],
    pools: &[PoolState],
    principals: &[U256],
    caps: &[U256],
    curve: &CurveParameters,
    deposits: U256,
    config: &SolverConfig,
) -> Result<Vec<MarginalRate>, SolveError> {
    schedule
        .iter()
        .zip(principals)
        .zip(caps)
        .map(|((slot, &principal), &capacity)| {
            let utilization = pools[slot.pool].utilization_after(principal, deposits)?;
            if capacity.is_zero() {
                // Closed pool, possibly at or past the ceiling: never priced
                return Ok(MarginalRate::closed(utilization));
            }
            let rate = evaluate_curve(curve, utilization)?;
            let slope = curve_slope(curve, utilization, config.slope_epsilon)?;
            let principal_per_rate =
                mul_div_down(deposits, WAD, max(slope, U256::from(1u8)))?;
            Ok(MarginalRate {
                utilization,
                rate,
                slope,
                capacity,
                principal_per_rate,
            })
        })
        .collect()
}

/// Most expensive installment that can give principal minus the cheapest
/// one that can take it, floored at zero.
fn rate_spread(principals: &[U256], marginals: &[MarginalRate]) -> U256 {
    let givers: Vec<U256> = principals
        .iter()
        .zip(marginals)
        .filter(|(p, _)| !p.is_zero())
        .map(|(_, m)| m.rate)
        .collect();
    let takers: Vec<U256> = principals
        .iter()
        .zip(marginals)
        .filter(|(&p, m)| p < m.capacity)
        .map(|(_, m)| m.rate)
        .collect();

    match (max_of(&givers), min_of(&takers)) {
        (Some(high), Some(low)) => zero_floor_sub(high, low),
        _ => U256::ZERO,
    }
}

fn arithmetic_mean_rate(principals: &[U256], rates: &[U256], total: U256) -> Result<U256, MathError> {
    let mut mean = U256::ZERO;
    for (&p, &r) in principals.iter().zip(rates) {
        mean = mean
            .checked_add(mul_div_down(p, r, total)?)
            .ok_or(MathError::Overflow)?;
    }
    Ok(mean)
}

/// Geometric mean of `1 + rate`, weighted by principal times term.
fn compounded_mean_rate(
    principals: &[U256],
    rates: &[U256],
    maturities: &[u64],
    now: u64,
) -> Result<U256, MathError> {
    let weights = principals
        .iter()
        .zip(maturities)
        .map(|(&p, &m)| {
            p.checked_mul(U256::from(m.saturating_sub(now)))
                .ok_or(MathError::Overflow)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let total_weight = weights
        .iter()
        .try_fold(U256::ZERO, |acc, w| acc.checked_add(*w))
        .ok_or(MathError::Overflow)?;
    if total_weight.is_zero() {
        return Ok(U256::ZERO);
    }

    let mut log_mean = U256::ZERO;
    for (&weight, &rate) in weights.iter().zip(rates) {
        let growth = to_signed(WAD.checked_add(rate).ok_or(MathError::Overflow)?)?;
        // ln(1 + r) >= 0
        let log = ln_wad(growth)?.unsigned_abs();
        log_mean = log_mean
            .checked_add(mul_div_down(log, weight, total_weight)?)
            .ok_or(MathError::Overflow)?;
    }

    let growth = exp_wad(to_signed(log_mean)?)?;
    Ok(zero_floor_sub(growth.into_raw(), WAD))
}
