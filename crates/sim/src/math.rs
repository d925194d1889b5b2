//! WAD fixed-point arithmetic.
//!
//! Every financial quantity in this crate is an 18-decimal fixed-point integer
//! ("WAD"): the integer `10^18` represents `1.0`. The functions here reproduce
//! the integer semantics of the on-chain math library exactly, including the
//! bit-level algorithms for the transcendental functions, so a preview computed
//! off-chain matches what the contract will compute to the last unit.
//!
//! # Rounding
//!
//! | Function | Rounding |
//! |----------|----------|
//! | [`mul_wad`], [`div_wad`], [`mul_div_down`] | toward zero |
//! | [`mul_wad_up`], [`div_wad_up`], [`mul_div_up`] | away from zero |
//! | [`ln_wad`], [`exp_wad`] | as the on-chain rational approximations |
//! | [`sqrt`] | floor |
//!
//! Products are formed in 512 bits before rescaling, so the only way for a
//! multiplication to fail is a result that genuinely does not fit in 256 bits.
//!
//! # Example
//!
//! ```rust
//! use installments_sim::math::{div_wad, exp_wad, ln_wad, mul_wad, WAD};
//! use alloy_primitives::{I256, U256};
//!
//! let half = U256::from(500_000_000_000_000_000u64);
//! assert_eq!(mul_wad(half, half).unwrap(), WAD / U256::from(4));
//! assert!(div_wad(WAD, U256::ZERO).is_err());
//!
//! let one = I256::from_raw(WAD);
//! assert_eq!(ln_wad(one).unwrap(), I256::ZERO);
//! assert_eq!(exp_wad(I256::ZERO).unwrap(), one);
//! ```

use alloy_primitives::{uint, I256, U256, U512};

use crate::error::MathError;

/// 1.0 in WAD
pub const WAD: U256 = uint!(1_000_000_000_000_000_000_U256);

/// Seconds in a 365 day year
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

// ln(2) * 2^96
const LN_2_X96: U256 = uint!(54916777467707473351141471128_U256);

// exp_wad domain: exp(x) rounds to zero at or below the floor and no longer
// fits an int256 at or above the ceiling.
const EXP_FLOOR: U256 = uint!(42139678854452767551_U256);
const EXP_CEILING: U256 = uint!(135305999368893231589_U256);

// 5^18, used for the 1e18 -> 2^96 base conversion (1e18 / 2^96 = 5^18 / 2^78)
const FIVE_POW_18: U256 = uint!(3814697265625_U256);

const EXP_P0: U256 = uint!(1346386616545796478920950773328_U256);
const EXP_P1: U256 = uint!(57155421227552351082224309758442_U256);
const EXP_P2: U256 = uint!(94201549194550492254356042504812_U256);
const EXP_P3: U256 = uint!(28719021644029726153956944680412240_U256);
const EXP_P4: U256 = uint!(4385272521454847904659076985693276_U256);

const EXP_Q0: U256 = uint!(2855989394907223263936484059900_U256);
const EXP_Q1: U256 = uint!(50020603652535783019961831881945_U256);
const EXP_Q2: U256 = uint!(533845033583426703283633433725380_U256);
const EXP_Q3: U256 = uint!(3604857256930695427073651918091429_U256);
const EXP_Q4: U256 = uint!(14423608567350463180887372962807573_U256);
const EXP_Q5: U256 = uint!(26449188498355588339934803723976023_U256);

// scale factor * 1e18 * 2^99, applied with a single shift by (195 - k)
const EXP_SCALE: U256 = uint!(3822833074963236453042738258902158003155416615667_U256);

const LN_P0: U256 = uint!(3273285459638523848632254066296_U256);
const LN_P1: U256 = uint!(24828157081833163892658089445524_U256);
const LN_P2: U256 = uint!(43456485725739037958740375743393_U256);
const LN_P3: U256 = uint!(11111509109440967052023855526967_U256);
const LN_P4: U256 = uint!(45023709667254063763336534515857_U256);
const LN_P5: U256 = uint!(14706773417378608786704636184526_U256);
const LN_P6: U256 = uint!(795164235651350426258249787498_U256);

const LN_Q0: U256 = uint!(5573035233440673466300451813936_U256);
const LN_Q1: U256 = uint!(71694874799317883764090561454958_U256);
const LN_Q2: U256 = uint!(283447036172924575727196451306956_U256);
const LN_Q3: U256 = uint!(401686690394027663651624208769553_U256);
const LN_Q4: U256 = uint!(204048457590392012362485061816622_U256);
const LN_Q5: U256 = uint!(31853899698501571402653359427138_U256);
const LN_Q6: U256 = uint!(909429971244387300277376558375_U256);

// s * 5e18 * 2^96
const LN_SCALE: U256 = uint!(1677202110996718588342820967067443963516166_U256);
// ln(2) * 5e18 * 2^192
const LN_2_SCALED: U256 =
    uint!(16597577552685614221487285958193947469193820559219878177908093499208371_U256);
// ln(2^96 / 1e18) * 5e18 * 2^192
const LN_OFFSET: U256 =
    uint!(600920179829731861736702779321621459595472258049074101567377883020018308_U256);

fn widen(x: U256) -> U512 {
    let l = x.as_limbs();
    U512::from_limbs([l[0], l[1], l[2], l[3], 0, 0, 0, 0])
}

fn narrow(x: U512) -> Result<U256, MathError> {
    let l = x.as_limbs();
    if l[4..].iter().any(|&limb| limb != 0) {
        return Err(MathError::Overflow);
    }
    Ok(U256::from_limbs([l[0], l[1], l[2], l[3]]))
}

/// Computes `x * y / d` rounded down, with a 512-bit intermediate product.
pub fn mul_div_down(x: U256, y: U256, d: U256) -> Result<U256, MathError> {
    if d.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    narrow(widen(x) * widen(y) / widen(d))
}

/// Computes `x * y / d` rounded up, with a 512-bit intermediate product.
pub fn mul_div_up(x: U256, y: U256, d: U256) -> Result<U256, MathError> {
    if d.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = widen(x) * widen(y);
    let d = widen(d);
    let quotient = product / d;
    if (product % d).is_zero() {
        narrow(quotient)
    } else {
        narrow(quotient + U512::from(1u8))
    }
}

/// WAD multiplication `x * y / 1e18`, rounded down.
pub fn mul_wad(x: U256, y: U256) -> Result<U256, MathError> {
    mul_div_down(x, y, WAD)
}

/// WAD multiplication `x * y / 1e18`, rounded up.
pub fn mul_wad_up(x: U256, y: U256) -> Result<U256, MathError> {
    mul_div_up(x, y, WAD)
}

/// WAD division `x * 1e18 / y`, rounded down.
///
/// Fails with [`MathError::DivisionByZero`] when `y` is zero.
pub fn div_wad(x: U256, y: U256) -> Result<U256, MathError> {
    mul_div_down(x, WAD, y)
}

/// WAD division `x * 1e18 / y`, rounded up.
pub fn div_wad_up(x: U256, y: U256) -> Result<U256, MathError> {
    mul_div_up(x, WAD, y)
}

/// Signed `x * y / d` rounded toward zero.
pub fn mul_div_signed(x: I256, y: U256, d: U256) -> Result<I256, MathError> {
    let magnitude = to_signed(mul_div_down(x.unsigned_abs(), y, d)?)?;
    Ok(if x.is_negative() { -magnitude } else { magnitude })
}

/// Converts an unsigned WAD into a signed one.
pub fn to_signed(x: U256) -> Result<I256, MathError> {
    I256::try_from(x).map_err(|_| MathError::Overflow)
}

fn signed(x: U256) -> I256 {
    I256::from_raw(x)
}

// (a * b) >> 96 with arithmetic shift, wrapping like the on-chain unchecked block
fn mul_sar_96(a: I256, b: I256) -> I256 {
    a.wrapping_mul(b).asr(96)
}

/// Natural logarithm of a WAD value.
///
/// The argument is normalized into `[1, 2) * 2^96` by its bit length, the
/// logarithm of the normalized value is taken with an (8, 8)-term rational
/// approximation, and the result is rescaled by `k * ln(2)` plus the
/// `ln(2^96 / 1e18)` base conversion term.
///
/// Fails with [`MathError::Undefined`] when `x <= 0`.
pub fn ln_wad(x: I256) -> Result<I256, MathError> {
    if x <= I256::ZERO {
        return Err(MathError::Undefined);
    }

    // ln(2^k * x) = k * ln(2) + ln(x)
    let raw = x.into_raw();
    let log2 = raw.bit_len() as i64 - 1;
    let k = log2 - 96;
    let x = signed((raw << (159 - k) as usize) >> 159usize);

    let mut p = x.wrapping_add(signed(LN_P0));
    p = mul_sar_96(p, x).wrapping_add(signed(LN_P1));
    p = mul_sar_96(p, x).wrapping_add(signed(LN_P2));
    p = mul_sar_96(p, x).wrapping_sub(signed(LN_P3));
    p = mul_sar_96(p, x).wrapping_sub(signed(LN_P4));
    p = mul_sar_96(p, x).wrapping_sub(signed(LN_P5));
    p = p.wrapping_mul(x).wrapping_sub(signed(LN_P6 << 96usize));

    // p stays in the 2^192 basis, q is monic
    let mut q = x.wrapping_add(signed(LN_Q0));
    q = mul_sar_96(q, x).wrapping_add(signed(LN_Q1));
    q = mul_sar_96(q, x).wrapping_add(signed(LN_Q2));
    q = mul_sar_96(q, x).wrapping_add(signed(LN_Q3));
    q = mul_sar_96(q, x).wrapping_add(signed(LN_Q4));
    q = mul_sar_96(q, x).wrapping_add(signed(LN_Q5));
    q = mul_sar_96(q, x).wrapping_add(signed(LN_Q6));

    let mut r = p.checked_div(q).ok_or(MathError::Overflow)?;

    let k = I256::try_from(k).map_err(|_| MathError::Overflow)?;
    r = r.wrapping_mul(signed(LN_SCALE));
    r = r.wrapping_add(signed(LN_2_SCALED).wrapping_mul(k));
    r = r.wrapping_add(signed(LN_OFFSET));
    Ok(r.asr(174))
}

/// Exponential of a WAD value.
///
/// Returns zero for `x <= -42.139678854452767551` (the result would round to
/// zero) and fails with [`MathError::Overflow`] for
/// `x >= 135.305999368893231589`.
pub fn exp_wad(x: I256) -> Result<I256, MathError> {
    if x <= -signed(EXP_FLOOR) {
        return Ok(I256::ZERO);
    }
    if x >= signed(EXP_CEILING) {
        return Err(MathError::Overflow);
    }

    // Convert to a 2^96 basis: multiply by 2^78 / 5^18
    let two_78 = signed(U256::from(1u8) << 78usize);
    let x = x
        .wrapping_mul(two_78)
        .checked_div(signed(FIVE_POW_18))
        .ok_or(MathError::Overflow)?;

    // exp(x) = exp(x') * 2^k with k = round(x / ln 2)
    let two_95 = signed(U256::from(1u8) << 95usize);
    let two_96 = signed(U256::from(1u8) << 96usize);
    let k = x
        .wrapping_mul(two_96)
        .checked_div(signed(LN_2_X96))
        .ok_or(MathError::Overflow)?
        .wrapping_add(two_95)
        .asr(96);
    let x = x.wrapping_sub(k.wrapping_mul(signed(LN_2_X96)));

    let mut y = x.wrapping_add(signed(EXP_P0));
    y = mul_sar_96(y, x).wrapping_add(signed(EXP_P1));
    let mut p = y.wrapping_add(x).wrapping_sub(signed(EXP_P2));
    p = mul_sar_96(p, y).wrapping_add(signed(EXP_P3));
    p = p.wrapping_mul(x).wrapping_add(signed(EXP_P4 << 96usize));

    let mut q = x.wrapping_sub(signed(EXP_Q0));
    q = mul_sar_96(q, x).wrapping_add(signed(EXP_Q1));
    q = mul_sar_96(q, x).wrapping_sub(signed(EXP_Q2));
    q = mul_sar_96(q, x).wrapping_add(signed(EXP_Q3));
    q = mul_sar_96(q, x).wrapping_sub(signed(EXP_Q4));
    q = mul_sar_96(q, x).wrapping_add(signed(EXP_Q5));

    // q has no real roots, p is already 2^96 too large
    let r = p.checked_div(q).ok_or(MathError::Overflow)?;

    let k = i64::try_from(k).map_err(|_| MathError::Overflow)?;
    let shift = usize::try_from(195 - k).map_err(|_| MathError::Overflow)?;
    Ok(signed(r.into_raw().wrapping_mul(EXP_SCALE) >> shift))
}

/// Integer square root, rounded down.
///
/// Seeds Newton's method from the bit length of `x`, runs seven iterations
/// and corrects the final oscillation between floor and ceiling.
pub fn sqrt(x: U256) -> U256 {
    if x.is_zero() {
        return U256::ZERO;
    }

    let mut y = x;
    let mut z = U256::from(181u8);

    // Keep y >= 256 while shifting so the seed stays within a factor of ~2.84
    if y >= U256::from(1u8) << 136usize {
        y >>= 128usize;
        z <<= 64usize;
    }
    if y >= U256::from(1u8) << 72usize {
        y >>= 64usize;
        z <<= 32usize;
    }
    if y >= U256::from(1u8) << 40usize {
        y >>= 32usize;
        z <<= 16usize;
    }
    if y >= U256::from(1u8) << 24usize {
        y >>= 16usize;
        z <<= 8usize;
    }

    z = (z * (y + U256::from(65_536u32))) >> 18usize;

    for _ in 0..7 {
        z = (z + x / z) >> 1usize;
    }

    if x / z < z {
        z -= U256::from(1u8);
    }
    z
}

/// Square root of a WAD value, as a WAD value.
pub fn sqrt_wad(x: U256) -> Result<U256, MathError> {
    Ok(sqrt(x.checked_mul(WAD).ok_or(MathError::Overflow)?))
}

/// Returns the smaller of two values
pub fn min(a: U256, b: U256) -> U256 {
    if a < b {
        a
    } else {
        b
    }
}

/// Returns the larger of two values
pub fn max(a: U256, b: U256) -> U256 {
    if a > b {
        a
    } else {
        b
    }
}

/// Smallest value of a slice, `None` when empty.
pub fn min_of(values: &[U256]) -> Option<U256> {
    values.iter().copied().min()
}

/// Largest value of a slice, `None` when empty.
pub fn max_of(values: &[U256]) -> Option<U256> {
    values.iter().copied().max()
}

/// Absolute value of a signed WAD.
pub fn abs(x: I256) -> U256 {
    x.unsigned_abs()
}

/// `a - b`, or zero when `b > a`
pub fn zero_floor_sub(a: U256, b: U256) -> U256 {
    a.saturating_sub(b)
}

#[cfg(test)]
pub(crate) fn wad_to_f64(value: U256) -> f64 {
    let s = value.to_string();
    s.parse::<f64>().unwrap_or(f64::MAX) / 1e18
}
