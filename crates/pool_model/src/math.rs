//! Constant product pool math (x·y=k)
//!
//! All intermediates are widened to u128 and every narrowing back to u64 is
//! checked. Rounding always favours the pool: amounts paid in round up,
//! amounts paid out round down.

use crate::state::Reserves;
use crate::{PoolError, Result, BPS_SCALE};

/// Amounts a deposit will move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositQuote {
    pub x_in: u64,
    pub y_in: u64,
    pub shares_out: u64,
}

/// Outcome of a swap against given reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    /// Full input, fee included
    pub amount_in: u64,
    /// Portion of the input priced on the curve
    pub effective_in: u64,
    /// Portion of the input kept by the pool as fee
    pub fee: u64,
    pub amount_out: u64,
    /// Input-side reserve after the swap
    pub new_reserve_in: u64,
    /// Output-side reserve after the swap
    pub new_reserve_out: u64,
}

/// Amounts a withdrawal will release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawQuote {
    pub x_out: u64,
    pub y_out: u64,
    pub shares_in: u64,
}

#[inline]
fn narrow(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| PoolError::Overflow)
}

/// floor(a * b / d)
///
/// Returns `EmptyPool` when `d` is zero: every denominator in this module is
/// a reserve or the share supply.
#[inline]
pub fn mul_div_floor(a: u64, b: u64, d: u64) -> Result<u64> {
    if d == 0 {
        return Err(PoolError::EmptyPool);
    }
    narrow(u128::from(a) * u128::from(b) / u128::from(d))
}

/// ceil(a * b / d)
#[inline]
pub fn mul_div_ceil(a: u64, b: u64, d: u64) -> Result<u64> {
    if d == 0 {
        return Err(PoolError::EmptyPool);
    }
    let num = u128::from(a) * u128::from(b);
    let d = u128::from(d);
    let q = num / d;
    narrow(if num % d == 0 { q } else { q + 1 })
}

#[inline]
pub fn add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(PoolError::Overflow)
}

#[inline]
pub fn sub(a: u64, b: u64) -> Result<u64> {
    a.checked_sub(b).ok_or(PoolError::Overflow)
}

/// Contribution required to mint `shares`
///
/// - Empty pool: the caller sets the price; exactly `max_x`/`max_y` go in.
/// - Funded pool: x_in = ceil(shares · x / supply), same for y.
///
/// # Returns
/// * `DepositQuote` with the required amounts
/// * `SlippageExceeded` if either amount is above the caller's maximum
pub fn deposit_amounts(
    reserves: &Reserves,
    shares: u64,
    max_x: u64,
    max_y: u64,
) -> Result<DepositQuote> {
    if shares == 0 {
        return Err(PoolError::ZeroAmount);
    }

    if reserves.is_empty() {
        if max_x == 0 || max_y == 0 {
            return Err(PoolError::ZeroAmount);
        }
        return Ok(DepositQuote {
            x_in: max_x,
            y_in: max_y,
            shares_out: shares,
        });
    }

    let x_in = mul_div_ceil(shares, reserves.x, reserves.shares)?;
    let y_in = mul_div_ceil(shares, reserves.y, reserves.shares)?;

    if x_in > max_x || y_in > max_y {
        return Err(PoolError::SlippageExceeded);
    }

    Ok(DepositQuote {
        x_in,
        y_in,
        shares_out: shares,
    })
}

/// Constant product swap with the fee taken from the input
///
/// - Δin_eff = Δin · (BPS_SCALE - fee) / BPS_SCALE
/// - out1 = ceil(in0 · out0 / (in0 + Δin_eff))
/// - Δout = out0 - out1
/// - in1 = in0 + Δin (the fee stays in the pool)
///
/// Rounding out1 up keeps in1 · out1 >= in0 · out0.
///
/// # Arguments
/// * `reserve_in` - Reserve of the asset paid in
/// * `reserve_out` - Reserve of the asset paid out
/// * `fee_bps` - Fee in basis points (30 = 0.3%)
/// * `amount_in` - Input amount, fee included
pub fn swap_out(reserve_in: u64, reserve_out: u64, fee_bps: u16, amount_in: u64) -> Result<SwapQuote> {
    if amount_in == 0 {
        return Err(PoolError::ZeroAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(PoolError::EmptyPool);
    }
    let fee_bps = u64::from(fee_bps);
    if fee_bps >= BPS_SCALE {
        return Err(PoolError::InvalidFee);
    }

    let effective_in = mul_div_floor(amount_in, BPS_SCALE - fee_bps, BPS_SCALE)?;

    let k = u128::from(reserve_in) * u128::from(reserve_out);
    let denom = u128::from(reserve_in) + u128::from(effective_in);
    let quotient = k / denom;
    let new_out = if k % denom == 0 { quotient } else { quotient + 1 };
    let new_out = narrow(new_out)?;
    // k > 0, so the ceiling is at least 1 and the output reserve is never drained
    debug_assert!(new_out > 0);

    let amount_out = sub(reserve_out, new_out)?;
    if amount_out == 0 {
        return Err(PoolError::ZeroAmount);
    }

    let new_reserve_in = add(reserve_in, amount_in)?;

    Ok(SwapQuote {
        amount_in,
        effective_in,
        fee: amount_in - effective_in,
        amount_out,
        new_reserve_in,
        new_reserve_out: new_out,
    })
}

/// Amounts released by burning `shares`
///
/// x_out = floor(shares · x / supply), same for y.
pub fn withdraw_amounts(reserves: &Reserves, shares: u64) -> Result<WithdrawQuote> {
    if shares == 0 {
        return Err(PoolError::ZeroAmount);
    }
    if reserves.is_empty() {
        return Err(PoolError::EmptyPool);
    }
    if shares > reserves.shares {
        return Err(PoolError::InsufficientShares);
    }

    Ok(WithdrawQuote {
        x_out: mul_div_floor(shares, reserves.x, reserves.shares)?,
        y_out: mul_div_floor(shares, reserves.y, reserves.shares)?,
        shares_in: shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESERVE: u64 = 1_000_000_000;

    fn funded() -> Reserves {
        Reserves {
            x: RESERVE,
            y: RESERVE,
            shares: 1_000_000,
        }
    }

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div_floor(7, 3, 2).unwrap(), 10);
        assert_eq!(mul_div_ceil(7, 3, 2).unwrap(), 11);
        assert_eq!(mul_div_ceil(4, 3, 2).unwrap(), 6);
        assert_eq!(mul_div_floor(1, 1, 0), Err(PoolError::EmptyPool));
    }

    #[test]
    fn test_mul_div_overflow() {
        assert_eq!(mul_div_floor(u64::MAX, u64::MAX, 1), Err(PoolError::Overflow));
        assert_eq!(mul_div_floor(u64::MAX, u64::MAX, u64::MAX).unwrap(), u64::MAX);
    }

    #[test]
    fn test_swap_reference_case() {
        // 100 X into 1000/1000 at 30 bps
        let q = swap_out(RESERVE, RESERVE, 30, 100_000_000).unwrap();

        assert_eq!(q.effective_in, 99_700_000);
        assert_eq!(q.fee, 300_000);
        assert_eq!(q.amount_out, 90_661_089);
        assert!(q.amount_out > 90_000_000 && q.amount_out < 90_661_090);
        assert_eq!(q.new_reserve_in, RESERVE + 100_000_000);
        assert_eq!(q.new_reserve_out, RESERVE - 90_661_089);
    }

    #[test]
    fn test_invariant_increases_with_fees() {
        let k0 = u128::from(RESERVE) * u128::from(RESERVE);
        let q = swap_out(RESERVE, RESERVE, 30, 50_000_000).unwrap();
        let k1 = u128::from(q.new_reserve_in) * u128::from(q.new_reserve_out);

        assert!(k1 > k0, "Invariant should increase due to fees");
    }

    #[test]
    fn test_zero_fee_never_loses_to_rounding() {
        let k0 = 3u128 * 7;
        let q = swap_out(3, 7, 0, 2).unwrap();
        assert!(u128::from(q.new_reserve_in) * u128::from(q.new_reserve_out) >= k0);
    }

    #[test]
    fn test_swap_output_rounding_to_zero() {
        // 1 unit in at 99.99% fee prices nothing on the curve
        assert_eq!(swap_out(RESERVE, RESERVE, 9_999, 1), Err(PoolError::ZeroAmount));
    }

    #[test]
    fn test_swap_empty_pool() {
        assert_eq!(swap_out(0, 0, 30, 10), Err(PoolError::EmptyPool));
        assert_eq!(swap_out(RESERVE, RESERVE, 30, 0), Err(PoolError::ZeroAmount));
    }

    #[test]
    fn test_swap_cannot_drain_output() {
        let q = swap_out(1, 1_000, 0, u64::MAX - 1).unwrap();
        assert_eq!(q.new_reserve_out, 1);
        assert_eq!(q.amount_out, 999);
    }

    #[test]
    fn test_swap_input_overflow() {
        assert_eq!(swap_out(u64::MAX, u64::MAX, 0, u64::MAX), Err(PoolError::Overflow));
    }

    #[test]
    fn test_bootstrap_deposit_uses_maximums() {
        let q = deposit_amounts(&Reserves::default(), 1_000_000, RESERVE, RESERVE).unwrap();
        assert_eq!(q, DepositQuote { x_in: RESERVE, y_in: RESERVE, shares_out: 1_000_000 });

        assert_eq!(
            deposit_amounts(&Reserves::default(), 1_000_000, 0, RESERVE),
            Err(PoolError::ZeroAmount)
        );
    }

    #[test]
    fn test_proportional_deposit_rounds_up() {
        let reserves = Reserves { x: 10, y: 20, shares: 3 };
        let q = deposit_amounts(&reserves, 1, u64::MAX, u64::MAX).unwrap();
        // 10/3 = 3.33, 20/3 = 6.67
        assert_eq!(q.x_in, 4);
        assert_eq!(q.y_in, 7);
    }

    #[test]
    fn test_deposit_slippage() {
        let q = deposit_amounts(&funded(), 500_000, RESERVE / 2, RESERVE / 2).unwrap();
        assert_eq!((q.x_in, q.y_in), (RESERVE / 2, RESERVE / 2));

        assert_eq!(
            deposit_amounts(&funded(), 500_000, RESERVE / 2 - 1, RESERVE),
            Err(PoolError::SlippageExceeded)
        );
    }

    #[test]
    fn test_withdraw_rounds_down() {
        let reserves = Reserves { x: 10, y: 20, shares: 3 };
        let q = withdraw_amounts(&reserves, 1).unwrap();
        assert_eq!((q.x_out, q.y_out), (3, 6));
    }

    #[test]
    fn test_withdraw_everything() {
        let q = withdraw_amounts(&funded(), 1_000_000).unwrap();
        assert_eq!((q.x_out, q.y_out), (RESERVE, RESERVE));
        assert_eq!(withdraw_amounts(&funded(), 1_000_001), Err(PoolError::InsufficientShares));
        assert_eq!(withdraw_amounts(&Reserves::default(), 1), Err(PoolError::EmptyPool));
    }
}
