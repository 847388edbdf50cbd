//! Kani proofs for constant product swap invariants
//!
//! - **P1: Product Non-Decreasing** - x·y after a swap is never below x·y before
//! - **P2: Reserves Positive** - a swap never empties either side
//! - **P3: Total** - swap math returns an error instead of panicking
//! - **P4: Fee Monotone** - a higher fee never pays out more

use pool_model::math::swap_out;
use pool_model::PoolError;

/// P1: Product non-decreasing, for every fee in [0, 10000)
///
/// The output-side reserve is rounded up, so no rounding tolerance is needed.
#[kani::proof]
#[kani::unwind(4)]
fn p1_product_non_decreasing() {
    let r_in: u64 = kani::any();
    let r_out: u64 = kani::any();
    let amount_in: u64 = kani::any();
    let fee_bps: u16 = kani::any();

    kani::assume(r_in > 0 && r_in < 1 << 40);
    kani::assume(r_out > 0 && r_out < 1 << 40);
    kani::assume(amount_in > 0 && amount_in < 1 << 40);
    kani::assume(fee_bps < 10_000);

    let k0 = u128::from(r_in) * u128::from(r_out);

    if let Ok(q) = swap_out(r_in, r_out, fee_bps, amount_in) {
        let k1 = u128::from(q.new_reserve_in) * u128::from(q.new_reserve_out);
        assert!(k1 >= k0, "P1: product must not decrease");
        assert_eq!(q.new_reserve_in, r_in + amount_in, "P1: full input stays in pool");
        assert_eq!(q.new_reserve_out + q.amount_out, r_out, "P1: output conserved");
    }
}

/// P2: Reserves positive after any successful swap
#[kani::proof]
#[kani::unwind(4)]
fn p2_reserves_positive() {
    let r_in: u64 = kani::any();
    let r_out: u64 = kani::any();
    let amount_in: u64 = kani::any();
    let fee_bps: u16 = kani::any();

    kani::assume(r_in > 0 && r_out > 0);
    kani::assume(fee_bps < 10_000);

    if let Ok(q) = swap_out(r_in, r_out, fee_bps, amount_in) {
        assert!(q.new_reserve_in > 0, "P2: input reserve positive");
        assert!(q.new_reserve_out > 0, "P2: output reserve positive");
        assert!(q.amount_out > 0, "P2: swap pays something");
        assert!(q.effective_in <= q.amount_in, "P2: fee is non-negative");
    }
}

/// P3: No panic on the full u64 domain
#[kani::proof]
#[kani::unwind(4)]
fn p3_total_on_full_domain() {
    let r_in: u64 = kani::any();
    let r_out: u64 = kani::any();
    let amount_in: u64 = kani::any();
    let fee_bps: u16 = kani::any();

    match swap_out(r_in, r_out, fee_bps, amount_in) {
        Ok(_) => {}
        Err(e) => assert!(matches!(
            e,
            PoolError::ZeroAmount
                | PoolError::EmptyPool
                | PoolError::InvalidFee
                | PoolError::Overflow
        )),
    }
}

/// P4: Raising the fee never increases the output
#[kani::proof]
#[kani::unwind(4)]
fn p4_fee_monotone() {
    let r_in: u64 = kani::any();
    let r_out: u64 = kani::any();
    let amount_in: u64 = kani::any();
    let low: u16 = kani::any();
    let high: u16 = kani::any();

    kani::assume(r_in > 0 && r_in < 1 << 32);
    kani::assume(r_out > 0 && r_out < 1 << 32);
    kani::assume(amount_in > 0 && amount_in < 1 << 32);
    kani::assume(low <= high && high < 10_000);

    if let (Ok(cheap), Ok(dear)) = (
        swap_out(r_in, r_out, low, amount_in),
        swap_out(r_in, r_out, high, amount_in),
    ) {
        assert!(dear.amount_out <= cheap.amount_out, "P4: fee must not raise output");
    }
}
