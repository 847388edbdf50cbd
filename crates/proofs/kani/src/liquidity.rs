//! Kani proofs for deposit / withdraw share accounting
//!
//! - **L1: Deposit Rounds Up** - depositors never pay less than their share
//! - **L2: Withdraw Rounds Down** - withdrawers never take more than their share
//! - **L3: Full Exit** - burning the whole supply empties the pool
//! - **L4: No Mutation On Error** - rejected operations leave the pool unchanged

use pool_model::math::{deposit_amounts, withdraw_amounts};
use pool_model::{
    apply, initialize, Authority, Context, Direction, InitParams, Operation, Pool, PoolAddresses,
    Reserves,
};

fn any_funded_reserves() -> Reserves {
    let x: u64 = kani::any();
    let y: u64 = kani::any();
    let shares: u64 = kani::any();
    kani::assume(x > 0 && x < 1 << 40);
    kani::assume(y > 0 && y < 1 << 40);
    kani::assume(shares > 0 && shares < 1 << 40);
    Reserves { x, y, shares }
}

fn pool_with(reserves: Reserves, locked: bool) -> Pool {
    let mut pool = initialize(
        InitParams {
            seed: 1,
            fee_bps: 30,
            asset_x: [1; 32],
            asset_y: [2; 32],
            authority: Authority::Key([9; 32]),
        },
        PoolAddresses {
            vault_x: [10; 32],
            vault_y: [11; 32],
            share_mint: [12; 32],
        },
    )
    .expect("fixed params must initialize");
    pool.reserves = reserves;
    pool.config.locked = locked;
    pool
}

/// L1: x_in · supply >= shares · x (same for y)
#[kani::proof]
#[kani::unwind(4)]
fn l1_deposit_rounds_up() {
    let reserves = any_funded_reserves();
    let shares: u64 = kani::any();
    kani::assume(shares > 0 && shares < 1 << 40);

    if let Ok(q) = deposit_amounts(&reserves, shares, u64::MAX, u64::MAX) {
        let supply = u128::from(reserves.shares);
        assert!(u128::from(q.x_in) * supply >= u128::from(shares) * u128::from(reserves.x));
        assert!(u128::from(q.y_in) * supply >= u128::from(shares) * u128::from(reserves.y));
    }
}

/// L2: x_out · supply <= shares · x (same for y)
#[kani::proof]
#[kani::unwind(4)]
fn l2_withdraw_rounds_down() {
    let reserves = any_funded_reserves();
    let shares: u64 = kani::any();
    kani::assume(shares > 0 && shares <= reserves.shares);

    if let Ok(q) = withdraw_amounts(&reserves, shares) {
        let supply = u128::from(reserves.shares);
        assert!(u128::from(q.x_out) * supply <= u128::from(shares) * u128::from(reserves.x));
        assert!(u128::from(q.y_out) * supply <= u128::from(shares) * u128::from(reserves.y));
        assert!(q.x_out <= reserves.x && q.y_out <= reserves.y);
    }
}

/// L3: Burning the whole supply returns exactly the reserves
#[kani::proof]
#[kani::unwind(4)]
fn l3_full_exit() {
    let reserves = any_funded_reserves();

    if let Ok(q) = withdraw_amounts(&reserves, reserves.shares) {
        assert_eq!(q.x_out, reserves.x, "L3: all of x returned");
        assert_eq!(q.y_out, reserves.y, "L3: all of y returned");
    }
}

/// L4: Rejected operations never alter the input pool
#[kani::proof]
#[kani::unwind(4)]
fn l4_no_mutation_on_error() {
    let reserves = any_funded_reserves();
    let locked: bool = kani::any();
    let pool = pool_with(reserves, locked);
    let before = pool;

    let amount: u64 = kani::any();
    let bound: u64 = kani::any();
    let expiry: i64 = kani::any();
    let selector: u8 = kani::any();
    kani::assume(selector < 3);

    let op = match selector {
        0 => Operation::Deposit { shares: amount, max_x: bound, max_y: bound, expiry },
        1 => Operation::Swap { direction: Direction::XToY, amount_in: amount, min_amount_out: bound, expiry },
        _ => Operation::Withdraw { shares: amount, min_x: bound, min_y: bound, expiry },
    };
    let ctx = Context {
        now: 1_000,
        caller: [5; 32],
        caller_shares: reserves.shares,
    };

    let result = apply(&pool, &op, &ctx);
    assert_eq!(pool, before, "L4: input pool untouched");
    if locked && selector < 2 {
        assert!(result.is_err(), "L4: locked pool rejects deposit and swap");
    }
    if expiry < ctx.now {
        assert!(result.is_err(), "L4: expired operations rejected");
    }
}
