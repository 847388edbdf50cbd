//! Pool state transitions
//!
//! Each operation validates against the current pool, computes the next
//! state and the movements that realize it, and returns both. The input pool
//! is never modified; on error the caller simply keeps the old state.

use crate::math::{self, DepositQuote, SwapQuote, WithdrawQuote};
use crate::movement::{Movement, Movements};
use crate::state::{Authority, Direction, InitParams, Pool, PoolAddresses, PoolConfig, Reserves};
use crate::{Address, PoolError, Result};

/// Facts the host supplies at the moment of application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// Current unix timestamp (seconds)
    pub now: i64,
    /// Signer of the operation
    pub caller: Address,
    /// Caller's pool-share balance
    pub caller_shares: u64,
}

/// An operation against an existing pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Deposit {
        shares: u64,
        max_x: u64,
        max_y: u64,
        expiry: i64,
    },
    Swap {
        direction: Direction,
        amount_in: u64,
        min_amount_out: u64,
        expiry: i64,
    },
    Withdraw {
        shares: u64,
        min_x: u64,
        min_y: u64,
        expiry: i64,
    },
    SetLock {
        locked: bool,
    },
}

/// Result of a successful operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Pool state after the operation
    pub pool: Pool,
    /// Ledger movements to execute atomically with the state write
    pub movements: Movements,
}

/// Create a pool record with zero reserves
///
/// Duplicate detection belongs to whoever stores pools keyed by seed.
pub fn initialize(params: InitParams, addresses: PoolAddresses) -> Result<Pool> {
    PoolConfig::new(params, addresses).map(Pool::new)
}

/// Apply `op` to `pool`
pub fn apply(pool: &Pool, op: &Operation, ctx: &Context) -> Result<Transition> {
    match *op {
        Operation::Deposit {
            shares,
            max_x,
            max_y,
            expiry,
        } => pool.deposit(ctx, shares, max_x, max_y, expiry),
        Operation::Swap {
            direction,
            amount_in,
            min_amount_out,
            expiry,
        } => pool.swap(ctx, direction, amount_in, min_amount_out, expiry),
        Operation::Withdraw {
            shares,
            min_x,
            min_y,
            expiry,
        } => pool.withdraw(ctx, shares, min_x, min_y, expiry),
        Operation::SetLock { locked } => pool.set_lock(ctx, locked).map(|pool| Transition {
            pool,
            movements: Movements::new(),
        }),
    }
}

#[inline]
fn ensure_not_expired(ctx: &Context, expiry: i64) -> Result<()> {
    if ctx.now > expiry {
        return Err(PoolError::Expired);
    }
    Ok(())
}

impl Pool {
    #[inline]
    fn ensure_unlocked(&self) -> Result<()> {
        if self.config.locked {
            return Err(PoolError::PoolLocked);
        }
        Ok(())
    }

    /// Amounts a deposit of `shares` would take, without applying it
    pub fn quote_deposit(&self, shares: u64, max_x: u64, max_y: u64) -> Result<DepositQuote> {
        math::deposit_amounts(&self.reserves, shares, max_x, max_y)
    }

    /// Outcome of a swap, without applying it
    pub fn quote_swap(&self, direction: Direction, amount_in: u64) -> Result<SwapQuote> {
        let (reserve_in, reserve_out) = self.reserves.swap_sides(direction);
        math::swap_out(reserve_in, reserve_out, self.config.fee_bps, amount_in)
    }

    /// Amounts a withdrawal of `shares` would release, without applying it
    pub fn quote_withdraw(&self, shares: u64) -> Result<WithdrawQuote> {
        math::withdraw_amounts(&self.reserves, shares)
    }

    /// Add liquidity and mint `shares` to the caller
    ///
    /// An empty pool takes exactly `max_x`/`max_y` and sets the price; a
    /// funded pool takes the proportional amounts rounded up.
    pub fn deposit(
        &self,
        ctx: &Context,
        shares: u64,
        max_x: u64,
        max_y: u64,
        expiry: i64,
    ) -> Result<Transition> {
        self.ensure_unlocked()?;
        ensure_not_expired(ctx, expiry)?;

        let quote = self.quote_deposit(shares, max_x, max_y)?;

        let reserves = Reserves {
            x: math::add(self.reserves.x, quote.x_in)?,
            y: math::add(self.reserves.y, quote.y_in)?,
            shares: math::add(self.reserves.shares, quote.shares_out)?,
        };

        let cfg = &self.config;
        let mut movements = Movements::new();
        movements.push(Movement::Transfer {
            asset: cfg.asset_x,
            from: ctx.caller,
            to: cfg.vault_x,
            amount: quote.x_in,
        });
        movements.push(Movement::Transfer {
            asset: cfg.asset_y,
            from: ctx.caller,
            to: cfg.vault_y,
            amount: quote.y_in,
        });
        movements.push(Movement::Mint {
            mint: cfg.share_mint,
            to: ctx.caller,
            amount: quote.shares_out,
        });

        Ok(Transition {
            pool: Pool::with_reserves(self.config, reserves),
            movements,
        })
    }

    /// Trade `amount_in` of one asset for the other along x·y=k
    pub fn swap(
        &self,
        ctx: &Context,
        direction: Direction,
        amount_in: u64,
        min_amount_out: u64,
        expiry: i64,
    ) -> Result<Transition> {
        self.ensure_unlocked()?;
        ensure_not_expired(ctx, expiry)?;

        let quote = self.quote_swap(direction, amount_in)?;
        if quote.amount_out < min_amount_out {
            return Err(PoolError::SlippageExceeded);
        }

        let reserves = match direction {
            Direction::XToY => Reserves {
                x: quote.new_reserve_in,
                y: quote.new_reserve_out,
                shares: self.reserves.shares,
            },
            Direction::YToX => Reserves {
                x: quote.new_reserve_out,
                y: quote.new_reserve_in,
                shares: self.reserves.shares,
            },
        };

        let ((asset_in, vault_in), (asset_out, vault_out)) = self.config.swap_sides(direction);
        let mut movements = Movements::new();
        movements.push(Movement::Transfer {
            asset: asset_in,
            from: ctx.caller,
            to: vault_in,
            amount: quote.amount_in,
        });
        movements.push(Movement::Transfer {
            asset: asset_out,
            from: vault_out,
            to: ctx.caller,
            amount: quote.amount_out,
        });

        Ok(Transition {
            pool: Pool::with_reserves(self.config, reserves),
            movements,
        })
    }

    /// Burn `shares` and pay out the proportional reserves, rounded down
    ///
    /// Permitted while the pool is locked.
    pub fn withdraw(
        &self,
        ctx: &Context,
        shares: u64,
        min_x: u64,
        min_y: u64,
        expiry: i64,
    ) -> Result<Transition> {
        ensure_not_expired(ctx, expiry)?;

        if shares == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if shares > ctx.caller_shares {
            return Err(PoolError::InsufficientShares);
        }

        let quote = self.quote_withdraw(shares)?;
        if quote.x_out < min_x || quote.y_out < min_y {
            return Err(PoolError::SlippageExceeded);
        }

        let reserves = Reserves {
            x: math::sub(self.reserves.x, quote.x_out)?,
            y: math::sub(self.reserves.y, quote.y_out)?,
            shares: math::sub(self.reserves.shares, quote.shares_in)?,
        };

        let cfg = &self.config;
        let mut movements = Movements::new();
        movements.push(Movement::Burn {
            mint: cfg.share_mint,
            from: ctx.caller,
            amount: quote.shares_in,
        });
        if quote.x_out > 0 {
            movements.push(Movement::Transfer {
                asset: cfg.asset_x,
                from: cfg.vault_x,
                to: ctx.caller,
                amount: quote.x_out,
            });
        }
        if quote.y_out > 0 {
            movements.push(Movement::Transfer {
                asset: cfg.asset_y,
                from: cfg.vault_y,
                to: ctx.caller,
                amount: quote.y_out,
            });
        }

        Ok(Transition {
            pool: Pool::with_reserves(self.config, reserves),
            movements,
        })
    }

    /// Set the lock flag; only the configured authority may call this
    pub fn set_lock(&self, ctx: &Context, locked: bool) -> Result<Pool> {
        match &self.config.authority {
            Authority::Disabled => Err(PoolError::NoAuthorityConfigured),
            Authority::Key(key) if *key != ctx.caller => Err(PoolError::Unauthorized),
            Authority::Key(_) => {
                let mut pool = *self;
                pool.config.locked = locked;
                Ok(pool)
            }
        }
    }
}
