//! Pool Model - Constant product pool state transitions (x·y=k)
//!
//! This crate holds the pure accounting core of a two-asset liquidity pool:
//! configuration, reserve/share bookkeeping and the five operations that
//! move it (initialize, deposit, swap, withdraw, set-lock).
//!
//! Every operation takes the current [`Pool`] by reference and returns either
//! a [`Transition`] (the next pool state plus the asset movements the ledger
//! must execute) or a [`PoolError`]. Nothing is mutated on error, nothing is
//! read from the environment: the caller supplies the clock and the caller's
//! share balance through [`Context`].
//!
//! No_std, no allocation, no panics outside tests.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(kani)]
extern crate kani;

pub mod math;
pub mod movement;
pub mod state;
pub mod transitions;

pub use math::{DepositQuote, SwapQuote, WithdrawQuote};
pub use movement::{Movement, Movements, MAX_MOVEMENTS};
pub use state::{Authority, Direction, InitParams, Pool, PoolAddresses, PoolConfig, Reserves};
pub use transitions::{apply, initialize, Context, Operation, Transition};

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u64 = 10_000;

/// Opaque 32-byte identifier (asset, account or signer)
pub type Address = [u8; 32];

/// Error types for pool operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolError {
    /// A pool record already exists for this seed
    DuplicatePool,
    /// Fee must be below 10,000 bps
    InvalidFee,
    /// Asset X and asset Y are the same asset
    IdenticalAssets,
    /// A required amount is zero
    ZeroAmount,
    /// Operation expiry is earlier than the current time
    Expired,
    /// Caller is not the pool authority
    Unauthorized,
    /// Pool was created without an authority
    NoAuthorityConfigured,
    /// Realized amounts fall outside the caller's bounds
    SlippageExceeded,
    /// Pool is locked for deposits and swaps
    PoolLocked,
    /// Pool holds no reserves
    EmptyPool,
    /// Caller does not hold enough pool shares
    InsufficientShares,
    /// Reserves and share supply disagree on whether the pool is funded
    InconsistentReserves,
    /// Arithmetic overflow
    Overflow,
}

impl core::fmt::Display for PoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            PoolError::DuplicatePool => "a pool already exists for this seed",
            PoolError::InvalidFee => "fee must be below 10000 bps",
            PoolError::IdenticalAssets => "asset x and asset y must differ",
            PoolError::ZeroAmount => "amount must be non-zero",
            PoolError::Expired => "operation expired",
            PoolError::Unauthorized => "caller is not the pool authority",
            PoolError::NoAuthorityConfigured => "pool has no lock authority",
            PoolError::SlippageExceeded => "slippage limit exceeded",
            PoolError::PoolLocked => "pool is locked",
            PoolError::EmptyPool => "pool has no liquidity",
            PoolError::InsufficientShares => "not enough pool shares",
            PoolError::InconsistentReserves => "reserves and share supply disagree",
            PoolError::Overflow => "arithmetic overflow",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for PoolError {}

pub type Result<T> = core::result::Result<T, PoolError>;
