//! Asset movements emitted by pool transitions
//!
//! The engine never touches balances. Each successful operation returns the
//! transfers, mints and burns the ledger must execute atomically together
//! with the pool-state write.

use arrayvec::ArrayVec;

use crate::Address;

/// Most movements any single operation emits (deposit: 2 transfers + mint)
pub const MAX_MOVEMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Move `amount` of `asset` between two holders
    Transfer {
        asset: Address,
        from: Address,
        to: Address,
        amount: u64,
    },
    /// Issue pool shares
    Mint { mint: Address, to: Address, amount: u64 },
    /// Destroy pool shares
    Burn { mint: Address, from: Address, amount: u64 },
}

impl Movement {
    pub fn amount(&self) -> u64 {
        match self {
            Movement::Transfer { amount, .. }
            | Movement::Mint { amount, .. }
            | Movement::Burn { amount, .. } => *amount,
        }
    }
}

pub type Movements = ArrayVec<Movement, MAX_MOVEMENTS>;
