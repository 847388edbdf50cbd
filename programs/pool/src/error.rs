//! Runtime errors

use pool_model::PoolError;
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The pool model rejected the operation
    #[error("pool rejected operation: {0}")]
    Pool(#[from] PoolError),

    /// The ledger could not execute the movements
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("no pool with seed {0}")]
    PoolNotFound(u64),
}

impl RuntimeError {
    /// The model error, if this is one
    pub fn pool_error(&self) -> Option<PoolError> {
        match self {
            RuntimeError::Pool(e) => Some(*e),
            _ => None,
        }
    }
}
