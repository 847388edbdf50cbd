//! Caller-facing operation surface for one pool
//!
//! Mirrors the instruction surface: `deposit(shares, max_x, max_y, expiry)`,
//! `swap(direction, amount_in, min_amount_out, expiry)`,
//! `withdraw(shares, min_x, min_y, expiry)`, `set_lock(locked)`.
//! Holding `&mut` to the registry and ledger serializes operations on the
//! pool for the lifetime of the session.

use pool_model::{Address, Direction, Operation, Pool, Transition};

use crate::clock::Clock;
use crate::error::RuntimeError;
use crate::ledger::Ledger;
use crate::registry::PoolRegistry;

pub struct PoolSession<'a, L: Ledger, C: Clock> {
    registry: &'a mut PoolRegistry,
    ledger: &'a mut L,
    clock: &'a C,
    seed: u64,
    caller: Address,
}

impl<'a, L: Ledger, C: Clock> PoolSession<'a, L, C> {
    pub fn new(
        registry: &'a mut PoolRegistry,
        ledger: &'a mut L,
        clock: &'a C,
        seed: u64,
        caller: Address,
    ) -> Self {
        Self {
            registry,
            ledger,
            clock,
            seed,
            caller,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ledger(&self) -> &L {
        &*self.ledger
    }

    /// Current pool state
    pub fn pool(&self) -> Result<Pool, RuntimeError> {
        self.registry.load(&*self.ledger, self.seed)
    }

    /// Caller's pool-share balance
    pub fn shares(&self) -> Result<u64, RuntimeError> {
        let pool = self.pool()?;
        Ok(self.ledger.balance(&pool.config.share_mint, &self.caller))
    }

    pub fn apply(&mut self, op: Operation) -> Result<Transition, RuntimeError> {
        let now = self.clock.now();
        self.registry
            .apply(&mut *self.ledger, self.seed, now, &self.caller, &op)
    }

    pub fn deposit(
        &mut self,
        shares: u64,
        max_x: u64,
        max_y: u64,
        expiry: i64,
    ) -> Result<Transition, RuntimeError> {
        self.apply(Operation::Deposit {
            shares,
            max_x,
            max_y,
            expiry,
        })
    }

    pub fn swap(
        &mut self,
        direction: Direction,
        amount_in: u64,
        min_amount_out: u64,
        expiry: i64,
    ) -> Result<Transition, RuntimeError> {
        self.apply(Operation::Swap {
            direction,
            amount_in,
            min_amount_out,
            expiry,
        })
    }

    pub fn withdraw(
        &mut self,
        shares: u64,
        min_x: u64,
        min_y: u64,
        expiry: i64,
    ) -> Result<Transition, RuntimeError> {
        self.apply(Operation::Withdraw {
            shares,
            min_x,
            min_y,
            expiry,
        })
    }

    pub fn set_lock(&mut self, locked: bool) -> Result<Transition, RuntimeError> {
        self.apply(Operation::SetLock { locked })
    }
}
