//! Pool registry: durable pool records keyed by seed
//!
//! Reserves are not stored. They are read back from the ledger (vault
//! balances and share-mint supply) every time a pool is loaded, and the
//! record only changes when an operation's movements have been executed.
//!
//! A pool with no shares outstanding is empty whatever its vaults hold.
//! Anyone can transfer into a vault; such a balance is left in place and
//! becomes part of the reserves when the next bootstrap deposit funds the
//! pool.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use pool_model::{
    apply, initialize, Address, Authority, Context, InitParams, Operation, Pool, PoolConfig,
    PoolError, Reserves, Transition,
};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::error::RuntimeError;
use crate::ledger::Ledger;
use crate::pda::PoolPdas;

/// Stored pool record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub config: PoolConfig,
    /// Address of the config account
    pub address: Address,
    pub config_bump: u8,
    pub share_mint_bump: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRegistry {
    program_id: Address,
    pools: BTreeMap<u64, PoolRecord>,
}

impl PoolRegistry {
    pub fn new(program_id: &Pubkey) -> Self {
        Self {
            program_id: program_id.to_bytes(),
            pools: BTreeMap::new(),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        Pubkey::new_from_array(self.program_id)
    }

    pub fn get(&self, seed: u64) -> Option<&PoolRecord> {
        self.pools.get(&seed)
    }

    pub fn records(&self) -> impl Iterator<Item = &PoolRecord> {
        self.pools.values()
    }

    /// Create a pool for `seed`
    ///
    /// Vault and share-mint identifiers are derived from the seed; nothing is
    /// written to the ledger until the first deposit.
    pub fn initialize(
        &mut self,
        seed: u64,
        fee_bps: u16,
        asset_x: &Address,
        asset_y: &Address,
        authority: Option<Address>,
    ) -> Result<&PoolRecord, RuntimeError> {
        if self.pools.contains_key(&seed) {
            warn!("initialize rejected: pool {} already exists", seed);
            return Err(PoolError::DuplicatePool.into());
        }

        let pdas = PoolPdas::derive(&self.program_id(), seed);
        debug!(
            "pool {} accounts: config={} share_mint={} vault_x={} vault_y={}",
            seed, pdas.config, pdas.share_mint, pdas.vault_x, pdas.vault_y
        );

        let pool = initialize(
            InitParams {
                seed,
                fee_bps,
                asset_x: *asset_x,
                asset_y: *asset_y,
                authority: Authority::from_option(authority),
            },
            pdas.addresses(),
        )
        .map_err(|e| {
            warn!("initialize rejected for pool {}: {}", seed, e);
            e
        })?;

        info!("pool {} initialized (fee {} bps)", seed, fee_bps);

        let record: &PoolRecord = self.pools.entry(seed).or_insert(PoolRecord {
            config: pool.config,
            address: pdas.config.to_bytes(),
            config_bump: pdas.config_bump,
            share_mint_bump: pdas.share_mint_bump,
        });
        Ok(record)
    }

    /// Current pool state with reserves read from the ledger
    pub fn load<L: Ledger>(&self, ledger: &L, seed: u64) -> Result<Pool, RuntimeError> {
        let record = self.pools.get(&seed).ok_or(RuntimeError::PoolNotFound(seed))?;
        let cfg = &record.config;

        let pool = Pool::with_reserves(*cfg, ledger_reserves(ledger, cfg));
        pool.check_invariants()?;
        Ok(pool)
    }

    /// Run `op` against pool `seed` and commit it
    ///
    /// The ledger executes the movements first; the record is only updated
    /// if that succeeds, so a failure at any step leaves both untouched.
    pub fn apply<L: Ledger>(
        &mut self,
        ledger: &mut L,
        seed: u64,
        now: i64,
        caller: &Address,
        op: &Operation,
    ) -> Result<Transition, RuntimeError> {
        let pool = self.load(&*ledger, seed)?;
        let ctx = Context {
            now,
            caller: *caller,
            caller_shares: ledger.balance(&pool.config.share_mint, caller),
        };

        let mut transition = apply(&pool, op, &ctx).map_err(|e| {
            warn!("pool {}: {:?} rejected: {}", seed, op, e);
            e
        })?;

        ledger.execute(&transition.movements).map_err(|e| {
            warn!("pool {}: ledger refused movements: {}", seed, e);
            e
        })?;

        if let Some(record) = self.pools.get_mut(&seed) {
            record.config = transition.pool.config;
        }
        // a bootstrap over vault dust funds the pool with the dust included
        transition.pool.reserves = ledger_reserves(&*ledger, &transition.pool.config);

        info!(
            "pool {}: {:?} applied, reserves x={} y={} shares={}",
            seed,
            op,
            transition.pool.reserves.x,
            transition.pool.reserves.y,
            transition.pool.reserves.shares
        );

        Ok(transition)
    }
}

/// Reserves as the ledger holds them; an unfunded pool reads as empty
fn ledger_reserves<L: Ledger>(ledger: &L, cfg: &PoolConfig) -> Reserves {
    let shares = ledger.supply(&cfg.share_mint);
    let x = ledger.balance(&cfg.asset_x, &cfg.vault_x);
    let y = ledger.balance(&cfg.asset_y, &cfg.vault_y);

    if shares == 0 {
        if x > 0 || y > 0 {
            debug!("pool {} is unfunded; vault dust x={} y={} ignored", cfg.seed, x, y);
        }
        return Reserves::default();
    }
    Reserves { x, y, shares }
}
