//! Token ledger collaborator
//!
//! The pool model only emits movements. A [`Ledger`] owns balances and must
//! execute a batch of movements all-or-nothing.

use pool_model::{Address, Movement};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient balance: {owner} holds {available} of {asset}, needs {required}")]
    InsufficientBalance {
        asset: Pubkey,
        owner: Pubkey,
        available: u64,
        required: u64,
    },
    #[error("balance overflow for {asset}")]
    Overflow { asset: Pubkey },
}

/// Balance storage and transfer/mint/burn primitives
pub trait Ledger {
    /// Balance of `asset` held by `owner`
    fn balance(&self, asset: &Address, owner: &Address) -> u64;

    /// Outstanding supply of `asset`
    fn supply(&self, asset: &Address) -> u64;

    /// Execute every movement or none of them
    fn execute(&mut self, movements: &[Movement]) -> Result<(), LedgerError>;
}

/// One (asset, owner) balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub asset: Address,
    pub owner: Address,
    pub amount: u64,
}

/// Reference in-process ledger
///
/// Supply is the sum of all balances of an asset, so mint and burn are
/// credit and debit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryLedger {
    accounts: Vec<TokenAccount>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accounts(&self) -> &[TokenAccount] {
        &self.accounts
    }

    /// Accounts held by `owner`
    pub fn holdings<'a>(&'a self, owner: &'a Address) -> impl Iterator<Item = &'a TokenAccount> + 'a {
        self.accounts.iter().filter(move |a| &a.owner == owner)
    }

    /// Issue `amount` of `asset` to `owner` out of thin air
    pub fn credit(&mut self, asset: &Address, owner: &Address, amount: u64) -> Result<(), LedgerError> {
        let slot = self.slot_mut(asset, owner);
        *slot = slot.checked_add(amount).ok_or(LedgerError::Overflow {
            asset: Pubkey::new_from_array(*asset),
        })?;
        Ok(())
    }

    fn debit(&mut self, asset: &Address, owner: &Address, amount: u64) -> Result<(), LedgerError> {
        let available = self.balance(asset, owner);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: Pubkey::new_from_array(*asset),
                owner: Pubkey::new_from_array(*owner),
                available,
                required: amount,
            });
        }
        *self.slot_mut(asset, owner) = available - amount;
        Ok(())
    }

    fn slot_mut(&mut self, asset: &Address, owner: &Address) -> &mut u64 {
        let idx = match self
            .accounts
            .iter()
            .position(|a| &a.asset == asset && &a.owner == owner)
        {
            Some(idx) => idx,
            None => {
                self.accounts.push(TokenAccount {
                    asset: *asset,
                    owner: *owner,
                    amount: 0,
                });
                self.accounts.len() - 1
            }
        };
        &mut self.accounts[idx].amount
    }

    fn execute_one(&mut self, movement: &Movement) -> Result<(), LedgerError> {
        match movement {
            Movement::Transfer {
                asset,
                from,
                to,
                amount,
            } => {
                self.debit(asset, from, *amount)?;
                self.credit(asset, to, *amount)
            }
            Movement::Mint { mint, to, amount } => self.credit(mint, to, *amount),
            Movement::Burn { mint, from, amount } => self.debit(mint, from, *amount),
        }
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, asset: &Address, owner: &Address) -> u64 {
        self.accounts
            .iter()
            .find(|a| &a.asset == asset && &a.owner == owner)
            .map(|a| a.amount)
            .unwrap_or(0)
    }

    fn supply(&self, asset: &Address) -> u64 {
        self.accounts
            .iter()
            .filter(|a| &a.asset == asset)
            .fold(0u64, |acc, a| acc.saturating_add(a.amount))
    }

    fn execute(&mut self, movements: &[Movement]) -> Result<(), LedgerError> {
        // Stage on a copy so a failing movement leaves no trace
        let mut staged = self.clone();
        for movement in movements {
            staged.execute_one(movement)?;
        }
        *self = staged;
        Ok(())
    }
}
