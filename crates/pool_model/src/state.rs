//! Pool configuration and reserve bookkeeping

use crate::{Address, PoolError, Result, BPS_SCALE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Who may toggle the pool lock
///
/// A pool created with [`Authority::Disabled`] can never be locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Authority {
    Disabled,
    Key(Address),
}

impl Authority {
    pub fn from_option(key: Option<Address>) -> Self {
        match key {
            Some(key) => Authority::Key(key),
            None => Authority::Disabled,
        }
    }

    pub fn key(&self) -> Option<&Address> {
        match self {
            Authority::Key(key) => Some(key),
            Authority::Disabled => None,
        }
    }
}

/// Swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Pay asset X, receive asset Y
    XToY,
    /// Pay asset Y, receive asset X
    YToX,
}

/// Derived identifiers allocated to a pool at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolAddresses {
    /// Custody account holding asset X
    pub vault_x: Address,
    /// Custody account holding asset Y
    pub vault_y: Address,
    /// Mint of the pool-share token
    pub share_mint: Address,
}

/// Arguments to [`crate::initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitParams {
    pub seed: u64,
    pub fee_bps: u16,
    pub asset_x: Address,
    pub asset_y: Address,
    pub authority: Authority,
}

/// Pool configuration (one per seed)
///
/// Immutable after initialization except for `locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolConfig {
    /// Caller-chosen identity of the pool
    pub seed: u64,
    pub asset_x: Address,
    pub asset_y: Address,
    /// Swap fee charged on input, in basis points
    pub fee_bps: u16,
    pub authority: Authority,
    /// Deposits and swaps are rejected while set
    pub locked: bool,
    pub vault_x: Address,
    pub vault_y: Address,
    pub share_mint: Address,
}

impl PoolConfig {
    /// Validate parameters and build an unlocked config
    pub fn new(params: InitParams, addresses: PoolAddresses) -> Result<Self> {
        if u64::from(params.fee_bps) >= BPS_SCALE {
            return Err(PoolError::InvalidFee);
        }
        if params.asset_x == params.asset_y {
            return Err(PoolError::IdenticalAssets);
        }

        Ok(Self {
            seed: params.seed,
            asset_x: params.asset_x,
            asset_y: params.asset_y,
            fee_bps: params.fee_bps,
            authority: params.authority,
            locked: false,
            vault_x: addresses.vault_x,
            vault_y: addresses.vault_y,
            share_mint: addresses.share_mint,
        })
    }

    pub fn addresses(&self) -> PoolAddresses {
        PoolAddresses {
            vault_x: self.vault_x,
            vault_y: self.vault_y,
            share_mint: self.share_mint,
        }
    }

    /// (asset, vault) pairs for the input and output side of a swap
    pub fn swap_sides(&self, direction: Direction) -> ((Address, Address), (Address, Address)) {
        let x = (self.asset_x, self.vault_x);
        let y = (self.asset_y, self.vault_y);
        match direction {
            Direction::XToY => (x, y),
            Direction::YToX => (y, x),
        }
    }
}

/// Reserve and share-supply figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reserves {
    pub x: u64,
    pub y: u64,
    /// Total issued pool shares
    pub shares: u64,
}

impl Reserves {
    pub fn is_empty(&self) -> bool {
        self.shares == 0
    }

    /// Reserves for the (input, output) side of a swap
    pub fn swap_sides(&self, direction: Direction) -> (u64, u64) {
        match direction {
            Direction::XToY => (self.x, self.y),
            Direction::YToX => (self.y, self.x),
        }
    }

    /// Invariant product x·y
    pub fn product(&self) -> u128 {
        u128::from(self.x) * u128::from(self.y)
    }

    /// Either all three figures are zero or none are
    pub fn check(&self) -> Result<()> {
        let zeros = [self.x == 0, self.y == 0, self.shares == 0];
        if zeros.iter().all(|z| *z) || zeros.iter().all(|z| !*z) {
            Ok(())
        } else {
            Err(PoolError::InconsistentReserves)
        }
    }
}

/// A pool: configuration plus its current reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pool {
    pub config: PoolConfig,
    pub reserves: Reserves,
}

impl Pool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            reserves: Reserves::default(),
        }
    }

    pub fn with_reserves(config: PoolConfig, reserves: Reserves) -> Self {
        Self { config, reserves }
    }

    pub fn check_invariants(&self) -> Result<()> {
        self.reserves.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses() -> PoolAddresses {
        PoolAddresses {
            vault_x: [10; 32],
            vault_y: [11; 32],
            share_mint: [12; 32],
        }
    }

    fn params(fee_bps: u16) -> InitParams {
        InitParams {
            seed: 7,
            fee_bps,
            asset_x: [1; 32],
            asset_y: [2; 32],
            authority: Authority::Key([9; 32]),
        }
    }

    #[test]
    fn test_config_starts_unlocked() {
        let config = PoolConfig::new(params(30), addresses()).unwrap();
        assert!(!config.locked);
        assert_eq!(config.fee_bps, 30);
        assert_eq!(config.addresses(), addresses());
    }

    #[test]
    fn test_fee_bound() {
        assert!(PoolConfig::new(params(9_999), addresses()).is_ok());
        assert_eq!(
            PoolConfig::new(params(10_000), addresses()),
            Err(PoolError::InvalidFee)
        );
    }

    #[test]
    fn test_identical_assets_rejected() {
        let mut p = params(30);
        p.asset_y = p.asset_x;
        assert_eq!(PoolConfig::new(p, addresses()), Err(PoolError::IdenticalAssets));
    }

    #[test]
    fn test_reserve_consistency() {
        assert!(Reserves::default().check().is_ok());
        assert!(Reserves { x: 1, y: 1, shares: 1 }.check().is_ok());
        assert_eq!(
            Reserves { x: 5, y: 0, shares: 0 }.check(),
            Err(PoolError::InconsistentReserves)
        );
        assert_eq!(
            Reserves { x: 5, y: 5, shares: 0 }.check(),
            Err(PoolError::InconsistentReserves)
        );
    }

    #[test]
    fn test_authority_option_round() {
        assert_eq!(Authority::from_option(None), Authority::Disabled);
        assert_eq!(Authority::from_option(Some([3; 32])).key(), Some(&[3; 32]));
    }
}
