//! Program-derived addresses for pool accounts
//!
//! Every pool account is a pure function of the program id and the pool
//! seed, so any party can recompute them without a lookup:
//! - config:     ["config", seed_le]
//! - share mint: ["lp", config]
//! - vaults:     ["vault", config, "x" | "y"]

use pool_model::PoolAddresses;
use solana_program::pubkey::Pubkey;

pub const CONFIG_SEED: &[u8] = b"config";
pub const SHARE_MINT_SEED: &[u8] = b"lp";
pub const VAULT_SEED: &[u8] = b"vault";

/// Role tag of a custody vault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultRole {
    X,
    Y,
}

impl VaultRole {
    pub fn tag(self) -> &'static [u8] {
        match self {
            VaultRole::X => b"x",
            VaultRole::Y => b"y",
        }
    }
}

/// Derive the pool config PDA
pub fn derive_config_pda(program_id: &Pubkey, seed: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED, &seed.to_le_bytes()], program_id)
}

/// Derive the share mint PDA owned by a pool config
pub fn derive_share_mint_pda(program_id: &Pubkey, config: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SHARE_MINT_SEED, config.as_ref()], program_id)
}

/// Derive a custody vault PDA owned by a pool config
pub fn derive_vault_pda(program_id: &Pubkey, config: &Pubkey, role: VaultRole) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, config.as_ref(), role.tag()], program_id)
}

/// All accounts belonging to one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolPdas {
    pub config: Pubkey,
    pub config_bump: u8,
    pub share_mint: Pubkey,
    pub share_mint_bump: u8,
    pub vault_x: Pubkey,
    pub vault_y: Pubkey,
}

impl PoolPdas {
    pub fn derive(program_id: &Pubkey, seed: u64) -> Self {
        let (config, config_bump) = derive_config_pda(program_id, seed);
        let (share_mint, share_mint_bump) = derive_share_mint_pda(program_id, &config);
        let (vault_x, _) = derive_vault_pda(program_id, &config, VaultRole::X);
        let (vault_y, _) = derive_vault_pda(program_id, &config, VaultRole::Y);

        Self {
            config,
            config_bump,
            share_mint,
            share_mint_bump,
            vault_x,
            vault_y,
        }
    }

    /// Identifiers handed to the pool model at initialization
    pub fn addresses(&self) -> PoolAddresses {
        PoolAddresses {
            vault_x: self.vault_x.to_bytes(),
            vault_y: self.vault_y.to_bytes(),
            share_mint: self.share_mint.to_bytes(),
        }
    }
}
