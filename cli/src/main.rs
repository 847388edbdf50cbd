//! cpamm - operator CLI for constant product pools
//!
//! Keeps a local pool book (pool records plus token balances) on disk and
//! drives every pool operation against it: create a pool, fund wallets,
//! deposit, swap, withdraw, lock and unlock, and read-only quotes.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use cpamm_pool::pool_model::Direction;

mod config;
mod pool;
mod store;

use config::CliConfig;
use pool::QuoteRequest;

#[derive(Parser)]
#[command(name = "cpamm")]
#[command(about = "Constant product pool CLI - create pools, provide liquidity and swap", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the pool book (overrides config)
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Path to keypair file
    #[arg(short, long)]
    keypair: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SwapDirection {
    /// Pay X, receive Y
    XToY,
    /// Pay Y, receive X
    YToX,
}

impl From<SwapDirection> for Direction {
    fn from(d: SwapDirection) -> Self {
        match d {
            SwapDirection::XToY => Direction::XToY,
            SwapDirection::YToX => Direction::YToX,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new pool
    Init {
        /// Pool seed (unique per program)
        #[arg(long)]
        seed: u64,

        /// Swap fee (basis points)
        #[arg(short, long, default_value = "30")]
        fee_bps: u16,

        /// Mint of asset X
        mint_x: String,

        /// Mint of asset Y
        mint_y: String,

        /// Create the pool without a lock authority
        #[arg(long)]
        no_authority: bool,
    },

    /// Credit a wallet with test tokens
    Fund {
        /// Mint to credit
        mint: String,

        /// Amount to credit
        amount: u64,

        /// Wallet to credit (defaults to the keypair)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Add liquidity for a number of pool shares
    Deposit {
        /// Pool seed
        seed: u64,

        /// Shares to mint
        shares: u64,

        /// Maximum X to pay
        #[arg(long)]
        max_x: u64,

        /// Maximum Y to pay
        #[arg(long)]
        max_y: u64,

        /// Seconds until the request expires (defaults to config)
        #[arg(long)]
        expiry_secs: Option<i64>,
    },

    /// Trade one asset for the other
    Swap {
        /// Pool seed
        seed: u64,

        #[arg(value_enum)]
        direction: SwapDirection,

        /// Amount paid in, fee included
        amount_in: u64,

        /// Minimum amount to receive
        #[arg(long, default_value = "1")]
        min_out: u64,

        /// Seconds until the request expires (defaults to config)
        #[arg(long)]
        expiry_secs: Option<i64>,
    },

    /// Burn pool shares for a pro-rata share of the reserves
    Withdraw {
        /// Pool seed
        seed: u64,

        /// Shares to burn
        shares: u64,

        /// Minimum X to receive
        #[arg(long, default_value = "0")]
        min_x: u64,

        /// Minimum Y to receive
        #[arg(long, default_value = "0")]
        min_y: u64,

        /// Seconds until the request expires (defaults to config)
        #[arg(long)]
        expiry_secs: Option<i64>,
    },

    /// Refuse deposits and swaps (authority only)
    Lock {
        /// Pool seed
        seed: u64,
    },

    /// Re-open a locked pool (authority only)
    Unlock {
        /// Pool seed
        seed: u64,
    },

    /// Show pool configuration and reserves
    Show {
        /// Pool seed (all pools if omitted)
        seed: Option<u64>,
    },

    /// Preview an operation without executing it
    Quote {
        #[command(subcommand)]
        command: QuoteCommands,
    },

    /// Show wallet balances
    Balance {
        /// Wallet (defaults to the keypair)
        owner: Option<String>,
    },
}

#[derive(Subcommand)]
enum QuoteCommands {
    /// Amounts a deposit would pay
    Deposit {
        seed: u64,
        shares: u64,
        #[arg(long, default_value_t = u64::MAX)]
        max_x: u64,
        #[arg(long, default_value_t = u64::MAX)]
        max_y: u64,
    },

    /// Output and fee of a swap
    Swap {
        seed: u64,
        #[arg(value_enum)]
        direction: SwapDirection,
        amount_in: u64,
    },

    /// Amounts a withdrawal would release
    Withdraw { seed: u64, shares: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = CliConfig::new(cli.config.clone(), cli.state.clone(), cli.keypair.clone())?;

    if cli.verbose {
        println!("{} {}", "Program:".bright_cyan(), config.program_id);
        println!("{} {}", "Pool Book:".bright_cyan(), config.state_path.display());
        println!("{} {}", "Keypair:".bright_cyan(), config.keypair_path.display());
        println!("{} {}", "Caller:".bright_cyan(), config.pubkey());
    }

    match cli.command {
        Commands::Init {
            seed,
            fee_bps,
            mint_x,
            mint_y,
            no_authority,
        } => {
            pool::initialize_pool(&config, seed, fee_bps, mint_x, mint_y, no_authority).await?;
        }
        Commands::Fund {
            mint,
            amount,
            owner,
        } => {
            pool::fund(&config, mint, amount, owner).await?;
        }
        Commands::Deposit {
            seed,
            shares,
            max_x,
            max_y,
            expiry_secs,
        } => {
            pool::deposit(&config, seed, shares, max_x, max_y, expiry_secs).await?;
        }
        Commands::Swap {
            seed,
            direction,
            amount_in,
            min_out,
            expiry_secs,
        } => {
            pool::swap(&config, seed, direction.into(), amount_in, min_out, expiry_secs).await?;
        }
        Commands::Withdraw {
            seed,
            shares,
            min_x,
            min_y,
            expiry_secs,
        } => {
            pool::withdraw(&config, seed, shares, min_x, min_y, expiry_secs).await?;
        }
        Commands::Lock { seed } => {
            pool::set_lock(&config, seed, true).await?;
        }
        Commands::Unlock { seed } => {
            pool::set_lock(&config, seed, false).await?;
        }
        Commands::Show { seed } => {
            pool::show_pools(&config, seed).await?;
        }
        Commands::Quote { command } => {
            let (seed, request) = match command {
                QuoteCommands::Deposit {
                    seed,
                    shares,
                    max_x,
                    max_y,
                } => (
                    seed,
                    QuoteRequest::Deposit {
                        shares,
                        max_x,
                        max_y,
                    },
                ),
                QuoteCommands::Swap {
                    seed,
                    direction,
                    amount_in,
                } => (
                    seed,
                    QuoteRequest::Swap {
                        direction: direction.into(),
                        amount_in,
                    },
                ),
                QuoteCommands::Withdraw { seed, shares } => {
                    (seed, QuoteRequest::Withdraw { shares })
                }
            };
            pool::quote(&config, seed, request).await?;
        }
        Commands::Balance { owner } => {
            pool::show_balance(&config, owner).await?;
        }
    }

    Ok(())
}
