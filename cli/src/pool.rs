//! Pool operations

use anyhow::{Context, Result};
use colored::Colorize;
use solana_sdk::pubkey::Pubkey;

use cpamm_pool::pool_model::{Address, Authority, Direction, Movement, Pool, Transition};
use cpamm_pool::{InMemoryLedger, Ledger, PoolSession, RuntimeError, SystemClock};

use crate::config::{parse_address, CliConfig};
use crate::store::PoolBook;

fn load_book(config: &CliConfig) -> Result<PoolBook> {
    PoolBook::load_or_new(&config.state_path, &config.program_id)
}

fn key(address: &Address) -> Pubkey {
    Pubkey::new_from_array(*address)
}

fn print_pool(pool: &Pool) {
    let cfg = &pool.config;
    println!("{} {}", "Seed:".bright_cyan(), cfg.seed);
    println!("{} {}", "Asset X:".bright_cyan(), key(&cfg.asset_x));
    println!("{} {}", "Asset Y:".bright_cyan(), key(&cfg.asset_y));
    println!("{} {} bps", "Fee:".bright_cyan(), cfg.fee_bps);
    match cfg.authority {
        Authority::Key(k) => println!("{} {}", "Authority:".bright_cyan(), key(&k)),
        Authority::Disabled => println!("{} {}", "Authority:".bright_cyan(), "none".dimmed()),
    }
    if cfg.locked {
        println!("{} {}", "Status:".bright_cyan(), "LOCKED".red().bold());
    } else {
        println!("{} {}", "Status:".bright_cyan(), "open".green());
    }
    println!("{} {}", "Vault X:".bright_cyan(), key(&cfg.vault_x));
    println!("{} {}", "Vault Y:".bright_cyan(), key(&cfg.vault_y));
    println!("{} {}", "Share Mint:".bright_cyan(), key(&cfg.share_mint));
    println!("{} {}", "Reserve X:".bright_cyan(), pool.reserves.x);
    println!("{} {}", "Reserve Y:".bright_cyan(), pool.reserves.y);
    println!("{} {}", "Share Supply:".bright_cyan(), pool.reserves.shares);
}

fn print_transition(transition: &Transition) {
    println!("\n{}", "Movements:".bright_yellow());
    for movement in &transition.movements {
        match movement {
            Movement::Transfer {
                asset,
                from,
                to,
                amount,
            } => println!(
                "  transfer {} of {}: {} -> {}",
                amount,
                key(asset),
                key(from),
                key(to)
            ),
            Movement::Mint { mint, to, amount } => {
                println!("  mint {} of {} to {}", amount, key(mint), key(to))
            }
            Movement::Burn { mint, from, amount } => {
                println!("  burn {} of {} from {}", amount, key(mint), key(from))
            }
        }
    }

    let r = &transition.pool.reserves;
    println!(
        "\n{} x={} y={} shares={}",
        "Reserves:".bright_cyan(),
        r.x,
        r.y,
        r.shares
    );
}

/// Change the book under its lock and persist it if `f` succeeds
fn update_book<T, F>(config: &CliConfig, f: F) -> Result<T>
where
    F: FnOnce(&mut PoolBook) -> Result<T>,
{
    PoolBook::update(&config.state_path, &config.program_id, f)
}

/// Run one pool operation against the locked book
fn commit<F>(config: &CliConfig, seed: u64, op: F) -> Result<Transition>
where
    F: FnOnce(&mut PoolSession<'_, InMemoryLedger, SystemClock>) -> Result<Transition, RuntimeError>,
{
    update_book(config, |book| {
        let clock = SystemClock;
        let mut session = book.session(&clock, seed, config.caller());
        op(&mut session).with_context(|| format!("Operation on pool {} failed", seed))
    })
}

pub async fn initialize_pool(
    config: &CliConfig,
    seed: u64,
    fee_bps: u16,
    mint_x: String,
    mint_y: String,
    no_authority: bool,
) -> Result<()> {
    println!("{}", "=== Initialize Pool ===".bright_green().bold());
    println!("{} {}", "Program:".bright_cyan(), config.program_id);

    let asset_x = parse_address(&mint_x)?;
    let asset_y = parse_address(&mint_y)?;
    let authority = if no_authority {
        None
    } else {
        Some(config.caller())
    };

    let record = update_book(config, |book| {
        let record = *book
            .registry
            .initialize(seed, fee_bps, &asset_x, &asset_y, authority)
            .with_context(|| format!("Failed to initialize pool {}", seed))?;
        Ok(record)
    })?;

    println!("{} {} (bump {})", "Config:".bright_cyan(), key(&record.address), record.config_bump);
    println!("{} {}", "Share Mint Bump:".bright_cyan(), record.share_mint_bump);
    print_pool(&Pool::new(record.config));
    println!("\n{}", "Pool initialized".bright_green());
    Ok(())
}

/// Credit a wallet with test tokens
pub async fn fund(
    config: &CliConfig,
    mint: String,
    amount: u64,
    owner: Option<String>,
) -> Result<()> {
    println!("{}", "=== Fund Wallet ===".bright_green().bold());

    let asset = parse_address(&mint)?;
    let owner = match owner {
        Some(o) => parse_address(&o)?,
        None => config.caller(),
    };

    let balance = update_book(config, |book| {
        if book.is_share_mint(&asset) {
            anyhow::bail!("{} is a pool share mint; shares are only issued by deposits", mint);
        }
        book.ledger
            .credit(&asset, &owner, amount)
            .context("Failed to credit wallet")?;
        Ok(book.ledger.balance(&asset, &owner))
    })?;

    println!("{} {}", "Mint:".bright_cyan(), mint);
    println!("{} {}", "Owner:".bright_cyan(), key(&owner));
    println!("{} {}", "Balance:".bright_cyan(), balance);
    Ok(())
}

pub async fn deposit(
    config: &CliConfig,
    seed: u64,
    shares: u64,
    max_x: u64,
    max_y: u64,
    expiry_secs: Option<i64>,
) -> Result<()> {
    println!("{}", "=== Deposit ===".bright_green().bold());
    println!("{} {}", "Pool:".bright_cyan(), seed);
    println!("{} {}", "Shares:".bright_cyan(), shares);
    println!("{} {} / {}", "Max X / Y:".bright_cyan(), max_x, max_y);

    let expiry = config.expiry(expiry_secs);
    let transition = commit(config, seed, |s| s.deposit(shares, max_x, max_y, expiry))?;

    print_transition(&transition);
    println!("\n{}", "Deposit complete".bright_green());
    Ok(())
}

pub async fn swap(
    config: &CliConfig,
    seed: u64,
    direction: Direction,
    amount_in: u64,
    min_amount_out: u64,
    expiry_secs: Option<i64>,
) -> Result<()> {
    println!("{}", "=== Swap ===".bright_green().bold());
    println!("{} {}", "Pool:".bright_cyan(), seed);
    println!("{} {:?}", "Direction:".bright_cyan(), direction);
    println!("{} {}", "Amount In:".bright_cyan(), amount_in);
    println!("{} {}", "Min Out:".bright_cyan(), min_amount_out);

    let expiry = config.expiry(expiry_secs);
    let transition = commit(config, seed, |s| {
        s.swap(direction, amount_in, min_amount_out, expiry)
    })?;

    print_transition(&transition);
    println!("\n{}", "Swap complete".bright_green());
    Ok(())
}

pub async fn withdraw(
    config: &CliConfig,
    seed: u64,
    shares: u64,
    min_x: u64,
    min_y: u64,
    expiry_secs: Option<i64>,
) -> Result<()> {
    println!("{}", "=== Withdraw ===".bright_green().bold());
    println!("{} {}", "Pool:".bright_cyan(), seed);
    println!("{} {}", "Shares:".bright_cyan(), shares);
    println!("{} {} / {}", "Min X / Y:".bright_cyan(), min_x, min_y);

    let expiry = config.expiry(expiry_secs);
    let transition = commit(config, seed, |s| s.withdraw(shares, min_x, min_y, expiry))?;

    print_transition(&transition);
    println!("\n{}", "Withdraw complete".bright_green());
    Ok(())
}

pub async fn set_lock(config: &CliConfig, seed: u64, locked: bool) -> Result<()> {
    let title = if locked { "=== Lock Pool ===" } else { "=== Unlock Pool ===" };
    println!("{}", title.bright_green().bold());
    println!("{} {}", "Pool:".bright_cyan(), seed);

    commit(config, seed, |s| s.set_lock(locked))?;

    if locked {
        println!("\n{}", "Pool locked: deposits and swaps are refused".yellow());
    } else {
        println!("\n{}", "Pool unlocked".bright_green());
    }
    Ok(())
}

pub async fn show_pools(config: &CliConfig, seed: Option<u64>) -> Result<()> {
    println!("{}", "=== Pools ===".bright_green().bold());
    let book = load_book(config)?;

    let seeds: Vec<u64> = match seed {
        Some(seed) => vec![seed],
        None => book.registry.records().map(|r| r.config.seed).collect(),
    };

    if seeds.is_empty() {
        println!("\n{}", "No pools found".dimmed());
        return Ok(());
    }

    for seed in seeds {
        let pool = book
            .registry
            .load(&book.ledger, seed)
            .with_context(|| format!("Failed to load pool {}", seed))?;
        println!();
        print_pool(&pool);
    }
    Ok(())
}

/// What to quote
pub enum QuoteRequest {
    Deposit { shares: u64, max_x: u64, max_y: u64 },
    Swap { direction: Direction, amount_in: u64 },
    Withdraw { shares: u64 },
}

pub async fn quote(config: &CliConfig, seed: u64, request: QuoteRequest) -> Result<()> {
    println!("{}", "=== Quote ===".bright_green().bold());
    let book = load_book(config)?;
    let pool = book
        .registry
        .load(&book.ledger, seed)
        .with_context(|| format!("Failed to load pool {}", seed))?;

    match request {
        QuoteRequest::Deposit {
            shares,
            max_x,
            max_y,
        } => {
            let q = pool
                .quote_deposit(shares, max_x, max_y)
                .map_err(|e| anyhow::anyhow!("Deposit not possible: {}", e))?;
            println!("{} {}", "X In:".bright_cyan(), q.x_in);
            println!("{} {}", "Y In:".bright_cyan(), q.y_in);
            println!("{} {}", "Shares Out:".bright_cyan(), q.shares_out);
        }
        QuoteRequest::Swap {
            direction,
            amount_in,
        } => {
            let q = pool
                .quote_swap(direction, amount_in)
                .map_err(|e| anyhow::anyhow!("Swap not possible: {}", e))?;
            println!("{} {}", "Amount In:".bright_cyan(), q.amount_in);
            println!("{} {}", "Fee:".bright_cyan(), q.fee);
            println!("{} {}", "Amount Out:".bright_cyan(), q.amount_out);
            println!(
                "{} {} / {}",
                "New Reserves (in / out):".bright_cyan(),
                q.new_reserve_in,
                q.new_reserve_out
            );
        }
        QuoteRequest::Withdraw { shares } => {
            let q = pool
                .quote_withdraw(shares)
                .map_err(|e| anyhow::anyhow!("Withdraw not possible: {}", e))?;
            println!("{} {}", "X Out:".bright_cyan(), q.x_out);
            println!("{} {}", "Y Out:".bright_cyan(), q.y_out);
            println!("{} {}", "Shares In:".bright_cyan(), q.shares_in);
        }
    }

    if pool.config.locked {
        println!("\n{}", "Pool is locked: only withdrawals will execute".yellow());
    }
    Ok(())
}

pub async fn show_balance(config: &CliConfig, owner: Option<String>) -> Result<()> {
    println!("{}", "=== Balances ===".bright_green().bold());
    let owner = match owner {
        Some(o) => parse_address(&o)?,
        None => config.caller(),
    };
    println!("{} {}", "Owner:".bright_cyan(), key(&owner));

    let book = load_book(config)?;
    let mut any = false;
    for account in book.ledger.holdings(&owner).filter(|a| a.amount > 0) {
        any = true;
        let label = if book.is_share_mint(&account.asset) {
            " (pool shares)"
        } else {
            ""
        };
        println!("  {} {}{}", key(&account.asset), account.amount, label.dimmed());
    }

    if !any {
        println!("\n{}", "No balances".dimmed());
    }
    Ok(())
}
