//! Local pool book persisted between CLI invocations

use anyhow::{Context, Result};
use fs2::FileExt;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use cpamm_pool::pool_model::Address;
use cpamm_pool::{Clock, InMemoryLedger, PoolRegistry, PoolSession};

/// Pool records plus the balances they custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBook {
    pub registry: PoolRegistry,
    pub ledger: InMemoryLedger,
}

impl PoolBook {
    pub fn new(program_id: &Pubkey) -> Self {
        Self {
            registry: PoolRegistry::new(program_id),
            ledger: InMemoryLedger::new(),
        }
    }

    /// Load the book at `path`, or start an empty one if there is none yet
    pub fn load_or_new(path: &Path, program_id: &Pubkey) -> Result<Self> {
        if !path.exists() {
            debug!("no pool book at {}, starting empty", path.display());
            return Ok(Self::new(program_id));
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pool book: {}", path.display()))?;
        let book: PoolBook = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse pool book: {}", path.display()))?;

        if book.registry.program_id() != *program_id {
            anyhow::bail!(
                "Pool book {} was created for program {}, not {}",
                path.display(),
                book.registry.program_id(),
                program_id
            );
        }

        Ok(book)
    }

    /// Load, change and save the book while holding its lock
    ///
    /// Nothing is written if `f` fails.
    pub fn update<T, F>(path: &Path, program_id: &Pubkey, f: F) -> Result<T>
    where
        F: FnOnce(&mut PoolBook) -> Result<T>,
    {
        let _lock = BookLock::acquire(path)?;
        let mut book = Self::load_or_new(path, program_id)?;
        let out = f(&mut book)?;
        book.save(path)?;
        Ok(out)
    }

    /// Write the book, replacing the previous file in one rename
    pub fn save(&self, path: &Path) -> Result<()> {
        create_parent(path)?;

        let tmp = temp_path(path);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize pool book")?;
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write pool book: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace pool book: {}", path.display()))?;

        debug!("pool book saved to {}", path.display());
        Ok(())
    }

    pub fn session<'a, C: Clock>(
        &'a mut self,
        clock: &'a C,
        seed: u64,
        caller: Address,
    ) -> PoolSession<'a, InMemoryLedger, C> {
        PoolSession::new(&mut self.registry, &mut self.ledger, clock, seed, caller)
    }

    /// True if `asset` is the share mint of some pool
    pub fn is_share_mint(&self, asset: &Address) -> bool {
        self.registry
            .records()
            .any(|r| &r.config.share_mint == asset)
    }
}

/// Exclusive advisory lock on a book's `.lock` sidecar, released on drop
pub struct BookLock {
    file: File,
    path: PathBuf,
}

impl BookLock {
    /// Block until no other process or handle holds the lock
    pub fn acquire(book: &Path) -> Result<Self> {
        create_parent(book)?;
        let path = sidecar_path(book, ".lock");
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock pool book: {}", path.display()))?;
        debug!("locked {}", path.display());
        Ok(Self { file, path })
    }
}

impl Drop for BookLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!("failed to unlock {}: {}", self.path.display(), e);
        }
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    sidecar_path(path, ".tmp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpamm_pool::pool_model::Direction;
    use cpamm_pool::{FixedClock, Ledger};
    use tempfile::tempdir;

    const X: Address = [1; 32];
    const Y: Address = [2; 32];
    const USER: Address = [7; 32];

    fn funded_book(program_id: &Pubkey) -> PoolBook {
        let mut book = PoolBook::new(program_id);
        book.registry.initialize(5, 30, &X, &Y, Some(USER)).unwrap();
        book.ledger.credit(&X, &USER, 2_000_000).unwrap();
        book.ledger.credit(&Y, &USER, 2_000_000).unwrap();

        let clock = FixedClock::at(100);
        let mut session = book.session(&clock, 5, USER);
        session.deposit(1_000, 1_000_000, 1_000_000, 200).unwrap();
        session.swap(Direction::XToY, 10_000, 1, 200).unwrap();
        book
    }

    #[test]
    fn test_missing_file_gives_empty_book() {
        let dir = tempdir().unwrap();
        let program_id = Pubkey::new_unique();
        let book = PoolBook::load_or_new(&dir.path().join("pools.json"), &program_id).unwrap();
        assert_eq!(book, PoolBook::new(&program_id));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("pools.json");
        let program_id = Pubkey::new_unique();
        let book = funded_book(&program_id);

        book.save(&path).unwrap();
        assert!(!temp_path(&path).exists());

        let loaded = PoolBook::load_or_new(&path, &program_id).unwrap();
        assert_eq!(loaded, book);
        let pool = loaded.registry.load(&loaded.ledger, 5).unwrap();
        assert_eq!(pool.reserves.shares, 1_000);
        assert_eq!(loaded.ledger.balance(&pool.config.share_mint, &USER), 1_000);
    }

    #[test]
    fn test_program_id_mismatch_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pools.json");
        PoolBook::new(&Pubkey::new_unique()).save(&path).unwrap();

        let err = PoolBook::load_or_new(&path, &Pubkey::new_unique()).unwrap_err();
        assert!(err.to_string().contains("was created for program"));
    }

    #[test]
    fn test_share_mint_is_recognized() {
        let book = funded_book(&Pubkey::new_unique());
        let cfg = book.registry.get(5).unwrap().config;

        assert!(book.is_share_mint(&cfg.share_mint));
        assert!(!book.is_share_mint(&X));
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pools.json");
        let program_id = Pubkey::new_unique();
        funded_book(&program_id).save(&path).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let err = PoolBook::update(&path, &program_id, |book| -> Result<()> {
            book.ledger.credit(&X, &USER, 1)?;
            anyhow::bail!("rejected")
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "rejected");
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pools.json");
        let program_id = Pubkey::new_unique();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        PoolBook::update(&path, &program_id, |book| {
                            book.ledger.credit(&X, &USER, 1)?;
                            Ok(())
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let book = PoolBook::load_or_new(&path, &program_id).unwrap();
        assert_eq!(book.ledger.balance(&X, &USER), 80);
    }

    #[test]
    fn test_concurrent_swaps_each_see_the_previous_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pools.json");
        let program_id = Pubkey::new_unique();
        let mut book = funded_book(&program_id);
        book.ledger.credit(&X, &USER, 1_000_000).unwrap();
        book.save(&path).unwrap();
        let start = book.registry.load(&book.ledger, 5).unwrap().reserves;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    PoolBook::update(&path, &program_id, |book| {
                        let clock = FixedClock::at(100);
                        let t = book.session(&clock, 5, USER).swap(Direction::XToY, 1_000, 1, 200)?;
                        Ok(t.pool.reserves)
                    })
                    .unwrap()
                })
            })
            .collect();
        let mut seen: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap().x).collect();
        seen.sort_unstable();

        // each swap started from the reserves the previous one left behind
        let expected: Vec<u64> = (1..=4).map(|n| start.x + n * 1_000).collect();
        assert_eq!(seen, expected);
    }
}
