//! Operations on one pool from several threads
//!
//! The registry and ledger are borrowed mutably for the whole of an
//! operation, so sharing them across threads means putting them behind one
//! lock. Every operation then sees the state left by the one before it.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use cpamm_pool::pool_model::{Address, Direction, PoolError};
use cpamm_pool::*;
use solana_program::pubkey::Pubkey;

const SEED: u64 = 77;
const NOW: i64 = 1_000;
const EXPIRY: i64 = 2_000;

struct Book {
    registry: PoolRegistry,
    ledger: InMemoryLedger,
}

struct Shared {
    book: Mutex<Book>,
    clock: FixedClock,
    x: Address,
    y: Address,
}

impl Shared {
    fn with_session<T>(
        &self,
        caller: Address,
        f: impl FnOnce(&mut PoolSession<'_, InMemoryLedger, FixedClock>) -> T,
    ) -> T {
        let mut guard = self.book.lock().unwrap();
        let book = &mut *guard;
        let mut session =
            PoolSession::new(&mut book.registry, &mut book.ledger, &self.clock, SEED, caller);
        f(&mut session)
    }
}

fn funded_pool(traders: &[Address]) -> Arc<Shared> {
    let x = Pubkey::new_unique().to_bytes();
    let y = Pubkey::new_unique().to_bytes();
    let lp = Pubkey::new_unique().to_bytes();

    let mut registry = PoolRegistry::new(&Pubkey::new_unique());
    registry.initialize(SEED, 30, &x, &y, None).unwrap();

    let mut ledger = InMemoryLedger::new();
    for who in traders.iter().chain([&lp]) {
        ledger.credit(&x, who, 10_000_000_000).unwrap();
        ledger.credit(&y, who, 10_000_000_000).unwrap();
    }

    let clock = FixedClock::at(NOW);
    {
        let mut session = PoolSession::new(&mut registry, &mut ledger, &clock, SEED, lp);
        session
            .deposit(1_000_000, 1_000_000_000, 1_000_000_000, EXPIRY)
            .unwrap();
    }

    Arc::new(Shared {
        book: Mutex::new(Book { registry, ledger }),
        clock,
        x,
        y,
    })
}

#[test]
fn test_two_swaps_priced_on_the_same_state_cannot_both_fill() {
    let traders = [Pubkey::new_unique().to_bytes(), Pubkey::new_unique().to_bytes()];
    let shared = funded_pool(&traders);
    let barrier = Arc::new(Barrier::new(traders.len()));

    let handles: Vec<_> = traders
        .iter()
        .map(|&trader| {
            let shared = Arc::clone(&shared);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let quoted = shared.with_session(trader, |s| {
                    s.pool().unwrap().quote_swap(Direction::XToY, 100_000_000).unwrap()
                });
                barrier.wait();
                shared.with_session(trader, |s| {
                    s.swap(Direction::XToY, 100_000_000, quoted.amount_out, EXPIRY)
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(RuntimeError::Pool(PoolError::SlippageExceeded)))));
}

#[test]
fn test_concurrent_swaps_keep_ledger_consistent() {
    let traders: Vec<Address> = (0..4).map(|_| Pubkey::new_unique().to_bytes()).collect();
    let shared = funded_pool(&traders);
    let start = shared.with_session(traders[0], |s| s.pool().unwrap());

    let handles: Vec<_> = traders
        .iter()
        .enumerate()
        .map(|(i, &trader)| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for n in 0..25u64 {
                    let direction = if (i as u64 + n) % 2 == 0 {
                        Direction::XToY
                    } else {
                        Direction::YToX
                    };
                    let amount = 1_000_000 + n * 10_000;
                    let before = shared.with_session(trader, |s| s.pool().unwrap());
                    let t = shared
                        .with_session(trader, |s| s.swap(direction, amount, 1, EXPIRY))
                        .unwrap();
                    // other threads may have traded in between; the product only grows
                    assert!(t.pool.reserves.product() >= before.reserves.product());
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let book = shared.book.lock().unwrap();
    let end = book.registry.load(&book.ledger, SEED).unwrap();
    assert!(end.reserves.product() > start.reserves.product());
    assert_eq!(end.reserves.shares, start.reserves.shares);

    let total = |asset: &Address| -> u128 {
        book.ledger
            .accounts()
            .iter()
            .filter(|a| &a.asset == asset)
            .map(|a| u128::from(a.amount))
            .sum()
    };
    let minted = 10_000_000_000u128 * (traders.len() as u128 + 1);
    assert_eq!(total(&shared.x), minted);
    assert_eq!(total(&shared.y), minted);
}
