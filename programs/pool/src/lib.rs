//! Constant product pool host runtime
//!
//! Everything the pool model leaves to collaborators, in one place:
//! - [`pda`]: deterministic account derivation from the pool seed
//! - [`ledger`]: balance storage executing model movements atomically
//! - [`registry`]: pool records keyed by seed, with reserves read from the ledger
//! - [`session`]: the per-pool operation surface
//! - [`clock`]: time source for expiry checks

pub mod clock;
pub mod error;
pub mod ledger;
pub mod pda;
pub mod registry;
pub mod session;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::RuntimeError;
pub use ledger::{InMemoryLedger, Ledger, LedgerError, TokenAccount};
pub use pda::{PoolPdas, VaultRole};
pub use registry::{PoolRecord, PoolRegistry};
pub use session::PoolSession;

/// Re-export the model so hosts need a single dependency
pub use pool_model;
