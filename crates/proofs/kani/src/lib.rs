//! Kani harnesses for the pool model
//!
//! Run with: cargo kani -p proofs-kani --harness <name>
//! Run all: cargo kani -p proofs-kani
//!
//! - P1-P4: swap curve (product monotone, reserves positive, no panic, fee)
//! - L1-L4: liquidity (rounding direction, full exit, no mutation on error)

#![cfg_attr(not(kani), allow(dead_code))]

#[cfg(kani)]
mod liquidity;
#[cfg(kani)]
mod swap;
