//! # CLMM Vault Simulation
//!
//! In-memory concentrated-liquidity pool used by the vault and its tests.
//!
//! ## Features
//!
//! - **Pool adapter**: the capability the vault consumes (tick, price,
//!   liquidity/amount conversion, mint, burn, swap, fee growth)
//! - **Simulated pool**: tick-by-tick swaps with per-tick liquidity and
//!   fee growth tracking
//! - **Shared pool**: one pool observed by several vaults and traders
//! - **Registry**: pools keyed by token pair and fee tier
//! - **Price paths**: GBM target prices for trading simulations
//!
//! ## Example
//!
//! ```rust
//! use clmm_vault_simulation::prelude::*;
//! use clmm_vault_domain::{Address, FeeTier};
//! use rust_decimal::Decimal;
//!
//! let mut pool = SimulatedPool::new(
//!     Address::from_low_u64_be(100),
//!     Address::from_low_u64_be(1),
//!     Address::from_low_u64_be(2),
//!     FeeTier::Medium,
//! );
//! pool.initialize(Decimal::ONE).unwrap();
//! assert_eq!(pool.current_tick().unwrap(), 0);
//! ```

/// The pool capability consumed by vaults.
pub mod adapter;
/// Pool error types.
pub mod error;
/// Simulated concentrated-liquidity pool.
pub mod pool;
/// Prelude module for convenient imports.
pub mod prelude;
/// Price path generators.
pub mod price_path;
/// Pool registry.
pub mod registry;
/// Shared pool handle.
pub mod shared;
