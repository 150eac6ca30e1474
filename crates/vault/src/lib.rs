//! # CLMM Vault Core
//!
//! A vault that pools liquidity-provider capital for one concentrated
//! liquidity pair and splits it across two positions:
//! - a wide **base** position holding the bulk of the capital
//! - a narrow single-sided **limit** position placed against the price
//!
//! Depositors receive fungible shares priced against the vault's total
//! value (idle balances plus both positions and their uncollected fees).
//! The owner rebalances: both positions are withdrawn, harvested fees are
//! split between the fee recipient, an optional affiliate and the vault,
//! idle tokens are optionally swapped and both ranges are redeployed.
//!
//! Every state-changing call commits completely or not at all.
//!
//! ## Example
//!
//! ```rust
//! use clmm_vault_core::prelude::*;
//! use clmm_vault_domain::{Address, FeeTier};
//! use clmm_vault_simulation::prelude::SimulatedPool;
//! use primitive_types::U256;
//! use rust_decimal::Decimal;
//!
//! let (token0, token1) = (Address::from_low_u64_be(1), Address::from_low_u64_be(2));
//! let mut pool = SimulatedPool::new(Address::from_low_u64_be(100), token0, token1, FeeTier::Medium);
//! pool.initialize(Decimal::ONE).unwrap();
//!
//! let owner = Address::from_low_u64_be(7);
//! let mut vault = Vault::new(
//!     Address::from_low_u64_be(200),
//!     owner,
//!     pool,
//!     true,
//!     true,
//!     owner,
//!     VaultConfig::default(),
//! )
//! .unwrap();
//!
//! let alice = Address::from_low_u64_be(0xa1);
//! let mut bank = TokenBank::new();
//! for token in [token0, token1] {
//!     bank.mint(token, alice, U256::from(1_000u64)).unwrap();
//!     bank.approve(token, alice, vault.address(), U256::MAX);
//! }
//!
//! let shares = vault
//!     .deposit(&mut bank, alice, U256::from(1_000u64), U256::from(1_000u64), alice)
//!     .unwrap();
//! assert_eq!(shares, U256::from(2_000u64));
//! ```

/// Deposit pricing and share accounting.
pub mod accounting;
/// Vault and factory configuration.
pub mod config;
/// Error types.
pub mod error;
/// Vault events.
pub mod events;
/// Vault factory.
pub mod factory;
/// Harvest-on-touch fee accounting.
pub mod fee_ledger;
/// Fungible token ledgers.
pub mod ledger;
/// Settled swaps and liquidity provision.
pub mod market;
/// Deposit and withdraw preconditions.
pub mod policy;
/// Base and limit positions.
pub mod position;
/// Prelude module for convenient imports.
pub mod prelude;
/// Rebalancing.
pub mod rebalance;
/// The vault record.
pub mod vault;
