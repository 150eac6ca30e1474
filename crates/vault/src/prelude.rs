//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use clmm_vault_core::prelude::*;
//! ```

// Accounting
pub use crate::accounting::{PRECISION, shares_for_deposit, spot_price_x18, value_in_token1};

// Configuration
pub use crate::config::{FactoryConfig, FeeMode, VaultConfig};

// Errors
pub use crate::error::{FactoryError, LedgerError, VaultError};

// Events
pub use crate::events::{
    DepositData, EventData, EventLog, FeesDistributedData, RebalanceData, VaultEvent,
    VaultEventType, WithdrawData,
};

// Factory
pub use crate::factory::{VaultFactory, VaultKey, vault_address};

// Ledgers
pub use crate::fee_ledger::FeeLedger;
pub use crate::ledger::{FungibleLedger, TokenBank};

// Market
pub use crate::market::{provide_liquidity, remove_liquidity, swap_exact_in};

// Policy
pub use crate::policy::PolicyGuard;

// Positions
pub use crate::position::{Position, PositionKind, PositionManager, PositionView, Withdrawal};

// Rebalance
pub use crate::rebalance::{FeeDistribution, RebalanceReport, split_fees};

// Vault
pub use crate::vault::Vault;
