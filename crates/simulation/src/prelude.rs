//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use clmm_vault_simulation::prelude::*;
//! ```

// Adapter
pub use crate::adapter::{FeeGrowth, PoolAdapter, PoolRegistry, SwapOutcome};

// Errors
pub use crate::error::PoolError;

// Pools
pub use crate::pool::SimulatedPool;
pub use crate::registry::SimulatedPoolRegistry;
pub use crate::shared::SharedPool;

// Price path generators
pub use crate::price_path::{GeometricBrownianMotion, PricePathGenerator};
