//! Domain types and math for the dual-position vault.
//!
//! This crate holds everything the vault and the pool simulation share:
//! - Addresses and token ordering
//! - Tick/price conversion and concentrated-liquidity amount math
//! - Full-precision integer helpers for share accounting
//! - Fee tiers, percentages and tick ranges

/// Error types.
pub mod error;
/// Fee tiers supported by the pool.
pub mod fees;
/// Math utilities.
pub mod math;
/// Addresses and token ordering.
pub mod token;
/// Value objects.
pub mod value_objects;

pub use error::MathError;
pub use fees::FeeTier;
pub use token::Address;
pub use value_objects::percentage::Percentage;
pub use value_objects::price::Price;
pub use value_objects::tick_range::TickRange;
