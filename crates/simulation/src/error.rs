use clmm_vault_domain::{Address, MathError};
use thiserror::Error;

/// Errors raised by the simulated pool and its registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("pool not initialized")]
    NotInitialized,
    #[error("pool already initialized")]
    AlreadyInitialized,
    #[error("invalid tick range [{lower}, {upper}]")]
    InvalidTickRange { lower: i32, upper: i32 },
    #[error("liquidity amount must be nonzero")]
    ZeroLiquidity,
    #[error("position of {owner:?} holds {available} liquidity, {requested} requested")]
    InsufficientPositionLiquidity {
        owner: Address,
        available: u128,
        requested: u128,
    },
    #[error("insufficient liquidity for swap")]
    InsufficientLiquidity,
    #[error("invalid sqrt price limit")]
    InvalidPriceLimit,
    #[error("identical token addresses")]
    IdenticalTokens,
    #[error(transparent)]
    Math(#[from] MathError),
}
