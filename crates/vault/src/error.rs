//! Error types for the vault, its ledgers and the factory.

use clmm_vault_domain::MathError;
use clmm_vault_simulation::error::PoolError;
use thiserror::Error;

/// Errors raised by a fungible ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("allowance insufficient")]
    InsufficientAllowance,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("zero address")]
    ZeroAddress,
    #[error("supply overflow")]
    Overflow,
}

/// Errors raised by vault operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// Caller is not the vault owner.
    #[error("caller is not the owner")]
    Unauthorized,
    #[error("deposits must be nonzero")]
    ZeroDeposit,
    #[error("token0 prohibited by vault policy")]
    Token0NotAllowed,
    #[error("token1 prohibited by vault policy")]
    Token1NotAllowed,
    /// Recipient is the zero address or the vault itself.
    #[error("invalid recipient")]
    InvalidRecipient,
    #[error("deposits must be less than maximum amounts")]
    DepositAboveMaximum,
    #[error("maxTotalSupply exceeded")]
    MaxTotalSupplyExceeded,
    #[error("shares must be nonzero")]
    ZeroShares,
    #[error("base position invalid")]
    BasePositionInvalid,
    #[error("limit position invalid")]
    LimitPositionInvalid,
    #[error("at least one token must be allowed")]
    NoTokenAllowed,
    #[error("zero address")]
    ZeroAddress,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Errors raised by the vault factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    #[error("caller is not the owner")]
    Unauthorized,
    #[error("identical token addresses")]
    IdenticalTokens,
    #[error("zero address")]
    ZeroAddress,
    #[error("at least one token must be allowed")]
    NoTokenAllowed,
    #[error("vault exists")]
    VaultExists,
    #[error("fee incorrect")]
    FeeIncorrect(u32),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error(transparent)]
    Math(#[from] MathError),
}
