//! Deposit and withdraw preconditions.

use crate::config::VaultConfig;
use crate::error::{LedgerError, VaultError};
use clmm_vault_domain::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Which tokens a vault accepts. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyGuard {
    pub allow_token0: bool,
    pub allow_token1: bool,
}

impl PolicyGuard {
    pub fn new(allow_token0: bool, allow_token1: bool) -> Result<Self, VaultError> {
        if !allow_token0 && !allow_token1 {
            return Err(VaultError::NoTokenAllowed);
        }
        Ok(Self {
            allow_token0,
            allow_token1,
        })
    }

    /// Checks run before any deposit state is touched, first failure wins.
    pub fn check_deposit(
        &self,
        config: &VaultConfig,
        vault: Address,
        amount0: U256,
        amount1: U256,
        to: Address,
    ) -> Result<(), VaultError> {
        if amount0.is_zero() && amount1.is_zero() {
            return Err(VaultError::ZeroDeposit);
        }
        if !self.allow_token0 && !amount0.is_zero() {
            return Err(VaultError::Token0NotAllowed);
        }
        if !self.allow_token1 && !amount1.is_zero() {
            return Err(VaultError::Token1NotAllowed);
        }
        if to.is_zero() || to == vault {
            return Err(VaultError::InvalidRecipient);
        }
        let over0 = !config.deposit_max0.is_zero() && amount0 > config.deposit_max0;
        let over1 = !config.deposit_max1.is_zero() && amount1 > config.deposit_max1;
        if over0 || over1 {
            return Err(VaultError::DepositAboveMaximum);
        }
        Ok(())
    }

    /// Checked after minting.
    pub fn check_supply(&self, config: &VaultConfig, supply: U256) -> Result<(), VaultError> {
        if !config.max_total_supply.is_zero() && supply > config.max_total_supply {
            return Err(VaultError::MaxTotalSupplyExceeded);
        }
        Ok(())
    }

    pub fn check_withdraw(&self, shares: U256, to: Address, balance: U256) -> Result<(), VaultError> {
        if shares.is_zero() {
            return Err(VaultError::ZeroShares);
        }
        if to.is_zero() {
            return Err(VaultError::InvalidRecipient);
        }
        if shares > balance {
            return Err(LedgerError::InsufficientBalance.into());
        }
        Ok(())
    }
}
