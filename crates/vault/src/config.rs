//! Vault and factory configuration.

use clmm_vault_domain::{Address, Percentage};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// What happens to fees harvested on rebalance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeMode {
    /// `base_fee` percent leaves the vault, split between the fee recipient
    /// and the affiliate.
    #[default]
    Split,
    /// Legacy mode: every harvested fee stays in the vault.
    Compounding,
}

/// Owner-settable vault parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Per-call token0 deposit ceiling (zero means unlimited).
    pub deposit_max0: U256,
    /// Per-call token1 deposit ceiling (zero means unlimited).
    pub deposit_max1: U256,
    /// Cap on total shares (zero disables it).
    pub max_total_supply: U256,
    /// Percent of harvested fees distributed outside the vault.
    pub base_fee: Percentage,
    /// Percent of the distributed slice that goes to the affiliate.
    pub base_fee_split: Percentage,
    pub fee_mode: FeeMode,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            deposit_max0: U256::zero(),
            deposit_max1: U256::zero(),
            max_total_supply: U256::zero(),
            base_fee: Percentage::saturating(10),
            base_fee_split: Percentage::saturating(50),
            fee_mode: FeeMode::Split,
        }
    }
}

impl VaultConfig {
    #[must_use]
    pub fn with_deposit_max(mut self, max0: U256, max1: U256) -> Self {
        self.deposit_max0 = max0;
        self.deposit_max1 = max1;
        self
    }

    #[must_use]
    pub fn with_max_total_supply(mut self, max: U256) -> Self {
        self.max_total_supply = max;
        self
    }

    #[must_use]
    pub fn with_base_fee(mut self, base_fee: Percentage) -> Self {
        self.base_fee = base_fee;
        self
    }

    #[must_use]
    pub fn with_base_fee_split(mut self, split: Percentage) -> Self {
        self.base_fee_split = split;
        self
    }

    #[must_use]
    pub fn with_fee_mode(mut self, fee_mode: FeeMode) -> Self {
        self.fee_mode = fee_mode;
        self
    }

    /// Base fee actually applied; compounding vaults distribute nothing.
    pub fn effective_base_fee(&self) -> Percentage {
        match self.fee_mode {
            FeeMode::Split => self.base_fee,
            FeeMode::Compounding => Percentage::ZERO,
        }
    }
}

/// Factory-wide defaults applied to every vault it creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub fee_recipient: Address,
    #[serde(default)]
    pub vault: VaultConfig,
}

impl FactoryConfig {
    pub fn new(fee_recipient: Address) -> Self {
        Self {
            fee_recipient,
            vault: VaultConfig::default(),
        }
    }

    #[must_use]
    pub fn with_vault_config(mut self, vault: VaultConfig) -> Self {
        self.vault = vault;
        self
    }
}
