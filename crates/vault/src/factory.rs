//! Owner-gated vault factory: one vault per
//! `(token0, token1, fee, allow_token0, allow_token1)` key.

use crate::config::FactoryConfig;
use crate::error::FactoryError;
use crate::vault::Vault;
use clmm_vault_domain::{Address, FeeTier, Percentage};
use clmm_vault_simulation::adapter::PoolRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Registry key of a vault. Tokens are stored sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultKey {
    /// Lower-sorted token.
    pub token0: Address,
    /// Higher-sorted token.
    pub token1: Address,
    /// Pool fee in hundredths of a basis point.
    pub fee: u32,
    /// Whether deposits may contain token0.
    pub allow_token0: bool,
    /// Whether deposits may contain token1.
    pub allow_token1: bool,
}

impl VaultKey {
    /// Builds the key for an unordered pair, carrying each allow flag with
    /// its token.
    pub fn new(token_a: Address, allow_a: bool, token_b: Address, allow_b: bool, fee: u32) -> Self {
        if token_a < token_b {
            Self {
                token0: token_a,
                token1: token_b,
                fee,
                allow_token0: allow_a,
                allow_token1: allow_b,
            }
        } else {
            Self {
                token0: token_b,
                token1: token_a,
                fee,
                allow_token0: allow_b,
                allow_token1: allow_a,
            }
        }
    }

    fn to_bytes(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(46);
        bytes.extend_from_slice(self.token0.as_bytes());
        bytes.extend_from_slice(self.token1.as_bytes());
        bytes.extend_from_slice(&self.fee.to_be_bytes());
        bytes.push(u8::from(self.allow_token0));
        bytes.push(u8::from(self.allow_token1));
        bytes
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(seed: u8, data: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in std::iter::once(&seed).chain(data) {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Deterministic vault address for `key` under `factory`.
pub fn vault_address(factory: Address, key: &VaultKey) -> Address {
    let mut data = factory.as_bytes().to_vec();
    data.extend(key.to_bytes());

    let mut raw = [0u8; 20];
    for (i, chunk) in raw.chunks_mut(8).enumerate() {
        let word = fnv1a(i as u8, &data).to_be_bytes();
        chunk.copy_from_slice(&word[..chunk.len()]);
    }
    Address::from(raw)
}

/// Creates and owns vaults, binding each to its pool from `R`.
pub struct VaultFactory<R: PoolRegistry> {
    /// Base for derived vault addresses.
    address: Address,
    /// Only address allowed to create vaults and change factory settings.
    owner: Address,
    /// Source of the pools vaults are created over.
    registry: R,
    /// Settings copied into every new vault.
    config: FactoryConfig,
    /// Vaults in creation order.
    vaults: Vec<Vault<R::Pool>>,
    /// Index into `vaults` by pair, fee and allow flags.
    by_key: HashMap<VaultKey, usize>,
    /// Index into `vaults` by vault address.
    by_address: HashMap<Address, usize>,
}

impl<R: PoolRegistry> VaultFactory<R> {
    pub fn new(address: Address, owner: Address, registry: R, config: FactoryConfig) -> Self {
        Self {
            address,
            owner,
            registry,
            config,
            vaults: Vec::new(),
            by_key: HashMap::new(),
            by_address: HashMap::new(),
        }
    }

    fn ensure_owner(&self, caller: Address, action: &'static str) -> Result<(), FactoryError> {
        if caller != self.owner {
            warn!(factory = ?self.address, caller = ?caller, action, "unauthorized call rejected");
            return Err(FactoryError::Unauthorized);
        }
        Ok(())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Creates a vault for the pair and returns its address. The caller
    /// becomes the vault owner.
    pub fn create_vault(
        &mut self,
        caller: Address,
        token_a: Address,
        allow_a: bool,
        token_b: Address,
        allow_b: bool,
        fee: u32,
    ) -> Result<Address, FactoryError> {
        self.ensure_owner(caller, "create_vault")?;
        if token_a == token_b {
            return Err(FactoryError::IdenticalTokens);
        }
        if token_a.is_zero() || token_b.is_zero() {
            return Err(FactoryError::ZeroAddress);
        }
        if !allow_a && !allow_b {
            return Err(FactoryError::NoTokenAllowed);
        }
        let key = VaultKey::new(token_a, allow_a, token_b, allow_b, fee);
        if self.by_key.contains_key(&key) {
            return Err(FactoryError::VaultExists);
        }
        let fee_tier = FeeTier::from_fee(fee).map_err(|_| FactoryError::FeeIncorrect(fee))?;

        let pool = self.registry.get_or_create_pool(key.token0, key.token1, fee_tier)?;
        let address = vault_address(self.address, &key);
        let vault = Vault::new(
            address,
            caller,
            pool,
            key.allow_token0,
            key.allow_token1,
            self.config.fee_recipient,
            self.config.vault.clone(),
        )?;

        let index = self.vaults.len();
        self.vaults.push(vault);
        self.by_key.insert(key, index);
        self.by_address.insert(address, index);
        info!(
            factory = ?self.address,
            vault = ?address,
            token0 = ?key.token0,
            token1 = ?key.token1,
            fee,
            allow_token0 = key.allow_token0,
            allow_token1 = key.allow_token1,
            "vault created"
        );
        Ok(address)
    }

    /// Vault created `index`-th.
    pub fn vault_at(&self, index: usize) -> Option<&Vault<R::Pool>> {
        self.vaults.get(index)
    }

    pub fn vault_count(&self) -> usize {
        self.vaults.len()
    }

    /// Address of the vault registered under the key, in any token order.
    pub fn get_vault(
        &self,
        token_a: Address,
        allow_a: bool,
        token_b: Address,
        allow_b: bool,
        fee: u32,
    ) -> Option<Address> {
        let key = VaultKey::new(token_a, allow_a, token_b, allow_b, fee);
        self.by_key.get(&key).map(|&i| self.vaults[i].address())
    }

    pub fn vault(&self, address: Address) -> Option<&Vault<R::Pool>> {
        self.by_address.get(&address).map(|&i| &self.vaults[i])
    }

    pub fn vault_mut(&mut self, address: Address) -> Option<&mut Vault<R::Pool>> {
        self.by_address.get(&address).map(|&i| &mut self.vaults[i])
    }

    pub fn vaults(&self) -> impl Iterator<Item = &Vault<R::Pool>> {
        self.vaults.iter()
    }

    /// Sets the fee recipient for new vaults and every existing one.
    pub fn set_fee_recipient(&mut self, caller: Address, fee_recipient: Address) -> Result<(), FactoryError> {
        self.ensure_owner(caller, "set_fee_recipient")?;
        if fee_recipient.is_zero() {
            return Err(FactoryError::ZeroAddress);
        }
        for vault in &mut self.vaults {
            vault.apply_fee_recipient(fee_recipient)?;
        }
        self.config.fee_recipient = fee_recipient;
        info!(factory = ?self.address, fee_recipient = ?fee_recipient, "fee recipient set");
        Ok(())
    }

    /// Sets the base fee for new vaults and every existing one.
    pub fn set_base_fee(&mut self, caller: Address, base_fee: u8) -> Result<(), FactoryError> {
        self.ensure_owner(caller, "set_base_fee")?;
        let base_fee = Percentage::new(base_fee)?;
        for vault in &mut self.vaults {
            vault.apply_base_fee(base_fee);
        }
        self.config.vault.base_fee = base_fee;
        info!(factory = ?self.address, base_fee = base_fee.value(), "base fee set");
        Ok(())
    }

    /// Sets the base fee split for new vaults and every existing one.
    pub fn set_base_fee_split(&mut self, caller: Address, base_fee_split: u8) -> Result<(), FactoryError> {
        self.ensure_owner(caller, "set_base_fee_split")?;
        let base_fee_split = Percentage::new(base_fee_split)?;
        for vault in &mut self.vaults {
            vault.apply_base_fee_split(base_fee_split);
        }
        self.config.vault.base_fee_split = base_fee_split;
        info!(factory = ?self.address, base_fee_split = base_fee_split.value(), "base fee split set");
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<(), FactoryError> {
        self.ensure_owner(caller, "transfer_ownership")?;
        if new_owner.is_zero() {
            return Err(FactoryError::ZeroAddress);
        }
        let previous = self.owner;
        self.owner = new_owner;
        info!(factory = ?self.address, previous = ?previous, owner = ?new_owner, "factory ownership transferred");
        Ok(())
    }
}
