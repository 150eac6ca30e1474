//! The vault record: identity, owner-settable parameters, share ledger and
//! the all-or-nothing wrapper every state-changing call runs in.
//!
//! Deposits and withdrawals live in [`crate::accounting`], rebalancing in
//! [`crate::rebalance`].

use crate::config::{FeeMode, VaultConfig};
use crate::error::VaultError;
use crate::events::{EventData, EventLog, VaultEvent};
use crate::ledger::{FungibleLedger, TokenBank};
use crate::policy::PolicyGuard;
use crate::position::{PositionKind, PositionManager, PositionView};
use clmm_vault_domain::{Address, FeeTier, Percentage};
use clmm_vault_simulation::adapter::PoolAdapter;
use primitive_types::U256;
use tracing::{debug, info, warn};

/// A dual-position vault over one pool.
#[derive(Debug)]
pub struct Vault<P: PoolAdapter> {
    /// Address the vault holds tokens and pool positions under.
    pub(crate) address: Address,
    /// Only address allowed to rebalance and change parameters.
    pub(crate) owner: Address,
    /// Token sorted first in the pool.
    pub(crate) token0: Address,
    /// Token sorted second in the pool.
    pub(crate) token1: Address,
    /// Which tokens deposits may contain.
    pub(crate) policy: PolicyGuard,
    /// Pool the positions live in.
    pub(crate) pool: P,
    /// Base and limit positions.
    pub(crate) positions: PositionManager,
    /// Share balances and supply.
    pub(crate) shares: FungibleLedger,
    /// Owner-settable limits and fee parameters.
    pub(crate) config: VaultConfig,
    /// Receives the distributed fee slice not owed to the affiliate.
    pub(crate) fee_recipient: Address,
    /// Optional second fee receiver; `None` sends everything to the
    /// recipient.
    pub(crate) affiliate: Option<Address>,
    /// Append-only record of successful calls.
    pub(crate) events: EventLog,
}

impl<P: PoolAdapter> Vault<P> {
    /// Creates a vault over `pool`. Positions start empty and nothing is
    /// deployed until the first rebalance.
    pub fn new(
        address: Address,
        owner: Address,
        pool: P,
        allow_token0: bool,
        allow_token1: bool,
        fee_recipient: Address,
        config: VaultConfig,
    ) -> Result<Self, VaultError> {
        if address.is_zero() || owner.is_zero() || fee_recipient.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        let policy = PolicyGuard::new(allow_token0, allow_token1)?;
        Ok(Self {
            address,
            owner,
            token0: pool.token0(),
            token1: pool.token1(),
            policy,
            pool,
            positions: PositionManager::new(address),
            shares: FungibleLedger::new(),
            config,
            fee_recipient,
            affiliate: None,
            events: EventLog::new(),
        })
    }

    pub(crate) fn ensure_owner(&self, caller: Address, action: &'static str) -> Result<(), VaultError> {
        if caller != self.owner {
            warn!(vault = ?self.address, caller = ?caller, action, "unauthorized call rejected");
            return Err(VaultError::Unauthorized);
        }
        Ok(())
    }

    /// Runs `op` so that it either commits completely or leaves the vault,
    /// the bank and the pool exactly as they were.
    pub(crate) fn atomically<T>(
        &mut self,
        bank: &mut TokenBank,
        action: &'static str,
        op: impl FnOnce(&mut Self, &mut TokenBank) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        let positions = self.positions.clone();
        let shares = self.shares.clone();
        let events = self.events.len();
        let balances = bank.clone();
        self.pool.checkpoint();

        match op(self, bank) {
            Ok(value) => {
                self.pool.commit();
                Ok(value)
            }
            Err(e) => {
                self.pool.rollback();
                self.positions = positions;
                self.shares = shares;
                self.events.truncate(events);
                *bank = balances;
                warn!(vault = ?self.address, action, error = %e, "call reverted");
                Err(e)
            }
        }
    }

    pub(crate) fn emit(&mut self, data: EventData) {
        self.events.record(VaultEvent::new(self.address, data));
    }

    /// Tokens the vault holds outside its positions.
    pub fn idle_balances(&self, bank: &TokenBank) -> (U256, U256) {
        (
            bank.balance_of(self.token0, self.address),
            bank.balance_of(self.token1, self.address),
        )
    }

    /// Address the vault holds tokens and positions under.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Lower-sorted token of the pool.
    pub fn token0(&self) -> Address {
        self.token0
    }

    /// Higher-sorted token of the pool.
    pub fn token1(&self) -> Address {
        self.token1
    }

    /// Whether deposits may contain token0.
    pub fn allow_token0(&self) -> bool {
        self.policy.allow_token0
    }

    /// Whether deposits may contain token1.
    pub fn allow_token1(&self) -> bool {
        self.policy.allow_token1
    }

    /// The pool the positions live in.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Fee tier of the pool.
    pub fn fee_tier(&self) -> FeeTier {
        self.pool.fee_tier()
    }

    /// Spacing every range passed to [`Vault::rebalance`] must align to.
    pub fn tick_spacing(&self) -> i32 {
        self.pool.tick_spacing()
    }

    /// Pool's current tick.
    pub fn current_tick(&self) -> Result<i32, VaultError> {
        Ok(self.pool.current_tick()?)
    }

    /// Shares in existence.
    pub fn total_supply(&self) -> U256 {
        self.shares.total_supply()
    }

    /// Shares held by `holder`.
    pub fn balance_of(&self, holder: Address) -> U256 {
        self.shares.balance_of(holder)
    }

    /// Base position with its current principal and uncollected fees.
    pub fn base_position(&self) -> Result<PositionView, VaultError> {
        self.positions.view(PositionKind::Base, &self.pool)
    }

    /// Limit position with its current principal and uncollected fees.
    pub fn limit_position(&self) -> Result<PositionView, VaultError> {
        self.positions.view(PositionKind::Limit, &self.pool)
    }

    /// Current limits and fee parameters.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Per-token deposit caps; zero means uncapped.
    pub fn deposit_max(&self) -> (U256, U256) {
        (self.config.deposit_max0, self.config.deposit_max1)
    }

    /// Share supply cap; zero means uncapped.
    pub fn max_total_supply(&self) -> U256 {
        self.config.max_total_supply
    }

    /// Affiliate sharing the distributed fees, if any.
    pub fn affiliate(&self) -> Option<Address> {
        self.affiliate
    }

    /// Receiver of the distributed fees.
    pub fn fee_recipient(&self) -> Address {
        self.fee_recipient
    }

    /// Percentage of harvested fees that leaves the vault.
    pub fn base_fee(&self) -> Percentage {
        self.config.base_fee
    }

    /// Percentage of the distributed fees owed to the affiliate.
    pub fn base_fee_split(&self) -> Percentage {
        self.config.base_fee_split
    }

    /// Whether harvested fees are distributed or compounded.
    pub fn fee_mode(&self) -> FeeMode {
        self.config.fee_mode
    }

    /// Events of every successful call, oldest first.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Sets the per-token deposit caps. Owner only.
    pub fn set_deposit_max(
        &mut self,
        caller: Address,
        deposit_max0: U256,
        deposit_max1: U256,
    ) -> Result<(), VaultError> {
        self.ensure_owner(caller, "set_deposit_max")?;
        self.config.deposit_max0 = deposit_max0;
        self.config.deposit_max1 = deposit_max1;
        self.emit(EventData::DepositMax {
            deposit_max0,
            deposit_max1,
        });
        info!(vault = ?self.address, max0 = %deposit_max0, max1 = %deposit_max1, "deposit maximums set");
        Ok(())
    }

    /// Sets the share supply cap. Owner only.
    pub fn set_max_total_supply(&mut self, caller: Address, max_total_supply: U256) -> Result<(), VaultError> {
        self.ensure_owner(caller, "set_max_total_supply")?;
        self.config.max_total_supply = max_total_supply;
        self.emit(EventData::MaxTotalSupply { max_total_supply });
        info!(vault = ?self.address, max = %max_total_supply, "max total supply set");
        Ok(())
    }

    /// Sets or clears the affiliate. The zero address clears it.
    pub fn set_affiliate(&mut self, caller: Address, affiliate: Option<Address>) -> Result<(), VaultError> {
        self.ensure_owner(caller, "set_affiliate")?;
        let affiliate = affiliate.filter(|a| !a.is_zero());
        self.affiliate = affiliate;
        self.emit(EventData::Affiliate { affiliate });
        info!(vault = ?self.address, affiliate = ?affiliate, "affiliate set");
        Ok(())
    }

    /// Owner only. The zero address is rejected.
    pub fn set_fee_recipient(&mut self, caller: Address, fee_recipient: Address) -> Result<(), VaultError> {
        self.ensure_owner(caller, "set_fee_recipient")?;
        self.apply_fee_recipient(fee_recipient)
    }

    /// Owner only. Values above 100 are rejected.
    pub fn set_base_fee(&mut self, caller: Address, base_fee: u8) -> Result<(), VaultError> {
        self.ensure_owner(caller, "set_base_fee")?;
        self.apply_base_fee(Percentage::new(base_fee)?);
        Ok(())
    }

    /// Owner only. Values above 100 are rejected.
    pub fn set_base_fee_split(&mut self, caller: Address, base_fee_split: u8) -> Result<(), VaultError> {
        self.ensure_owner(caller, "set_base_fee_split")?;
        self.apply_base_fee_split(Percentage::new(base_fee_split)?);
        Ok(())
    }

    /// Switching to [`FeeMode::Compounding`] keeps every harvested fee in
    /// the vault; the stored base fee is kept for a later switch back.
    pub fn set_fee_mode(&mut self, caller: Address, fee_mode: FeeMode) -> Result<(), VaultError> {
        self.ensure_owner(caller, "set_fee_mode")?;
        self.config.fee_mode = fee_mode;
        self.emit(EventData::FeeMode { fee_mode });
        info!(vault = ?self.address, fee_mode = ?fee_mode, "fee mode set");
        Ok(())
    }

    /// Hands the vault to `new_owner`. Owner only.
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<(), VaultError> {
        self.ensure_owner(caller, "transfer_ownership")?;
        if new_owner.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        let previous = self.owner;
        self.owner = new_owner;
        self.emit(EventData::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        info!(vault = ?self.address, previous = ?previous, owner = ?new_owner, "ownership transferred");
        Ok(())
    }

    /// Moves shares between holders.
    pub fn transfer_shares(&mut self, from: Address, to: Address, amount: U256) -> Result<(), VaultError> {
        self.shares.transfer(from, to, amount)?;
        debug!(vault = ?self.address, from = ?from, to = ?to, amount = %amount, "shares transferred");
        Ok(())
    }

    pub(crate) fn apply_fee_recipient(&mut self, fee_recipient: Address) -> Result<(), VaultError> {
        if fee_recipient.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        self.fee_recipient = fee_recipient;
        self.emit(EventData::FeeRecipient { fee_recipient });
        info!(vault = ?self.address, fee_recipient = ?fee_recipient, "fee recipient set");
        Ok(())
    }

    pub(crate) fn apply_base_fee(&mut self, base_fee: Percentage) {
        self.config.base_fee = base_fee;
        self.emit(EventData::BaseFee {
            base_fee: base_fee.value(),
        });
        info!(vault = ?self.address, base_fee = base_fee.value(), "base fee set");
    }

    pub(crate) fn apply_base_fee_split(&mut self, base_fee_split: Percentage) {
        self.config.base_fee_split = base_fee_split;
        self.emit(EventData::BaseFeeSplit {
            base_fee_split: base_fee_split.value(),
        });
        info!(vault = ?self.address, base_fee_split = base_fee_split.value(), "base fee split set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::events::VaultEventType;
    use clmm_vault_domain::MathError;
    use clmm_vault_simulation::pool::SimulatedPool;
    use rust_decimal::Decimal;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn owner() -> Address {
        addr(0x0e)
    }

    fn vault() -> Vault<SimulatedPool> {
        let mut pool = SimulatedPool::new(addr(0xaa), addr(1), addr(2), FeeTier::Medium);
        pool.initialize(Decimal::ONE).unwrap();
        Vault::new(
            addr(0x77),
            owner(),
            pool,
            true,
            true,
            addr(0xfe),
            VaultConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_vault() {
        let vault = vault();
        assert_eq!(vault.token0(), addr(1));
        assert_eq!(vault.tick_spacing(), 60);
        assert_eq!(vault.current_tick().unwrap(), 0);
        assert!(vault.total_supply().is_zero());
        assert_eq!(vault.base_position().unwrap().liquidity, 0);
        assert_eq!(vault.affiliate(), None);
        assert!(vault.events().is_empty());
    }

    #[test]
    fn test_new_rejects_no_allowed_token() {
        let pool = SimulatedPool::new(addr(0xaa), addr(1), addr(2), FeeTier::Medium);
        let err = Vault::new(addr(0x77), owner(), pool, false, false, addr(0xfe), VaultConfig::default())
            .unwrap_err();
        assert_eq!(err, VaultError::NoTokenAllowed);
    }

    #[test]
    fn test_setters_are_owner_only() {
        let mut vault = vault();
        let stranger = addr(0xbad);
        assert_eq!(
            vault.set_deposit_max(stranger, U256::one(), U256::one()),
            Err(VaultError::Unauthorized)
        );
        assert_eq!(vault.set_base_fee(stranger, 5), Err(VaultError::Unauthorized));
        assert_eq!(
            vault.set_affiliate(stranger, Some(addr(5))),
            Err(VaultError::Unauthorized)
        );
        assert_eq!(
            vault.transfer_ownership(stranger, stranger),
            Err(VaultError::Unauthorized)
        );
        assert!(vault.events().is_empty());
    }

    #[test]
    fn test_setters_update_and_emit() {
        let mut vault = vault();
        vault
            .set_deposit_max(owner(), U256::from(100u64), U256::from(200u64))
            .unwrap();
        vault.set_max_total_supply(owner(), U256::from(1_000u64)).unwrap();
        vault.set_affiliate(owner(), Some(addr(0xaf))).unwrap();
        vault.set_base_fee(owner(), 20).unwrap();
        vault.set_base_fee_split(owner(), 100).unwrap();

        assert_eq!(vault.deposit_max(), (U256::from(100u64), U256::from(200u64)));
        assert_eq!(vault.max_total_supply(), U256::from(1_000u64));
        assert_eq!(vault.affiliate(), Some(addr(0xaf)));
        assert_eq!(vault.base_fee().value(), 20);
        assert_eq!(vault.base_fee_split().value(), 100);
        assert_eq!(vault.events().count_by_type(VaultEventType::ParameterChanged), 5);

        // the zero address clears the affiliate
        vault.set_affiliate(owner(), Some(Address::zero())).unwrap();
        assert_eq!(vault.affiliate(), None);
    }

    #[test]
    fn test_percentages_are_bounded() {
        let mut vault = vault();
        assert_eq!(
            vault.set_base_fee(owner(), 101),
            Err(VaultError::Math(MathError::PercentageOutOfRange(101)))
        );
        assert_eq!(vault.base_fee().value(), 10);
    }

    #[test]
    fn test_transfer_ownership() {
        let mut vault = vault();
        assert_eq!(
            vault.transfer_ownership(owner(), Address::zero()),
            Err(VaultError::ZeroAddress)
        );
        vault.transfer_ownership(owner(), addr(0x0f)).unwrap();
        assert_eq!(vault.owner(), addr(0x0f));
        assert_eq!(vault.set_base_fee(owner(), 1), Err(VaultError::Unauthorized));
        vault.set_base_fee(addr(0x0f), 1).unwrap();
    }

    #[test]
    fn test_atomically_restores_everything() {
        let mut vault = vault();
        let mut bank = TokenBank::new();
        bank.mint(addr(1), vault.address(), U256::from(500u64)).unwrap();

        let err = vault
            .atomically(&mut bank, "test", |vault, bank| {
                vault.shares.mint(addr(0xa1), U256::from(10u64))?;
                bank.transfer(addr(1), vault.address, addr(0xa1), U256::from(500u64))?;
                vault.emit(EventData::MaxTotalSupply {
                    max_total_supply: U256::zero(),
                });
                Err::<(), _>(LedgerError::InsufficientBalance.into())
            })
            .unwrap_err();

        assert_eq!(err, VaultError::Ledger(LedgerError::InsufficientBalance));
        assert!(vault.total_supply().is_zero());
        assert_eq!(vault.idle_balances(&bank).0, U256::from(500u64));
        assert!(vault.events().is_empty());
    }

    #[test]
    fn test_transfer_shares() {
        let mut vault = vault();
        vault.shares.mint(addr(0xa1), U256::from(10u64)).unwrap();
        vault
            .transfer_shares(addr(0xa1), addr(0xb0), U256::from(4u64))
            .unwrap();
        assert_eq!(vault.balance_of(addr(0xb0)), U256::from(4u64));
        assert_eq!(
            vault.transfer_shares(addr(0xa1), addr(0xb0), U256::from(7u64)),
            Err(VaultError::Ledger(LedgerError::InsufficientBalance))
        );
    }
}
