//! Fungible balances: the vault's share token and the pair's tokens.

use crate::error::LedgerError;
use clmm_vault_domain::Address;
use primitive_types::U256;
use std::collections::HashMap;

/// Balances, allowances and supply of one fungible token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FungibleLedger {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

impl FungibleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self.balances.entry(to).or_default();
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: U256) -> Result<(), LedgerError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        self.set_balance(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }
        self.set_balance(from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.set_balance(
            to,
            to_balance.checked_add(amount).ok_or(LedgerError::Overflow)?,
        );
        Ok(())
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`.
    ///
    /// The allowance is checked before the balance and is spent only when
    /// the transfer goes through.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance);
        }
        self.transfer(from, to, amount)?;
        if allowance != U256::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }
        Ok(())
    }

    fn set_balance(&mut self, owner: Address, amount: U256) {
        if amount.is_zero() {
            self.balances.remove(&owner);
        } else {
            self.balances.insert(owner, amount);
        }
    }
}

/// One ledger per token address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBank {
    ledgers: HashMap<Address, FungibleLedger>,
}

impl TokenBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self, token: Address) -> Option<&FungibleLedger> {
        self.ledgers.get(&token)
    }

    fn ledger_mut(&mut self, token: Address) -> &mut FungibleLedger {
        self.ledgers.entry(token).or_default()
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.ledgers
            .get(&token)
            .map(|l| l.balance_of(owner))
            .unwrap_or_default()
    }

    pub fn total_supply(&self, token: Address) -> U256 {
        self.ledgers
            .get(&token)
            .map(FungibleLedger::total_supply)
            .unwrap_or_default()
    }

    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        self.ledger_mut(token).mint(to, amount)
    }

    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.ledger_mut(token).approve(owner, spender, amount);
    }

    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.ledger_mut(token).transfer(from, to, amount)
    }

    pub fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.ledger_mut(token).transfer_from(spender, from, to, amount)
    }
}
