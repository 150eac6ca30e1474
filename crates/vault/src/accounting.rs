//! Share accounting: total value, deposits and withdrawals.
//!
//! # Pricing
//!
//! Deposits are valued in token1 at the pool's spot price, quoted at the
//! current tick with 18 decimals of precision:
//!
//! ```text
//! value = amount1 + amount0 * price
//! ```
//!
//! The first deposit mints `value` shares. Later deposits mint
//! `value * supply / pool_value`, where `pool_value` is the vault's total
//! amounts before the deposit valued the same way. Every division truncates.

use crate::error::VaultError;
use crate::events::{DepositData, EventData, WithdrawData};
use crate::ledger::TokenBank;
use crate::position::PositionKind;
use crate::vault::Vault;
use clmm_vault_domain::math::full_math::{decimal_to_u256_floor, mul_div};
use clmm_vault_domain::math::price_tick::tick_to_price;
use clmm_vault_domain::{Address, MathError};
use clmm_vault_simulation::adapter::PoolAdapter;
use primitive_types::U256;
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Fixed-point scale of quoted prices.
pub const PRECISION: u64 = 1_000_000_000_000_000_000;

/// Price of token0 in token1 at `tick`, scaled by [`PRECISION`].
pub fn spot_price_x18(tick: i32) -> Result<U256, MathError> {
    let price = tick_to_price(tick)?;
    let scaled = price
        .checked_mul(Decimal::from(PRECISION))
        .ok_or(MathError::Overflow("spot price"))?;
    decimal_to_u256_floor(scaled)
}

/// Value of `amount0`/`amount1` in token1 at `price_x18`.
pub fn value_in_token1(amount0: U256, amount1: U256, price_x18: U256) -> Result<U256, MathError> {
    let converted = mul_div(amount0, price_x18, U256::from(PRECISION))?;
    amount1
        .checked_add(converted)
        .ok_or(MathError::Overflow("deposit value"))
}

/// Shares minted for a deposit given the pre-deposit totals and supply.
pub fn shares_for_deposit(
    amount0: U256,
    amount1: U256,
    price_x18: U256,
    total0: U256,
    total1: U256,
    total_supply: U256,
) -> Result<U256, MathError> {
    let value = value_in_token1(amount0, amount1, price_x18)?;
    if total_supply.is_zero() {
        return Ok(value);
    }
    let pool_value = value_in_token1(total0, total1, price_x18)?;
    mul_div(value, total_supply, pool_value)
}

impl<P: PoolAdapter> Vault<P> {
    /// Idle balances plus both positions' principal and uncollected fees.
    pub fn total_amounts(&self, bank: &TokenBank) -> Result<(U256, U256), VaultError> {
        let (idle0, idle1) = self.idle_balances(bank);
        let (base0, base1) = self.positions.current_amounts(PositionKind::Base, &self.pool)?;
        let (limit0, limit1) = self.positions.current_amounts(PositionKind::Limit, &self.pool)?;
        Ok((idle0 + base0 + limit0, idle1 + base1 + limit1))
    }

    /// Pulls `amount0`/`amount1` from `caller` into the vault's idle balance
    /// and mints shares to `to`. Returns the shares minted.
    pub fn deposit(
        &mut self,
        bank: &mut TokenBank,
        caller: Address,
        amount0: U256,
        amount1: U256,
        to: Address,
    ) -> Result<U256, VaultError> {
        if let Err(err) = self
            .policy
            .check_deposit(&self.config, self.address, amount0, amount1, to)
        {
            warn!(
                vault = ?self.address,
                sender = ?caller,
                amount0 = %amount0,
                amount1 = %amount1,
                error = %err,
                "deposit rejected"
            );
            return Err(err);
        }

        self.atomically(bank, "deposit", |vault, bank| {
            let price = spot_price_x18(vault.pool.current_tick()?)?;
            let (total0, total1) = vault.total_amounts(bank)?;
            let shares = shares_for_deposit(
                amount0,
                amount1,
                price,
                total0,
                total1,
                vault.shares.total_supply(),
            )?;
            if shares.is_zero() {
                return Err(VaultError::ZeroShares);
            }

            if !amount0.is_zero() {
                bank.transfer_from(vault.token0, vault.address, caller, vault.address, amount0)?;
            }
            if !amount1.is_zero() {
                bank.transfer_from(vault.token1, vault.address, caller, vault.address, amount1)?;
            }
            vault.shares.mint(to, shares)?;
            vault
                .policy
                .check_supply(&vault.config, vault.shares.total_supply())?;

            vault.emit(EventData::Deposit(DepositData {
                sender: caller,
                to,
                shares,
                amount0,
                amount1,
            }));
            info!(
                vault = ?vault.address,
                sender = ?caller,
                to = ?to,
                shares = %shares,
                amount0 = %amount0,
                amount1 = %amount1,
                "deposit"
            );
            Ok(shares)
        })
    }

    /// Burns `shares` of `caller` and sends `to` the same fraction of the
    /// idle balances and of both positions, fees included.
    pub fn withdraw(
        &mut self,
        bank: &mut TokenBank,
        caller: Address,
        shares: U256,
        to: Address,
    ) -> Result<(U256, U256), VaultError> {
        if let Err(err) = self
            .policy
            .check_withdraw(shares, to, self.shares.balance_of(caller))
        {
            warn!(
                vault = ?self.address,
                sender = ?caller,
                shares = %shares,
                error = %err,
                "withdraw rejected"
            );
            return Err(err);
        }

        self.atomically(bank, "withdraw", |vault, bank| {
            let total_supply = vault.shares.total_supply();

            let base = vault.positions.withdraw_fraction(
                PositionKind::Base,
                &mut vault.pool,
                bank,
                shares,
                total_supply,
                to,
            )?;
            let limit = vault.positions.withdraw_fraction(
                PositionKind::Limit,
                &mut vault.pool,
                bank,
                shares,
                total_supply,
                to,
            )?;

            let (idle0, idle1) = vault.idle_balances(bank);
            let unused0 = mul_div(idle0, shares, total_supply)?;
            let unused1 = mul_div(idle1, shares, total_supply)?;
            bank.transfer(vault.token0, vault.address, to, unused0)?;
            bank.transfer(vault.token1, vault.address, to, unused1)?;

            vault.shares.burn(caller, shares)?;

            let amount0 = base.total0() + limit.total0() + unused0;
            let amount1 = base.total1() + limit.total1() + unused1;
            vault.emit(EventData::Withdraw(WithdrawData {
                sender: caller,
                to,
                shares,
                amount0,
                amount1,
            }));
            info!(
                vault = ?vault.address,
                sender = ?caller,
                to = ?to,
                shares = %shares,
                amount0 = %amount0,
                amount1 = %amount1,
                "withdraw"
            );
            Ok((amount0, amount1))
        })
    }
}
