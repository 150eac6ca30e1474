//! Settled pool interactions for accounts other than the vault's positions:
//! swaps and plain liquidity provision.
//!
//! The pool only computes amounts; these helpers move the tokens through
//! the [`TokenBank`] and undo the pool change when settlement cannot
//! happen.

use crate::error::{LedgerError, VaultError};
use crate::ledger::TokenBank;
use clmm_vault_domain::{Address, TickRange};
use clmm_vault_simulation::adapter::{PoolAdapter, SwapOutcome};
use primitive_types::U256;
use rust_decimal::Decimal;
use tracing::debug;

/// Exact-input swap paid from and to `trader`.
pub fn swap_exact_in<P: PoolAdapter>(
    pool: &mut P,
    bank: &mut TokenBank,
    trader: Address,
    zero_for_one: bool,
    amount_in: U256,
    sqrt_price_limit: Option<Decimal>,
) -> Result<SwapOutcome, VaultError> {
    let (token_in, token_out) = if zero_for_one {
        (pool.token0(), pool.token1())
    } else {
        (pool.token1(), pool.token0())
    };
    if bank.balance_of(token_in, trader) < amount_in {
        return Err(LedgerError::InsufficientBalance.into());
    }

    pool.checkpoint();
    let outcome = match pool.swap(zero_for_one, amount_in, sqrt_price_limit) {
        Ok(outcome) => outcome,
        Err(e) => {
            pool.rollback();
            return Err(e.into());
        }
    };
    let pool_address = pool.address();
    if bank.balance_of(token_out, pool_address) < outcome.amount_out {
        pool.rollback();
        return Err(LedgerError::InsufficientBalance.into());
    }
    pool.commit();

    bank.transfer(token_in, trader, pool_address, outcome.amount_in)?;
    bank.transfer(token_out, pool_address, trader, outcome.amount_out)?;

    debug!(
        trader = ?trader,
        zero_for_one,
        amount_in = %outcome.amount_in,
        amount_out = %outcome.amount_out,
        tick = outcome.tick_after,
        "swap settled"
    );
    Ok(outcome)
}

/// Mints `liquidity` in `range` for `provider` and pays the pool.
///
/// Fees earned by such positions are not tracked; the vault keeps its own
/// fee accounting.
pub fn provide_liquidity<P: PoolAdapter>(
    pool: &mut P,
    bank: &mut TokenBank,
    provider: Address,
    range: TickRange,
    liquidity: u128,
) -> Result<(U256, U256), VaultError> {
    let (token0, token1) = (pool.token0(), pool.token1());
    pool.checkpoint();
    let (amount0, amount1) = match pool.mint(provider, range, liquidity) {
        Ok(amounts) => amounts,
        Err(e) => {
            pool.rollback();
            return Err(e.into());
        }
    };
    if bank.balance_of(token0, provider) < amount0 || bank.balance_of(token1, provider) < amount1 {
        pool.rollback();
        return Err(LedgerError::InsufficientBalance.into());
    }
    pool.commit();

    let pool_address = pool.address();
    bank.transfer(token0, provider, pool_address, amount0)?;
    bank.transfer(token1, provider, pool_address, amount1)?;
    debug!(provider = ?provider, range = %range, liquidity, "liquidity provided");
    Ok((amount0, amount1))
}

/// Burns `liquidity` from `provider`'s position in `range` and pays it out.
pub fn remove_liquidity<P: PoolAdapter>(
    pool: &mut P,
    bank: &mut TokenBank,
    provider: Address,
    range: TickRange,
    liquidity: u128,
) -> Result<(U256, U256), VaultError> {
    let (amount0, amount1) = pool.burn(provider, range, liquidity)?;
    let pool_address = pool.address();
    bank.transfer(pool.token0(), pool_address, provider, amount0)?;
    bank.transfer(pool.token1(), pool_address, provider, amount1)?;
    debug!(provider = ?provider, range = %range, liquidity, "liquidity removed");
    Ok((amount0, amount1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clmm_vault_domain::FeeTier;
    use clmm_vault_simulation::pool::SimulatedPool;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn setup() -> (SimulatedPool, TokenBank) {
        let mut pool = SimulatedPool::new(addr(0xaa), addr(1), addr(2), FeeTier::Medium);
        pool.initialize(Decimal::ONE).unwrap();
        let mut bank = TokenBank::new();
        for holder in [addr(0x10), addr(0xc0)] {
            bank.mint(addr(1), holder, U256::from(10_000_000_000u64)).unwrap();
            bank.mint(addr(2), holder, U256::from(10_000_000_000u64)).unwrap();
        }
        (pool, bank)
    }

    #[test]
    fn test_provide_and_swap() {
        let (mut pool, mut bank) = setup();
        let lp = addr(0x10);
        let range = TickRange::new(-887_220, 887_220);
        let (paid0, paid1) = provide_liquidity(&mut pool, &mut bank, lp, range, 1_000_000_000).unwrap();
        assert_eq!(bank.balance_of(addr(1), addr(0xaa)), paid0);
        assert_eq!(bank.balance_of(addr(2), addr(0xaa)), paid1);

        let trader = addr(0xc0);
        let out = swap_exact_in(&mut pool, &mut bank, trader, true, U256::from(1_000_000u64), None).unwrap();
        assert_eq!(
            bank.balance_of(addr(1), trader),
            U256::from(10_000_000_000u64) - out.amount_in
        );
        assert_eq!(
            bank.balance_of(addr(2), trader),
            U256::from(10_000_000_000u64) + out.amount_out
        );
        assert!(pool.current_tick().unwrap() < 0);
    }

    #[test]
    fn test_swap_without_funds_leaves_pool_untouched() {
        let (mut pool, mut bank) = setup();
        provide_liquidity(&mut pool, &mut bank, addr(0x10), TickRange::new(-600, 600), 1_000_000).unwrap();
        let poor = addr(0xdd);
        assert_eq!(
            swap_exact_in(&mut pool, &mut bank, poor, true, U256::from(1_000u64), None),
            Err(VaultError::Ledger(LedgerError::InsufficientBalance))
        );
        assert_eq!(pool.current_tick().unwrap(), 0);
    }

    #[test]
    fn test_provide_without_funds_rolls_back() {
        let (mut pool, mut bank) = setup();
        let poor = addr(0xdd);
        let range = TickRange::new(-600, 600);
        assert_eq!(
            provide_liquidity(&mut pool, &mut bank, poor, range, 1_000_000),
            Err(VaultError::Ledger(LedgerError::InsufficientBalance))
        );
        assert_eq!(pool.position_liquidity(poor, range), 0);
    }

    #[test]
    fn test_remove_liquidity_pays_provider() {
        let (mut pool, mut bank) = setup();
        let lp = addr(0x10);
        let range = TickRange::new(-600, 600);
        provide_liquidity(&mut pool, &mut bank, lp, range, 1_000_000).unwrap();
        let (out0, out1) = remove_liquidity(&mut pool, &mut bank, lp, range, 1_000_000).unwrap();
        assert!(out0 > U256::zero() && out1 > U256::zero());
        // mint rounds up and burn rounds down, so at most dust stays behind
        assert!(bank.balance_of(addr(1), addr(0xaa)) <= U256::from(2u64));
        assert!(bank.balance_of(addr(2), addr(0xaa)) <= U256::from(2u64));
    }
}
