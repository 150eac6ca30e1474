//! Capability interface between a vault and the pool it deploys into.

use crate::error::PoolError;
use clmm_vault_domain::math::price_tick;
use clmm_vault_domain::{Address, FeeTier, Price, TickRange};
use primitive_types::U256;
use rust_decimal::Decimal;
use std::ops::Sub;

/// Fees earned per unit of liquidity, per token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeGrowth {
    pub token0: Decimal,
    pub token1: Decimal,
}

impl FeeGrowth {
    pub const ZERO: FeeGrowth = FeeGrowth {
        token0: Decimal::ZERO,
        token1: Decimal::ZERO,
    };

    pub fn new(token0: Decimal, token1: Decimal) -> Self {
        Self { token0, token1 }
    }
}

impl Sub for FeeGrowth {
    type Output = FeeGrowth;

    fn sub(self, rhs: FeeGrowth) -> FeeGrowth {
        FeeGrowth {
            token0: self.token0 - rhs.token0,
            token1: self.token1 - rhs.token1,
        }
    }
}

/// Result of a swap against the pool.
///
/// `amount_in` includes the fee and is what the swapper owes the pool;
/// `amount_out` is what the pool owes the swapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub zero_for_one: bool,
    pub amount_in: U256,
    pub amount_out: U256,
    pub fee: U256,
    pub tick_after: i32,
}

/// The pool capability a vault consumes.
///
/// Token custody is not part of this trait: `mint`, `burn` and `swap`
/// return the amounts to settle and the caller moves the tokens.
pub trait PoolAdapter {
    /// Address the pool's token balances are held under.
    fn address(&self) -> Address;

    fn token0(&self) -> Address;

    fn token1(&self) -> Address;

    fn fee_tier(&self) -> FeeTier;

    fn tick_spacing(&self) -> i32 {
        self.fee_tier().tick_spacing()
    }

    /// Current tick; fails when the pool has no price yet.
    fn current_tick(&self) -> Result<i32, PoolError>;

    fn sqrt_price(&self) -> Result<Decimal, PoolError>;

    /// Current price of token0 in token1.
    fn price(&self) -> Result<Price, PoolError> {
        let sqrt_price = self.sqrt_price()?;
        Ok(Price::new(sqrt_price * sqrt_price))
    }

    /// Largest liquidity `amount0`/`amount1` can fund in `range` now.
    fn liquidity_for_amounts(
        &self,
        range: TickRange,
        amount0: U256,
        amount1: U256,
    ) -> Result<u128, PoolError> {
        let sqrt_price = self.sqrt_price()?;
        let sqrt_lower = price_tick::tick_to_sqrt_price(range.lower)?;
        let sqrt_upper = price_tick::tick_to_sqrt_price(range.upper)?;
        Ok(
            clmm_vault_domain::math::concentrated_liquidity::get_liquidity_for_amounts(
                sqrt_price, sqrt_lower, sqrt_upper, amount0, amount1,
            )?,
        )
    }

    /// Token amounts `liquidity` represents in `range` now.
    fn amounts_for_liquidity(
        &self,
        range: TickRange,
        liquidity: u128,
        round_up: bool,
    ) -> Result<(U256, U256), PoolError> {
        let sqrt_price = self.sqrt_price()?;
        let sqrt_lower = price_tick::tick_to_sqrt_price(range.lower)?;
        let sqrt_upper = price_tick::tick_to_sqrt_price(range.upper)?;
        Ok(
            clmm_vault_domain::math::concentrated_liquidity::get_amounts_for_liquidity(
                sqrt_price, sqrt_lower, sqrt_upper, liquidity, round_up,
            )?,
        )
    }

    /// Cumulative fees per unit of liquidity earned inside `range`.
    fn fee_growth_inside(&self, range: TickRange) -> Result<FeeGrowth, PoolError>;

    /// Adds `liquidity` to `owner`'s position in `range`; returns the
    /// token amounts owed to the pool.
    fn mint(
        &mut self,
        owner: Address,
        range: TickRange,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError>;

    /// Removes `liquidity` from `owner`'s position in `range`; returns the
    /// token amounts released by the pool.
    fn burn(
        &mut self,
        owner: Address,
        range: TickRange,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError>;

    /// Exact-input swap. `zero_for_one` sells token0 for token1.
    fn swap(
        &mut self,
        zero_for_one: bool,
        amount_in: U256,
        sqrt_price_limit: Option<Decimal>,
    ) -> Result<SwapOutcome, PoolError>;

    /// Saves the current pool state.
    fn checkpoint(&mut self);

    /// Drops the most recent checkpoint, keeping the current state.
    fn commit(&mut self);

    /// Restores the most recent checkpoint.
    fn rollback(&mut self);
}

/// Source of pools for a vault factory.
pub trait PoolRegistry {
    type Pool: PoolAdapter;

    /// Returns the pool for the pair and tier, creating it if needed.
    fn get_or_create_pool(
        &mut self,
        token0: Address,
        token1: Address,
        fee_tier: FeeTier,
    ) -> Result<Self::Pool, PoolError>;
}
