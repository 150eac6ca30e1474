//! Concentrated-liquidity pool simulation.
//!
//! Within a single tick range the pool behaves as a constant product AMM
//! parameterised by `sqrt(P)` and `L`. Swaps walk initialized ticks one at
//! a time, charging the fee on each step's input and crossing tick
//! boundaries as the price moves.
//!
//! # Fee Tracking
//!
//! A global fee growth counter per token records fees per unit of active
//! liquidity. Each initialized tick stores the growth seen on its far side
//! so the growth inside any range can be derived at any time.
//!
//! The pool keeps no token balances: callers settle the amounts returned by
//! `mint`, `burn` and `swap` themselves.

use crate::adapter::{FeeGrowth, PoolAdapter, SwapOutcome};
use crate::error::PoolError;
use clmm_vault_domain::fees::FEE_DENOMINATOR;
use clmm_vault_domain::math::concentrated_liquidity::get_amounts_for_liquidity;
use clmm_vault_domain::math::full_math::{
    decimal_to_u256_ceil, decimal_to_u256_floor, u256_to_decimal,
};
use clmm_vault_domain::math::price_tick::{
    MAX_TICK, MIN_TICK, sqrt_price_to_tick, tick_to_sqrt_price,
};
use clmm_vault_domain::{Address, FeeTier, MathError, TickRange};
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Per-tick state stored in the tick map.
#[derive(Debug, Clone, Default, PartialEq)]
struct TickState {
    /// Total liquidity referencing this tick.
    liquidity_gross: u128,
    /// Net liquidity change when crossing this tick left-to-right.
    liquidity_net: i128,
    /// Fee growth on the other side of this tick from the current price.
    fee_growth_outside: FeeGrowth,
}

#[derive(Debug, Clone, PartialEq)]
struct PoolState {
    initialized: bool,
    sqrt_price: Decimal,
    current_tick: i32,
    /// Liquidity active at `current_tick`.
    liquidity: u128,
    fee_growth_global: FeeGrowth,
    ticks: BTreeMap<i32, TickState>,
    positions: HashMap<(Address, i32, i32), u128>,
}

impl Default for PoolState {
    fn default() -> Self {
        Self {
            initialized: false,
            sqrt_price: Decimal::ZERO,
            current_tick: 0,
            liquidity: 0,
            fee_growth_global: FeeGrowth::ZERO,
            ticks: BTreeMap::new(),
            positions: HashMap::new(),
        }
    }
}

/// A concentrated-liquidity pool for one token pair and fee tier.
#[derive(Debug, Clone)]
pub struct SimulatedPool {
    address: Address,
    token0: Address,
    token1: Address,
    fee_tier: FeeTier,
    state: PoolState,
    checkpoints: Vec<PoolState>,
}

impl SimulatedPool {
    /// Creates an uninitialized pool. `token0` must sort below `token1`.
    pub fn new(address: Address, token0: Address, token1: Address, fee_tier: FeeTier) -> Self {
        Self {
            address,
            token0,
            token1,
            fee_tier,
            state: PoolState::default(),
            checkpoints: Vec::new(),
        }
    }

    /// Sets the starting price (token0 in token1).
    pub fn initialize(&mut self, price: Decimal) -> Result<(), PoolError> {
        if self.state.initialized {
            return Err(PoolError::AlreadyInitialized);
        }
        if price <= Decimal::ZERO {
            return Err(MathError::NonPositivePrice.into());
        }
        let sqrt_f64 = price
            .to_f64()
            .ok_or(MathError::Overflow("price to f64"))?
            .sqrt();
        let sqrt_price = Decimal::from_f64(sqrt_f64).ok_or(MathError::Overflow("sqrt price"))?;
        self.initialize_sqrt(sqrt_price)
    }

    fn initialize_sqrt(&mut self, sqrt_price: Decimal) -> Result<(), PoolError> {
        let tick = sqrt_price_to_tick(sqrt_price)?;
        self.state.sqrt_price = sqrt_price;
        self.state.current_tick = tick;
        self.state.initialized = true;
        debug!(pool = ?self.address, tick, %sqrt_price, "pool initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    /// Liquidity active at the current tick.
    pub fn active_liquidity(&self) -> u128 {
        self.state.liquidity
    }

    pub fn fee_growth_global(&self) -> FeeGrowth {
        self.state.fee_growth_global
    }

    /// Liquidity `owner` holds in `range`.
    pub fn position_liquidity(&self, owner: Address, range: TickRange) -> u128 {
        self.state
            .positions
            .get(&(owner, range.lower, range.upper))
            .copied()
            .unwrap_or(0)
    }

    /// Number of initialized ticks.
    pub fn initialized_ticks(&self) -> usize {
        self.state.ticks.len()
    }

    fn require_initialized(&self) -> Result<(), PoolError> {
        if !self.state.initialized {
            return Err(PoolError::NotInitialized);
        }
        Ok(())
    }

    fn check_range(&self, range: TickRange) -> Result<(), PoolError> {
        if !range.is_valid(self.fee_tier.tick_spacing()) {
            return Err(PoolError::InvalidTickRange {
                lower: range.lower,
                upper: range.upper,
            });
        }
        Ok(())
    }

    fn update_tick(&mut self, tick: i32, delta: i128, upper: bool) -> Result<(), PoolError> {
        let state = &mut self.state;
        let global = state.fee_growth_global;
        let current_tick = state.current_tick;
        let entry = state.ticks.entry(tick).or_insert_with(|| TickState {
            // growth below the current tick is assumed to have happened below
            fee_growth_outside: if tick <= current_tick {
                global
            } else {
                FeeGrowth::ZERO
            },
            ..TickState::default()
        });

        let gross = if delta >= 0 {
            entry.liquidity_gross.checked_add(delta.unsigned_abs())
        } else {
            entry.liquidity_gross.checked_sub(delta.unsigned_abs())
        }
        .ok_or(MathError::Overflow("tick liquidity gross"))?;
        let net_delta = if upper { -delta } else { delta };
        entry.liquidity_net = entry
            .liquidity_net
            .checked_add(net_delta)
            .ok_or(MathError::Overflow("tick liquidity net"))?;
        entry.liquidity_gross = gross;

        if gross == 0 {
            state.ticks.remove(&tick);
        }
        Ok(())
    }

    fn modify_position(
        &mut self,
        owner: Address,
        range: TickRange,
        delta: i128,
    ) -> Result<(), PoolError> {
        self.update_tick(range.lower, delta, false)?;
        self.update_tick(range.upper, delta, true)?;

        if range.contains(self.state.current_tick) {
            let active = i128::try_from(self.state.liquidity)
                .map_err(|_| MathError::Overflow("active liquidity"))?;
            let active = active
                .checked_add(delta)
                .ok_or(MathError::Overflow("active liquidity"))?;
            self.state.liquidity =
                u128::try_from(active).map_err(|_| MathError::Overflow("active liquidity"))?;
        }

        let key = (owner, range.lower, range.upper);
        let held = self.state.positions.get(&key).copied().unwrap_or(0);
        let held = if delta >= 0 {
            held.checked_add(delta.unsigned_abs())
        } else {
            held.checked_sub(delta.unsigned_abs())
        }
        .ok_or(MathError::Overflow("position liquidity"))?;
        if held == 0 {
            self.state.positions.remove(&key);
        } else {
            self.state.positions.insert(key, held);
        }
        Ok(())
    }

    fn cross_tick(&mut self, tick: i32, zero_for_one: bool) -> Result<(), PoolError> {
        let global = self.state.fee_growth_global;
        if let Some(state) = self.state.ticks.get_mut(&tick) {
            state.fee_growth_outside = global - state.fee_growth_outside;

            let active = i128::try_from(self.state.liquidity)
                .map_err(|_| MathError::Overflow("active liquidity"))?;
            // moving down applies the net change in reverse
            let active = if zero_for_one {
                active.checked_sub(state.liquidity_net)
            } else {
                active.checked_add(state.liquidity_net)
            }
            .ok_or(MathError::Overflow("active liquidity"))?;
            self.state.liquidity =
                u128::try_from(active).map_err(|_| MathError::Overflow("active liquidity"))?;
        }
        Ok(())
    }

    /// Next initialized tick in the swap direction: at or below the current
    /// tick when the price falls, strictly above it when it rises.
    fn next_initialized_tick(&self, zero_for_one: bool) -> Option<i32> {
        let current = self.state.current_tick;
        if zero_for_one {
            self.state
                .ticks
                .range(..=current)
                .next_back()
                .map(|(&t, _)| t)
        } else {
            self.state
                .ticks
                .range((
                    std::ops::Bound::Excluded(current),
                    std::ops::Bound::Unbounded,
                ))
                .next()
                .map(|(&t, _)| t)
        }
    }

    fn execute_swap(
        &mut self,
        zero_for_one: bool,
        amount_in: U256,
        sqrt_price_limit: Option<Decimal>,
    ) -> Result<SwapOutcome, PoolError> {
        let fee_rate = Decimal::from(self.fee_tier.fee()) / Decimal::from(FEE_DENOMINATOR);
        let one_minus_fee = Decimal::ONE - fee_rate;
        let bound = if zero_for_one {
            tick_to_sqrt_price(MIN_TICK)?
        } else {
            tick_to_sqrt_price(MAX_TICK)?
        };

        if let Some(limit) = sqrt_price_limit {
            let valid = if zero_for_one {
                limit < self.state.sqrt_price && limit > bound
            } else {
                limit > self.state.sqrt_price && limit < bound
            };
            if !valid {
                return Err(PoolError::InvalidPriceLimit);
            }
        }

        let mut remaining = u256_to_decimal(amount_in)?;
        let mut total_in = Decimal::ZERO;
        let mut total_out = Decimal::ZERO;
        let mut total_fee = Decimal::ZERO;

        while remaining > Decimal::ZERO {
            let sqrt_price = self.state.sqrt_price;
            let next_tick = self.next_initialized_tick(zero_for_one);
            let tick_target = match next_tick {
                Some(t) => tick_to_sqrt_price(t)?,
                None => bound,
            };
            let (target, limited) = match sqrt_price_limit {
                Some(limit) if zero_for_one && limit > tick_target => (limit, true),
                Some(limit) if !zero_for_one && limit < tick_target => (limit, true),
                _ => (tick_target, false),
            };

            let liquidity = Decimal::from_u128(self.state.liquidity)
                .ok_or(MathError::Overflow("active liquidity"))?;

            // input (net of fee) that moves the price all the way to target;
            // None when the span is too wide to represent
            let max_net = if zero_for_one {
                amount0_span(liquidity, target, sqrt_price)
            } else {
                amount1_span(liquidity, sqrt_price, target)
            };
            let reach = max_net.and_then(|max_net| {
                let gross = max_net.checked_div(one_minus_fee)?;
                (remaining >= gross).then_some((max_net, gross))
            });

            let (fee, consumed, new_sqrt_price) = match reach {
                Some((max_net, gross)) => (gross - max_net, gross, target),
                None => {
                    let fee = remaining * fee_rate;
                    let net = remaining - fee;
                    let new_sqrt_price = if zero_for_one {
                        // 1/sqrt_new = 1/sqrt + net/L
                        let shift = net
                            .checked_mul(sqrt_price)
                            .and_then(|v| v.checked_div(liquidity))
                            .ok_or(MathError::Overflow("swap step"))?;
                        sqrt_price / (Decimal::ONE + shift)
                    } else {
                        sqrt_price + net / liquidity
                    };
                    (fee, remaining, new_sqrt_price)
                }
            };

            let out = if zero_for_one {
                amount1_span(liquidity, new_sqrt_price, sqrt_price)
            } else {
                amount0_span(liquidity, sqrt_price, new_sqrt_price)
            }
            .ok_or(MathError::Overflow("swap output"))?;

            if !liquidity.is_zero() {
                let growth = fee / liquidity;
                if zero_for_one {
                    self.state.fee_growth_global.token0 += growth;
                } else {
                    self.state.fee_growth_global.token1 += growth;
                }
            }

            remaining -= consumed;
            total_in += consumed;
            total_out += out;
            total_fee += fee;
            self.state.sqrt_price = new_sqrt_price;

            match (reach.is_some(), limited, next_tick) {
                (true, false, Some(t)) => {
                    self.cross_tick(t, zero_for_one)?;
                    self.state.current_tick = if zero_for_one { t - 1 } else { t };
                }
                (true, false, None) => {
                    self.state.current_tick = if zero_for_one { MIN_TICK } else { MAX_TICK };
                    break;
                }
                _ => {
                    self.state.current_tick = sqrt_price_to_tick(new_sqrt_price)?;
                    break;
                }
            }
        }

        if total_in.is_zero() {
            return Err(PoolError::InsufficientLiquidity);
        }

        let amount_in = decimal_to_u256_ceil(total_in)?.min(amount_in);
        let amount_out = decimal_to_u256_floor(total_out)?;
        let fee = decimal_to_u256_ceil(total_fee)?;

        Ok(SwapOutcome {
            zero_for_one,
            amount_in,
            amount_out,
            fee,
            tick_after: self.state.current_tick,
        })
    }
}

/// `L * (1/lower - 1/upper)`, unrounded.
fn amount0_span(liquidity: Decimal, lower: Decimal, upper: Decimal) -> Option<Decimal> {
    if liquidity.is_zero() || lower >= upper {
        return Some(Decimal::ZERO);
    }
    liquidity
        .checked_mul(upper - lower)
        .and_then(|v| v.checked_div(lower))
        .and_then(|v| v.checked_div(upper))
}

/// `L * (upper - lower)`, unrounded.
fn amount1_span(liquidity: Decimal, lower: Decimal, upper: Decimal) -> Option<Decimal> {
    if liquidity.is_zero() || lower >= upper {
        return Some(Decimal::ZERO);
    }
    liquidity.checked_mul(upper - lower)
}

impl PoolAdapter for SimulatedPool {
    fn address(&self) -> Address {
        self.address
    }

    fn token0(&self) -> Address {
        self.token0
    }

    fn token1(&self) -> Address {
        self.token1
    }

    fn fee_tier(&self) -> FeeTier {
        self.fee_tier
    }

    fn current_tick(&self) -> Result<i32, PoolError> {
        self.require_initialized()?;
        Ok(self.state.current_tick)
    }

    fn sqrt_price(&self) -> Result<Decimal, PoolError> {
        self.require_initialized()?;
        Ok(self.state.sqrt_price)
    }

    fn fee_growth_inside(&self, range: TickRange) -> Result<FeeGrowth, PoolError> {
        self.require_initialized()?;
        let global = self.state.fee_growth_global;
        let current = self.state.current_tick;
        let outside = |tick: i32| {
            self.state
                .ticks
                .get(&tick)
                .map_or(FeeGrowth::ZERO, |t| t.fee_growth_outside)
        };

        let below = if current >= range.lower {
            outside(range.lower)
        } else {
            global - outside(range.lower)
        };
        let above = if current < range.upper {
            outside(range.upper)
        } else {
            global - outside(range.upper)
        };

        Ok(global - below - above)
    }

    fn mint(
        &mut self,
        owner: Address,
        range: TickRange,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError> {
        self.require_initialized()?;
        self.check_range(range)?;
        if liquidity == 0 {
            return Err(PoolError::ZeroLiquidity);
        }
        let delta =
            i128::try_from(liquidity).map_err(|_| MathError::Overflow("liquidity delta"))?;

        let amounts = get_amounts_for_liquidity(
            self.state.sqrt_price,
            tick_to_sqrt_price(range.lower)?,
            tick_to_sqrt_price(range.upper)?,
            liquidity,
            true,
        )?;
        self.modify_position(owner, range, delta)?;

        debug!(
            pool = ?self.address,
            owner = ?owner,
            range = %range,
            liquidity,
            amount0 = %amounts.0,
            amount1 = %amounts.1,
            "liquidity minted"
        );
        Ok(amounts)
    }

    fn burn(
        &mut self,
        owner: Address,
        range: TickRange,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError> {
        self.require_initialized()?;
        if liquidity == 0 {
            return Ok((U256::zero(), U256::zero()));
        }
        let available = self.position_liquidity(owner, range);
        if available < liquidity {
            return Err(PoolError::InsufficientPositionLiquidity {
                owner,
                available,
                requested: liquidity,
            });
        }
        let delta =
            i128::try_from(liquidity).map_err(|_| MathError::Overflow("liquidity delta"))?;

        let amounts = get_amounts_for_liquidity(
            self.state.sqrt_price,
            tick_to_sqrt_price(range.lower)?,
            tick_to_sqrt_price(range.upper)?,
            liquidity,
            false,
        )?;
        self.modify_position(owner, range, -delta)?;

        debug!(
            pool = ?self.address,
            owner = ?owner,
            range = %range,
            liquidity,
            amount0 = %amounts.0,
            amount1 = %amounts.1,
            "liquidity burned"
        );
        Ok(amounts)
    }

    fn swap(
        &mut self,
        zero_for_one: bool,
        amount_in: U256,
        sqrt_price_limit: Option<Decimal>,
    ) -> Result<SwapOutcome, PoolError> {
        self.require_initialized()?;
        if amount_in.is_zero() {
            return Err(PoolError::InsufficientLiquidity);
        }

        let saved = self.state.clone();
        match self.execute_swap(zero_for_one, amount_in, sqrt_price_limit) {
            Ok(outcome) => {
                debug!(
                    pool = ?self.address,
                    zero_for_one,
                    amount_in = %outcome.amount_in,
                    amount_out = %outcome.amount_out,
                    tick = outcome.tick_after,
                    "swap executed"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.state = saved;
                Err(e)
            }
        }
    }

    fn checkpoint(&mut self) {
        self.checkpoints.push(self.state.clone());
    }

    fn commit(&mut self) {
        self.checkpoints.pop();
    }

    fn rollback(&mut self) {
        if let Some(state) = self.checkpoints.pop() {
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lp() -> Address {
        Address::from_low_u64_be(0xc0)
    }

    fn pool_at_one() -> SimulatedPool {
        let mut pool = SimulatedPool::new(
            Address::from_low_u64_be(0xaa),
            Address::from_low_u64_be(1),
            Address::from_low_u64_be(2),
            FeeTier::Medium,
        );
        pool.initialize(Decimal::ONE).unwrap();
        pool
    }

    fn full_range() -> TickRange {
        TickRange::new(-887_220, 887_220)
    }

    #[test]
    fn test_uninitialized_pool_rejects_reads() {
        let pool = SimulatedPool::new(
            Address::from_low_u64_be(0xaa),
            Address::from_low_u64_be(1),
            Address::from_low_u64_be(2),
            FeeTier::Medium,
        );
        assert_eq!(pool.current_tick(), Err(PoolError::NotInitialized));
    }

    #[test]
    fn test_mint_full_range_at_one() {
        let mut pool = pool_at_one();
        let (a0, a1) = pool.mint(lp(), full_range(), 1_000_000_000).unwrap();

        // both sides close to L at price 1
        assert!(a0 > U256::from(999_999_000u64) && a0 <= U256::from(1_000_000_001u64));
        assert!(a1 > U256::from(999_999_000u64) && a1 <= U256::from(1_000_000_001u64));
        assert_eq!(pool.active_liquidity(), 1_000_000_000);
        assert_eq!(pool.initialized_ticks(), 2);
    }

    #[test]
    fn test_mint_rejects_misaligned_range() {
        let mut pool = pool_at_one();
        let err = pool.mint(lp(), TickRange::new(-1000, 1800), 1_000).unwrap_err();
        assert_eq!(
            err,
            PoolError::InvalidTickRange {
                lower: -1000,
                upper: 1800
            }
        );
    }

    #[test]
    fn test_range_out_of_price_is_single_sided() {
        let mut pool = pool_at_one();
        // entirely above the price: token0 only
        let (a0, a1) = pool.mint(lp(), TickRange::new(60, 600), 1_000_000).unwrap();
        assert!(a0 > U256::zero());
        assert!(a1.is_zero());
        // entirely below: token1 only
        let (b0, b1) = pool.mint(lp(), TickRange::new(-600, -60), 1_000_000).unwrap();
        assert!(b0.is_zero());
        assert!(b1 > U256::zero());
        // neither is active
        assert_eq!(pool.active_liquidity(), 0);
    }

    #[test]
    fn test_burn_returns_no_more_than_minted() {
        let mut pool = pool_at_one();
        let range = TickRange::new(-600, 600);
        let (m0, m1) = pool.mint(lp(), range, 5_000_000).unwrap();
        let (b0, b1) = pool.burn(lp(), range, 5_000_000).unwrap();
        assert!(b0 <= m0 && b1 <= m1);
        assert_eq!(pool.position_liquidity(lp(), range), 0);
        assert_eq!(pool.initialized_ticks(), 0);
        assert_eq!(pool.active_liquidity(), 0);
    }

    #[test]
    fn test_burn_more_than_held() {
        let mut pool = pool_at_one();
        let range = TickRange::new(-600, 600);
        pool.mint(lp(), range, 100).unwrap();
        let err = pool.burn(lp(), range, 101).unwrap_err();
        assert!(matches!(
            err,
            PoolError::InsufficientPositionLiquidity { available: 100, .. }
        ));
        // burning zero is a no-op
        assert_eq!(
            pool.burn(lp(), range, 0).unwrap(),
            (U256::zero(), U256::zero())
        );
    }

    #[test]
    fn test_swap_moves_price_and_accrues_fees() {
        let mut pool = pool_at_one();
        pool.mint(lp(), full_range(), 1_000_000_000_000).unwrap();

        let out = pool.swap(true, U256::from(1_000_000_000u64), None).unwrap();
        assert_eq!(out.amount_in, U256::from(1_000_000_000u64));
        // 0.3% fee, then a little slippage
        assert!(out.amount_out < U256::from(997_000_000u64));
        assert!(out.amount_out > U256::from(995_000_000u64));
        assert!(pool.current_tick().unwrap() < 0);
        assert!(pool.fee_growth_global().token0 > Decimal::ZERO);
        assert!(pool.fee_growth_global().token1.is_zero());

        let back = pool.swap(false, U256::from(1_000_000_000u64), None).unwrap();
        assert!(back.amount_out > U256::zero());
        assert!(pool.fee_growth_global().token1 > Decimal::ZERO);
    }

    #[test]
    fn test_swap_crosses_ticks() {
        let mut pool = pool_at_one();
        pool.mint(lp(), full_range(), 1_000_000_000).unwrap();
        let narrow = TickRange::new(-120, 0);
        pool.mint(lp(), narrow, 50_000_000_000).unwrap();
        // tick 0 is the upper edge, so the narrow range is not active yet
        assert_eq!(pool.active_liquidity(), 1_000_000_000);

        // crossing into the narrow range and past it
        pool.swap(true, U256::from(1_000_000_000u64), None).unwrap();
        assert!(pool.current_tick().unwrap() < -120);
        assert_eq!(pool.active_liquidity(), 1_000_000_000);
    }

    #[test]
    fn test_swap_respects_price_limit() {
        let mut pool = pool_at_one();
        pool.mint(lp(), full_range(), 1_000_000_000).unwrap();
        let limit = tick_to_sqrt_price(-60).unwrap();
        let out = pool.swap(true, U256::from(500_000_000u64), Some(limit)).unwrap();
        assert!(out.amount_in < U256::from(500_000_000u64));
        assert_eq!(pool.sqrt_price().unwrap(), limit);
        assert_eq!(pool.current_tick().unwrap(), -60);

        assert_eq!(
            pool.swap(true, U256::from(1u64), Some(dec!(2))),
            Err(PoolError::InvalidPriceLimit)
        );
    }

    #[test]
    fn test_swap_without_liquidity_fails_cleanly() {
        let mut pool = pool_at_one();
        let before = pool.sqrt_price().unwrap();
        assert_eq!(
            pool.swap(true, U256::from(1_000u64), None),
            Err(PoolError::InsufficientLiquidity)
        );
        assert_eq!(pool.sqrt_price().unwrap(), before);
    }

    #[test]
    fn test_fee_growth_inside_tracks_active_range() {
        let mut pool = pool_at_one();
        pool.mint(lp(), full_range(), 1_000_000_000_000).unwrap();
        let inside = TickRange::new(-600, 600);
        let outside = TickRange::new(600, 1200);
        pool.mint(lp(), inside, 1_000_000).unwrap();
        pool.mint(lp(), outside, 1_000_000).unwrap();

        pool.swap(true, U256::from(1_000_000u64), None).unwrap();

        let g_inside = pool.fee_growth_inside(inside).unwrap();
        let g_outside = pool.fee_growth_inside(outside).unwrap();
        assert!(g_inside.token0 > Decimal::ZERO);
        assert!(g_outside.token0.is_zero());
    }

    #[test]
    fn test_checkpoint_rollback() {
        let mut pool = pool_at_one();
        pool.mint(lp(), full_range(), 1_000_000_000).unwrap();
        pool.checkpoint();
        pool.swap(true, U256::from(1_000_000u64), None).unwrap();
        assert!(pool.current_tick().unwrap() < 0);
        pool.rollback();
        assert_eq!(pool.current_tick().unwrap(), 0);
        assert_eq!(pool.sqrt_price().unwrap(), Decimal::ONE);
    }
}
