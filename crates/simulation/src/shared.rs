use crate::adapter::{FeeGrowth, PoolAdapter, SwapOutcome};
use crate::error::PoolError;
use crate::pool::SimulatedPool;
use clmm_vault_domain::{Address, FeeTier, TickRange};
use primitive_types::U256;
use rust_decimal::Decimal;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Handle to a pool shared by several vaults and traders.
///
/// Clones point at the same pool, so a swap made through one handle moves
/// the price every other handle observes.
#[derive(Debug, Clone)]
pub struct SharedPool(Rc<RefCell<SimulatedPool>>);

impl SharedPool {
    pub fn new(pool: SimulatedPool) -> Self {
        Self(Rc::new(RefCell::new(pool)))
    }

    pub fn borrow(&self) -> Ref<'_, SimulatedPool> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, SimulatedPool> {
        self.0.borrow_mut()
    }

    /// Whether both handles refer to the same pool.
    pub fn ptr_eq(&self, other: &SharedPool) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PoolAdapter for SharedPool {
    fn address(&self) -> Address {
        self.borrow().address()
    }

    fn token0(&self) -> Address {
        self.borrow().token0()
    }

    fn token1(&self) -> Address {
        self.borrow().token1()
    }

    fn fee_tier(&self) -> FeeTier {
        self.borrow().fee_tier()
    }

    fn current_tick(&self) -> Result<i32, PoolError> {
        self.borrow().current_tick()
    }

    fn sqrt_price(&self) -> Result<Decimal, PoolError> {
        self.borrow().sqrt_price()
    }

    fn fee_growth_inside(&self, range: TickRange) -> Result<FeeGrowth, PoolError> {
        self.borrow().fee_growth_inside(range)
    }

    fn mint(
        &mut self,
        owner: Address,
        range: TickRange,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError> {
        self.borrow_mut().mint(owner, range, liquidity)
    }

    fn burn(
        &mut self,
        owner: Address,
        range: TickRange,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError> {
        self.borrow_mut().burn(owner, range, liquidity)
    }

    fn swap(
        &mut self,
        zero_for_one: bool,
        amount_in: U256,
        sqrt_price_limit: Option<Decimal>,
    ) -> Result<SwapOutcome, PoolError> {
        self.borrow_mut()
            .swap(zero_for_one, amount_in, sqrt_price_limit)
    }

    fn checkpoint(&mut self) {
        self.borrow_mut().checkpoint();
    }

    fn commit(&mut self) {
        self.borrow_mut().commit();
    }

    fn rollback(&mut self) {
        self.borrow_mut().rollback();
    }
}
