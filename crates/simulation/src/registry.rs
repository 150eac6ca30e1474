use crate::adapter::PoolRegistry;
use crate::error::PoolError;
use crate::pool::SimulatedPool;
use crate::shared::SharedPool;
use clmm_vault_domain::{Address, FeeTier};
use std::collections::HashMap;
use tracing::info;

/// Pools keyed by `(token0, token1, fee tier)`, created on first request.
///
/// Pools start uninitialized; whoever creates the market sets the price.
#[derive(Debug, Default)]
pub struct SimulatedPoolRegistry {
    pools: HashMap<(Address, Address, FeeTier), SharedPool>,
    created: u64,
}

impl SimulatedPoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an existing pool. Token order does not matter.
    pub fn pool(&self, token_a: Address, token_b: Address, fee_tier: FeeTier) -> Option<SharedPool> {
        let (token0, token1) = clmm_vault_domain::token::sort_tokens(token_a, token_b);
        self.pools.get(&(token0, token1, fee_tier)).cloned()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    fn next_address(&mut self) -> Address {
        self.created += 1;
        // pools live in their own address block
        Address::from_low_u64_be(0x00b0_0000_0000 + self.created)
    }
}

impl PoolRegistry for SimulatedPoolRegistry {
    type Pool = SharedPool;

    fn get_or_create_pool(
        &mut self,
        token_a: Address,
        token_b: Address,
        fee_tier: FeeTier,
    ) -> Result<SharedPool, PoolError> {
        if token_a == token_b {
            return Err(PoolError::IdenticalTokens);
        }
        let (token0, token1) = clmm_vault_domain::token::sort_tokens(token_a, token_b);
        if let Some(pool) = self.pools.get(&(token0, token1, fee_tier)) {
            return Ok(pool.clone());
        }

        let address = self.next_address();
        let pool = SharedPool::new(SimulatedPool::new(address, token0, token1, fee_tier));
        self.pools.insert((token0, token1, fee_tier), pool.clone());
        info!(pool = ?address, token0 = ?token0, token1 = ?token1, fee = fee_tier.fee(), "pool created");
        Ok(pool)
    }
}
