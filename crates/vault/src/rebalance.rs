//! Rebalancing: tear down both positions, distribute harvested fees,
//! optionally swap idle tokens and redeploy around new ranges.
//!
//! # Fee split
//!
//! Of the harvested fees `F` the vault keeps `F - base_fee(F)`. The
//! distributed slice goes `base_fee_split` percent to the affiliate when one
//! is set and the rest to the fee recipient, so
//! `affiliate + recipient + retained == F` for each token.

use crate::error::VaultError;
use crate::events::{EventData, FeesDistributedData, RebalanceData};
use crate::ledger::TokenBank;
use crate::market;
use crate::position::PositionKind;
use crate::vault::Vault;
use clmm_vault_domain::{Address, MathError, Percentage, TickRange};
use clmm_vault_simulation::adapter::{PoolAdapter, SwapOutcome};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Base range must be ordered, aligned and inside the priceable ticks.
pub fn validate_base(range: TickRange, tick_spacing: i32) -> Result<(), VaultError> {
    if !range.is_valid(tick_spacing) {
        return Err(VaultError::BasePositionInvalid);
    }
    Ok(())
}

/// Limit range must be ordered, aligned and inside the priceable ticks.
pub fn validate_limit(range: TickRange, tick_spacing: i32) -> Result<(), VaultError> {
    if !range.is_valid(tick_spacing) {
        return Err(VaultError::LimitPositionInvalid);
    }
    Ok(())
}

/// Limit range must not straddle `tick`. Touching it at either edge is
/// allowed.
pub fn validate_limit_side(range: TickRange, tick: i32) -> Result<(), VaultError> {
    if !range.is_single_sided(tick) {
        return Err(VaultError::LimitPositionInvalid);
    }
    Ok(())
}

/// Where harvested fees go, per token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDistribution {
    pub recipient0: U256,
    pub recipient1: U256,
    pub affiliate0: U256,
    pub affiliate1: U256,
    /// Stays in the vault as idle balance.
    pub retained0: U256,
    pub retained1: U256,
}

impl FeeDistribution {
    pub fn total0(&self) -> U256 {
        self.recipient0 + self.affiliate0 + self.retained0
    }

    pub fn total1(&self) -> U256 {
        self.recipient1 + self.affiliate1 + self.retained1
    }
}

fn split_one(
    fee: U256,
    base_fee: Percentage,
    base_fee_split: Percentage,
    has_affiliate: bool,
) -> Result<(U256, U256, U256), MathError> {
    let distributed = base_fee.apply(fee)?;
    let affiliate = if has_affiliate {
        base_fee_split.apply(distributed)?
    } else {
        U256::zero()
    };
    Ok((distributed - affiliate, affiliate, fee - distributed))
}

/// Splits harvested fees between the recipient, the affiliate and the vault.
pub fn split_fees(
    fee0: U256,
    fee1: U256,
    base_fee: Percentage,
    base_fee_split: Percentage,
    affiliate: Option<Address>,
) -> Result<FeeDistribution, MathError> {
    let has_affiliate = affiliate.is_some();
    let (recipient0, affiliate0, retained0) = split_one(fee0, base_fee, base_fee_split, has_affiliate)?;
    let (recipient1, affiliate1, retained1) = split_one(fee1, base_fee, base_fee_split, has_affiliate)?;
    Ok(FeeDistribution {
        recipient0,
        recipient1,
        affiliate0,
        affiliate1,
        retained0,
        retained1,
    })
}

/// Outcome of a rebalance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceReport {
    /// Pool tick the new positions were deployed at.
    pub tick: i32,
    pub base: TickRange,
    pub limit: TickRange,
    pub base_liquidity: u128,
    pub limit_liquidity: u128,
    /// Fees harvested from both positions.
    pub fee0: U256,
    pub fee1: U256,
    pub distribution: FeeDistribution,
    pub swap: Option<SwapOutcome>,
    /// Vault holdings after redeployment.
    pub total0: U256,
    pub total1: U256,
}

impl<P: PoolAdapter> Vault<P> {
    /// Withdraws both positions, distributes fees, optionally swaps and
    /// redeploys.
    ///
    /// A positive `swap_quantity` sells that much token0 for token1, a
    /// negative one sells token1 for token0. The limit range is checked
    /// against the tick after the swap.
    pub fn rebalance(
        &mut self,
        bank: &mut TokenBank,
        caller: Address,
        base: TickRange,
        limit: TickRange,
        swap_quantity: i128,
    ) -> Result<RebalanceReport, VaultError> {
        self.ensure_owner(caller, "rebalance")?;
        let tick_spacing = self.pool.tick_spacing();
        validate_base(base, tick_spacing)?;
        validate_limit(limit, tick_spacing)?;
        if swap_quantity == 0 {
            validate_limit_side(limit, self.pool.current_tick()?)?;
        }

        self.atomically(bank, "rebalance", |vault, bank| {
            vault.rebalance_inner(bank, base, limit, swap_quantity)
        })
    }

    fn rebalance_inner(
        &mut self,
        bank: &mut TokenBank,
        base: TickRange,
        limit: TickRange,
        swap_quantity: i128,
    ) -> Result<RebalanceReport, VaultError> {
        let base_out = self
            .positions
            .withdraw_all(PositionKind::Base, &mut self.pool, bank)?;
        let limit_out = self
            .positions
            .withdraw_all(PositionKind::Limit, &mut self.pool, bank)?;
        let fee0 = base_out.fee0 + limit_out.fee0;
        let fee1 = base_out.fee1 + limit_out.fee1;
        debug!(
            vault = ?self.address,
            base_liquidity = base_out.liquidity,
            limit_liquidity = limit_out.liquidity,
            fee0 = %fee0,
            fee1 = %fee1,
            "positions withdrawn"
        );

        let distribution = self.distribute_fees(bank, fee0, fee1)?;

        let swap = if swap_quantity == 0 {
            None
        } else {
            let zero_for_one = swap_quantity > 0;
            let amount = U256::from(swap_quantity.unsigned_abs());
            Some(market::swap_exact_in(
                &mut self.pool,
                bank,
                self.address,
                zero_for_one,
                amount,
                None,
            )?)
        };

        let tick = self.pool.current_tick()?;
        validate_limit_side(limit, tick)?;

        let (idle0, idle1) = self.idle_balances(bank);
        let base_liquidity =
            self.positions
                .deploy(PositionKind::Base, &mut self.pool, bank, base, idle0, idle1)?;
        let (idle0, idle1) = self.idle_balances(bank);
        let limit_liquidity =
            self.positions
                .deploy(PositionKind::Limit, &mut self.pool, bank, limit, idle0, idle1)?;

        let (total0, total1) = self.total_amounts(bank)?;
        self.emit(EventData::Rebalance(RebalanceData {
            tick,
            base,
            limit,
            base_liquidity,
            limit_liquidity,
            fee0,
            fee1,
            total_amount0: total0,
            total_amount1: total1,
            total_supply: self.shares.total_supply(),
        }));
        info!(
            vault = ?self.address,
            tick,
            base = %base,
            limit = %limit,
            base_liquidity,
            limit_liquidity,
            total0 = %total0,
            total1 = %total1,
            "rebalanced"
        );

        Ok(RebalanceReport {
            tick,
            base,
            limit,
            base_liquidity,
            limit_liquidity,
            fee0,
            fee1,
            distribution,
            swap,
            total0,
            total1,
        })
    }

    /// Pays the distributed slice out of the vault's idle balance. The
    /// retained part never moves.
    fn distribute_fees(
        &mut self,
        bank: &mut TokenBank,
        fee0: U256,
        fee1: U256,
    ) -> Result<FeeDistribution, VaultError> {
        let distribution = split_fees(
            fee0,
            fee1,
            self.config.effective_base_fee(),
            self.config.base_fee_split,
            self.affiliate,
        )?;
        if fee0.is_zero() && fee1.is_zero() {
            return Ok(distribution);
        }

        bank.transfer(self.token0, self.address, self.fee_recipient, distribution.recipient0)?;
        bank.transfer(self.token1, self.address, self.fee_recipient, distribution.recipient1)?;
        if let Some(affiliate) = self.affiliate {
            bank.transfer(self.token0, self.address, affiliate, distribution.affiliate0)?;
            bank.transfer(self.token1, self.address, affiliate, distribution.affiliate1)?;
        }

        self.emit(EventData::FeesDistributed(FeesDistributedData {
            fee_recipient: self.fee_recipient,
            recipient_fee0: distribution.recipient0,
            recipient_fee1: distribution.recipient1,
            affiliate: self.affiliate,
            affiliate_fee0: distribution.affiliate0,
            affiliate_fee1: distribution.affiliate1,
            retained_fee0: distribution.retained0,
            retained_fee1: distribution.retained1,
        }));
        info!(
            vault = ?self.address,
            recipient0 = %distribution.recipient0,
            recipient1 = %distribution.recipient1,
            affiliate0 = %distribution.affiliate0,
            affiliate1 = %distribution.affiliate1,
            "fees distributed"
        );
        Ok(distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeeMode, VaultConfig};
    use crate::events::VaultEventType;
    use clmm_vault_domain::FeeTier;
    use clmm_vault_simulation::pool::SimulatedPool;
    use rust_decimal::Decimal;

    const TOKEN0: u64 = 1;
    const TOKEN1: u64 = 2;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn owner() -> Address {
        addr(0x0e)
    }

    fn alice() -> Address {
        addr(0xa1)
    }

    fn units(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn setup() -> (Vault<SimulatedPool>, TokenBank) {
        let mut pool = SimulatedPool::new(addr(0xaa), addr(TOKEN0), addr(TOKEN1), FeeTier::Medium);
        pool.initialize(Decimal::ONE).unwrap();
        let mut bank = TokenBank::new();

        // background liquidity so the vault is not alone in the pool
        let lp = addr(0x10);
        bank.mint(addr(TOKEN0), lp, units(100_000)).unwrap();
        bank.mint(addr(TOKEN1), lp, units(100_000)).unwrap();
        market::provide_liquidity(
            &mut pool,
            &mut bank,
            lp,
            TickRange::new(-887_220, 887_220),
            10_000_000_000_000_000_000_000,
        )
        .unwrap();

        let mut vault = Vault::new(
            addr(0x77),
            owner(),
            pool,
            true,
            true,
            addr(0xfe),
            VaultConfig::default(),
        )
        .unwrap();
        for token in [addr(TOKEN0), addr(TOKEN1)] {
            bank.mint(token, alice(), units(10_000)).unwrap();
            bank.approve(token, alice(), vault.address(), U256::MAX);
        }
        vault
            .deposit(&mut bank, alice(), units(1000), units(1000), alice())
            .unwrap();
        (vault, bank)
    }

    #[test]
    fn test_split_fees_is_exact() {
        let split = split_fees(
            U256::from(1_001u64),
            U256::from(7u64),
            Percentage::saturating(10),
            Percentage::saturating(50),
            Some(addr(0xaf)),
        )
        .unwrap();
        // 10% of 1001 is 100, half of which goes to the affiliate
        assert_eq!(split.recipient0, U256::from(50u64));
        assert_eq!(split.affiliate0, U256::from(50u64));
        assert_eq!(split.retained0, U256::from(901u64));
        assert_eq!(split.total0(), U256::from(1_001u64));
        // the slice of 7 truncates to nothing
        assert_eq!(split.retained1, U256::from(7u64));
        assert_eq!(split.total1(), U256::from(7u64));
    }

    #[test]
    fn test_split_without_affiliate() {
        let split = split_fees(
            U256::from(1_000u64),
            U256::zero(),
            Percentage::saturating(20),
            Percentage::saturating(50),
            None,
        )
        .unwrap();
        assert_eq!(split.recipient0, U256::from(200u64));
        assert!(split.affiliate0.is_zero());
        assert_eq!(split.retained0, U256::from(800u64));
    }

    #[test]
    fn test_ranges_past_the_tick_bounds_are_rejected() {
        // -887_280 is aligned to 60 but below the lowest tick
        let below = TickRange::new(-887_280, 60);
        let above = TickRange::new(-60, 887_280);
        assert_eq!(validate_base(below, 60), Err(VaultError::BasePositionInvalid));
        assert_eq!(validate_base(above, 60), Err(VaultError::BasePositionInvalid));
        assert_eq!(validate_limit(below, 60), Err(VaultError::LimitPositionInvalid));
        assert_eq!(validate_limit(above, 60), Err(VaultError::LimitPositionInvalid));
        assert!(validate_base(TickRange::new(-887_220, 887_220), 60).is_ok());
    }

    #[test]
    fn test_limit_side_validation() {
        assert!(validate_limit_side(TickRange::new(-600, 0), 0).is_ok());
        assert!(validate_limit_side(TickRange::new(0, 600), 0).is_ok());
        assert_eq!(
            validate_limit_side(TickRange::new(-60, 60), 0),
            Err(VaultError::LimitPositionInvalid)
        );
    }

    #[test]
    fn test_rebalance_deploys_idle() {
        let (mut vault, mut bank) = setup();
        let report = vault
            .rebalance(
                &mut bank,
                owner(),
                TickRange::new(-1800, 1800),
                TickRange::new(-600, 0),
                0,
            )
            .unwrap();

        assert!(report.base_liquidity > 0);
        // the base range at parity takes both tokens, the limit gets dust
        let limit = vault.limit_position().unwrap();
        assert!(limit.amount0 + limit.amount1 < units(1) / U256::from(10_000u64));
        let (idle0, idle1) = vault.idle_balances(&bank);
        // only rounding dust stays idle
        assert!(idle0 < units(1) / U256::from(10_000u64));
        assert!(idle1 < units(1) / U256::from(10_000u64));
        assert_eq!(vault.base_position().unwrap().range, TickRange::new(-1800, 1800));
        assert_eq!(vault.events().count_by_type(VaultEventType::Rebalance), 1);
        // nothing was harvested, so nothing was distributed
        assert_eq!(vault.events().count_by_type(VaultEventType::FeesDistributed), 0);
    }

    #[test]
    fn test_rebalance_is_owner_only() {
        let (mut vault, mut bank) = setup();
        assert_eq!(
            vault.rebalance(
                &mut bank,
                alice(),
                TickRange::new(-1800, 1800),
                TickRange::new(-600, 0),
                0
            ),
            Err(VaultError::Unauthorized)
        );
    }

    #[test]
    fn test_rebalance_geometry_errors() {
        let (mut vault, mut bank) = setup();
        let cases = [
            (TickRange::new(1800, 1000), TickRange::new(-600, 0), VaultError::BasePositionInvalid),
            (TickRange::new(-1000, 1800), TickRange::new(-600, 0), VaultError::BasePositionInvalid),
            (TickRange::new(-1800, 1800), TickRange::new(0, -600), VaultError::LimitPositionInvalid),
            (TickRange::new(-1800, 1800), TickRange::new(-600, 50), VaultError::LimitPositionInvalid),
            (TickRange::new(-1800, 1800), TickRange::new(-60, 60), VaultError::LimitPositionInvalid),
        ];
        for (base, limit, expected) in cases {
            assert_eq!(vault.rebalance(&mut bank, owner(), base, limit, 0), Err(expected));
        }
        assert_eq!(vault.events().count_by_type(VaultEventType::Rebalance), 0);
    }

    #[test]
    fn test_swap_that_straddles_limit_reverts() {
        let (mut vault, mut bank) = setup();
        vault
            .rebalance(
                &mut bank,
                owner(),
                TickRange::new(-1800, 1800),
                TickRange::new(-600, 0),
                0,
            )
            .unwrap();
        let before = vault.total_amounts(&bank).unwrap();

        // selling token0 pushes the tick below zero, so [-600, 0] straddles it
        let err = vault
            .rebalance(
                &mut bank,
                owner(),
                TickRange::new(-1800, 1800),
                TickRange::new(-600, 0),
                100_000_000_000_000_000_000,
            )
            .unwrap_err();
        assert_eq!(err, VaultError::LimitPositionInvalid);
        assert_eq!(vault.current_tick().unwrap(), 0);
        assert_eq!(vault.total_amounts(&bank).unwrap(), before);
    }

    #[test]
    fn test_compounding_keeps_fees() {
        let (mut vault, mut bank) = setup();
        vault.set_fee_mode(owner(), FeeMode::Compounding).unwrap();
        vault
            .rebalance(
                &mut bank,
                owner(),
                TickRange::new(-1800, 1800),
                TickRange::new(-600, 0),
                0,
            )
            .unwrap();

        // a round trip through the vault's own liquidity earns fees
        let trader = addr(0xc0);
        bank.mint(addr(TOKEN0), trader, units(1000)).unwrap();
        bank.mint(addr(TOKEN1), trader, units(1000)).unwrap();
        let out = market::swap_exact_in(&mut vault.pool, &mut bank, trader, true, units(10), None).unwrap();
        market::swap_exact_in(&mut vault.pool, &mut bank, trader, false, out.amount_out, None).unwrap();

        // flooring to the spacing keeps the limit range at or below the tick
        let tick = vault.current_tick().unwrap();
        let aligned = tick - tick.rem_euclid(60);
        let limit = TickRange::new(aligned - 600, aligned);
        let report = vault
            .rebalance(&mut bank, owner(), TickRange::new(-1800, 1800), limit, 0)
            .unwrap();
        assert!(report.fee0 > U256::zero());
        assert_eq!(report.distribution.retained0, report.fee0);
        assert_eq!(report.distribution.retained1, report.fee1);
        assert!(bank.balance_of(addr(TOKEN0), addr(0xfe)).is_zero());
    }
}
