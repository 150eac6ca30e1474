//! Harvest-on-touch fee accounting for one position.
//!
//! The pool only reports cumulative fee growth per unit of liquidity inside a
//! range. A position's earnings since its last touch are
//! `liquidity * (growth_now - growth_last)`; touching folds them into the
//! uncollected balance and moves the snapshot forward.

use clmm_vault_domain::MathError;
use clmm_vault_domain::math::full_math::{mul_decimal_floor, mul_div};
use clmm_vault_simulation::adapter::FeeGrowth;
use primitive_types::U256;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeLedger {
    growth_inside_last: FeeGrowth,
    uncollected0: U256,
    uncollected1: U256,
}

impl FeeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts accrual from `growth`, e.g. right after liquidity is opened.
    pub fn snapshot(&mut self, growth: FeeGrowth) {
        self.growth_inside_last = growth;
    }

    pub fn growth_inside_last(&self) -> FeeGrowth {
        self.growth_inside_last
    }

    pub fn uncollected(&self) -> (U256, U256) {
        (self.uncollected0, self.uncollected1)
    }

    /// Fees earned since the last touch, not yet folded in.
    pub fn pending(&self, liquidity: u128, growth_now: FeeGrowth) -> Result<(U256, U256), MathError> {
        if liquidity == 0 {
            return Ok((U256::zero(), U256::zero()));
        }
        let liquidity = U256::from(liquidity);
        let delta = growth_now - self.growth_inside_last;
        Ok((
            mul_decimal_floor(liquidity, delta.token0)?,
            mul_decimal_floor(liquidity, delta.token1)?,
        ))
    }

    /// Uncollected plus pending fees, without touching the ledger.
    pub fn observed(&self, liquidity: u128, growth_now: FeeGrowth) -> Result<(U256, U256), MathError> {
        let (pending0, pending1) = self.pending(liquidity, growth_now)?;
        Ok((
            self.uncollected0 + pending0,
            self.uncollected1 + pending1,
        ))
    }

    /// Folds pending fees into the uncollected balance.
    pub fn accrue(&mut self, liquidity: u128, growth_now: FeeGrowth) -> Result<(), MathError> {
        let (pending0, pending1) = self.pending(liquidity, growth_now)?;
        self.uncollected0 = self
            .uncollected0
            .checked_add(pending0)
            .ok_or(MathError::Overflow("uncollected fees"))?;
        self.uncollected1 = self
            .uncollected1
            .checked_add(pending1)
            .ok_or(MathError::Overflow("uncollected fees"))?;
        self.growth_inside_last = growth_now;
        Ok(())
    }

    /// Empties the uncollected balance.
    pub fn take_all(&mut self) -> (U256, U256) {
        let taken = (self.uncollected0, self.uncollected1);
        self.uncollected0 = U256::zero();
        self.uncollected1 = U256::zero();
        taken
    }

    /// Takes `numerator / denominator` of the uncollected balance, rounded
    /// down.
    pub fn take_fraction(
        &mut self,
        numerator: U256,
        denominator: U256,
    ) -> Result<(U256, U256), MathError> {
        if numerator >= denominator {
            return Ok(self.take_all());
        }
        let fee0 = mul_div(self.uncollected0, numerator, denominator)?;
        let fee1 = mul_div(self.uncollected1, numerator, denominator)?;
        self.uncollected0 -= fee0;
        self.uncollected1 -= fee1;
        Ok((fee0, fee1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_accrue_moves_snapshot() {
        let mut ledger = FeeLedger::new();
        ledger.snapshot(FeeGrowth::new(dec!(0.001), dec!(0)));

        let now = FeeGrowth::new(dec!(0.0015), dec!(0.0002));
        let pending = ledger.pending(1_000_000, now).unwrap();
        assert_eq!(pending, (U256::from(500u64), U256::from(200u64)));

        ledger.accrue(1_000_000, now).unwrap();
        assert_eq!(ledger.uncollected(), (U256::from(500u64), U256::from(200u64)));
        // nothing new since the touch
        assert_eq!(
            ledger.pending(1_000_000, now).unwrap(),
            (U256::zero(), U256::zero())
        );
    }

    #[test]
    fn test_observed_does_not_harvest() {
        let mut ledger = FeeLedger::new();
        ledger.accrue(10, FeeGrowth::new(dec!(1), dec!(1))).unwrap();
        let later = FeeGrowth::new(dec!(3), dec!(1));
        assert_eq!(
            ledger.observed(10, later).unwrap(),
            (U256::from(30u64), U256::from(10u64))
        );
        assert_eq!(ledger.uncollected(), (U256::from(10u64), U256::from(10u64)));
    }

    #[test]
    fn test_take_fraction_then_all() {
        let mut ledger = FeeLedger::new();
        ledger.accrue(100, FeeGrowth::new(dec!(1), dec!(0.33))).unwrap();
        // 100 and 33 uncollected
        let part = ledger
            .take_fraction(U256::from(1u64), U256::from(3u64))
            .unwrap();
        assert_eq!(part, (U256::from(33u64), U256::from(11u64)));
        assert_eq!(ledger.take_all(), (U256::from(67u64), U256::from(22u64)));
        assert_eq!(ledger.uncollected(), (U256::zero(), U256::zero()));
    }

    #[test]
    fn test_accrual_for_liquidity_past_decimal_range() {
        let mut ledger = FeeLedger::new();
        // u128::MAX is about 3.4e38, well past the largest Decimal
        let growth = FeeGrowth::new(dec!(0.5), dec!(0));
        ledger.accrue(u128::MAX, growth).unwrap();
        assert_eq!(ledger.uncollected().0, U256::from(u128::MAX) / U256::from(2u64));
        assert_eq!(ledger.uncollected().1, U256::zero());
    }
}
