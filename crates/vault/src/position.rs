//! Base and limit positions and the operations that move liquidity in and
//! out of them.
//!
//! Every operation that changes a position's liquidity first folds the fees
//! it earned into its [`FeeLedger`]. Token settlement goes through the
//! [`TokenBank`]: minted amounts move from the vault to the pool, burned
//! principal and collected fees move from the pool to the receiver.

use crate::error::VaultError;
use crate::fee_ledger::FeeLedger;
use crate::ledger::TokenBank;
use clmm_vault_domain::math::full_math::mul_div;
use clmm_vault_domain::{Address, TickRange};
use clmm_vault_simulation::adapter::PoolAdapter;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Which of the two vault positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionKind {
    /// Wide range holding the bulk of capital.
    Base,
    /// Narrow single-sided range placed against the current price.
    Limit,
}

impl fmt::Display for PositionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionKind::Base => write!(f, "base"),
            PositionKind::Limit => write!(f, "limit"),
        }
    }
}

/// One of the vault's liquidity positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub kind: PositionKind,
    /// Range of the last deployment; kept after the liquidity is drained.
    pub range: TickRange,
    /// Liquidity currently held in the pool.
    pub liquidity: u128,
    /// Fees earned but not yet paid out of the pool.
    pub fees: FeeLedger,
}

impl Position {
    pub fn new(kind: PositionKind) -> Self {
        Self {
            kind,
            range: TickRange::new(0, 0),
            liquidity: 0,
            fees: FeeLedger::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.liquidity == 0
    }
}

/// Read-only view of a position: liquidity and what it is worth now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionView {
    pub kind: PositionKind,
    pub range: TickRange,
    pub liquidity: u128,
    /// Principal plus uncollected fees in token0.
    pub amount0: U256,
    /// Principal plus uncollected fees in token1.
    pub amount1: U256,
}

/// What came out of a position: principal and fees kept apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Withdrawal {
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
    pub fee0: U256,
    pub fee1: U256,
}

impl Withdrawal {
    pub fn total0(&self) -> U256 {
        self.amount0 + self.fee0
    }

    pub fn total1(&self) -> U256 {
        self.amount1 + self.fee1
    }
}

/// Largest liquidity in `0..=upper` for which `fits` holds.
///
/// `fits` must be monotone: true up to some liquidity and false beyond it.
/// Zero liquidity always fits.
pub fn largest_affordable<E>(
    upper: u128,
    mut fits: impl FnMut(u128) -> Result<bool, E>,
) -> Result<u128, E> {
    if upper == 0 || fits(upper)? {
        return Ok(upper);
    }
    let (mut low, mut high) = (0u128, upper);
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if fits(mid)? {
            low = mid;
        } else {
            high = mid;
        }
    }
    Ok(low)
}

/// Owns the base and limit positions of one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionManager {
    /// Address the positions are held under in the pool.
    owner: Address,
    base: Position,
    limit: Position,
}

impl PositionManager {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            base: Position::new(PositionKind::Base),
            limit: Position::new(PositionKind::Limit),
        }
    }

    pub fn position(&self, kind: PositionKind) -> &Position {
        match kind {
            PositionKind::Base => &self.base,
            PositionKind::Limit => &self.limit,
        }
    }

    fn position_mut(&mut self, kind: PositionKind) -> &mut Position {
        match kind {
            PositionKind::Base => &mut self.base,
            PositionKind::Limit => &mut self.limit,
        }
    }

    /// Principal at the current price plus uncollected fees. Nothing is
    /// harvested.
    pub fn current_amounts<P: PoolAdapter>(
        &self,
        kind: PositionKind,
        pool: &P,
    ) -> Result<(U256, U256), VaultError> {
        let position = self.position(kind);
        let (fee0, fee1) = if position.is_empty() {
            position.fees.uncollected()
        } else {
            let growth = pool.fee_growth_inside(position.range)?;
            position.fees.observed(position.liquidity, growth)?
        };
        let (amount0, amount1) = if position.is_empty() {
            (U256::zero(), U256::zero())
        } else {
            pool.amounts_for_liquidity(position.range, position.liquidity, false)?
        };
        Ok((amount0 + fee0, amount1 + fee1))
    }

    pub fn view<P: PoolAdapter>(
        &self,
        kind: PositionKind,
        pool: &P,
    ) -> Result<PositionView, VaultError> {
        let (amount0, amount1) = self.current_amounts(kind, pool)?;
        let position = self.position(kind);
        Ok(PositionView {
            kind,
            range: position.range,
            liquidity: position.liquidity,
            amount0,
            amount1,
        })
    }

    /// Folds fees earned since the last touch into the position's ledger.
    fn harvest<P: PoolAdapter>(&mut self, kind: PositionKind, pool: &P) -> Result<(), VaultError> {
        let position = self.position_mut(kind);
        if position.is_empty() {
            return Ok(());
        }
        let growth = pool.fee_growth_inside(position.range)?;
        position.fees.accrue(position.liquidity, growth)?;
        Ok(())
    }

    /// Opens `kind` in `range` with as much liquidity as `amount0`/`amount1`
    /// fund. The remainder stays with the vault. Returns the liquidity
    /// minted, which may be zero.
    pub fn deploy<P: PoolAdapter>(
        &mut self,
        kind: PositionKind,
        pool: &mut P,
        bank: &mut TokenBank,
        range: TickRange,
        amount0: U256,
        amount1: U256,
    ) -> Result<u128, VaultError> {
        if !self.position(kind).is_empty() {
            // top up on the existing range is not supported; drain first
            self.withdraw_all(kind, pool, bank)?;
        }

        let estimate = pool.liquidity_for_amounts(range, amount0, amount1)?;
        // minting rounds up, so the estimate may cost a little more than the budget
        let liquidity = largest_affordable(estimate, |candidate| {
            let (cost0, cost1) = pool.amounts_for_liquidity(range, candidate, true)?;
            Ok::<_, VaultError>(cost0 <= amount0 && cost1 <= amount1)
        })?;

        let owner = self.owner;
        {
            let position = self.position_mut(kind);
            position.range = range;
            position.liquidity = 0;
        }
        if liquidity == 0 {
            debug!(position = %kind, range = %range, "nothing to deploy");
            return Ok(0);
        }

        let (paid0, paid1) = pool.mint(owner, range, liquidity)?;
        let pool_address = pool.address();
        bank.transfer(pool.token0(), owner, pool_address, paid0)?;
        bank.transfer(pool.token1(), owner, pool_address, paid1)?;

        let growth = pool.fee_growth_inside(range)?;
        let position = self.position_mut(kind);
        position.liquidity = liquidity;
        position.fees.snapshot(growth);

        debug!(
            position = %kind,
            range = %range,
            liquidity,
            amount0 = %paid0,
            amount1 = %paid1,
            "position deployed"
        );
        Ok(liquidity)
    }

    /// Burns all liquidity of `kind` and collects every fee it earned back
    /// into the vault.
    pub fn withdraw_all<P: PoolAdapter>(
        &mut self,
        kind: PositionKind,
        pool: &mut P,
        bank: &mut TokenBank,
    ) -> Result<Withdrawal, VaultError> {
        let owner = self.owner;
        self.burn_to(kind, pool, bank, U256::one(), U256::one(), owner)
    }

    /// Burns `shares / total_shares` of the liquidity of `kind` and pays
    /// that principal plus the same fraction of its fees to `to`.
    pub fn withdraw_fraction<P: PoolAdapter>(
        &mut self,
        kind: PositionKind,
        pool: &mut P,
        bank: &mut TokenBank,
        shares: U256,
        total_shares: U256,
        to: Address,
    ) -> Result<Withdrawal, VaultError> {
        self.burn_to(kind, pool, bank, shares, total_shares, to)
    }

    fn burn_to<P: PoolAdapter>(
        &mut self,
        kind: PositionKind,
        pool: &mut P,
        bank: &mut TokenBank,
        numerator: U256,
        denominator: U256,
        to: Address,
    ) -> Result<Withdrawal, VaultError> {
        self.harvest(kind, pool)?;

        let owner = self.owner;
        let position = self.position_mut(kind);
        let burn = if numerator >= denominator {
            position.liquidity
        } else {
            mul_div(U256::from(position.liquidity), numerator, denominator)?.as_u128()
        };

        let (amount0, amount1) = pool.burn(owner, position.range, burn)?;
        let (fee0, fee1) = position.fees.take_fraction(numerator, denominator)?;
        position.liquidity -= burn;

        let pool_address = pool.address();
        bank.transfer(pool.token0(), pool_address, to, amount0 + fee0)?;
        bank.transfer(pool.token1(), pool_address, to, amount1 + fee1)?;

        if burn > 0 || !fee0.is_zero() || !fee1.is_zero() {
            debug!(
                position = %kind,
                liquidity = burn,
                amount0 = %amount0,
                amount1 = %amount1,
                fee0 = %fee0,
                fee1 = %fee1,
                "position drawn down"
            );
        }

        Ok(Withdrawal {
            liquidity: burn,
            amount0,
            amount1,
            fee0,
            fee1,
        })
    }
}
