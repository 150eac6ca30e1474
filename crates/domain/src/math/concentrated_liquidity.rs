//! Amount and liquidity conversions over a sqrt-price range.
//!
//! Prices arrive as `Decimal` square roots and are converted to Q64.96 fixed
//! point, so every product below is exact integer math and amounts are not
//! limited to what a `Decimal` can hold.

use crate::error::MathError;
use crate::math::full_math::{decimal_to_q96, div_rounding_up, mul_div, mul_div_rounding_up};
use primitive_types::U256;
use rust_decimal::Decimal;

fn q96() -> U256 {
    U256::one() << 96
}

fn to_q96(sqrt_price: Decimal) -> Result<U256, MathError> {
    if sqrt_price <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }
    let fixed = decimal_to_q96(sqrt_price)?;
    if fixed.is_zero() {
        return Err(MathError::NonPositivePrice);
    }
    Ok(fixed)
}

fn ordered(sqrt_price_a: Decimal, sqrt_price_b: Decimal) -> Result<(U256, U256), MathError> {
    let a = to_q96(sqrt_price_a)?;
    let b = to_q96(sqrt_price_b)?;
    Ok(if a < b { (a, b) } else { (b, a) })
}

// Liquidity is a u128; anything larger is clamped to the maximum.
fn saturate(liquidity: Result<U256, MathError>) -> Result<u128, MathError> {
    match liquidity {
        Ok(value) if value > U256::from(u128::MAX) => Ok(u128::MAX),
        Ok(value) => Ok(value.as_u128()),
        Err(MathError::Overflow(_)) => Ok(u128::MAX),
        Err(err) => Err(err),
    }
}

fn amount0_delta(liquidity: u128, lower: U256, upper: U256, round_up: bool) -> Result<U256, MathError> {
    if liquidity == 0 || lower == upper {
        return Ok(U256::zero());
    }
    // delta_x = (L << 96) * (upper - lower) / upper / lower
    let numerator = U256::from(liquidity) << 96;
    let span = upper - lower;
    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator, span, upper)?, lower)
    } else {
        Ok(mul_div(numerator, span, upper)? / lower)
    }
}

fn amount1_delta(liquidity: u128, lower: U256, upper: U256, round_up: bool) -> Result<U256, MathError> {
    if liquidity == 0 || lower == upper {
        return Ok(U256::zero());
    }
    let span = upper - lower;
    if round_up {
        mul_div_rounding_up(U256::from(liquidity), span, q96())
    } else {
        mul_div(U256::from(liquidity), span, q96())
    }
}

fn liquidity0(amount0: U256, lower: U256, upper: U256) -> Result<u128, MathError> {
    if lower == upper {
        return Err(MathError::DivisionByZero);
    }
    let intermediate = mul_div(lower, upper, q96())?;
    saturate(mul_div(amount0, intermediate, upper - lower))
}

fn liquidity1(amount1: U256, lower: U256, upper: U256) -> Result<u128, MathError> {
    if lower == upper {
        return Err(MathError::DivisionByZero);
    }
    saturate(mul_div(amount1, q96(), upper - lower))
}

/// Calculates the amount of token0 (x) given liquidity and price range.
/// delta_x = L * (1/sqrt(P_a) - 1/sqrt(P_b))
/// where P_a < P_b
pub fn get_amount0_delta(
    liquidity: u128,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
    round_up: bool,
) -> Result<U256, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b)?;
    amount0_delta(liquidity, lower, upper, round_up)
}

/// Calculates the amount of token1 (y) given liquidity and price range.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a))
/// where P_a < P_b
pub fn get_amount1_delta(
    liquidity: u128,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
    round_up: bool,
) -> Result<U256, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b)?;
    amount1_delta(liquidity, lower, upper, round_up)
}

/// Calculates liquidity for a given amount of token0 and price range
/// L = amount0 * (sqrt(P_a) * sqrt(P_b)) / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount0(
    amount0: U256,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
) -> Result<u128, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b)?;
    liquidity0(amount0, lower, upper)
}

/// Calculates liquidity for a given amount of token1 and price range
/// L = amount1 / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount1(
    amount1: U256,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
) -> Result<u128, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b)?;
    liquidity1(amount1, lower, upper)
}

/// Largest liquidity that the given amounts can fund in `[sqrt_price_a,
/// sqrt_price_b]` at the current `sqrt_price`, clamped to `u128::MAX`.
///
/// Below the range only token0 counts, above it only token1, and inside it
/// the scarcer side limits the result.
pub fn get_liquidity_for_amounts(
    sqrt_price: Decimal,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
    amount0: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b)?;
    let current = to_q96(sqrt_price)?;

    if current <= lower {
        liquidity0(amount0, lower, upper)
    } else if current < upper {
        let from0 = liquidity0(amount0, current, upper)?;
        let from1 = liquidity1(amount1, lower, current)?;
        Ok(from0.min(from1))
    } else {
        liquidity1(amount1, lower, upper)
    }
}

/// Token amounts represented by `liquidity` in `[sqrt_price_a,
/// sqrt_price_b]` at the current `sqrt_price`.
///
/// Minting rounds up (the depositor pays the dust), burning and valuation
/// round down.
pub fn get_amounts_for_liquidity(
    sqrt_price: Decimal,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
    liquidity: u128,
    round_up: bool,
) -> Result<(U256, U256), MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b)?;
    let current = to_q96(sqrt_price)?;

    if current <= lower {
        let amount0 = amount0_delta(liquidity, lower, upper, round_up)?;
        Ok((amount0, U256::zero()))
    } else if current < upper {
        let amount0 = amount0_delta(liquidity, current, upper, round_up)?;
        let amount1 = amount1_delta(liquidity, lower, current, round_up)?;
        Ok((amount0, amount1))
    } else {
        let amount1 = amount1_delta(liquidity, lower, upper, round_up)?;
        Ok((U256::zero(), amount1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_deltas() {
        // Example: Liquidity 1000
        // Price goes from 1 to 4 (sqrt: 1 to 2)
        // delta_y = 1000 * (2 - 1) = 1000
        // delta_x = 1000 * (1/1 - 1/2) = 1000 * 0.5 = 500

        let liquidity = 1000u128;
        let sqrt_p_a = Decimal::from(1);
        let sqrt_p_b = Decimal::from(2);

        let dy = get_amount1_delta(liquidity, sqrt_p_a, sqrt_p_b, false).unwrap();
        assert_eq!(dy.as_u64(), 1000);

        let dx = get_amount0_delta(liquidity, sqrt_p_a, sqrt_p_b, false).unwrap();
        assert_eq!(dx.as_u64(), 500);
    }

    #[test]
    fn test_rounding_direction() {
        // 1000 * (1/1 - 1/1.5) = 333.33..
        let down = get_amount0_delta(1000, dec!(1), dec!(1.5), false).unwrap();
        let up = get_amount0_delta(1000, dec!(1), dec!(1.5), true).unwrap();
        assert_eq!(down.as_u64(), 333);
        assert_eq!(up.as_u64(), 334);
    }

    #[test]
    fn test_get_liquidity() {
        let sqrt_p_a = Decimal::from(1);
        let sqrt_p_b = Decimal::from(2);

        // From previous test: if dx = 500, L should be 1000
        let l = get_liquidity_for_amount0(U256::from(500u64), sqrt_p_a, sqrt_p_b).unwrap();
        assert_eq!(l, 1000);

        // If dy = 1000, L should be 1000
        let l2 = get_liquidity_for_amount1(U256::from(1000u64), sqrt_p_a, sqrt_p_b).unwrap();
        assert_eq!(l2, 1000);
    }

    #[test]
    fn test_liquidity_for_amounts_by_region() {
        let a = dec!(1);
        let b = dec!(2);
        let amount0 = U256::from(500u64);
        let amount1 = U256::from(1000u64);

        // below the range: token0 only
        assert_eq!(
            get_liquidity_for_amounts(dec!(0.5), a, b, amount0, U256::zero()).unwrap(),
            1000
        );
        // above the range: token1 only
        assert_eq!(
            get_liquidity_for_amounts(dec!(3), a, b, U256::zero(), amount1).unwrap(),
            1000
        );
        // inside: scarcer side wins, token1 is missing
        assert_eq!(
            get_liquidity_for_amounts(dec!(1.5), a, b, amount0, U256::zero()).unwrap(),
            0
        );
    }

    #[test]
    fn test_amounts_for_liquidity_inside() {
        // sqrt price 1.5 inside [1, 2]
        // amount0 = 1200 * (2 - 1.5) / (1.5 * 2) = 200
        // amount1 = 1200 * (1.5 - 1) = 600
        let (a0, a1) =
            get_amounts_for_liquidity(dec!(1.5), dec!(1), dec!(2), 1200, false).unwrap();
        assert_eq!(a0.as_u64(), 200);
        assert_eq!(a1.as_u64(), 600);

        let l = get_liquidity_for_amounts(dec!(1.5), dec!(1), dec!(2), a0, a1).unwrap();
        assert_eq!(l, 1200);
    }

    #[test]
    fn test_amounts_beyond_decimal_range() {
        // 10^29 wei per side is past the largest Decimal
        let amount = U256::exp10(29);
        let l = get_liquidity_for_amounts(dec!(1), dec!(0.5), dec!(2), amount, amount).unwrap();
        // token1 limits: 10^29 / (1 - 0.5)
        assert_eq!(l, 200_000_000_000_000_000_000_000_000_000);

        let (a0, a1) = get_amounts_for_liquidity(dec!(1), dec!(0.5), dec!(2), l, true).unwrap();
        assert!(a0 <= amount && a1 <= amount);
        assert_eq!(a1, amount);
    }

    #[test]
    fn test_liquidity_saturates() {
        let l = get_liquidity_for_amount1(U256::MAX, dec!(1), dec!(1.0001)).unwrap();
        assert_eq!(l, u128::MAX);
        assert_eq!(
            get_liquidity_for_amount1(U256::one(), dec!(1), dec!(1)),
            Err(MathError::DivisionByZero)
        );
    }
}
