//! Full-precision integer helpers.
//!
//! Share and fee accounting multiplies two 256-bit quantities before
//! dividing, so the product is carried in 512 bits.

use crate::error::MathError;
use primitive_types::{U256, U512};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// `a * b / denominator`, rounded down.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = a.full_mul(b);
    let result = product / U512::from(denominator);
    U256::try_from(result).map_err(|_| MathError::Overflow("mul_div"))
}

/// `a * b / denominator`, rounded up.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = a.full_mul(b);
    let denominator = U512::from(denominator);
    let mut result = product / denominator;
    if !(product % denominator).is_zero() {
        result += U512::one();
    }
    U256::try_from(result).map_err(|_| MathError::Overflow("mul_div_rounding_up"))
}

/// `a / b`, rounded up.
pub fn div_rounding_up(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let (quotient, remainder) = a.div_mod(b);
    Ok(if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::one()
    })
}

/// Converts a non-negative `Decimal` into Q64.96 fixed point, rounded down.
pub fn decimal_to_q96(value: Decimal) -> Result<U256, MathError> {
    if value.is_sign_negative() {
        return Err(MathError::NonPositivePrice);
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    mul_div(mantissa, U256::one() << 96, U256::exp10(value.scale() as usize))
}

/// `value * factor`, rounded down; negative factors yield zero.
///
/// The product is exact, so `value` is not limited to what a `Decimal` can
/// hold.
pub fn mul_decimal_floor(value: U256, factor: Decimal) -> Result<U256, MathError> {
    if factor.is_sign_negative() || factor.is_zero() {
        return Ok(U256::zero());
    }
    let mantissa = U256::from(factor.mantissa().unsigned_abs());
    mul_div(value, mantissa, U256::exp10(factor.scale() as usize))
}

/// Converts an integer amount into a `Decimal`.
pub fn u256_to_decimal(value: U256) -> Result<Decimal, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow("u256 to decimal"));
    }
    Decimal::from_u128(value.as_u128()).ok_or(MathError::Overflow("u256 to decimal"))
}

/// Truncates a non-negative `Decimal` into an integer amount.
pub fn decimal_to_u256_floor(value: Decimal) -> Result<U256, MathError> {
    if value.is_sign_negative() {
        return Ok(U256::zero());
    }
    let raw = value.floor().to_u128().ok_or(MathError::Overflow("decimal to u256"))?;
    Ok(U256::from(raw))
}

/// Rounds a non-negative `Decimal` up into an integer amount.
pub fn decimal_to_u256_ceil(value: Decimal) -> Result<U256, MathError> {
    if value.is_sign_negative() {
        return Ok(U256::zero());
    }
    let raw = value.ceil().to_u128().ok_or(MathError::Overflow("decimal to u256"))?;
    Ok(U256::from(raw))
}
