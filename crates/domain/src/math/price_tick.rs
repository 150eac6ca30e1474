use crate::error::MathError;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Lowest tick a pool accepts.
pub const MIN_TICK: i32 = -887_272;
/// Highest tick a pool accepts.
pub const MAX_TICK: i32 = 887_272;

const BASE: f64 = 1.0001;

fn check_tick(tick: i32) -> Result<(), MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfRange(tick));
    }
    Ok(())
}

/// Returns the price corresponding to a given tick.
/// P = 1.0001 ^ tick
pub fn tick_to_price(tick: i32) -> Result<Decimal, MathError> {
    check_tick(tick)?;
    let price_f64 = BASE.powi(tick);
    Decimal::from_f64(price_f64).ok_or(MathError::Overflow("tick to price"))
}

/// Returns sqrt(P) at a given tick: 1.0001 ^ (tick / 2).
pub fn tick_to_sqrt_price(tick: i32) -> Result<Decimal, MathError> {
    check_tick(tick)?;
    let sqrt_f64 = BASE.powf(f64::from(tick) / 2.0);
    Decimal::from_f64(sqrt_f64).ok_or(MathError::Overflow("tick to sqrt price"))
}

/// Returns the tick corresponding to a given price.
/// tick = log_1.0001(P), rounded to nearest
pub fn price_to_tick(price: Decimal) -> Result<i32, MathError> {
    if price <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }
    let price_f64 = price.to_f64().ok_or(MathError::Overflow("price to f64"))?;
    let tick = price_f64.log(BASE);
    Ok(tick.round() as i32)
}

/// Greatest tick whose sqrt price does not exceed `sqrt_price`.
pub fn sqrt_price_to_tick(sqrt_price: Decimal) -> Result<i32, MathError> {
    if sqrt_price <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }
    let sqrt_f64 = sqrt_price
        .to_f64()
        .ok_or(MathError::Overflow("sqrt price to f64"))?;
    let raw = 2.0 * sqrt_f64.ln() / BASE.ln();
    // f64 noise around exact tick boundaries
    let nearest = raw.round();
    let tick = if (raw - nearest).abs() < 1e-9 {
        nearest
    } else {
        raw.floor()
    };
    let tick = tick as i32;
    check_tick(tick)?;
    Ok(tick)
}
