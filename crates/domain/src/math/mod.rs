pub mod concentrated_liquidity;
pub mod full_math;
pub mod price_tick;
