use crate::math::price_tick::{MAX_TICK, MIN_TICK};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open tick interval `[lower, upper)` a position provides liquidity in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickRange {
    pub lower: i32,
    pub upper: i32,
}

impl TickRange {
    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    /// Ordered, aligned to `tick_spacing` and inside the priceable ticks.
    pub fn is_valid(&self, tick_spacing: i32) -> bool {
        self.lower < self.upper
            && self.lower >= MIN_TICK
            && self.upper <= MAX_TICK
            && self.lower % tick_spacing == 0
            && self.upper % tick_spacing == 0
    }

    /// Whether the pool is earning fees in this range at `tick`.
    pub fn contains(&self, tick: i32) -> bool {
        tick >= self.lower && tick < self.upper
    }

    /// Whole range sits on one side of `tick`: it may touch the tick at
    /// either edge but never straddles it.
    pub fn is_single_sided(&self, tick: i32) -> bool {
        self.upper <= tick || self.lower >= tick
    }

    pub fn width(&self) -> i32 {
        self.upper - self.lower
    }
}

impl fmt::Display for TickRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
