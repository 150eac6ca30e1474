use thiserror::Error;

/// Errors raised by the domain math helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    /// Arithmetic overflowed the target type.
    #[error("math overflow: {0}")]
    Overflow(&'static str),
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// A price or sqrt price was zero or negative.
    #[error("price must be positive")]
    NonPositivePrice,
    /// Tick outside of the supported range.
    #[error("tick {0} out of range")]
    TickOutOfRange(i32),
    /// Percentage outside 0..=100.
    #[error("percentage {0} out of range")]
    PercentageOutOfRange(u8),
    /// Fee tier not supported.
    #[error("unsupported fee tier {0}")]
    UnsupportedFeeTier(u32),
}
