use crate::error::MathError;
use crate::math::full_math::mul_div;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Whole percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const HUNDRED: Percentage = Percentage(100);

    pub fn new(pct: u8) -> Result<Self, MathError> {
        if pct > 100 {
            return Err(MathError::PercentageOutOfRange(pct));
        }
        Ok(Self(pct))
    }

    /// Clamps `pct` into `0..=100`.
    pub const fn saturating(pct: u8) -> Self {
        if pct > 100 { Self(100) } else { Self(pct) }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Complement to one hundred (`100 - self`).
    pub fn complement(&self) -> Self {
        Self(100 - self.0)
    }

    /// `amount * pct / 100`, truncated.
    pub fn apply(&self, amount: U256) -> Result<U256, MathError> {
        mul_div(amount, U256::from(self.0), U256::from(100u8))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for Percentage {
    type Error = MathError;

    fn try_from(pct: u8) -> Result<Self, Self::Error> {
        Self::new(pct)
    }
}

impl From<Percentage> for u8 {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Percentage::new(100).is_ok());
        assert_eq!(
            Percentage::new(101),
            Err(MathError::PercentageOutOfRange(101))
        );
    }

    #[test]
    fn test_apply_truncates() {
        let ten = Percentage::new(10).unwrap();
        assert_eq!(ten.apply(U256::from(1_005u64)).unwrap(), U256::from(100u64));
        assert_eq!(ten.complement().value(), 90);
        assert_eq!(Percentage::saturating(250), Percentage::HUNDRED);
    }
}
