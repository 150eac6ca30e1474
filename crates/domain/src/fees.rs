use crate::error::MathError;
use serde::{Deserialize, Serialize};

/// Pool fee denominator: fees are expressed in hundredths of a basis point.
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Fee tiers a pool can be created with, each bound to its tick spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeeTier {
    /// 0.05%, tick spacing 10.
    Low,
    /// 0.3%, tick spacing 60.
    Medium,
    /// 1%, tick spacing 200.
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 3] = [FeeTier::Low, FeeTier::Medium, FeeTier::High];

    /// Fee in hundredths of a bip (3000 = 0.3%).
    pub const fn fee(self) -> u32 {
        match self {
            FeeTier::Low => 500,
            FeeTier::Medium => 3_000,
            FeeTier::High => 10_000,
        }
    }

    pub const fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }

    /// Resolves a raw fee value into a supported tier.
    pub fn from_fee(fee: u32) -> Result<Self, MathError> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.fee() == fee)
            .ok_or(MathError::UnsupportedFeeTier(fee))
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = MathError;

    fn try_from(fee: u32) -> Result<Self, Self::Error> {
        Self::from_fee(fee)
    }
}
