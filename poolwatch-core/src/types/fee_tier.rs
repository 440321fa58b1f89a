//! Pool fee tier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Fee tier of a concentrated-liquidity pool.
///
/// `fee` is expressed in percent (`0.05` means 0.05%). Two tiers with the
/// same fee but different tick spacing are distinct pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeTier {
    /// Swap fee in percent.
    pub fee: Decimal,
    /// Tick spacing of the pool.
    pub tick_spacing: u16,
}

impl FeeTier {
    /// Creates a fee tier, rejecting negative fees and zero tick spacing.
    pub fn new(fee: Decimal, tick_spacing: u16) -> Result<Self, ValidationError> {
        let tier = Self { fee, tick_spacing };
        tier.check()?;
        Ok(tier)
    }

    /// Validates an already-constructed tier (e.g. one read from config).
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.fee.is_sign_negative() || self.tick_spacing == 0 {
            return Err(ValidationError::InvalidFeeTier(self.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%/{}", self.fee.normalize(), self.tick_spacing)
    }
}
