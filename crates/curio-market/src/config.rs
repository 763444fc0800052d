//! Constructor-time marketplace configuration.

use crate::error::MarketError;
use curio_token::Address;
use serde::{Deserialize, Serialize};

/// Immutable marketplace configuration, fixed at construction.
///
/// `fee_percent` is validated to 0..=100 here; the engine's fee arithmetic
/// relies on that bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Operator identity allowed to withdraw accrued fees.
    pub owner: Address,
    /// The marketplace's own ledger account, where fees accrue.
    pub treasury: Address,
    /// Percentage of each sale price retained by the marketplace.
    pub fee_percent: u8,
}

impl MarketConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidFeePercent`] if `fee_percent` exceeds
    /// 100.
    pub fn new(owner: Address, treasury: Address, fee_percent: u8) -> Result<Self, MarketError> {
        if fee_percent > 100 {
            return Err(MarketError::InvalidFeePercent { fee_percent });
        }
        Ok(Self {
            owner,
            treasury,
            fee_percent,
        })
    }
}
