//! Token amount representation.
//!
//! Amounts are stored as base units (1 coin = 10^18 units) so that
//! marketplace prices and fee splits stay exact integer arithmetic;
//! decimal coin conversion exists only for display and test ergonomics.

use crate::error::{Result, TokenError};
use crate::UNITS_PER_COIN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// An amount of curio tokens.
///
/// Internally stored as base units (1 coin = 10^18 units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount {
    units: u64,
}

impl Amount {
    /// Zero tokens.
    pub const ZERO: Self = Self { units: 0 };

    /// Maximum amount (`u64::MAX` base units).
    pub const MAX: Self = Self { units: u64::MAX };

    /// Create an amount from base units.
    #[must_use]
    pub const fn from_units(units: u64) -> Self {
        Self { units }
    }

    /// Create an amount from whole coins.
    ///
    /// # Errors
    ///
    /// Returns an error if the coin count does not fit in `u64` base units.
    pub fn coins(coins: u64) -> Result<Self> {
        let units = coins
            .checked_mul(UNITS_PER_COIN)
            .ok_or_else(|| TokenError::invalid_amount(format!("{coins} coins overflows")))?;
        Ok(Self { units })
    }

    /// Get the amount in base units.
    #[must_use]
    pub const fn units(&self) -> u64 {
        self.units
    }

    /// Get the amount in coins (decimal, lossy above 2^53 units).
    #[must_use]
    pub fn as_coins(&self) -> f64 {
        self.units as f64 / UNITS_PER_COIN as f64
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.units == 0
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(&self, other: Self) -> Self {
        Self {
            units: self.units.saturating_add(other.units),
        }
    }

    /// Saturating subtraction.
    #[must_use]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        Self {
            units: self.units.saturating_sub(other.units),
        }
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(&self, other: Self) -> Option<Self> {
        match self.units.checked_add(other.units) {
            Some(units) => Some(Self { units }),
            None => None,
        }
    }

    /// Checked subtraction.
    #[must_use]
    pub const fn checked_sub(&self, other: Self) -> Option<Self> {
        match self.units.checked_sub(other.units) {
            Some(units) => Some(Self { units }),
            None => None,
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.units % UNITS_PER_COIN == 0 {
            write!(f, "{} CUR", self.units / UNITS_PER_COIN)
        } else {
            write!(f, "{} units", self.units)
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            units: self.units + other.units,
        }
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            units: self.units - other.units,
        }
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self::from_units(units)
    }
}
