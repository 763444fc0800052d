//! Error types for curio token operations.

use thiserror::Error;

/// Result type alias for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Invalid account address format.
    #[error("invalid address: {message}")]
    InvalidAddress {
        /// Description of the address error.
        message: String,
    },

    /// Insufficient balance for a debit.
    #[error("insufficient balance: have {have} units, need {need} units")]
    InsufficientBalance {
        /// Current balance in base units.
        have: u64,
        /// Required balance in base units.
        need: u64,
    },

    /// Invalid amount.
    #[error("invalid amount: {message}")]
    InvalidAmount {
        /// Description of the amount error.
        message: String,
    },

    /// Wallet error.
    #[error("wallet error: {message}")]
    WalletError {
        /// Description of the wallet error.
        message: String,
    },

    /// Balance arithmetic would overflow.
    #[error("balance overflow crediting {amount} units to {account}")]
    BalanceOverflow {
        /// Account being credited.
        account: String,
        /// Amount in base units.
        amount: u64,
    },
}

impl TokenError {
    /// Create an invalid address error.
    #[must_use]
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            message: message.into(),
        }
    }

    /// Create an insufficient balance error.
    #[must_use]
    pub fn insufficient_balance(have: u64, need: u64) -> Self {
        Self::InsufficientBalance { have, need }
    }

    /// Create an invalid amount error.
    #[must_use]
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    /// Create a wallet error.
    #[must_use]
    pub fn wallet_error(message: impl Into<String>) -> Self {
        Self::WalletError {
            message: message.into(),
        }
    }
}
