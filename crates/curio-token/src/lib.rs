//! # curio-token
//!
//! Value primitives and payment rails for the curio marketplace.
//!
//! This crate provides:
//!
//! - [`Amount`]: token amount with fixed-point precision
//! - [`Address`] / [`Wallet`]: account identity and transaction signing
//! - [`Ledger`]: the payment-rails capability consumed by the marketplace,
//!   with [`InMemoryLedger`] as a self-contained backend

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod error;
pub mod ledger;
pub mod wallet;

pub use amount::Amount;
pub use error::TokenError;
pub use ledger::{InMemoryLedger, Ledger};
pub use wallet::{Address, Wallet};

/// Base units per whole coin (wei-scale fixed point).
pub const UNITS_PER_COIN: u64 = 1_000_000_000_000_000_000;
