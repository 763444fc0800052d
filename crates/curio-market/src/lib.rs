//! # curio-market
//!
//! Peer-to-peer marketplace ledger for non-fungible digital assets.
//!
//! This crate provides:
//!
//! - Collection directory for registering external asset collections
//! - Item catalog tracking ownership and listing state
//! - Offer book for off-list purchase negotiation
//! - Settlement engine enforcing atomic, fee-correct sales and claims
//!
//! The core is polymorphic over two capabilities: [`AssetRegistry`]
//! (ownership oracle and transfer executor) and [`curio_token::Ledger`]
//! (payment rails). In-memory implementations of both ship with the
//! workspace so the full system runs without external services.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod events;
pub mod offers;
pub mod registry;
pub mod settlement;
pub mod shared;

pub use catalog::{Item, ItemCatalog, ItemId};
pub use config::MarketConfig;
pub use directory::{CollectionDirectory, CollectionId};
pub use error::MarketError;
pub use events::MarketEvent;
pub use offers::{Offer, OfferBook};
pub use registry::{AssetRegistry, InMemoryRegistry, RegistryError};
pub use settlement::{marketplace_fee, seller_proceeds, Marketplace};
pub use shared::SharedMarketplace;
