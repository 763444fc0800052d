//! Error types for curio-market.
//!
//! Every violated precondition has its own variant; a rejected operation
//! never leaves partial state behind. [`MarketError::SettlementFailed`] is
//! the one category that originates outside the marketplace: an external
//! capability (asset registry or ledger) rejecting its part of a settlement.

use crate::catalog::ItemId;
use crate::directory::CollectionId;
use curio_token::Address;
use thiserror::Error;

/// Errors that can occur in marketplace operations.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Collection already registered with the marketplace.
    #[error("collection already registered: {registry}")]
    CollectionAlreadyRegistered {
        /// The external registry address.
        registry: Address,
    },

    /// Collection id is not registered.
    #[error("collection not registered: {collection}")]
    CollectionNotRegistered {
        /// The unknown collection id.
        collection: CollectionId,
    },

    /// The (collection, token) pair is already tracked as an item.
    #[error("item already added: collection {collection}, token {token_id}")]
    ItemAlreadyAdded {
        /// Collection of the duplicate item.
        collection: CollectionId,
        /// Token id of the duplicate item.
        token_id: u64,
    },

    /// Caller does not own the asset according to the asset registry.
    #[error("caller {caller} is not the asset owner of token {token_id}")]
    NotAssetOwner {
        /// The rejected caller.
        caller: Address,
        /// Token id within its collection.
        token_id: u64,
    },

    /// Item id is not tracked by the catalog.
    #[error("item not found: {item}")]
    ItemNotFound {
        /// The unknown item id.
        item: ItemId,
    },

    /// Caller is not the item's recorded owner.
    #[error("caller {caller} is not the owner of item {item}")]
    NotItemOwner {
        /// The item in question.
        item: ItemId,
        /// The rejected caller.
        caller: Address,
    },

    /// Zero is not a valid listing or offer price.
    #[error("price must be nonzero")]
    ZeroPrice,

    /// Item is already listed for sale.
    #[error("item already listed: {item}")]
    AlreadyListed {
        /// The listed item.
        item: ItemId,
    },

    /// Item is not listed for sale.
    #[error("item not listed: {item}")]
    NotListed {
        /// The unlisted item.
        item: ItemId,
    },

    /// Owners cannot place offers on their own items.
    #[error("cannot offer on own item {item}")]
    SelfOffer {
        /// The item in question.
        item: ItemId,
    },

    /// Owners cannot buy their own items.
    #[error("cannot purchase own item {item}")]
    SelfPurchase {
        /// The item in question.
        item: ItemId,
    },

    /// Funds sent with the call do not cover the price.
    #[error("insufficient funds: required {required} units, sent {sent} units")]
    InsufficientFunds {
        /// Price in base units.
        required: u64,
        /// Funds attached to the call, in base units.
        sent: u64,
    },

    /// No offer exists at (item, offerer).
    #[error("offer not found: item {item}, offerer {offerer}")]
    OfferNotFound {
        /// The item in question.
        item: ItemId,
        /// The offerer whose offer was looked up.
        offerer: Address,
    },

    /// Caller is not the seller snapshotted in the offer.
    #[error("caller {caller} is not the target of the offer on item {item}")]
    NotOfferTarget {
        /// The item in question.
        item: ItemId,
        /// The rejected caller.
        caller: Address,
    },

    /// Offer has not been accepted by the seller.
    #[error("offer not accepted: item {item}, offerer {offerer}")]
    OfferNotAccepted {
        /// The item in question.
        item: ItemId,
        /// The offerer whose claim was rejected.
        offerer: Address,
    },

    /// Caller is not the marketplace owner.
    #[error("caller {caller} is not the marketplace owner")]
    NotOwner {
        /// The rejected caller.
        caller: Address,
    },

    /// Fee percent outside the 0..=100 range.
    #[error("invalid fee percent: {fee_percent} (must be 0..=100)")]
    InvalidFeePercent {
        /// The rejected value.
        fee_percent: u8,
    },

    /// An external capability rejected its part of a settlement.
    ///
    /// Marketplace state is unchanged when this is returned.
    #[error("settlement failed: {reason}")]
    SettlementFailed {
        /// What the capability reported.
        reason: String,
    },
}

impl MarketError {
    /// Create a settlement failure from an external-capability error.
    #[must_use]
    pub fn settlement_failed(reason: impl Into<String>) -> Self {
        Self::SettlementFailed {
            reason: reason.into(),
        }
    }
}

impl From<curio_token::TokenError> for MarketError {
    fn from(e: curio_token::TokenError) -> Self {
        Self::settlement_failed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_display() {
        let err = MarketError::InsufficientFunds {
            required: 100,
            sent: 40,
        };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("40"));
    }

    #[test]
    fn invalid_fee_percent_display() {
        let err = MarketError::InvalidFeePercent { fee_percent: 101 };
        assert!(err.to_string().contains("101"));
    }

    #[test]
    fn token_error_maps_to_settlement_failure() {
        let err: MarketError = curio_token::TokenError::insufficient_balance(1, 2).into();
        assert!(matches!(err, MarketError::SettlementFailed { .. }));
    }
}
