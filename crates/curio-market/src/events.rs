//! Domain events for external indexers.
//!
//! Every successful marketplace operation appends one event to the engine's
//! journal; hosts drain the journal and ship it to whatever indexing
//! pipeline they run. Events are plain serde values, tagged by kind.

use crate::catalog::ItemId;
use crate::directory::CollectionId;
use curio_token::{Address, Amount};
use serde::{Deserialize, Serialize};

/// A marketplace domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A collection was registered.
    CollectionAdded {
        /// Assigned collection id.
        collection: CollectionId,
        /// External registry address.
        registry: Address,
    },
    /// An item was added to the catalog.
    ItemAdded {
        /// Assigned item id.
        item: ItemId,
        /// External registry address of the item's collection.
        registry: Address,
        /// Token id within the collection.
        token_id: u64,
        /// Recorded owner at creation.
        owner: Address,
    },
    /// An item was listed for sale.
    ItemListed {
        /// The listed item.
        item: ItemId,
        /// External registry address of the item's collection.
        registry: Address,
        /// Token id within the collection.
        token_id: u64,
        /// The listing owner.
        seller: Address,
        /// Listing price.
        price: Amount,
    },
    /// A listed item was sold.
    ItemSold {
        /// The sold item.
        item: ItemId,
        /// External registry address of the item's collection.
        registry: Address,
        /// Token id within the collection.
        token_id: u64,
        /// The previous owner.
        seller: Address,
        /// The new owner.
        buyer: Address,
        /// Sale price (before the fee split).
        price: Amount,
    },
    /// An offer was placed on an unlisted item.
    OfferPlaced {
        /// The item offered on.
        item: ItemId,
        /// The bidding account.
        offerer: Address,
        /// Offered price.
        price: Amount,
    },
    /// A seller accepted an offer.
    OfferAccepted {
        /// The item offered on.
        item: ItemId,
        /// The bidding account.
        offerer: Address,
    },
    /// An accepted offer was claimed and settled.
    ItemClaimed {
        /// The claimed item.
        item: ItemId,
        /// The claiming account (new owner).
        claimer: Address,
    },
}
