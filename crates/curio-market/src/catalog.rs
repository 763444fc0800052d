//! Item catalog.
//!
//! Tracks every (collection, token) pair added to the marketplace, its
//! recorded owner, and its listing price. A zero price means "not listed".
//! The catalog exclusively owns the item set and the deduplication index;
//! ownership and price mutate only through settlement.

use crate::directory::CollectionId;
use crate::error::MarketError;
use chrono::{DateTime, Utc};
use curio_token::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique item identifier, assigned sequentially and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(u64);

impl ItemId {
    /// Create an item id from its raw value (as received from a host API
    /// or an indexed event).
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw id.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A marketplace-tracked asset.
///
/// `owner` is the marketplace's view of the holder; it matches the asset
/// registry at creation time but can diverge after an out-of-band transfer
/// not mediated by the marketplace. Settlement against a stale owner fails
/// at the registry and unwinds cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique item id.
    pub id: ItemId,
    /// Collection this item belongs to.
    pub collection: CollectionId,
    /// Token id within the collection.
    pub token_id: u64,
    /// Recorded holder.
    pub owner: Address,
    /// Listing price; zero means not listed.
    pub price: Amount,
    /// When the item was added to the catalog.
    pub added_at: DateTime<Utc>,
}

impl Item {
    /// Whether the item is currently listed for sale.
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        !self.price.is_zero()
    }
}

/// The catalog of tracked items.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    items: HashMap<ItemId, Item>,
    dedup: HashMap<(CollectionId, u64), ItemId>,
    next_id: u64,
}

impl ItemCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new item, unlisted, owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ItemAlreadyAdded`] if the (collection, token)
    /// pair is already tracked.
    pub fn add(
        &mut self,
        collection: CollectionId,
        token_id: u64,
        owner: &Address,
    ) -> Result<ItemId, MarketError> {
        if self.dedup.contains_key(&(collection, token_id)) {
            return Err(MarketError::ItemAlreadyAdded {
                collection,
                token_id,
            });
        }

        self.next_id += 1;
        let id = ItemId(self.next_id);
        self.items.insert(
            id,
            Item {
                id,
                collection,
                token_id,
                owner: owner.clone(),
                price: Amount::ZERO,
                added_at: Utc::now(),
            },
        );
        self.dedup.insert((collection, token_id), id);
        Ok(id)
    }

    /// Whether the (collection, token) pair is already tracked.
    #[must_use]
    pub fn is_tracked(&self, collection: CollectionId, token_id: u64) -> bool {
        self.dedup.contains_key(&(collection, token_id))
    }

    /// Look up an item.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ItemNotFound`] for ids never assigned.
    pub fn get(&self, item: ItemId) -> Result<&Item, MarketError> {
        self.items.get(&item).ok_or(MarketError::ItemNotFound { item })
    }

    /// List an item for sale at `price`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ItemNotFound`], [`MarketError::NotItemOwner`],
    /// [`MarketError::ZeroPrice`], or [`MarketError::AlreadyListed`].
    pub fn list(
        &mut self,
        item: ItemId,
        price: Amount,
        caller: &Address,
    ) -> Result<(), MarketError> {
        let entry = self
            .items
            .get_mut(&item)
            .ok_or(MarketError::ItemNotFound { item })?;

        if &entry.owner != caller {
            return Err(MarketError::NotItemOwner {
                item,
                caller: caller.clone(),
            });
        }
        if price.is_zero() {
            return Err(MarketError::ZeroPrice);
        }
        if entry.is_listed() {
            return Err(MarketError::AlreadyListed { item });
        }

        entry.price = price;
        Ok(())
    }

    /// Record a completed sale or claim: new owner, delisted.
    ///
    /// Settlement-only mutation; the item must exist.
    pub(crate) fn record_sale(&mut self, item: ItemId, new_owner: &Address) {
        if let Some(entry) = self.items.get_mut(&item) {
            entry.owner = new_owner.clone();
            entry.price = Amount::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curio_token::Wallet;

    fn address() -> Address {
        Wallet::generate().expect("wallet").address().clone()
    }

    fn collection() -> CollectionId {
        CollectionId::new(1)
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut catalog = ItemCatalog::new();
        let owner = address();
        let a = catalog.add(collection(), 10, &owner).unwrap();
        let b = catalog.add(collection(), 11, &owner).unwrap();
        assert_eq!(a.value(), 1);
        assert_eq!(b.value(), 2);
    }

    #[test]
    fn new_item_is_unlisted() {
        let mut catalog = ItemCatalog::new();
        let owner = address();
        let id = catalog.add(collection(), 10, &owner).unwrap();

        let item = catalog.get(id).unwrap();
        assert_eq!(item.owner, owner);
        assert!(!item.is_listed());
        assert!(item.price.is_zero());
    }

    #[test]
    fn duplicate_pair_rejected_regardless_of_caller() {
        let mut catalog = ItemCatalog::new();
        catalog.add(collection(), 10, &address()).unwrap();

        let result = catalog.add(collection(), 10, &address());
        assert!(matches!(result, Err(MarketError::ItemAlreadyAdded { .. })));
    }

    #[test]
    fn same_token_in_other_collection_allowed() {
        let mut catalog = ItemCatalog::new();
        let owner = address();
        catalog.add(CollectionId::new(1), 10, &owner).unwrap();
        assert!(catalog.add(CollectionId::new(2), 10, &owner).is_ok());
    }

    #[test]
    fn unknown_item_not_found() {
        let catalog = ItemCatalog::new();
        let result = catalog.get(ItemId(5));
        assert!(matches!(result, Err(MarketError::ItemNotFound { .. })));
    }

    #[test]
    fn list_sets_price() {
        let mut catalog = ItemCatalog::new();
        let owner = address();
        let id = catalog.add(collection(), 10, &owner).unwrap();

        catalog.list(id, Amount::from_units(500), &owner).unwrap();
        let item = catalog.get(id).unwrap();
        assert!(item.is_listed());
        assert_eq!(item.price, Amount::from_units(500));
    }

    #[test]
    fn list_by_non_owner_rejected() {
        let mut catalog = ItemCatalog::new();
        let id = catalog.add(collection(), 10, &address()).unwrap();

        let result = catalog.list(id, Amount::from_units(500), &address());
        assert!(matches!(result, Err(MarketError::NotItemOwner { .. })));
    }

    #[test]
    fn list_at_zero_rejected() {
        let mut catalog = ItemCatalog::new();
        let owner = address();
        let id = catalog.add(collection(), 10, &owner).unwrap();

        let result = catalog.list(id, Amount::ZERO, &owner);
        assert!(matches!(result, Err(MarketError::ZeroPrice)));
    }

    #[test]
    fn double_listing_rejected() {
        let mut catalog = ItemCatalog::new();
        let owner = address();
        let id = catalog.add(collection(), 10, &owner).unwrap();
        catalog.list(id, Amount::from_units(500), &owner).unwrap();

        let result = catalog.list(id, Amount::from_units(600), &owner);
        assert!(matches!(result, Err(MarketError::AlreadyListed { .. })));
    }

    #[test]
    fn list_unknown_item_rejected() {
        let mut catalog = ItemCatalog::new();
        let result = catalog.list(ItemId(5), Amount::from_units(500), &address());
        assert!(matches!(result, Err(MarketError::ItemNotFound { .. })));
    }

    #[test]
    fn record_sale_delists_and_reassigns() {
        let mut catalog = ItemCatalog::new();
        let seller = address();
        let buyer = address();
        let id = catalog.add(collection(), 10, &seller).unwrap();
        catalog.list(id, Amount::from_units(500), &seller).unwrap();

        catalog.record_sale(id, &buyer);
        let item = catalog.get(id).unwrap();
        assert_eq!(item.owner, buyer);
        assert!(!item.is_listed());
    }

    #[test]
    fn relisting_after_sale_allowed() {
        let mut catalog = ItemCatalog::new();
        let seller = address();
        let buyer = address();
        let id = catalog.add(collection(), 10, &seller).unwrap();
        catalog.list(id, Amount::from_units(500), &seller).unwrap();
        catalog.record_sale(id, &buyer);

        assert!(catalog.list(id, Amount::from_units(900), &buyer).is_ok());
    }

    #[test]
    fn item_serialization() {
        let mut catalog = ItemCatalog::new();
        let id = catalog.add(collection(), 10, &address()).unwrap();

        let item = catalog.get(id).unwrap();
        let json = serde_json::to_string(item).expect("serialize");
        let parsed: Item = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.id, item.id);
        assert_eq!(parsed.token_id, 10);
    }
}
