//! Shared-ownership wrapper for concurrent hosts.
//!
//! The engine itself is single-writer: every operation takes `&mut self`
//! and runs to completion with no suspension points. A multi-threaded host
//! gets the same serializability guarantee by funnelling all operations
//! through one exclusive lock, which is what [`SharedMarketplace`] does.

use crate::catalog::{Item, ItemId};
use crate::directory::CollectionId;
use crate::error::MarketError;
use crate::events::MarketEvent;
use crate::registry::AssetRegistry;
use crate::settlement::Marketplace;
use curio_token::{Address, Amount, Ledger};
use parking_lot::Mutex;
use std::sync::Arc;

/// A cloneable handle to a marketplace behind a single exclusive lock.
///
/// Each operation acquires the lock, runs to completion, and releases it;
/// no caller can observe another operation partially applied.
#[derive(Debug)]
pub struct SharedMarketplace<R, L> {
    inner: Arc<Mutex<Marketplace<R, L>>>,
}

impl<R, L> Clone for SharedMarketplace<R, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: AssetRegistry, L: Ledger> SharedMarketplace<R, L> {
    /// Wrap a marketplace for shared use.
    #[must_use]
    pub fn new(marketplace: Marketplace<R, L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(marketplace)),
        }
    }

    /// See [`Marketplace::add_collection`].
    pub fn add_collection(&self, registry: &Address) -> Result<CollectionId, MarketError> {
        self.inner.lock().add_collection(registry)
    }

    /// See [`Marketplace::add_item`].
    pub fn add_item(
        &self,
        collection: CollectionId,
        token_id: u64,
        caller: &Address,
    ) -> Result<ItemId, MarketError> {
        self.inner.lock().add_item(collection, token_id, caller)
    }

    /// See [`Marketplace::list_item`].
    pub fn list_item(
        &self,
        item: ItemId,
        price: Amount,
        caller: &Address,
    ) -> Result<(), MarketError> {
        self.inner.lock().list_item(item, price, caller)
    }

    /// See [`Marketplace::buy_item`].
    pub fn buy_item(
        &self,
        item: ItemId,
        caller: &Address,
        funds_sent: Amount,
    ) -> Result<(), MarketError> {
        self.inner.lock().buy_item(item, caller, funds_sent)
    }

    /// See [`Marketplace::place_offer`].
    pub fn place_offer(
        &self,
        item: ItemId,
        caller: &Address,
        price: Amount,
    ) -> Result<(), MarketError> {
        self.inner.lock().place_offer(item, caller, price)
    }

    /// See [`Marketplace::accept_offer`].
    pub fn accept_offer(
        &self,
        item: ItemId,
        offerer: &Address,
        caller: &Address,
    ) -> Result<(), MarketError> {
        self.inner.lock().accept_offer(item, offerer, caller)
    }

    /// See [`Marketplace::claim_item`].
    pub fn claim_item(
        &self,
        item: ItemId,
        caller: &Address,
        funds_sent: Amount,
    ) -> Result<(), MarketError> {
        self.inner.lock().claim_item(item, caller, funds_sent)
    }

    /// See [`Marketplace::withdraw`].
    pub fn withdraw(&self, caller: &Address) -> Result<Amount, MarketError> {
        self.inner.lock().withdraw(caller)
    }

    /// Snapshot of a tracked item.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ItemNotFound`] for ids never assigned.
    pub fn item(&self, item: ItemId) -> Result<Item, MarketError> {
        self.inner.lock().item(item).cloned()
    }

    /// The marketplace's accrued fee balance.
    #[must_use]
    pub fn treasury_balance(&self) -> Amount {
        self.inner.lock().treasury_balance()
    }

    /// Drain the event journal.
    #[must_use]
    pub fn take_events(&self) -> Vec<MarketEvent> {
        self.inner.lock().take_events()
    }

    /// Run `f` with exclusive access to the underlying marketplace.
    ///
    /// Host bootstrap hook (seeding ledgers, minting assets).
    pub fn with<T>(&self, f: impl FnOnce(&mut Marketplace<R, L>) -> T) -> T {
        f(&mut self.inner.lock())
    }
}
