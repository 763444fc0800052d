//! Offer book for off-list negotiation.
//!
//! Offers exist only for unlisted items. Each offer snapshots the item's
//! owner as its seller at creation time; acceptance and claim settle
//! against that snapshot, never against the live owner. This is deliberate:
//! an out-of-band ownership change cannot redirect settlement funds.

use crate::catalog::{Item, ItemId};
use crate::error::MarketError;
use chrono::{DateTime, Utc};
use curio_token::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A pending or accepted bid on an unlisted item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    /// Offered price (always nonzero).
    pub price: Amount,
    /// The item's owner at the time the offer was placed.
    pub seller: Address,
    /// Set by the seller's acceptance; required for claiming.
    pub accepted: bool,
    /// When the offer was placed.
    pub placed_at: DateTime<Utc>,
}

/// The book of pending offers, keyed by (item, offerer).
#[derive(Debug, Default)]
pub struct OfferBook {
    offers: HashMap<(ItemId, Address), Offer>,
    offerers: HashMap<ItemId, Vec<Address>>,
}

impl OfferBook {
    /// Create an empty offer book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an offer on `item` by `caller`.
    ///
    /// Re-offering overwrites the stored offer (and resets its accepted
    /// flag) but appends the offerer to the item's offerer list again, so
    /// the list may contain duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::AlreadyListed`] for listed items,
    /// [`MarketError::ZeroPrice`] for zero offers, and
    /// [`MarketError::SelfOffer`] when the caller owns the item.
    pub fn place(
        &mut self,
        item: &Item,
        caller: &Address,
        price: Amount,
    ) -> Result<(), MarketError> {
        if item.is_listed() {
            return Err(MarketError::AlreadyListed { item: item.id });
        }
        if price.is_zero() {
            return Err(MarketError::ZeroPrice);
        }
        if &item.owner == caller {
            return Err(MarketError::SelfOffer { item: item.id });
        }

        self.offers.insert(
            (item.id, caller.clone()),
            Offer {
                price,
                seller: item.owner.clone(),
                accepted: false,
                placed_at: Utc::now(),
            },
        );
        self.offerers
            .entry(item.id)
            .or_default()
            .push(caller.clone());
        Ok(())
    }

    /// Look up the offer at (item, offerer).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OfferNotFound`] if no offer exists at the key.
    pub fn get(&self, item: ItemId, offerer: &Address) -> Result<&Offer, MarketError> {
        self.offers
            .get(&(item, offerer.clone()))
            .ok_or_else(|| MarketError::OfferNotFound {
                item,
                offerer: offerer.clone(),
            })
    }

    /// Mark the offer at (item, offerer) as accepted.
    ///
    /// Only the snapshotted seller may accept. Re-accepting an already
    /// accepted offer succeeds; callers treat it as a fresh acceptance.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OfferNotFound`] or
    /// [`MarketError::NotOfferTarget`].
    pub fn accept(
        &mut self,
        item: ItemId,
        offerer: &Address,
        caller: &Address,
    ) -> Result<(), MarketError> {
        let offer = self
            .offers
            .get_mut(&(item, offerer.clone()))
            .ok_or_else(|| MarketError::OfferNotFound {
                item,
                offerer: offerer.clone(),
            })?;

        if &offer.seller != caller {
            return Err(MarketError::NotOfferTarget {
                item,
                caller: caller.clone(),
            });
        }

        offer.accepted = true;
        Ok(())
    }

    /// Remove the accepted offer at (item, offerer) and discard every other
    /// offer on the item along with its offerer list.
    ///
    /// The wholesale clearing is an intentional simplification: a claim
    /// settles the item, so sibling offers no longer have anything to bid
    /// on. Displaced offerers are not notified; no funds are held in
    /// offers, so nothing needs refunding.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OfferNotFound`] or
    /// [`MarketError::OfferNotAccepted`]. The book is unchanged on error.
    pub fn take_and_clear(&mut self, item: ItemId, offerer: &Address) -> Result<Offer, MarketError> {
        let key = (item, offerer.clone());
        let offer = self
            .offers
            .get(&key)
            .ok_or_else(|| MarketError::OfferNotFound {
                item,
                offerer: offerer.clone(),
            })?;

        if !offer.accepted {
            return Err(MarketError::OfferNotAccepted {
                item,
                offerer: offerer.clone(),
            });
        }

        let taken = self
            .offers
            .remove(&key)
            .ok_or_else(|| MarketError::OfferNotFound {
                item,
                offerer: offerer.clone(),
            })?;

        for displaced in self.offerers.remove(&item).unwrap_or_default() {
            self.offers.remove(&(item, displaced));
        }
        Ok(taken)
    }

    /// Accounts with offers on `item`, in placement order.
    ///
    /// May contain duplicates when an account re-offered.
    #[must_use]
    pub fn offerers(&self, item: ItemId) -> &[Address] {
        self.offerers.get(&item).map_or(&[], Vec::as_slice)
    }
}
