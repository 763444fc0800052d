//! Settlement engine for marketplace operations.
//!
//! [`Marketplace`] orchestrates the collection directory, item catalog,
//! offer book, asset registry, and ledger as one state machine. Every
//! operation validates all of its preconditions before mutating anything;
//! when an external capability rejects its part of a settlement after funds
//! have moved, the engine debits those funds back so no partially-applied
//! state is ever observable.
//!
//! # Fee arithmetic
//!
//! All splits use integer floor division with `u128` intermediates:
//!
//! - `seller_proceeds = floor(price * (100 - fee_percent) / 100)`
//! - `marketplace_fee = price - seller_proceeds`
//!
//! The two always sum to the price exactly, so no unit is ever created or
//! destroyed by rounding; the remainder lands on the marketplace side.

use crate::catalog::{Item, ItemCatalog, ItemId};
use crate::config::MarketConfig;
use crate::directory::{CollectionDirectory, CollectionId};
use crate::error::MarketError;
use crate::events::MarketEvent;
use crate::offers::{Offer, OfferBook};
use crate::registry::AssetRegistry;
use curio_token::{Address, Amount, Ledger};
use tracing::{info, warn};

/// Seller's share of a sale in base units.
///
/// Assumes `fee_percent <= 100` (enforced by [`MarketConfig::new`]); larger
/// values saturate to a zero share.
#[must_use]
pub const fn seller_proceeds(price_units: u64, fee_percent: u8) -> u64 {
    let keep = 100u128.saturating_sub(fee_percent as u128);
    // u64 * 100 fits comfortably in u128, so the floor division is exact.
    let share = price_units as u128 * keep / 100;
    share as u64
}

/// Marketplace's share of a sale in base units.
#[must_use]
pub const fn marketplace_fee(price_units: u64, fee_percent: u8) -> u64 {
    price_units - seller_proceeds(price_units, fee_percent)
}

/// The marketplace state machine and settlement engine.
///
/// Generic over the [`AssetRegistry`] and [`Ledger`] capabilities; the
/// engine itself holds no connection state and performs no I/O beyond
/// those two seams.
#[derive(Debug)]
pub struct Marketplace<R, L> {
    config: MarketConfig,
    directory: CollectionDirectory,
    catalog: ItemCatalog,
    offers: OfferBook,
    registry: R,
    ledger: L,
    events: Vec<MarketEvent>,
}

impl<R: AssetRegistry, L: Ledger> Marketplace<R, L> {
    /// Create a marketplace over the given capabilities.
    #[must_use]
    pub fn new(config: MarketConfig, registry: R, ledger: L) -> Self {
        Self {
            config,
            directory: CollectionDirectory::new(),
            catalog: ItemCatalog::new(),
            offers: OfferBook::new(),
            registry,
            ledger,
            events: Vec::new(),
        }
    }

    /// Register an asset collection by its external registry address.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::CollectionAlreadyRegistered`] if the address
    /// is already registered.
    pub fn add_collection(&mut self, registry: &Address) -> Result<CollectionId, MarketError> {
        let collection = self.directory.add(registry)?;
        info!(%collection, registry = %registry, "collection registered");
        self.events.push(MarketEvent::CollectionAdded {
            collection,
            registry: registry.clone(),
        });
        Ok(collection)
    }

    /// Whether a registry address is already registered.
    #[must_use]
    pub fn is_registered(&self, registry: &Address) -> bool {
        self.directory.is_registered(registry)
    }

    /// Track an asset as a marketplace item, owned by `caller`, unlisted.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::CollectionNotRegistered`],
    /// [`MarketError::ItemAlreadyAdded`], [`MarketError::NotAssetOwner`] if
    /// the asset registry reports a different owner, or
    /// [`MarketError::SettlementFailed`] if the registry does not know the
    /// asset at all.
    pub fn add_item(
        &mut self,
        collection: CollectionId,
        token_id: u64,
        caller: &Address,
    ) -> Result<ItemId, MarketError> {
        let registry_addr = self.directory.registry_of(collection)?.clone();
        if self.catalog.is_tracked(collection, token_id) {
            return Err(MarketError::ItemAlreadyAdded {
                collection,
                token_id,
            });
        }

        let actual_owner = self
            .registry
            .owner_of(&registry_addr, token_id)
            .map_err(|e| MarketError::settlement_failed(e.to_string()))?;
        if &actual_owner != caller {
            return Err(MarketError::NotAssetOwner {
                caller: caller.clone(),
                token_id,
            });
        }

        let item = self.catalog.add(collection, token_id, caller)?;
        info!(%item, %collection, token_id, owner = %caller, "item added");
        self.events.push(MarketEvent::ItemAdded {
            item,
            registry: registry_addr,
            token_id,
            owner: caller.clone(),
        });
        Ok(item)
    }

    /// List an item for sale at `price`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ItemNotFound`], [`MarketError::NotItemOwner`],
    /// [`MarketError::ZeroPrice`], or [`MarketError::AlreadyListed`].
    pub fn list_item(
        &mut self,
        item: ItemId,
        price: Amount,
        caller: &Address,
    ) -> Result<(), MarketError> {
        self.catalog.list(item, price, caller)?;

        let listed = self.catalog.get(item)?;
        let registry_addr = self.directory.registry_of(listed.collection)?.clone();
        info!(%item, price = %price, seller = %caller, "item listed");
        self.events.push(MarketEvent::ItemListed {
            item,
            registry: registry_addr,
            token_id: listed.token_id,
            seller: caller.clone(),
            price,
        });
        Ok(())
    }

    /// Buy a listed item, sending `funds_sent` with the call.
    ///
    /// Excess funds above the listing price are refunded to the caller
    /// before any other transfer. The price then splits into the
    /// marketplace fee (credited to the treasury) and the seller's
    /// proceeds; finally the asset moves through the registry. A registry
    /// rejection unwinds every credit made by this call.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ItemNotFound`], [`MarketError::NotListed`],
    /// [`MarketError::InsufficientFunds`], [`MarketError::SelfPurchase`],
    /// or [`MarketError::SettlementFailed`] (state unchanged).
    pub fn buy_item(
        &mut self,
        item: ItemId,
        caller: &Address,
        funds_sent: Amount,
    ) -> Result<(), MarketError> {
        let listed = self.catalog.get(item)?.clone();
        if !listed.is_listed() {
            return Err(MarketError::NotListed { item });
        }
        let price = listed.price;
        if funds_sent < price {
            return Err(MarketError::InsufficientFunds {
                required: price.units(),
                sent: funds_sent.units(),
            });
        }
        if &listed.owner == caller {
            return Err(MarketError::SelfPurchase { item });
        }
        let registry_addr = self.directory.registry_of(listed.collection)?.clone();

        let proceeds = Amount::from_units(seller_proceeds(price.units(), self.config.fee_percent));
        let fee = Amount::from_units(marketplace_fee(price.units(), self.config.fee_percent));
        let excess = funds_sent.saturating_sub(price);

        // Refund first, then fee, then proceeds; the asset moves last.
        let mut applied: Vec<(Address, Amount)> = Vec::new();
        let plan = [
            (caller.clone(), excess),
            (self.config.treasury.clone(), fee),
            (listed.owner.clone(), proceeds),
        ];
        for (account, amount) in plan {
            if amount.is_zero() {
                continue;
            }
            if let Err(e) = self.ledger.credit(&account, amount) {
                self.unwind_credits(&applied);
                return Err(MarketError::settlement_failed(e.to_string()));
            }
            applied.push((account, amount));
        }

        if let Err(e) =
            self.registry
                .transfer(&registry_addr, listed.token_id, &listed.owner, caller)
        {
            self.unwind_credits(&applied);
            return Err(MarketError::settlement_failed(e.to_string()));
        }

        self.catalog.record_sale(item, caller);
        info!(
            %item,
            seller = %listed.owner,
            buyer = %caller,
            price = %price,
            fee = %fee,
            "item sold"
        );
        self.events.push(MarketEvent::ItemSold {
            item,
            registry: registry_addr,
            token_id: listed.token_id,
            seller: listed.owner,
            buyer: caller.clone(),
            price,
        });
        Ok(())
    }

    /// Place an offer on an unlisted item.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ItemNotFound`], [`MarketError::AlreadyListed`],
    /// [`MarketError::ZeroPrice`], or [`MarketError::SelfOffer`].
    pub fn place_offer(
        &mut self,
        item: ItemId,
        caller: &Address,
        price: Amount,
    ) -> Result<(), MarketError> {
        let target = self.catalog.get(item)?;
        self.offers.place(target, caller, price)?;
        info!(%item, offerer = %caller, price = %price, "offer placed");
        self.events.push(MarketEvent::OfferPlaced {
            item,
            offerer: caller.clone(),
            price,
        });
        Ok(())
    }

    /// Accept the offer at (item, offerer).
    ///
    /// Only the seller snapshotted in the offer may accept. Re-accepting an
    /// already-accepted offer succeeds and re-emits [`MarketEvent::OfferAccepted`].
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OfferNotFound`] or
    /// [`MarketError::NotOfferTarget`].
    pub fn accept_offer(
        &mut self,
        item: ItemId,
        offerer: &Address,
        caller: &Address,
    ) -> Result<(), MarketError> {
        self.offers.accept(item, offerer, caller)?;
        info!(%item, offerer = %offerer, "offer accepted");
        self.events.push(MarketEvent::OfferAccepted {
            item,
            offerer: offerer.clone(),
        });
        Ok(())
    }

    /// Claim an accepted offer, sending `funds_sent` with the call.
    ///
    /// The full offer price goes to the snapshotted seller; claims carry
    /// no marketplace fee, unlike [`Self::buy_item`]. Excess funds are
    /// refunded to the caller first. On success the offer and every sibling
    /// offer on the item are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OfferNotFound`],
    /// [`MarketError::OfferNotAccepted`],
    /// [`MarketError::InsufficientFunds`], or
    /// [`MarketError::SettlementFailed`] (state unchanged).
    pub fn claim_item(
        &mut self,
        item: ItemId,
        caller: &Address,
        funds_sent: Amount,
    ) -> Result<(), MarketError> {
        let offer = self.offers.get(item, caller)?.clone();
        if !offer.accepted {
            return Err(MarketError::OfferNotAccepted {
                item,
                offerer: caller.clone(),
            });
        }
        if funds_sent < offer.price {
            return Err(MarketError::InsufficientFunds {
                required: offer.price.units(),
                sent: funds_sent.units(),
            });
        }
        let claimed = self.catalog.get(item)?.clone();
        let registry_addr = self.directory.registry_of(claimed.collection)?.clone();
        let excess = funds_sent.saturating_sub(offer.price);

        let mut applied: Vec<(Address, Amount)> = Vec::new();
        let plan = [
            (caller.clone(), excess),
            (offer.seller.clone(), offer.price),
        ];
        for (account, amount) in plan {
            if amount.is_zero() {
                continue;
            }
            if let Err(e) = self.ledger.credit(&account, amount) {
                self.unwind_credits(&applied);
                return Err(MarketError::settlement_failed(e.to_string()));
            }
            applied.push((account, amount));
        }

        if let Err(e) =
            self.registry
                .transfer(&registry_addr, claimed.token_id, &offer.seller, caller)
        {
            self.unwind_credits(&applied);
            return Err(MarketError::settlement_failed(e.to_string()));
        }

        self.catalog.record_sale(item, caller);
        self.offers.take_and_clear(item, caller)?;
        info!(%item, claimer = %caller, price = %offer.price, "item claimed");
        self.events.push(MarketEvent::ItemClaimed {
            item,
            claimer: caller.clone(),
        });
        Ok(())
    }

    /// Withdraw the treasury's entire accrued balance to the caller.
    ///
    /// Restricted to the configured marketplace owner. Returns the amount
    /// withdrawn (zero when nothing has accrued).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotOwner`] for any other caller, or
    /// [`MarketError::SettlementFailed`] if the ledger rejects the move.
    pub fn withdraw(&mut self, caller: &Address) -> Result<Amount, MarketError> {
        if caller != &self.config.owner {
            return Err(MarketError::NotOwner {
                caller: caller.clone(),
            });
        }

        let accrued = self.ledger.balance(&self.config.treasury);
        if accrued.is_zero() {
            return Ok(Amount::ZERO);
        }

        self.ledger
            .debit(&self.config.treasury, accrued)
            .map_err(|e| MarketError::settlement_failed(e.to_string()))?;
        if let Err(e) = self.ledger.credit(caller, accrued) {
            // Put the fees back; the treasury held them a moment ago.
            let treasury = self.config.treasury.clone();
            if let Err(restore) = self.ledger.credit(&treasury, accrued) {
                warn!(account = %treasury, amount = %accrued, error = %restore, "treasury restore failed");
            }
            return Err(MarketError::settlement_failed(e.to_string()));
        }

        info!(owner = %caller, amount = %accrued, "fees withdrawn");
        Ok(accrued)
    }

    /// Look up a tracked item.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ItemNotFound`] for ids never assigned.
    pub fn item(&self, item: ItemId) -> Result<&Item, MarketError> {
        self.catalog.get(item)
    }

    /// Look up the offer at (item, offerer).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OfferNotFound`] if no offer exists at the key.
    pub fn offer(&self, item: ItemId, offerer: &Address) -> Result<&Offer, MarketError> {
        self.offers.get(item, offerer)
    }

    /// Accounts with offers on `item` (may contain duplicates).
    #[must_use]
    pub fn offerers(&self, item: ItemId) -> &[Address] {
        self.offers.offerers(item)
    }

    /// The marketplace's accrued fee balance.
    #[must_use]
    pub fn treasury_balance(&self) -> Amount {
        self.ledger.balance(&self.config.treasury)
    }

    /// The immutable configuration.
    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// The ledger capability (read access for hosts).
    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable ledger access, for host bootstrap (seeding balances).
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// The asset-registry capability (read access for hosts).
    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Mutable registry access, for host bootstrap (minting assets).
    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    /// Drain the event journal (indexer hook).
    pub fn take_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events emitted since the last drain.
    #[must_use]
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Debit back credits applied earlier in the same failed operation.
    fn unwind_credits(&mut self, applied: &[(Address, Amount)]) {
        for (account, amount) in applied.iter().rev() {
            self.unwind_debit(account, *amount);
        }
    }

    fn unwind_debit(&mut self, account: &Address, amount: Amount) {
        // Debiting an amount credited moments ago in the same exclusive
        // operation; a failure here means the ledger broke mid-operation.
        if let Err(e) = self.ledger.debit(account, amount) {
            warn!(account = %account, amount = %amount, error = %e, "rollback debit failed");
        }
    }
}
