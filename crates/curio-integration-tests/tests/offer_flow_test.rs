//! End-to-end integration tests for the offer/accept/claim flow.
//!
//! Tests off-list negotiation on unlisted items:
//! 1. Placing offers (and the guards around them)
//! 2. Seller acceptance against the snapshotted seller
//! 3. Claiming: fee-free settlement, sibling clearing, atomic rollback

use curio_market::{
    AssetRegistry, InMemoryRegistry, Marketplace, MarketConfig, MarketError, MarketEvent,
};
use curio_token::{Address, Amount, InMemoryLedger, Ledger, Wallet};

// ============================================================================
// Helper Functions
// ============================================================================

const TOKEN: u64 = 42;

fn address() -> Address {
    Wallet::generate().expect("wallet").address().clone()
}

struct Harness {
    market: Marketplace<InMemoryRegistry, InMemoryLedger>,
    registry_addr: Address,
    seller: Address,
    offerer: Address,
    item: curio_market::ItemId,
}

/// Marketplace with one unlisted item, ready for offers. Fee is 3% so any
/// fee accidentally charged on a claim would show up in the treasury.
fn harness() -> Harness {
    let registry_addr = address();
    let seller = address();
    let offerer = address();

    let config = MarketConfig::new(address(), address(), 3).expect("config");
    let mut market = Marketplace::new(config, InMemoryRegistry::new(), InMemoryLedger::new());
    market.registry_mut().mint(&registry_addr, TOKEN, &seller);
    let collection = market.add_collection(&registry_addr).expect("collection");
    let item = market
        .add_item(collection, TOKEN, &seller)
        .expect("item");

    Harness {
        market,
        registry_addr,
        seller,
        offerer,
        item,
    }
}

fn balance(market: &Marketplace<InMemoryRegistry, InMemoryLedger>, account: &Address) -> Amount {
    market.ledger().balance(account)
}

// ============================================================================
// Phase 1: Placing Offers
// ============================================================================

#[test]
fn offer_snapshots_the_seller() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();

    let offer = h.market.offer(h.item, &h.offerer).unwrap();
    assert_eq!(offer.seller, h.seller);
    assert!(!offer.accepted);
}

#[test]
fn offers_only_exist_for_unlisted_items() {
    let mut h = harness();
    h.market
        .list_item(h.item, Amount::from_units(1_000), &h.seller.clone())
        .unwrap();

    let result = h
        .market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500));
    assert!(matches!(result, Err(MarketError::AlreadyListed { .. })));
}

#[test]
fn own_item_and_zero_price_offers_rejected() {
    let mut h = harness();

    let own = h
        .market
        .place_offer(h.item, &h.seller.clone(), Amount::from_units(500));
    assert!(matches!(own, Err(MarketError::SelfOffer { .. })));

    let zero = h.market.place_offer(h.item, &h.offerer.clone(), Amount::ZERO);
    assert!(matches!(zero, Err(MarketError::ZeroPrice)));
}

#[test]
fn repeat_offers_accumulate_duplicate_offerer_entries() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(700))
        .unwrap();

    // One live offer at the newer price; two list entries.
    assert_eq!(
        h.market.offer(h.item, &h.offerer).unwrap().price,
        Amount::from_units(700)
    );
    assert_eq!(
        h.market.offerers(h.item),
        &[h.offerer.clone(), h.offerer.clone()]
    );
}

// ============================================================================
// Phase 2: Acceptance
// ============================================================================

#[test]
fn only_the_snapshotted_seller_may_accept() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();

    let stranger = address();
    let result = h.market.accept_offer(h.item, &h.offerer.clone(), &stranger);
    assert!(matches!(result, Err(MarketError::NotOfferTarget { .. })));

    h.market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .unwrap();
    assert!(h.market.offer(h.item, &h.offerer).unwrap().accepted);
}

#[test]
fn accepting_an_unknown_offer_is_rejected() {
    let mut h = harness();
    let result = h
        .market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone());
    assert!(matches!(result, Err(MarketError::OfferNotFound { .. })));
}

#[test]
fn re_acceptance_succeeds_and_re_emits() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();
    h.market.take_events();

    h.market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .unwrap();
    h.market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .unwrap();

    let events = h.market.take_events();
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|e| matches!(e, MarketEvent::OfferAccepted { .. })));
}

#[test]
fn acceptance_follows_the_snapshot_after_out_of_band_transfer() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();

    // The asset moves outside the marketplace. The snapshotted seller can
    // still accept; the new holder cannot.
    let outsider = address();
    h.market
        .registry_mut()
        .mint(&h.registry_addr, TOKEN, &outsider);

    let by_outsider = h.market.accept_offer(h.item, &h.offerer.clone(), &outsider);
    assert!(matches!(by_outsider, Err(MarketError::NotOfferTarget { .. })));
    assert!(h
        .market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .is_ok());
}

// ============================================================================
// Phase 3: Claiming
// ============================================================================

#[test]
fn claim_before_acceptance_is_rejected() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();

    let result = h
        .market
        .claim_item(h.item, &h.offerer.clone(), Amount::from_units(500));
    assert!(matches!(result, Err(MarketError::OfferNotAccepted { .. })));
}

#[test]
fn claim_without_an_offer_is_rejected() {
    let mut h = harness();
    let result = h
        .market
        .claim_item(h.item, &h.offerer.clone(), Amount::from_units(500));
    assert!(matches!(result, Err(MarketError::OfferNotFound { .. })));
}

#[test]
fn underfunded_claim_moves_nothing() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();
    h.market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .unwrap();

    let result = h
        .market
        .claim_item(h.item, &h.offerer.clone(), Amount::from_units(499));
    assert!(matches!(
        result,
        Err(MarketError::InsufficientFunds {
            required: 500,
            sent: 499
        })
    ));

    assert!(balance(&h.market, &h.seller).is_zero());
    assert_eq!(h.market.item(h.item).unwrap().owner, h.seller);
    assert!(h.market.offer(h.item, &h.offerer).is_ok());
}

#[test]
fn claim_charges_no_fee() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();
    h.market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .unwrap();

    h.market
        .claim_item(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();

    // Unlike a listed sale, the seller receives the full price.
    assert_eq!(balance(&h.market, &h.seller), Amount::from_units(500));
    assert!(h.market.treasury_balance().is_zero());

    let claimed = h.market.item(h.item).unwrap().clone();
    assert_eq!(claimed.owner, h.offerer);
    assert!(!claimed.is_listed());
    assert_eq!(
        h.market
            .registry()
            .owner_of(&h.registry_addr, TOKEN)
            .unwrap(),
        h.offerer
    );
}

#[test]
fn claim_refunds_excess() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();
    h.market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .unwrap();

    h.market
        .claim_item(h.item, &h.offerer.clone(), Amount::from_units(800))
        .unwrap();

    assert_eq!(balance(&h.market, &h.offerer), Amount::from_units(300));
    assert_eq!(balance(&h.market, &h.seller), Amount::from_units(500));
}

#[test]
fn claim_clears_sibling_offers() {
    let mut h = harness();
    let rival = address();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();
    h.market
        .place_offer(h.item, &rival, Amount::from_units(900))
        .unwrap();
    h.market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .unwrap();

    h.market
        .claim_item(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();

    // The claimed offer is gone, and so is the rival's, without refund or
    // notification.
    assert!(matches!(
        h.market.offer(h.item, &h.offerer),
        Err(MarketError::OfferNotFound { .. })
    ));
    assert!(matches!(
        h.market.offer(h.item, &rival),
        Err(MarketError::OfferNotFound { .. })
    ));
    assert!(h.market.offerers(h.item).is_empty());
}

#[test]
fn claim_settles_against_the_snapshot_and_unwinds_on_stale_owner() {
    let mut h = harness();
    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();
    h.market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .unwrap();

    // Ownership changed out-of-band after acceptance; the registry will
    // reject a transfer from the snapshotted seller.
    let outsider = address();
    h.market
        .registry_mut()
        .mint(&h.registry_addr, TOKEN, &outsider);

    let result = h
        .market
        .claim_item(h.item, &h.offerer.clone(), Amount::from_units(500));
    assert!(matches!(result, Err(MarketError::SettlementFailed { .. })));

    // No funds moved, the offer survives, the catalog is untouched.
    assert!(balance(&h.market, &h.seller).is_zero());
    assert!(balance(&h.market, &h.offerer).is_zero());
    assert!(h.market.offer(h.item, &h.offerer).unwrap().accepted);
    assert_eq!(h.market.item(h.item).unwrap().owner, h.seller);
}

#[test]
fn claim_flow_emits_events_in_order() {
    let mut h = harness();
    h.market.take_events();

    h.market
        .place_offer(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();
    h.market
        .accept_offer(h.item, &h.offerer.clone(), &h.seller.clone())
        .unwrap();
    h.market
        .claim_item(h.item, &h.offerer.clone(), Amount::from_units(500))
        .unwrap();

    let events = h.market.take_events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], MarketEvent::OfferPlaced { .. }));
    assert!(matches!(events[1], MarketEvent::OfferAccepted { .. }));
    match &events[2] {
        MarketEvent::ItemClaimed { item, claimer } => {
            assert_eq!(item, &h.item);
            assert_eq!(claimer, &h.offerer);
        }
        other => panic!("expected ItemClaimed, got {other:?}"),
    }
}
