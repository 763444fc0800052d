//! Collection directory.
//!
//! Tracks which external asset collections are registered with the
//! marketplace. Ids are sequential from 1 and never reused; collections
//! are never removed.

use crate::error::MarketError;
use curio_token::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique collection identifier, assigned sequentially at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionId(u64);

impl CollectionId {
    /// Create a collection id from its raw value (as received from a host
    /// API or an indexed event).
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

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directory of registered collections.
#[derive(Debug, Default)]
pub struct CollectionDirectory {
    by_registry: HashMap<Address, CollectionId>,
    by_id: HashMap<CollectionId, Address>,
    next_id: u64,
}

impl CollectionDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection by its external registry address.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::CollectionAlreadyRegistered`] if the address
    /// is already present.
    pub fn add(&mut self, registry: &Address) -> Result<CollectionId, MarketError> {
        if self.by_registry.contains_key(registry) {
            return Err(MarketError::CollectionAlreadyRegistered {
                registry: registry.clone(),
            });
        }

        self.next_id += 1;
        let id = CollectionId(self.next_id);
        self.by_registry.insert(registry.clone(), id);
        self.by_id.insert(id, registry.clone());
        Ok(id)
    }

    /// Whether the registry address is already registered.
    #[must_use]
    pub fn is_registered(&self, registry: &Address) -> bool {
        self.by_registry.contains_key(registry)
    }

    /// Resolve a collection id to its external registry address.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::CollectionNotRegistered`] for unknown ids.
    pub fn registry_of(&self, collection: CollectionId) -> Result<&Address, MarketError> {
        self.by_id
            .get(&collection)
            .ok_or(MarketError::CollectionNotRegistered { collection })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curio_token::Wallet;

    fn address() -> Address {
        Wallet::generate().expect("wallet").address().clone()
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut directory = CollectionDirectory::new();
        let a = directory.add(&address()).unwrap();
        let b = directory.add(&address()).unwrap();
        assert_eq!(a.value(), 1);
        assert_eq!(b.value(), 2);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut directory = CollectionDirectory::new();
        let registry = address();
        directory.add(&registry).unwrap();

        let result = directory.add(&registry);
        assert!(matches!(
            result,
            Err(MarketError::CollectionAlreadyRegistered { .. })
        ));
    }

    #[test]
    fn is_registered_reflects_additions() {
        let mut directory = CollectionDirectory::new();
        let registry = address();
        assert!(!directory.is_registered(&registry));
        directory.add(&registry).unwrap();
        assert!(directory.is_registered(&registry));
    }

    #[test]
    fn registry_of_resolves_address() {
        let mut directory = CollectionDirectory::new();
        let registry = address();
        let id = directory.add(&registry).unwrap();
        assert_eq!(directory.registry_of(id).unwrap(), &registry);
    }

    #[test]
    fn registry_of_unknown_id_rejected() {
        let directory = CollectionDirectory::new();
        let result = directory.registry_of(CollectionId(9));
        assert!(matches!(
            result,
            Err(MarketError::CollectionNotRegistered { .. })
        ));
    }

    #[test]
    fn failed_registration_does_not_consume_an_id() {
        let mut directory = CollectionDirectory::new();
        let registry = address();
        directory.add(&registry).unwrap();
        let _ = directory.add(&registry);

        let next = directory.add(&address()).unwrap();
        assert_eq!(next.value(), 2);
    }

    #[test]
    fn collection_id_serialization() {
        let id = CollectionId(3);
        let json = serde_json::to_string(&id).expect("serialize");
        let parsed: CollectionId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
