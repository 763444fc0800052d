//! Asset ownership oracle consumed by the marketplace.
//!
//! Each registered collection is an external asset registry instance that
//! answers "who owns token T" and executes transfers on command. The
//! marketplace core is polymorphic over this capability only;
//! [`InMemoryRegistry`] is a self-contained implementation for hosts and
//! tests.

use curio_token::Address;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors reported by an asset registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry does not know the asset.
    #[error("unknown asset: registry {registry}, token {token_id}")]
    UnknownAsset {
        /// The registry address queried.
        registry: Address,
        /// The unknown token id.
        token_id: u64,
    },

    /// The claimed sender does not own the asset.
    #[error("transfer rejected: {from} does not own token {token_id}")]
    WrongOwner {
        /// The claimed current owner.
        from: Address,
        /// The token id in question.
        token_id: u64,
    },
}

/// Ownership oracle and transfer executor for (collection, token) pairs.
pub trait AssetRegistry {
    /// Current owner of `token_id` in the collection at `registry`.
    ///
    /// # Errors
    ///
    /// Returns error if the asset is unknown.
    fn owner_of(&self, registry: &Address, token_id: u64) -> Result<Address, RegistryError>;

    /// Transfer `token_id` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns error if the asset is unknown or `from` is not the actual
    /// owner. The transfer is applied fully or not at all.
    fn transfer(
        &mut self,
        registry: &Address,
        token_id: u64,
        from: &Address,
        to: &Address,
    ) -> Result<(), RegistryError>;
}

/// In-memory asset store keyed by (registry, token).
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    owners: HashMap<(Address, u64), Address>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an asset and its owner (test/host bootstrap).
    pub fn mint(&mut self, registry: &Address, token_id: u64, owner: &Address) {
        self.owners
            .insert((registry.clone(), token_id), owner.clone());
        debug!(registry = %registry, token_id, owner = %owner, "asset minted");
    }
}

impl AssetRegistry for InMemoryRegistry {
    fn owner_of(&self, registry: &Address, token_id: u64) -> Result<Address, RegistryError> {
        self.owners
            .get(&(registry.clone(), token_id))
            .cloned()
            .ok_or_else(|| RegistryError::UnknownAsset {
                registry: registry.clone(),
                token_id,
            })
    }

    fn transfer(
        &mut self,
        registry: &Address,
        token_id: u64,
        from: &Address,
        to: &Address,
    ) -> Result<(), RegistryError> {
        let key = (registry.clone(), token_id);
        let owner = self
            .owners
            .get(&key)
            .ok_or_else(|| RegistryError::UnknownAsset {
                registry: registry.clone(),
                token_id,
            })?;

        if owner != from {
            return Err(RegistryError::WrongOwner {
                from: from.clone(),
                token_id,
            });
        }

        self.owners.insert(key, to.clone());
        debug!(registry = %registry, token_id, from = %from, to = %to, "asset transferred");
        Ok(())
    }
}
