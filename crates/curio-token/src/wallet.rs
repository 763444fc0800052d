//! Account identity for marketplace participants.
//!
//! Every participant (sellers, buyers, offerers, the marketplace operator,
//! and the marketplace treasury itself) is identified by an [`Address`].
//! A [`Wallet`] is the Ed25519 keypair behind an address and can sign
//! operation payloads for hosts that require authenticated submissions.

use crate::error::{Result, TokenError};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An account address (base58-encoded 32-byte public key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create an address from a base58-encoded string.
    ///
    /// # Errors
    ///
    /// Returns error if the string is not valid base58 or wrong length.
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| TokenError::invalid_address(format!("invalid base58: {e}")))?;

        if bytes.len() != 32 {
            return Err(TokenError::invalid_address(format!(
                "address must be 32 bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self(s.to_string()))
    }

    /// Create an address from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns error if bytes are not 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(TokenError::invalid_address(format!(
                "address must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bs58::encode(bytes).into_string()))
    }

    /// Get the base58-encoded address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A participant wallet (Ed25519 keypair).
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Generate a new random wallet.
    ///
    /// Key material comes straight from the operating system's CSPRNG
    /// rather than a userspace PRNG.
    ///
    /// # Errors
    ///
    /// Returns error if the derived public key cannot form an address.
    pub fn generate() -> Result<Self> {
        let mut secret_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut secret_bytes);
        Self::from_secret_key(&secret_bytes)
    }

    /// Create a wallet from a secret key (32 bytes).
    ///
    /// # Errors
    ///
    /// Returns error if the key is invalid.
    pub fn from_secret_key(secret: &[u8]) -> Result<Self> {
        let secret_array: [u8; 32] = secret.try_into().map_err(|_| TokenError::WalletError {
            message: format!("secret key must be 32 bytes, got {}", secret.len()),
        })?;

        let signing_key = SigningKey::from_bytes(&secret_array);
        let verifying_key = signing_key.verifying_key();
        let address = Address::from_bytes(verifying_key.as_bytes())?;

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Get the wallet address.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the public key (verifying key).
    #[must_use]
    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign a message.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

#[allow(clippy::missing_fields_in_debug)]
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
