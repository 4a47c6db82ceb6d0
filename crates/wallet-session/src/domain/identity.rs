//! # Identity Value Objects
//!
//! The address and chain identifiers a resolution settles on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A wallet account address, case-normalized at construction.
///
/// Wallets report addresses in whatever casing they like (checksummed or
/// not); comparisons and the settled identity always use the lowercased
/// form so equality is stable across providers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Create an address, lowercasing the input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().to_lowercase())
    }

    /// The normalized address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccountAddress {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for AccountAddress {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chain identifier as reported by the wallet side of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Create a chain id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Numeric value of the chain id.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The address/chain pair a resolution settles on.
///
/// Both fields are optional because a corroborating session update may
/// omit either one; identities read directly from an approved session
/// always carry both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// First account of the session, lowercased. `None` only when the
    /// settling update carried no accounts.
    pub address: Option<AccountAddress>,
    /// Chain the session is on. `None` only when the settling update
    /// carried no chain id.
    pub chain_id: Option<ChainId>,
}

impl SessionIdentity {
    /// Identity with both fields present.
    #[must_use]
    pub fn new(address: AccountAddress, chain_id: ChainId) -> Self {
        Self {
            address: Some(address),
            chain_id: Some(chain_id),
        }
    }
}
