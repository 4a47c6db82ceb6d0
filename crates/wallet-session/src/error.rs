//! # Resolution Errors
//!
//! Failures surfaced to callers of the resolver. Handshake failures carry
//! the provider handle so the host can inspect or dispose of the failed
//! transport instead of reaching for ambient state.

use crate::config::ConfigError;
use crate::ports::outbound::{ProviderError, SessionProvider};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Convenience result alias for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors surfaced by session resolution.
#[derive(Error)]
pub enum ResolveError {
    /// The configuration failed validation. Caught before anything
    /// touches the provider.
    #[error("invalid resolver configuration: {0}")]
    Config(#[from] ConfigError),

    /// The session could not be established. Fatal for this attempt; no
    /// retry happens inside the resolver.
    #[error("wallet handshake failed: {source}")]
    Handshake {
        /// The transport-level failure.
        #[source]
        source: ProviderError,
        /// The provider whose handshake failed.
        provider: Arc<dyn SessionProvider>,
    },

    /// The session was established but reported no accounts, which
    /// breaks the provider contract.
    #[error("session established with no accounts")]
    NoAccounts,
}

impl ResolveError {
    /// The failed provider handle, when this error carries one.
    #[must_use]
    pub fn provider(&self) -> Option<&Arc<dyn SessionProvider>> {
        match self {
            Self::Handshake { provider, .. } => Some(provider),
            Self::Config(_) | Self::NoAccounts => None,
        }
    }
}

// Manual impl: the provider handle is a trait object with no Debug bound.
impl fmt::Debug for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(error) => f.debug_tuple("Config").field(error).finish(),
            Self::Handshake { source, .. } => f
                .debug_struct("Handshake")
                .field("source", source)
                .finish_non_exhaustive(),
            Self::NoAccounts => f.write_str("NoAccounts"),
        }
    }
}
