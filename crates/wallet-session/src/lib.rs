//! # Wallet Session
//!
//! Session resolution for wallet-bridge connections.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Given an established (or establishable) wallet connection, settle the
//! session's identity - which account, which chain - exactly once, then
//! keep consumers informed as the wallet changes it:
//! - Fresh sessions settle immediately on the approved identity
//! - Resumed sessions briefly wait for the wallet to corroborate or
//!   correct the cached identity before falling back to it
//! - After settlement, identity changes surface as provider-style
//!   `accountsChanged` / `chainChanged` / `networkChanged` notifications
//!
//! ## Settlement Paths
//!
//! | Entry | Corroboration wait | Settles on |
//! |-------|--------------------|------------|
//! | Fresh session | ignored | approved identity, immediately |
//! | Resumed session | zero | cached identity, immediately |
//! | Resumed session | armed | first session update, or cached identity at expiry |
//!
//! ## Module Structure
//!
//! ```text
//! wallet-session/
//! ├── domain/       # identity values, session events, resolution state machine
//! ├── ports/        # WalletSessionApi, SessionProvider/SessionHandle
//! ├── connection    # chain write-back slot + notification channel
//! ├── service       # resolver orchestration and the session task
//! ├── config        # resolver tunables
//! └── testing       # scripted mocks
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connection;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod testing;

// Re-exports
pub use config::{ConfigError, ResolverConfig, DEFAULT_WAIT_FOR_INITIAL_UPDATE};
pub use connection::{NotificationError, ProviderEventStream, ProviderEvents, WalletConnection};
pub use domain::{
    AccountAddress, ChainId, IdentityUpdate, ProviderEvent, ResolutionState, SessionEvent,
    SessionEventKind, SessionIdentity, SessionUpdateParams, UpdateOutcome,
};
pub use error::{ResolveError, Result};
pub use ports::{
    ProviderError, SessionHandle, SessionProvider, SessionUpdates, WalletSessionApi,
};
pub use service::{ResolvedSession, SessionResolver};

/// Account type hosts register this provider under.
pub const PROVIDER_KIND: &str = "walletconnect";

/// Default capacity of a connection's notification channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
