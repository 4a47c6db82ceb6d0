//! # Outbound Ports (Driven SPI)
//!
//! Interfaces the host's connection layer must implement. The transport
//! itself (bridge handshake, message relay, persistence of approved
//! sessions) lives entirely behind these traits.

use crate::domain::{AccountAddress, ChainId, SessionEvent};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors reported by the connection provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The wallet rejected the session request.
    #[error("handshake rejected: {0}")]
    HandshakeRejected(String),

    /// The handshake did not complete in time at the transport layer.
    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Connection provider - the boundary to the wallet transport.
///
/// Implementations own the bridge connection and any persisted session
/// state. The resolver never talks to the transport directly.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Accounts known from a persisted session, available before the
    /// handshake completes. Non-empty means the session is being resumed
    /// rather than created.
    fn cached_accounts(&self) -> Vec<AccountAddress>;

    /// Establish a fresh session or restore the persisted one, returning
    /// a handle to the live session.
    async fn connect(&self) -> Result<Arc<dyn SessionHandle>, ProviderError>;

    /// Whether the underlying transport still holds a connection.
    /// Consulted for cleanup after a failed handshake.
    fn transport_connected(&self) -> bool;

    /// Tear down the underlying transport session.
    async fn kill_session(&self) -> Result<(), ProviderError>;
}

/// A live wallet session.
///
/// The resolver reads the initial identity from the handle and follows
/// its update stream for the rest of the session's life.
pub trait SessionHandle: Send + Sync {
    /// Accounts approved for this session. Non-empty once connected.
    fn accounts(&self) -> Vec<AccountAddress>;

    /// Chain the session was approved on.
    fn chain_id(&self) -> ChainId;

    /// Subscribe to the session's update events. Events sent before the
    /// subscription exists are not replayed.
    fn updates(&self) -> SessionUpdates;
}

/// Receiver half of a session's update stream.
///
/// Lag on the underlying channel is logged and skipped rather than
/// surfaced: every session update carries the complete current identity,
/// so the next event supersedes anything missed.
pub struct SessionUpdates {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl SessionUpdates {
    /// Wrap a broadcast receiver handed out by a provider.
    #[must_use]
    pub fn new(receiver: broadcast::Receiver<SessionEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next session event.
    ///
    /// Returns `None` once the sending side is gone, which marks the end
    /// of the session.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "session update stream lagged");
                }
            }
        }
    }
}
