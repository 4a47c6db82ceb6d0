//! # Testing Utilities
//!
//! Scripted provider and session mocks used by this crate's unit tests
//! and the workspace integration suite.

use crate::domain::{AccountAddress, ChainId, SessionEvent};
use crate::ports::outbound::{ProviderError, SessionHandle, SessionProvider, SessionUpdates};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Channel capacity for mock session update streams.
const MOCK_UPDATE_CAPACITY: usize = 32;

/// In-memory session handle with an injectable update stream.
pub struct MockSessionHandle {
    accounts: Vec<AccountAddress>,
    chain_id: ChainId,
    events: Mutex<Option<broadcast::Sender<SessionEvent>>>,
}

impl MockSessionHandle {
    /// Handle approving the given accounts on the given chain.
    #[must_use]
    pub fn new(accounts: &[&str], chain_id: u64) -> Self {
        let (sender, _) = broadcast::channel(MOCK_UPDATE_CAPACITY);
        Self {
            accounts: accounts.iter().map(|a| AccountAddress::new(*a)).collect(),
            chain_id: ChainId::new(chain_id),
            events: Mutex::new(Some(sender)),
        }
    }

    /// Send an event into every subscribed update stream, returning the
    /// number of receivers it reached.
    pub fn inject(&self, event: SessionEvent) -> usize {
        self.events
            .lock()
            .as_ref()
            .map_or(0, |sender| sender.send(event).unwrap_or(0))
    }

    /// End the update stream, as when the wallet side disconnects.
    pub fn close(&self) {
        self.events.lock().take();
    }
}

impl SessionHandle for MockSessionHandle {
    fn accounts(&self) -> Vec<AccountAddress> {
        self.accounts.clone()
    }

    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn updates(&self) -> SessionUpdates {
        let receiver = match self.events.lock().as_ref() {
            Some(sender) => sender.subscribe(),
            None => closed_receiver(),
        };
        SessionUpdates::new(receiver)
    }
}

fn closed_receiver() -> broadcast::Receiver<SessionEvent> {
    let (sender, receiver) = broadcast::channel(1);
    drop(sender);
    receiver
}

/// Scripted session provider.
///
/// # Example
/// ```
/// use wallet_session::testing::MockSessionProvider;
/// use wallet_session::SessionProvider;
///
/// let provider = MockSessionProvider::resumed(&["0xAbc"], 1);
/// assert_eq!(provider.cached_accounts().len(), 1);
/// ```
pub struct MockSessionProvider {
    cached: Vec<AccountAddress>,
    handle: Arc<MockSessionHandle>,
    connect_error: Option<ProviderError>,
    kill_error: Option<ProviderError>,
    transport_connected: Mutex<bool>,
    kill_calls: Mutex<u32>,
}

impl MockSessionProvider {
    /// Provider with no persisted session. `connect` approves the given
    /// accounts on the given chain.
    #[must_use]
    pub fn fresh(accounts: &[&str], chain_id: u64) -> Self {
        Self {
            cached: Vec::new(),
            handle: Arc::new(MockSessionHandle::new(accounts, chain_id)),
            connect_error: None,
            kill_error: None,
            transport_connected: Mutex::new(true),
            kill_calls: Mutex::new(0),
        }
    }

    /// Provider resuming a persisted session: the cached accounts match
    /// what `connect` returns.
    #[must_use]
    pub fn resumed(accounts: &[&str], chain_id: u64) -> Self {
        let mut provider = Self::fresh(accounts, chain_id);
        provider.cached = accounts.iter().map(|a| AccountAddress::new(*a)).collect();
        provider
    }

    /// Provider whose handshake fails with the given error. The transport
    /// reads as disconnected unless scripted otherwise.
    #[must_use]
    pub fn failing(error: ProviderError) -> Self {
        let mut provider = Self::fresh(&[], 0);
        provider.connect_error = Some(error);
        *provider.transport_connected.lock() = false;
        provider
    }

    /// Script whether the transport looks connected.
    #[must_use]
    pub fn with_transport_connected(self, connected: bool) -> Self {
        *self.transport_connected.lock() = connected;
        self
    }

    /// Script `kill_session` to fail.
    #[must_use]
    pub fn with_kill_error(mut self, error: ProviderError) -> Self {
        self.kill_error = Some(error);
        self
    }

    /// The handle served by `connect`, exposed for event injection.
    #[must_use]
    pub fn handle(&self) -> Arc<MockSessionHandle> {
        Arc::clone(&self.handle)
    }

    /// How many times `kill_session` ran.
    #[must_use]
    pub fn kill_session_calls(&self) -> u32 {
        *self.kill_calls.lock()
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    fn cached_accounts(&self) -> Vec<AccountAddress> {
        self.cached.clone()
    }

    async fn connect(&self) -> Result<Arc<dyn SessionHandle>, ProviderError> {
        match &self.connect_error {
            Some(error) => Err(error.clone()),
            None => {
                let handle: Arc<dyn SessionHandle> = self.handle.clone();
                Ok(handle)
            }
        }
    }

    fn transport_connected(&self) -> bool {
        *self.transport_connected.lock()
    }

    async fn kill_session(&self) -> Result<(), ProviderError> {
        *self.kill_calls.lock() += 1;
        match &self.kill_error {
            Some(error) => Err(error.clone()),
            None => {
                *self.transport_connected.lock() = false;
                Ok(())
            }
        }
    }
}
