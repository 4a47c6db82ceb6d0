//! # Session Resolver Service
//!
//! Orchestrates one resolution attempt: establish the session through the
//! provider, settle the initial identity exactly once, then follow the
//! session's update stream and forward identity changes on the connection
//! until the stream ends.
//!
//! Settlement happens on one of three paths. Fresh sessions (and resumed
//! sessions with the wait disabled) settle immediately on the approved
//! identity. Resumed sessions with the wait armed race a timer against
//! the update stream inside [`SessionResolver::resolve`]; whichever fires
//! first settles, and the state machine keeps the loser from settling
//! again. The spawned session task only ever handles post-settlement
//! diffing.

use crate::config::ResolverConfig;
use crate::connection::WalletConnection;
use crate::domain::{
    AccountAddress, ChainId, ProviderEvent, ResolutionState, SessionEvent, SessionIdentity,
    UpdateOutcome,
};
use crate::error::{ResolveError, Result};
use crate::ports::inbound::WalletSessionApi;
use crate::ports::outbound::{SessionProvider, SessionUpdates};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of a settled resolution.
#[derive(Clone, Debug)]
pub struct ResolvedSession {
    /// Shared connection object. Emits change notifications and tracks
    /// the written-back chain id for the rest of the session.
    pub connection: Arc<WalletConnection>,
    /// Settled address, lowercased. `None` only if the settling update
    /// carried no accounts.
    pub address: Option<AccountAddress>,
    /// Settled chain id. `None` only if the settling update carried none.
    pub chain_id: Option<ChainId>,
}

impl ResolvedSession {
    fn from_identity(connection: Arc<WalletConnection>, identity: SessionIdentity) -> Self {
        Self {
            connection,
            address: identity.address,
            chain_id: identity.chain_id,
        }
    }
}

/// Session resolver sitting between a connection provider and the
/// consumer.
pub struct SessionResolver {
    provider: Arc<dyn SessionProvider>,
    config: ResolverConfig,
}

impl SessionResolver {
    /// Create a resolver over a provider.
    #[must_use]
    pub fn new(provider: Arc<dyn SessionProvider>, config: ResolverConfig) -> Self {
        debug!(
            wait_ms = config.wait_for_initial_update.as_millis() as u64,
            event_capacity = config.event_capacity,
            "session resolver created"
        );
        Self { provider, config }
    }

    /// Resolver with the default configuration.
    #[must_use]
    pub fn with_defaults(provider: Arc<dyn SessionProvider>) -> Self {
        Self::new(provider, ResolverConfig::default())
    }

    /// Resolve the session's identity. See [`WalletSessionApi::resolve`].
    ///
    /// Rejects an invalid configuration before touching the provider;
    /// the notification channel cannot be built over a zero capacity.
    pub async fn resolve(&self) -> Result<ResolvedSession> {
        self.config.validate()?;

        let existing_session = !self.provider.cached_accounts().is_empty();
        if existing_session {
            debug!("using existing wallet session");
        } else {
            debug!("creating new wallet session");
        }

        let handle = match self.provider.connect().await {
            Ok(handle) => handle,
            Err(source) => {
                self.cleanup_stale_transport().await;
                return Err(ResolveError::Handshake {
                    source,
                    provider: Arc::clone(&self.provider),
                });
            }
        };

        let address = handle
            .accounts()
            .into_iter()
            .next()
            .ok_or(ResolveError::NoAccounts)?;
        let chain_id = handle.chain_id();
        // Subscribe before settling so no update can slip between the
        // initial read and the race.
        let mut updates = handle.updates();

        let connection = Arc::new(WalletConnection::new(self.config.event_capacity));
        let session_id = connection.session_id();

        let waiting = existing_session && self.config.waits_for_initial_update();
        let mut state = ResolutionState::new(address, chain_id, waiting);

        let identity = if waiting {
            self.await_corroboration(&mut state, &mut updates, session_id)
                .await
        } else {
            state.identity()
        };

        connection.sync_chain(identity.chain_id);
        info!(
            session_id = %session_id,
            address = ?identity.address,
            chain_id = ?identity.chain_id,
            "wallet session resolved"
        );

        let task = SessionTask {
            state,
            connection: Arc::clone(&connection),
        };
        tokio::spawn(task.run(updates));

        Ok(ResolvedSession::from_identity(connection, identity))
    }

    /// Race the corroboration timer against the update stream.
    ///
    /// Returns as soon as either settles; the state machine's phase flag
    /// is what guarantees only one of them can.
    async fn await_corroboration(
        &self,
        state: &mut ResolutionState,
        updates: &mut SessionUpdates,
        session_id: Uuid,
    ) -> SessionIdentity {
        let wait = self.config.wait_for_initial_update;
        debug!(
            session_id = %session_id,
            wait_ms = wait.as_millis() as u64,
            "waiting for initial session update"
        );

        let timer = time::sleep(wait);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = &mut timer => {
                    let identity = state.settle_on_cached();
                    debug!(
                        session_id = %session_id,
                        address = ?identity.address,
                        chain_id = ?identity.chain_id,
                        "initial session update timed out, using cached identity"
                    );
                    return identity;
                }
                event = updates.recv() => match event {
                    Some(event) => {
                        note_session_event(session_id, &event);
                        if let UpdateOutcome::Resolved(identity) = state.apply_event(&event) {
                            debug!(
                                session_id = %session_id,
                                address = ?identity.address,
                                chain_id = ?identity.chain_id,
                                "session update settled resolution"
                            );
                            return identity;
                        }
                    }
                    None => {
                        // Nothing further can arrive once the stream is
                        // closed; the cached identity is all there is.
                        debug!(session_id = %session_id, "update stream closed during wait");
                        return state.settle_on_cached();
                    }
                }
            }
        }
    }

    /// Best-effort teardown of a transport left half-open by a failed
    /// handshake. Never masks the original failure.
    async fn cleanup_stale_transport(&self) {
        if !self.provider.transport_connected() {
            return;
        }
        debug!("terminating stale transport after handshake failure");
        if let Err(error) = self.provider.kill_session().await {
            warn!(error = %error, "failed to terminate stale transport");
        }
    }
}

#[async_trait]
impl WalletSessionApi for SessionResolver {
    async fn resolve(&self) -> Result<ResolvedSession> {
        SessionResolver::resolve(self).await
    }
}

/// Background task following the update stream after settlement, diffing
/// each session update into change notifications.
struct SessionTask {
    state: ResolutionState,
    connection: Arc<WalletConnection>,
}

impl SessionTask {
    /// Run until the session's update stream closes.
    async fn run(mut self, mut updates: SessionUpdates) {
        let session_id = self.connection.session_id();
        while let Some(event) = updates.recv().await {
            note_session_event(session_id, &event);
            match self.state.apply_event(&event) {
                UpdateOutcome::Notify(changes) => {
                    for change in changes {
                        self.forward(session_id, change);
                    }
                }
                UpdateOutcome::Ignored => {}
                UpdateOutcome::Resolved(_) => {
                    warn!(session_id = %session_id, "settlement outcome on a settled session");
                }
            }
        }
        debug!(session_id = %session_id, "session update stream closed");
    }

    fn forward(&self, session_id: Uuid, change: ProviderEvent) {
        match &change {
            ProviderEvent::AccountsChanged(accounts) => {
                info!(session_id = %session_id, ?accounts, "wallet address changed");
            }
            ProviderEvent::ChainChanged(chain_id) => {
                info!(session_id = %session_id, ?chain_id, "wallet chain changed");
                self.connection.sync_chain(*chain_id);
            }
            ProviderEvent::NetworkChanged(_) => {}
        }
        self.connection.emit(change);
    }
}

fn note_session_event(session_id: Uuid, event: &SessionEvent) {
    match &event.error {
        Some(error) => debug!(
            session_id = %session_id,
            kind = ?event.kind,
            error = %error,
            "received session event"
        ),
        None => debug!(
            session_id = %session_id,
            kind = ?event.kind,
            "received session event"
        ),
    }
}
