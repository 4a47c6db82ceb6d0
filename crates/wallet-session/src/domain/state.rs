//! # Resolution State Machine
//!
//! Makes the settlement race explicit: a single phase flag decides which
//! of the mutually exclusive settlement paths may still fire, and once
//! settled, further updates become pure diffs against the cached identity.
//!
//! Everything here is synchronous. The service layer drives this machine
//! from its timer/stream race, which keeps the race logic itself testable
//! without a runtime.

use super::events::{IdentityUpdate, ProviderEvent, SessionEvent};
use super::identity::{AccountAddress, ChainId, SessionIdentity};

/// Settlement phase of one resolution attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Resumed session with the corroboration wait armed: the next
    /// qualifying update (or the timer) settles the resolution.
    AwaitingUpdate,
    /// Initial identity delivered; updates now diff into notifications.
    Settled,
}

/// What applying a session event produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The event settled the resolution. A settling event never also
    /// produces change notifications.
    Resolved(SessionIdentity),
    /// Post-settlement changes to forward, in emission order.
    Notify(Vec<ProviderEvent>),
    /// Not a session update, or nothing changed.
    Ignored,
}

/// Mutable record of one resolution attempt.
///
/// Settlement is one-way: once the phase reaches `Settled` it never goes
/// back, so at most one settlement can ever be observed per attempt.
#[derive(Debug)]
pub struct ResolutionState {
    address: Option<AccountAddress>,
    chain_id: Option<ChainId>,
    phase: Phase,
}

impl ResolutionState {
    /// State for a session whose initial identity is known.
    ///
    /// `waiting` arms the corroboration window used for resumed sessions,
    /// giving the wallet a chance to confirm or correct the cached
    /// identity before it is reported.
    #[must_use]
    pub fn new(address: AccountAddress, chain_id: ChainId, waiting: bool) -> Self {
        Self {
            address: Some(address),
            chain_id: Some(chain_id),
            phase: if waiting {
                Phase::AwaitingUpdate
            } else {
                Phase::Settled
            },
        }
    }

    /// True while the corroboration wait is armed.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.phase == Phase::AwaitingUpdate
    }

    /// Snapshot of the current identity.
    #[must_use]
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            address: self.address.clone(),
            chain_id: self.chain_id,
        }
    }

    /// Last known chain id.
    #[must_use]
    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    /// Settle on the currently cached identity.
    ///
    /// Called when the corroboration wait expires (or the update stream
    /// ends) with no qualifying update. Idempotent: re-settling keeps the
    /// cached identity and stays settled.
    pub fn settle_on_cached(&mut self) -> SessionIdentity {
        self.phase = Phase::Settled;
        self.identity()
    }

    /// Apply one event from the session's update stream.
    ///
    /// While the wait is armed, the first session update settles the
    /// resolution on the updated identity, absent fields included. After
    /// settlement, each update is diffed field by field: a changed address
    /// yields `AccountsChanged`, a changed chain yields `ChainChanged`
    /// followed by `NetworkChanged`.
    pub fn apply_event(&mut self, event: &SessionEvent) -> UpdateOutcome {
        if !event.is_session_update() {
            return UpdateOutcome::Ignored;
        }
        let update = IdentityUpdate::from_event(event);
        match self.phase {
            Phase::AwaitingUpdate => {
                self.phase = Phase::Settled;
                self.address = update.address;
                self.chain_id = update.chain_id;
                UpdateOutcome::Resolved(self.identity())
            }
            Phase::Settled => {
                let mut changes = Vec::new();
                if self.address != update.address {
                    self.address = update.address;
                    changes.push(ProviderEvent::AccountsChanged(
                        self.address.clone().into_iter().collect(),
                    ));
                }
                if self.chain_id != update.chain_id {
                    self.chain_id = update.chain_id;
                    changes.push(ProviderEvent::ChainChanged(self.chain_id));
                    changes.push(ProviderEvent::NetworkChanged(self.chain_id));
                }
                if changes.is_empty() {
                    UpdateOutcome::Ignored
                } else {
                    UpdateOutcome::Notify(changes)
                }
            }
        }
    }
}
