//! # Session Events
//!
//! Wire-shaped events arriving from the wallet side of a session, and the
//! change notifications forwarded to consumers after resolution settles.

use super::identity::{AccountAddress, ChainId};
use serde::{Deserialize, Serialize};

/// Event kinds a live session can emit.
///
/// Follows the wire naming of the session protocol (`session_update` and
/// friends) so provider adapters can deserialize transport JSON directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    /// Initial approval of a fresh session.
    Connect,
    /// Accounts and/or chain changed on the wallet side.
    SessionUpdate,
    /// The wallet ended the session.
    Disconnect,
    /// A signing/call request initiated by the dapp side.
    CallRequest,
}

/// One notification from the wallet side of a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionEvent {
    /// What kind of event this is. Resolution only consults
    /// [`SessionEventKind::SessionUpdate`]; everything else is ignored.
    #[serde(rename = "event")]
    pub kind: SessionEventKind,
    /// Error reported alongside the event, if any. Logged, never acted on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// One entry per session covered by the event. Only the first entry
    /// is consulted.
    #[serde(default)]
    pub params: Vec<SessionUpdateParams>,
}

impl SessionEvent {
    /// A session update event carrying the given payload entries.
    #[must_use]
    pub fn update(params: Vec<SessionUpdateParams>) -> Self {
        Self {
            kind: SessionEventKind::SessionUpdate,
            error: None,
            params,
        }
    }

    /// An event of the given kind with no payload.
    #[must_use]
    pub fn of_kind(kind: SessionEventKind) -> Self {
        Self {
            kind,
            error: None,
            params: Vec::new(),
        }
    }

    /// True if resolution should consult this event at all.
    #[must_use]
    pub fn is_session_update(&self) -> bool {
        self.kind == SessionEventKind::SessionUpdate
    }
}

/// Per-session payload entry of a session update.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionUpdateParams {
    /// Accounts approved for the session, wallet casing preserved.
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Chain the session moved to, if the wallet reported one.
    #[serde(default, rename = "chainId")]
    pub chain_id: Option<ChainId>,
}

impl SessionUpdateParams {
    /// Payload entry with both fields present.
    #[must_use]
    pub fn new(account: impl Into<String>, chain_id: ChainId) -> Self {
        Self {
            accounts: vec![account.into()],
            chain_id: Some(chain_id),
        }
    }
}

/// Identity fields extracted from a session update.
///
/// Extraction never fails: absent entries, empty account lists, and
/// missing chain ids all degrade to `None` and processing continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityUpdate {
    /// First account of the first entry, lowercased.
    pub address: Option<AccountAddress>,
    /// Chain id of the first entry.
    pub chain_id: Option<ChainId>,
}

impl IdentityUpdate {
    /// Extract the consulted fields from an event payload.
    #[must_use]
    pub fn from_event(event: &SessionEvent) -> Self {
        let first = event.params.first();
        Self {
            address: first
                .and_then(|entry| entry.accounts.first())
                .map(AccountAddress::new),
            chain_id: first.and_then(|entry| entry.chain_id),
        }
    }
}

/// Change notifications delivered on the connection after resolution.
///
/// Variant names mirror the provider event names hosts already listen
/// for (`accountsChanged`, `chainChanged`, `networkChanged`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderEvent {
    /// The session's account changed. Carries the new address as a
    /// single-element list, or an empty list if the wallet cleared it.
    AccountsChanged(Vec<AccountAddress>),
    /// The session's chain changed.
    ChainChanged(Option<ChainId>),
    /// Legacy twin of [`ProviderEvent::ChainChanged`]; always emitted
    /// right after it, with the same value.
    NetworkChanged(Option<ChainId>),
}
