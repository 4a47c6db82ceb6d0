//! # Wallet Connection
//!
//! The shared object handed back to the consumer once resolution settles.
//! It carries two things: the written-back chain id, and the notification
//! channel identity changes are emitted on.
//!
//! The chain id slot exists because the session representation underneath
//! does not keep its own chain field consistent across updates.
//! [`WalletConnection::sync_chain`] is the one place that patches it, and
//! every settlement and chain-change path goes through that call.

use crate::domain::{ChainId, ProviderEvent};
use parking_lot::RwLock;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors observed on a notification subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// Every handle to the connection is gone and the channel is closed.
    #[error("notification channel closed")]
    Closed,
}

/// Live connection object shared between the resolver and consumers.
#[derive(Debug)]
pub struct WalletConnection {
    /// Correlation id tying this session's log lines together.
    session_id: Uuid,
    /// Last resolved chain id, written back on settlement and on every
    /// chain change.
    chain_id: RwLock<Option<ChainId>>,
    /// Notification channel for post-settlement change events.
    events: broadcast::Sender<ProviderEvent>,
}

impl WalletConnection {
    /// Create a connection with the given notification channel capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            session_id: Uuid::new_v4(),
            chain_id: RwLock::new(None),
            events,
        }
    }

    /// Correlation id of this session.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Chain id as last written back by resolution.
    #[must_use]
    pub fn chain_id(&self) -> Option<ChainId> {
        *self.chain_id.read()
    }

    /// Write the resolved chain id back onto the connection.
    ///
    /// Single fix-up point for the inconsistent upstream chain field.
    pub(crate) fn sync_chain(&self, chain_id: Option<ChainId>) {
        *self.chain_id.write() = chain_id;
    }

    /// Subscribe to change notifications.
    ///
    /// Only changes emitted after the subscription exists are delivered.
    #[must_use]
    pub fn subscribe(&self) -> ProviderEvents {
        ProviderEvents {
            receiver: self.events.subscribe(),
        }
    }

    /// Change notifications as a [`Stream`].
    #[must_use]
    pub fn event_stream(&self) -> ProviderEventStream {
        ProviderEventStream {
            inner: BroadcastStream::new(self.events.subscribe()),
        }
    }

    /// Number of active notification subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Emit a change notification, returning how many subscribers got it.
    ///
    /// A notification with no subscribers is dropped and logged; the
    /// session keeps running either way.
    pub(crate) fn emit(&self, event: ProviderEvent) -> usize {
        match self.events.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(
                    session_id = %self.session_id,
                    ?event,
                    "change notification dropped, no subscribers"
                );
                0
            }
        }
    }
}

/// Receiver of connection change notifications.
pub struct ProviderEvents {
    receiver: broadcast::Receiver<ProviderEvent>,
}

impl ProviderEvents {
    /// Receive the next notification.
    ///
    /// Returns `None` once every handle to the connection is dropped. A
    /// session whose update stream has ended goes quiet instead: the
    /// channel stays open as long as the consumer holds the connection.
    /// A slow subscriber that lags the channel skips the overwritten
    /// notifications.
    pub async fn recv(&mut self) -> Option<ProviderEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification subscriber lagged");
                }
            }
        }
    }

    /// Receive without waiting. `Ok(None)` when nothing is queued.
    pub fn try_recv(&mut self) -> Result<Option<ProviderEvent>, NotificationError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Ok(Some(event)),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(NotificationError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification subscriber lagged");
                }
            }
        }
    }
}

/// [`Stream`] adapter over a notification subscription. Lagged
/// notifications are skipped.
pub struct ProviderEventStream {
    inner: BroadcastStream<ProviderEvent>,
}

impl Stream for ProviderEventStream {
    type Item = ProviderEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => return Poll::Ready(Some(event)),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(_)))) => continue,
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
