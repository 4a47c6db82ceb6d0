//! # Inbound Port (Driving API)
//!
//! What this subsystem offers the host application.

use crate::error::Result;
use crate::service::ResolvedSession;
use async_trait::async_trait;

/// Wallet session API.
///
/// One call per session lifetime: resolve the identity, then follow the
/// returned connection for changes.
#[async_trait]
pub trait WalletSessionApi: Send + Sync {
    /// Resolve the session's identity.
    ///
    /// Establishes or resumes the session, settles on an address/chain
    /// pair exactly once, and keeps forwarding identity changes on the
    /// returned connection until the session ends.
    async fn resolve(&self) -> Result<ResolvedSession>;
}
