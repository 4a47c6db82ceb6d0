//! # Wallet-Session Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # End-to-end resolution over the public API
//!     ├── resolution.rs     # settlement paths and the corroboration race
//!     ├── notifications.rs  # post-settlement change notifications
//!     └── settlement.rs     # exactly-once settlement properties
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p wallet-session-tests
//!
//! # By category
//! cargo test -p wallet-session-tests integration::resolution::
//! cargo test -p wallet-session-tests integration::notifications::
//! cargo test -p wallet-session-tests integration::settlement::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]
