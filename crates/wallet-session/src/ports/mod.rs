//! # Ports Module
//!
//! Hexagonal boundaries: the inbound API offered to hosts and the
//! outbound interfaces the host's transport layer implements.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
