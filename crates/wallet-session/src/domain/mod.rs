//! # Domain Module
//!
//! Identity value objects, session events, and the resolution state
//! machine. No I/O and no runtime dependencies live here.

pub mod events;
pub mod identity;
pub mod state;

pub use events::*;
pub use identity::*;
pub use state::*;
