//! Message transport between netscope's isolated contexts.
//!
//! The page, the bridge, the hub and the consumer share no memory; every
//! hop is a one-directional message channel. This crate abstracts a hop as
//! a send side and a receive side so the relay logic can run against an
//! in-memory implementation in tests and against a real messaging fabric
//! in production.
//!
//! # Key Types
//!
//! - [`Transport`] - Fire-and-forget send side of a hop
//! - [`Inbox`] - Receive side of a hop
//! - [`MemoryTransport`] / [`MemoryInbox`] - In-process implementation

pub mod error;
pub mod memory;
pub mod traits;

// Re-exports
pub use error::SendError;
pub use memory::{MemoryInbox, MemoryTransport, channel};
pub use traits::{Inbox, Transport};
