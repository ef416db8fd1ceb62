//! netscope-core: shared model for the netscope network inspector
//!
//! netscope observes the network calls a page makes and relays a
//! structured record of each call to an inspection surface living in a
//! different execution context. This crate holds everything the three
//! hops agree on:
//!
//! - **Records** - [`PendingRequest`] while a call is in flight,
//!   [`CapturedRequest`] once it has completed
//! - **Wire messages** - [`PageEvent`] (page to bridge),
//!   [`RuntimeMessage`] (bridge to hub), [`PortMessage`] (consumer to hub)
//!   and [`Envelope`] (hub to consumer)
//! - **Clocks** - [`Clock`] with a monotonic and a manual implementation
//! - **Display helpers** - the consumer-facing formatting contract in
//!   [`display`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  PageEvent   ┌─────────────┐  RuntimeMessage  ┌───────────┐  Envelope  ┌──────────┐
//! │ Capture Layer│ ───────────▶ │ Page Bridge │ ───────────────▶ │ Relay Hub │ ─────────▶ │ Consumer │
//! └──────────────┘              └─────────────┘                  └───────────┘            └──────────┘
//! ```

pub mod clock;
pub mod display;
pub mod envelope;
pub mod error;
pub mod messages;
pub mod record;

// Re-export key types for convenience
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use envelope::{Envelope, TabId};
pub use error::CoreError;
pub use messages::{EventSource, PAGE_EVENT_TAG, PageEvent, PortMessage, RuntimeMessage};
pub use record::{Body, CapturedRequest, Headers, Outcome, PendingRequest, RequestKind, Status};
