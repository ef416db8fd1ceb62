//! Bridge and hub for netscope.
//!
//! The [`PageBridge`] sits between a page and the background context and
//! forwards only trusted capture events. The [`RelayHub`] owns the per-tab
//! routing state: a [`Channel`](hub::RelayHub) for every tab with a live
//! consumer, and a [`PendingQueue`] for every tab whose records are waiting
//! for one.
//!
//! ```text
//! page ──PageEvent──▶ PageBridge ──RuntimeMessage──▶ RelayHub ──Envelope──▶ ConsumerPort
//!                                  (RuntimeEndpoint)         ◀──PortMessage──
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod hub;
pub mod logging;
pub mod queue;

// Re-export key types for convenience
pub use bridge::{BridgeVerdict, PageBridge, RejectReason};
pub use config::{ConfigLoader, NetscopeConfig, OverflowPolicy, RelayConfig};
pub use error::ConfigError;
pub use hub::{
    ConsumerPort, HubEvent, HubHandle, HubStats, MessageSender, PortId, RelayHub,
    RuntimeDelivery, RuntimeEndpoint, spawn,
};
pub use queue::PendingQueue;
