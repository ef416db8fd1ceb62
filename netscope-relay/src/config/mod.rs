//! Layered configuration for the relay and capture layer

mod loader;
mod types;

pub use loader::{ConfigLoader, PROJECT_CONFIG_DIR_ENV};
pub use types::{DEFAULT_MAX_PENDING_PER_TAB, NetscopeConfig, OverflowPolicy, RelayConfig};
