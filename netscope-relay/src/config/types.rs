use netscope_capture::CaptureConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PENDING_PER_TAB: usize = 1000;

/// Which envelope a full pending queue gives up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest buffered envelope to make room
    #[default]
    DropOldest,
    /// Refuse the incoming envelope
    DropNewest,
}

/// Relay hub settings, read from the `[relay]` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_max_pending_per_tab")]
    pub max_pending_per_tab: usize,

    #[serde(default)]
    pub overflow: OverflowPolicy,
}

fn default_max_pending_per_tab() -> usize {
    DEFAULT_MAX_PENDING_PER_TAB
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_pending_per_tab: default_max_pending_per_tab(),
            overflow: OverflowPolicy::default(),
        }
    }
}

impl RelayConfig {
    #[must_use]
    pub fn with_max_pending_per_tab(mut self, limit: usize) -> Self {
        self.max_pending_per_tab = limit;
        self
    }

    #[must_use]
    pub fn with_overflow(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = policy;
        self
    }
}

/// Complete netscope configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetscopeConfig {
    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub relay: RelayConfig,
}

/// A single config file, where every value may be left unset
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawNetscopeConfig {
    #[serde(default)]
    pub capture: RawCaptureConfig,
    #[serde(default)]
    pub relay: RawRelayConfig,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCaptureConfig {
    pub capture_traces: Option<bool>,
    pub trace_depth: Option<usize>,
    pub max_response_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRelayConfig {
    pub max_pending_per_tab: Option<usize>,
    pub overflow: Option<OverflowPolicy>,
}
