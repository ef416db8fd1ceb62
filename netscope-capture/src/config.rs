//! Configuration for the capture layer.

use serde::{Deserialize, Serialize};

/// Capture settings, read from the `[capture]` table of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Record a call-site trace for every request.
    #[serde(default = "default_capture_traces")]
    pub capture_traces: bool,

    /// Maximum number of frames kept per trace.
    #[serde(default = "default_trace_depth")]
    pub trace_depth: usize,

    /// Truncate captured response text beyond this many bytes.
    #[serde(default)]
    pub max_response_bytes: Option<usize>,
}

fn default_capture_traces() -> bool {
    true
}

fn default_trace_depth() -> usize {
    32
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            capture_traces: default_capture_traces(),
            trace_depth: default_trace_depth(),
            max_response_bytes: None,
        }
    }
}

impl CaptureConfig {
    /// Disable call-site traces.
    #[must_use]
    pub fn without_traces(mut self) -> Self {
        self.capture_traces = false;
        self
    }

    #[must_use]
    pub fn with_trace_depth(mut self, depth: usize) -> Self {
        self.trace_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = Some(limit);
        self
    }
}
