//! Call-site trace capture
//!
//! Traces are taken when a call is issued, on the caller's stack, so they
//! point at the code that made the request rather than at whatever
//! continuation observed its completion.

use std::backtrace::{Backtrace, BacktraceStatus};

use crate::config::CaptureConfig;

/// Text recorded when no trace could be taken
pub const TRACE_UNAVAILABLE: &str = "Stack trace not available";

/// Frames belonging to the capture machinery itself, including the
/// decorators and the `Arc` forwarding impls the caller goes through
const INTERNAL_FRAMES: &[&str] = &[
    "std::backtrace",
    "netscope_capture::trace::",
    "netscope_capture::recorder::",
    "netscope_capture::fetch::CapturingFetch",
    "netscope_capture::xhr::CapturingXhr",
    "netscope_capture::client::FetchClient>::fetch",
    "netscope_capture::client::XhrHandle>::open",
];

/// Captures call-site traces according to the capture config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceCapture {
    enabled: bool,
    depth: usize,
}

impl TraceCapture {
    pub fn new(enabled: bool, depth: usize) -> Self {
        Self { enabled, depth }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.capture_traces, config.trace_depth)
    }

    /// Trace of the current call site, or [`TRACE_UNAVAILABLE`]
    pub fn capture(&self) -> String {
        if !self.enabled || self.depth == 0 {
            return TRACE_UNAVAILABLE.to_string();
        }

        let backtrace = Backtrace::force_capture();
        if backtrace.status() != BacktraceStatus::Captured {
            return TRACE_UNAVAILABLE.to_string();
        }

        let trace = self.format(&backtrace.to_string());
        if trace.is_empty() {
            TRACE_UNAVAILABLE.to_string()
        } else {
            trace
        }
    }

    /// Drop capture-internal frames and keep at most `depth` of the rest
    fn format(&self, rendered: &str) -> String {
        split_frames(rendered)
            .into_iter()
            .filter(|frame| !is_internal(frame))
            .take(self.depth)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for TraceCapture {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}

fn is_internal(frame: &str) -> bool {
    let header = frame.lines().next().unwrap_or_default();
    INTERNAL_FRAMES.iter().any(|marker| header.contains(marker))
}

/// Split a rendered backtrace into frames: a `N: symbol` header line plus
/// any `at file:line` continuation lines.
fn split_frames(rendered: &str) -> Vec<String> {
    let mut frames: Vec<String> = Vec::new();

    for line in rendered.lines() {
        if is_frame_header(line) {
            frames.push(line.trim_start().to_string());
        } else if let Some(current) = frames.last_mut() {
            current.push('\n');
            current.push_str(line);
        }
    }

    frames
}

fn is_frame_header(line: &str) -> bool {
    let trimmed = line.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && trimmed[digits..].starts_with(':')
}
