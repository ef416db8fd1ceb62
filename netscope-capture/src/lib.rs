//! Capture layer for netscope.
//!
//! Instead of patching the page's network primitives in place, the capture
//! layer wraps them. Both primitives are reached through capability traits
//! ([`FetchClient`] and [`XhrFactory`]); [`CaptureLayer::install`] swaps the
//! page's [`NetworkCapabilities`] for decorators that implement the same
//! traits, record every call, and emit one [`CapturedRequest`] per completed
//! call through a [`RecordSink`].
//!
//! Capture is transparent: callers see exactly the results and errors the
//! underlying primitive produced, and capture faults are logged and dropped.
//!
//! [`CapturedRequest`]: netscope_core::CapturedRequest

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod layer;
pub mod mock;
pub mod recorder;
pub mod sink;
pub mod trace;
pub mod xhr;

// Re-export key types for convenience
pub use client::{
    FetchClient, FetchRequest, FetchResponse, ReadyState, ReadyStateListener, XhrFactory,
    XhrHandle, XhrSnapshot,
};
pub use config::CaptureConfig;
pub use error::{FetchError, XhrError};
pub use fetch::CapturingFetch;
pub use layer::{CaptureLayer, InstallOutcome, InstallState, NetworkCapabilities};
pub use recorder::Recorder;
pub use sink::{PageEmitter, RecordSink};
pub use trace::TraceCapture;
pub use xhr::{CapturingXhr, CapturingXhrFactory};
