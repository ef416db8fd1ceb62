//! Shared capture context used by both decorators

use std::sync::Arc;

use netscope_core::{Clock, MonotonicClock, Outcome, PendingRequest, RequestKind};
use tracing::trace;

use crate::config::CaptureConfig;
use crate::sink::RecordSink;
use crate::trace::TraceCapture;

/// Starts and finishes records on behalf of the decorators
///
/// Holds no per-call state: each call's [`PendingRequest`] lives in that
/// call's own future or handle, never here.
#[derive(Clone)]
pub struct Recorder {
    sink: Arc<dyn RecordSink>,
    clock: Arc<dyn Clock>,
    tracer: TraceCapture,
    max_response_bytes: Option<usize>,
}

impl Recorder {
    pub fn new(sink: Arc<dyn RecordSink>, config: &CaptureConfig) -> Self {
        Self {
            sink,
            clock: Arc::new(MonotonicClock::new()),
            tracer: TraceCapture::from_config(config),
            max_response_bytes: config.max_response_bytes,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Open a record at call time, capturing the caller's trace
    pub fn start(&self, kind: RequestKind, method: &str, url: &str) -> PendingRequest {
        PendingRequest::new(kind, method, url, self.clock.now_ms(), self.tracer.capture())
    }

    /// Current page time, for stamping the end of a call
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Complete a record and hand it to the sink
    pub fn finish(&self, pending: PendingRequest, mut outcome: Outcome, end_time: f64) {
        if let Some(limit) = self.max_response_bytes {
            truncate_on_char_boundary(&mut outcome.response, limit);
        }

        let record = pending.complete(outcome, end_time, self.clock.wall());
        trace!(
            id = %record.id,
            kind = %record.kind,
            status = %record.status,
            duration_ms = record.duration,
            "Captured request"
        );
        self.sink.emit(record);
    }
}

fn truncate_on_char_boundary(text: &mut String, limit: usize) {
    if text.len() <= limit {
        return;
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}
