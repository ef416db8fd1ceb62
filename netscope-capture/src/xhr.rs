//! Decorator for the handle-style primitive
//!
//! A handle is configured across separate calls (`open`, any number of
//! `set_request_header`, then `send`), so the in-flight record rides on the
//! handle itself. At `send` the record moves into a ready-state listener,
//! which stamps and emits it when the handle reaches [`ReadyState::Done`].

use std::sync::{Arc, Mutex, PoisonError};

use netscope_core::{Body, Outcome, PendingRequest, RequestKind};
use tracing::trace;

use crate::client::{ReadyState, ReadyStateListener, XhrFactory, XhrHandle, XhrSnapshot};
use crate::error::XhrError;
use crate::recorder::Recorder;

/// Record handed from a handle to its completion listener
type Slot = Arc<Mutex<Option<PendingRequest>>>;

/// Wraps one handle, recording the request it carries
pub struct CapturingXhr {
    inner: Box<dyn XhrHandle>,
    recorder: Recorder,
    pending: Option<PendingRequest>,
    /// Record of the request currently in flight on this handle
    armed: Option<Slot>,
}

impl CapturingXhr {
    pub fn new(inner: Box<dyn XhrHandle>, recorder: Recorder) -> Self {
        Self {
            inner,
            recorder,
            pending: None,
            armed: None,
        }
    }

    /// Detach the in-flight record so its listener completes nothing
    fn disarm(&mut self) {
        if let Some(slot) = self.armed.take() {
            take_record(&slot);
        }
    }
}

impl XhrSnapshot for CapturingXhr {
    fn ready_state(&self) -> ReadyState {
        self.inner.ready_state()
    }

    fn status(&self) -> u16 {
        self.inner.status()
    }

    fn response_text(&self) -> String {
        self.inner.response_text()
    }
}

impl XhrHandle for CapturingXhr {
    fn open(&mut self, method: &str, url: &str) -> Result<(), XhrError> {
        let pending = self.recorder.start(RequestKind::Xhr, method, url);
        self.inner.open(method, url)?;
        // Reopening abandons whatever the handle was doing, in flight or not
        self.disarm();
        self.pending = Some(pending);
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), XhrError> {
        self.inner.set_request_header(name, value)?;
        if let Some(pending) = self.pending.as_mut() {
            pending.set_header(name, value);
        }
        Ok(())
    }

    fn add_ready_state_listener(&mut self, listener: ReadyStateListener) {
        self.inner.add_ready_state_listener(listener);
    }

    fn send(&mut self, body: Option<Body>) -> Result<(), XhrError> {
        let Some(mut pending) = self.pending.take() else {
            trace!("Send on a handle without an open record");
            return self.inner.send(body);
        };

        pending.set_body(body.clone());
        let slot: Slot = Arc::new(Mutex::new(Some(pending)));
        self.inner
            .add_ready_state_listener(completion_listener(Arc::clone(&slot), self.recorder.clone()));

        let result = self.inner.send(body);
        if result.is_err() {
            // The listener stays registered on the handle; disarm it so a
            // later request on the same handle cannot complete this record.
            take_record(&slot);
        } else {
            self.armed = Some(slot);
        }
        result
    }
}

fn completion_listener(slot: Slot, recorder: Recorder) -> ReadyStateListener {
    Box::new(move |xhr: &dyn XhrSnapshot| {
        if xhr.ready_state() != ReadyState::Done {
            return;
        }

        let Some(pending) = take_record(&slot) else {
            trace!("Handle completed with no attached record");
            return;
        };

        let end_time = recorder.now_ms();
        recorder.finish(
            pending,
            Outcome::response(xhr.status(), xhr.response_text()),
            end_time,
        );
    })
}

fn take_record(slot: &Slot) -> Option<PendingRequest> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Hands out [`CapturingXhr`] handles around the wrapped factory's handles
pub struct CapturingXhrFactory<F> {
    inner: F,
    recorder: Recorder,
}

impl<F> CapturingXhrFactory<F>
where
    F: XhrFactory,
{
    pub fn new(inner: F, recorder: Recorder) -> Self {
        Self { inner, recorder }
    }
}

impl<F> XhrFactory for CapturingXhrFactory<F>
where
    F: XhrFactory,
{
    fn create(&self) -> Box<dyn XhrHandle> {
        Box::new(CapturingXhr::new(self.inner.create(), self.recorder.clone()))
    }
}
