//! Where completed records go
//!
//! The capture layer hands each completed record to a [`RecordSink`].
//! In a page, that sink is a [`PageEmitter`], which posts the record onto
//! the page's message surface for the bridge to pick up.

use netscope_core::{CapturedRequest, PageEvent};
use netscope_transport::Transport;
use tracing::debug;

/// Receives completed records. Ownership of the record moves to the sink.
pub trait RecordSink: Send + Sync {
    fn emit(&self, record: CapturedRequest);
}

/// Posts records onto the page's message surface as tagged [`PageEvent`]s
///
/// Posting is fire-and-forget: if the surface is gone or the record cannot
/// be serialized, the record is dropped and the page carries on.
pub struct PageEmitter<T> {
    surface: T,
}

impl<T> PageEmitter<T>
where
    T: Transport<PageEvent>,
{
    pub fn new(surface: T) -> Self {
        Self { surface }
    }
}

impl<T> RecordSink for PageEmitter<T>
where
    T: Transport<PageEvent>,
{
    fn emit(&self, record: CapturedRequest) {
        let id = record.id;
        let event = match PageEvent::from_record(record) {
            Ok(event) => event,
            Err(e) => {
                debug!(%id, error = %e, "Dropping record that failed to serialize");
                return;
            }
        };

        if self.surface.send(event).is_err() {
            debug!(%id, "Page surface closed, dropping record");
        }
    }
}
