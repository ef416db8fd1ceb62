//! Filtered forwarder from the page to the relay hub

use netscope_core::{EventSource, PAGE_EVENT_TAG, PageEvent, RuntimeMessage};
use netscope_transport::{Inbox, SendError, Transport};
use tracing::{debug, trace};

/// Why the bridge refused a page event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Posted by a frame or a foreign window rather than the page itself
    ForeignSource(EventSource),
    /// Data has no string `type` field
    MissingTag,
    /// Data is tagged, but not as a capture event
    WrongTag(String),
    /// Tagged correctly, but the payload is not a captured record
    MalformedPayload,
}

/// What the bridge did with one page event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeVerdict {
    Forwarded,
    Rejected(RejectReason),
    /// Accepted, but the hub was unreachable; the record is dropped
    Undelivered,
}

/// Stateless forwarder: trusted capture events in, runtime messages out
pub struct PageBridge<T> {
    runtime: T,
}

impl<T> PageBridge<T>
where
    T: Transport<RuntimeMessage>,
{
    pub fn new(runtime: T) -> Self {
        Self { runtime }
    }

    /// Filter one page event and forward it if trusted
    pub fn handle(&self, event: PageEvent) -> BridgeVerdict {
        if event.source != EventSource::SameWindow {
            return self.reject(RejectReason::ForeignSource(event.source));
        }

        match event.tag() {
            None => return self.reject(RejectReason::MissingTag),
            Some(tag) if tag != PAGE_EVENT_TAG => {
                return self.reject(RejectReason::WrongTag(tag.to_string()));
            }
            Some(_) => {}
        }

        let record = match event.record() {
            Ok(record) => record,
            Err(err) => {
                trace!(error = %err, "Page event payload is not a record");
                return self.reject(RejectReason::MalformedPayload);
            }
        };

        match self.runtime.send(RuntimeMessage::InterceptedRequest(record)) {
            Ok(()) => BridgeVerdict::Forwarded,
            Err(SendError(_)) => {
                debug!("Relay hub unreachable, dropping record");
                BridgeVerdict::Undelivered
            }
        }
    }

    /// Forward events until the page surface closes, returning how many
    /// records were forwarded
    pub async fn run<I>(&self, mut inbox: I) -> usize
    where
        I: Inbox<PageEvent>,
    {
        let mut forwarded = 0;
        while let Some(event) = inbox.recv().await {
            if self.handle(event) == BridgeVerdict::Forwarded {
                forwarded += 1;
            }
        }
        debug!(forwarded, "Page event surface closed");
        forwarded
    }

    fn reject(&self, reason: RejectReason) -> BridgeVerdict {
        trace!(?reason, "Ignoring page event");
        BridgeVerdict::Rejected(reason)
    }
}
