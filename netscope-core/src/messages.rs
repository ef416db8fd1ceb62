//! Wire messages exchanged between the isolated contexts
//!
//! Each hop has its own shape, mirroring what the browser APIs carry:
//!
//! - page to bridge: a posted [`PageEvent`] whose data is tagged with
//!   [`PAGE_EVENT_TAG`]
//! - bridge to hub: a [`RuntimeMessage`]
//! - consumer to hub: a [`PortMessage`] over a named connection

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::envelope::TabId;
use crate::error::CoreError;
use crate::record::CapturedRequest;

/// Type tag carried by every event the capture layer posts
pub const PAGE_EVENT_TAG: &str = "FROM_PAGE";

/// Where a posted page event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Posted by the page's own window
    SameWindow,
    /// Posted by a child frame
    Frame,
    /// Posted by a window of another origin
    CrossOrigin,
}

/// An event observed on the page's message surface
///
/// `data` is untrusted: any script on the page can post arbitrary values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEvent {
    pub source: EventSource,
    pub data: serde_json::Value,
}

impl PageEvent {
    /// Wrap a completed record the way the capture layer posts it
    pub fn from_record(record: CapturedRequest) -> Result<Self, CoreError> {
        let payload = serde_json::to_value(record).map_err(CoreError::Serialize)?;
        Ok(Self {
            source: EventSource::SameWindow,
            data: json!({
                "type": PAGE_EVENT_TAG,
                "payload": payload,
            }),
        })
    }

    /// The `type` field of the event data, if it is a string
    pub fn tag(&self) -> Option<&str> {
        self.data.get("type").and_then(serde_json::Value::as_str)
    }

    /// Decode the payload as a captured record
    pub fn record(&self) -> Result<CapturedRequest, CoreError> {
        let payload = self
            .data
            .get("payload")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        serde_json::from_value(payload).map_err(CoreError::MalformedPayload)
    }
}

/// Messages sent from a bridge to the relay hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RuntimeMessage {
    #[serde(rename = "INTERCEPTED_REQUEST")]
    InterceptedRequest(CapturedRequest),
}

/// Messages sent from a consumer over its named connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum PortMessage {
    /// Handshake declaring which tab the consumer observes
    Init {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
}
