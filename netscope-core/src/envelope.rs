//! The unit moved by the relay hub

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::CapturedRequest;

/// Identifier of the browser tab a record originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TabId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A captured record addressed to the consumer observing `tab_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub tab_id: TabId,
    pub record: CapturedRequest,
}

impl Envelope {
    pub fn new(tab_id: TabId, record: CapturedRequest) -> Self {
        Self { tab_id, record }
    }
}
