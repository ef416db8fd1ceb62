//! Field types shared by pending and captured records

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Header name to value. Last write per key wins; order is irrelevant.
pub type Headers = BTreeMap<String, String>;

/// Which network primitive produced a record
///
/// The two primitives have different lifecycle shapes: an XHR handle is
/// configured across several calls and signals completion through its
/// ready-state listeners, while a fetch settles a single future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Handle-style call: open, set headers, send, ready-state callback
    #[serde(rename = "XHR")]
    Xhr,
    /// Future-style call that settles asynchronously
    Fetch,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xhr => "XHR",
            Self::Fetch => "Fetch",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome status of a completed call
///
/// Serialized as the bare numeric code, or the string `"Error"` when the
/// call failed at the transport level and never produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Code(u16),
    Error,
}

impl Status {
    const ERROR_SENTINEL: &'static str = "Error";

    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Error => f.write_str(Self::ERROR_SENTINEL),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Code(code) => serializer.serialize_u16(*code),
            Self::Error => serializer.serialize_str(Self::ERROR_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(u16),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Ok(Self::Code(code)),
            Raw::Text(text) if text == Self::ERROR_SENTINEL => Ok(Self::Error),
            Raw::Text(text) => Err(serde::de::Error::custom(format!(
                "unknown status sentinel: {text}"
            ))),
        }
    }
}

/// Opaque request payload
///
/// Serialized untagged, so a JSON string reads back as [`Body::Text`].
/// `From<Value>` already maps strings to `Text`; a hand-built
/// `Json(Value::String(..))` does not survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Body {
    Text(String),
    Json(serde_json::Value),
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}
