//! Request records
//!
//! A record is built in two stages. [`PendingRequest`] is created when a
//! call is issued and is owned by that call alone while it is in flight.
//! [`PendingRequest::complete`] consumes it and produces the immutable
//! [`CapturedRequest`], which is the only form that can be emitted.

mod types;

pub use types::{Body, Headers, RequestKind, Status};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A network call that has been issued but has not completed yet
#[derive(Debug)]
pub struct PendingRequest {
    id: Uuid,
    kind: RequestKind,
    method: String,
    url: String,
    headers: Headers,
    body: Option<Body>,
    start_time: f64,
    trace: String,
}

impl PendingRequest {
    /// Start a record at call time
    pub fn new(
        kind: RequestKind,
        method: impl Into<String>,
        url: impl Into<String>,
        start_time: f64,
        trace: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            method: method.into(),
            url: url.into(),
            headers: Headers::new(),
            body: None,
            start_time,
            trace,
        }
    }

    /// Record a request header, overwriting an earlier value for the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn set_headers(&mut self, headers: Headers) {
        self.headers = headers;
    }

    pub fn set_body(&mut self, body: Option<Body>) {
        self.body = body;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Stamp the outcome and timing, producing the emit-ready record
    ///
    /// `end_time` is clamped to `start_time` so the duration can never be
    /// negative, even if a clock misbehaves.
    pub fn complete(
        self,
        outcome: Outcome,
        end_time: f64,
        timestamp: DateTime<Utc>,
    ) -> CapturedRequest {
        let end_time = end_time.max(self.start_time);
        CapturedRequest {
            id: self.id,
            kind: self.kind,
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            start_time: self.start_time,
            end_time,
            duration: end_time - self.start_time,
            status: outcome.status,
            response: outcome.response,
            trace: self.trace,
            timestamp,
        }
    }
}

/// What a call produced: a status plus the response text or failure message
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: Status,
    pub response: String,
}

impl Outcome {
    /// The call reached the server and produced a response
    pub fn response(code: u16, text: impl Into<String>) -> Self {
        Self {
            status: Status::Code(code),
            response: text.into(),
        }
    }

    /// The call failed before producing a response
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            response: message.into(),
        }
    }
}

/// Structured record of one completed network call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRequest {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Option<Body>,
    /// Milliseconds on the page's monotonic clock
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub status: Status,
    pub response: String,
    /// Call-site trace captured when the call was issued
    pub trace: String,
    /// Wall-clock completion time
    pub timestamp: DateTime<Utc>,
}
