//! Capability traits for the two network primitives
//!
//! Page code never touches a network primitive directly; it goes through
//! these traits, which is what lets the capture layer slip a decorator in
//! front of the real implementation.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use netscope_core::{Body, Headers};

use crate::error::{FetchError, XhrError};

/// Arguments of a fetch call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    /// `None` means the primitive's default (`GET`)
    pub method: Option<String>,
    /// Headers as supplied by the caller, duplicates allowed
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The method actually used on the wire
    pub fn effective_method(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }

    /// Header names lower-cased, last value per name wins
    pub fn normalized_headers(&self) -> Headers {
        self.headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect()
    }
}

/// A settled fetch response
///
/// Cloning shares the body buffer; reading the body consumes one clone and
/// leaves the others untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    status: u16,
    headers: Headers,
    body: Bytes,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Consume the response and return its body bytes
    pub fn bytes(self) -> Bytes {
        self.body
    }

    /// Consume the response and decode its body as UTF-8 (lossily)
    pub fn text(self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Future-style network primitive
///
/// `fetch` builds its future synchronously, so anything done before the
/// returned future is first polled happens on the caller's own stack.
pub trait FetchClient: Send + Sync {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, FetchError>>;
}

impl<C> FetchClient for Arc<C>
where
    C: FetchClient + ?Sized,
{
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, FetchError>> {
        (**self).fetch(request)
    }
}

/// Lifecycle states of a handle-style request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Unsent = 0,
    Opened = 1,
    HeadersReceived = 2,
    Loading = 3,
    Done = 4,
}

/// Read-only view of a handle, passed to ready-state listeners
pub trait XhrSnapshot {
    fn ready_state(&self) -> ReadyState;

    /// Response status; 0 until headers arrive or after a network failure
    fn status(&self) -> u16;

    fn response_text(&self) -> String;
}

/// Callback fired on every ready-state change of a handle
pub type ReadyStateListener = Box<dyn FnMut(&dyn XhrSnapshot) + Send>;

/// Handle-style network primitive: configured across several calls,
/// completion reported through ready-state listeners
pub trait XhrHandle: XhrSnapshot + Send {
    fn open(&mut self, method: &str, url: &str) -> Result<(), XhrError>;

    fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), XhrError>;

    fn add_ready_state_listener(&mut self, listener: ReadyStateListener);

    fn send(&mut self, body: Option<Body>) -> Result<(), XhrError>;
}

/// Creates fresh handles, the way page code constructs a new request object
pub trait XhrFactory: Send + Sync {
    fn create(&self) -> Box<dyn XhrHandle>;
}

impl<F> XhrFactory for Arc<F>
where
    F: XhrFactory + ?Sized,
{
    fn create(&self) -> Box<dyn XhrHandle> {
        (**self).create()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_defaults_to_get() {
        let request = FetchRequest::new("https://example.com");
        assert_eq!(request.effective_method(), "GET");

        let request = request.with_method("DELETE");
        assert_eq!(request.effective_method(), "DELETE");
    }

    #[test]
    fn normalized_headers_lowercase_and_last_wins() {
        let request = FetchRequest::new("/")
            .with_header("Content-Type", "text/plain")
            .with_header("X-Trace", "1")
            .with_header("content-type", "application/json");

        let headers = request.normalized_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-trace"], "1");
    }

    #[test]
    fn cloned_response_keeps_original_body() {
        let response = FetchResponse::new(200, "{\"ok\":true}");
        let text = response.clone().text();

        assert_eq!(text, "{\"ok\":true}");
        assert_eq!(response.bytes(), Bytes::from_static(b"{\"ok\":true}"));
    }

    #[test]
    fn invalid_utf8_body_is_decoded_lossily() {
        let response = FetchResponse::new(200, vec![0x66, 0xff, 0x6f]);
        assert_eq!(response.text(), "f\u{fffd}o");
    }

    #[test]
    fn ready_states_are_ordered() {
        assert!(ReadyState::Opened < ReadyState::Done);
        assert_eq!(ReadyState::Done as u8, 4);
    }
}
