//! Scriptable network primitives and sinks for testing
//!
//! [`MockFetchClient`] answers fetch calls from a queue of scripted
//! results. [`MockXhr`] is a handle whose lifecycle is driven from the
//! outside through its [`MockXhrController`], so tests decide exactly when
//! and in what order requests complete.

use std::collections::{HashMap, VecDeque};
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use netscope_core::{Body, CapturedRequest};

use crate::client::{
    FetchClient, FetchRequest, FetchResponse, ReadyState, ReadyStateListener, XhrFactory,
    XhrHandle, XhrSnapshot,
};
use crate::error::{FetchError, XhrError};
use crate::sink::RecordSink;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fetch client answering from a queue of scripted results
///
/// Each call consumes one queued result at call time, so results are
/// matched to calls in issue order even when the calls complete out of
/// order.
#[derive(Default)]
pub struct MockFetchClient {
    results: Mutex<VecDeque<Result<FetchResponse, FetchError>>>,
    requests: Mutex<Vec<FetchRequest>>,
    delay: Option<Duration>,
    delays_by_url: HashMap<String, Duration>,
}

impl MockFetchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `delay`
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay responses for one url, overriding the default delay
    #[must_use]
    pub fn with_delay_for(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays_by_url.insert(url.into(), delay);
        self
    }

    pub fn queue_response(&self, response: FetchResponse) {
        lock(&self.results).push_back(Ok(response));
    }

    pub fn queue_error(&self, error: FetchError) {
        lock(&self.results).push_back(Err(error));
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<FetchRequest> {
        lock(&self.requests).clone()
    }
}

impl FetchClient for MockFetchClient {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, FetchError>> {
        let result = lock(&self.results).pop_front().unwrap_or_else(|| {
            Err(FetchError::Network(
                "No queued response in MockFetchClient".to_string(),
            ))
        });
        let delay = self.delays_by_url.get(&request.url).copied().or(self.delay);
        lock(&self.requests).push(request);

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

#[derive(Default)]
struct MockXhrState {
    ready_state: Option<ReadyState>,
    status: u16,
    response_text: String,
    method: Option<String>,
    url: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<Body>,
    sent: bool,
    listeners: Vec<ReadyStateListener>,
}

impl MockXhrState {
    fn ready_state(&self) -> ReadyState {
        self.ready_state.unwrap_or(ReadyState::Unsent)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            ready_state: self.ready_state(),
            status: self.status,
            response_text: self.response_text.clone(),
        }
    }
}

struct Snapshot {
    ready_state: ReadyState,
    status: u16,
    response_text: String,
}

impl XhrSnapshot for Snapshot {
    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn response_text(&self) -> String {
        self.response_text.clone()
    }
}

/// Move the handle to `state` and notify listeners outside the lock, so a
/// listener may touch the handle again without deadlocking.
fn transition(shared: &Mutex<MockXhrState>, state: ReadyState) {
    let (mut listeners, snapshot) = {
        let mut guard = lock(shared);
        guard.ready_state = Some(state);
        (mem::take(&mut guard.listeners), guard.snapshot())
    };

    for listener in &mut listeners {
        listener(&snapshot);
    }

    let mut guard = lock(shared);
    listeners.append(&mut guard.listeners);
    guard.listeners = listeners;
}

/// Handle-style request driven by a [`MockXhrController`]
pub struct MockXhr {
    shared: Arc<Mutex<MockXhrState>>,
}

impl MockXhr {
    pub fn new() -> (Self, MockXhrController) {
        let shared = Arc::new(Mutex::new(MockXhrState::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MockXhrController { shared },
        )
    }
}

impl XhrSnapshot for MockXhr {
    fn ready_state(&self) -> ReadyState {
        lock(&self.shared).ready_state()
    }

    fn status(&self) -> u16 {
        lock(&self.shared).status
    }

    fn response_text(&self) -> String {
        lock(&self.shared).response_text.clone()
    }
}

impl XhrHandle for MockXhr {
    fn open(&mut self, method: &str, url: &str) -> Result<(), XhrError> {
        {
            let mut state = lock(&self.shared);
            state.method = Some(method.to_string());
            state.url = Some(url.to_string());
            state.headers.clear();
            state.body = None;
            state.sent = false;
            state.status = 0;
            state.response_text.clear();
        }
        transition(&self.shared, ReadyState::Opened);
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), XhrError> {
        let mut state = lock(&self.shared);
        if state.ready_state() != ReadyState::Opened || state.sent {
            return Err(XhrError::InvalidState(
                "headers can only be set after open and before send",
            ));
        }
        if name.is_empty() {
            return Err(XhrError::InvalidHeader(name.to_string()));
        }
        state.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn add_ready_state_listener(&mut self, listener: ReadyStateListener) {
        lock(&self.shared).listeners.push(listener);
    }

    fn send(&mut self, body: Option<Body>) -> Result<(), XhrError> {
        let mut state = lock(&self.shared);
        if state.ready_state() != ReadyState::Opened || state.sent {
            return Err(XhrError::InvalidState(
                "send requires an opened request that has not been sent",
            ));
        }
        state.sent = true;
        state.body = body;
        Ok(())
    }
}

/// Drives a [`MockXhr`] through its lifecycle and inspects what it was sent
#[derive(Clone)]
pub struct MockXhrController {
    shared: Arc<Mutex<MockXhrState>>,
}

impl MockXhrController {
    /// Complete the request with a response
    pub fn respond(&self, status: u16, text: impl Into<String>) {
        {
            let mut state = lock(&self.shared);
            state.status = status;
            state.response_text = text.into();
        }
        transition(&self.shared, ReadyState::HeadersReceived);
        transition(&self.shared, ReadyState::Loading);
        transition(&self.shared, ReadyState::Done);
    }

    /// Complete the request with a network failure (status 0, no body)
    pub fn fail(&self) {
        {
            let mut state = lock(&self.shared);
            state.status = 0;
            state.response_text.clear();
        }
        transition(&self.shared, ReadyState::Done);
    }

    /// Move to an intermediate state without completing
    pub fn advance_to(&self, ready_state: ReadyState) {
        transition(&self.shared, ready_state);
    }

    pub fn method(&self) -> Option<String> {
        lock(&self.shared).method.clone()
    }

    pub fn url(&self) -> Option<String> {
        lock(&self.shared).url.clone()
    }

    /// Headers the handle itself received, in call order
    pub fn headers(&self) -> Vec<(String, String)> {
        lock(&self.shared).headers.clone()
    }

    pub fn body(&self) -> Option<Body> {
        lock(&self.shared).body.clone()
    }

    pub fn was_sent(&self) -> bool {
        lock(&self.shared).sent
    }
}

/// Factory producing [`MockXhr`] handles, keeping their controllers
#[derive(Default)]
pub struct MockXhrFactory {
    controllers: Mutex<Vec<MockXhrController>>,
}

impl MockXhrFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller of the `index`-th handle created
    pub fn controller(&self, index: usize) -> Option<MockXhrController> {
        lock(&self.controllers).get(index).cloned()
    }

    pub fn created(&self) -> usize {
        lock(&self.controllers).len()
    }
}

impl XhrFactory for MockXhrFactory {
    fn create(&self) -> Box<dyn XhrHandle> {
        let (xhr, controller) = MockXhr::new();
        lock(&self.controllers).push(controller);
        Box::new(xhr)
    }
}

/// Sink that keeps every record it receives
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<CapturedRequest>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far, in emit order
    pub fn records(&self) -> Vec<CapturedRequest> {
        lock(&self.records).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }
}

impl RecordSink for RecordingSink {
    fn emit(&self, record: CapturedRequest) {
        lock(&self.records).push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_fetch_answers_in_call_order() {
        let client = MockFetchClient::new();
        client.queue_response(FetchResponse::new(200, "first"));
        client.queue_error(FetchError::Aborted);

        let first = client.fetch(FetchRequest::new("/1")).await.unwrap();
        let second = client.fetch(FetchRequest::new("/2")).await;

        assert_eq!(first.text(), "first");
        assert_eq!(second.unwrap_err(), FetchError::Aborted);
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn mock_fetch_without_script_rejects() {
        let client = MockFetchClient::new();
        let result = client.fetch(FetchRequest::new("/")).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[test]
    fn mock_xhr_tracks_what_it_was_sent() {
        let (mut xhr, controller) = MockXhr::new();
        xhr.open("POST", "/submit").unwrap();
        xhr.set_request_header("X-A", "1").unwrap();
        xhr.send(Some(Body::from("payload"))).unwrap();

        assert_eq!(controller.method().as_deref(), Some("POST"));
        assert_eq!(controller.url().as_deref(), Some("/submit"));
        assert_eq!(controller.headers(), vec![("X-A".to_string(), "1".to_string())]);
        assert_eq!(controller.body(), Some(Body::Text("payload".to_string())));
        assert!(controller.was_sent());
    }

    #[test]
    fn mock_xhr_rejects_double_send() {
        let (mut xhr, _controller) = MockXhr::new();
        xhr.open("GET", "/").unwrap();
        xhr.send(None).unwrap();
        assert!(xhr.send(None).is_err());
    }

    #[test]
    fn mock_xhr_listener_sees_every_transition() {
        let (mut xhr, controller) = MockXhr::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_listener = Arc::clone(&seen);
        xhr.add_ready_state_listener(Box::new(move |snapshot: &dyn XhrSnapshot| {
            seen_by_listener.lock().unwrap().push(snapshot.ready_state());
        }));

        xhr.open("GET", "/").unwrap();
        xhr.send(None).unwrap();
        controller.respond(200, "ok");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ReadyState::Opened,
                ReadyState::HeadersReceived,
                ReadyState::Loading,
                ReadyState::Done
            ]
        );
        assert_eq!(xhr.response_text(), "ok");
    }

    #[test]
    fn factory_keeps_controllers() {
        let factory = MockXhrFactory::new();
        let _first = factory.create();
        let _second = factory.create();

        assert_eq!(factory.created(), 2);
        assert!(factory.controller(1).is_some());
        assert!(factory.controller(2).is_none());
    }
}
