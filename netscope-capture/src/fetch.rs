//! Decorator for the future-style primitive

use futures::future::BoxFuture;
use netscope_core::{Outcome, RequestKind};

use crate::client::{FetchClient, FetchRequest, FetchResponse};
use crate::error::FetchError;
use crate::recorder::Recorder;

/// Wraps a [`FetchClient`], recording every call it makes
///
/// The record is opened when `fetch` is called, before the returned future
/// is polled, and is owned by that future until it is emitted. The caller
/// gets back exactly what the wrapped client produced.
pub struct CapturingFetch<C> {
    inner: C,
    recorder: Recorder,
}

impl<C> CapturingFetch<C>
where
    C: FetchClient,
{
    pub fn new(inner: C, recorder: Recorder) -> Self {
        Self { inner, recorder }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C> FetchClient for CapturingFetch<C>
where
    C: FetchClient,
{
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, FetchError>> {
        let mut pending =
            self.recorder
                .start(RequestKind::Fetch, request.effective_method(), &request.url);
        pending.set_headers(request.normalized_headers());
        pending.set_body(request.body.clone());

        let call = self.inner.fetch(request);

        Box::pin(async move {
            match call.await {
                Ok(response) => {
                    let end_time = self.recorder.now_ms();
                    let status = response.status();
                    // Read a clone so the caller still gets an unread body
                    let text = response.clone().text();
                    self.recorder
                        .finish(pending, Outcome::response(status, text), end_time);
                    Ok(response)
                }
                Err(error) => {
                    let end_time = self.recorder.now_ms();
                    self.recorder
                        .finish(pending, Outcome::failure(error.to_string()), end_time);
                    Err(error)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use netscope_core::{Body, ManualClock, Status};

    use super::*;
    use crate::config::CaptureConfig;
    use crate::mock::{MockFetchClient, RecordingSink};

    fn capturing(client: MockFetchClient) -> (CapturingFetch<MockFetchClient>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let recorder = Recorder::new(sink.clone(), &CaptureConfig::default());
        (CapturingFetch::new(client, recorder), sink)
    }

    #[tokio::test]
    async fn successful_fetch_is_recorded_and_returned_unread() {
        let client = MockFetchClient::new();
        client.queue_response(FetchResponse::new(200, "{\"ok\":true}"));
        let (fetch, sink) = capturing(client);

        let response = fetch
            .fetch(
                FetchRequest::new("https://api.example.com/x")
                    .with_method("POST")
                    .with_body(Body::from("{\"a\":1}")),
            )
            .await
            .unwrap();

        assert_eq!(response.clone().text(), "{\"ok\":true}");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind, RequestKind::Fetch);
        assert_eq!(record.method, "POST");
        assert_eq!(record.url, "https://api.example.com/x");
        assert_eq!(record.status, Status::Code(200));
        assert_eq!(record.response, "{\"ok\":true}");
        assert_eq!(record.body, Some(Body::Text("{\"a\":1}".to_string())));
    }

    #[tokio::test]
    async fn failed_fetch_is_recorded_and_error_passed_through() {
        let client = MockFetchClient::new();
        client.queue_error(FetchError::Network("Network down".to_string()));
        let (fetch, sink) = capturing(client);

        let error = fetch
            .fetch(FetchRequest::new("https://api.example.com/x"))
            .await
            .unwrap_err();

        assert_eq!(error, FetchError::Network("Network down".to_string()));
        let records = sink.records();
        assert_eq!(records[0].status, Status::Error);
        assert_eq!(records[0].response, "Network down");
        assert_eq!(records[0].method, "GET");
    }

    #[tokio::test]
    async fn wrapped_client_sees_the_original_request() {
        let client = MockFetchClient::new();
        client.queue_response(FetchResponse::new(204, ""));
        let (fetch, _sink) = capturing(client);

        let request = FetchRequest::new("/a").with_header("X-Mixed-Case", "v");
        fetch.fetch(request.clone()).await.unwrap();

        assert_eq!(fetch.inner().requests(), vec![request]);
    }

    #[tokio::test]
    async fn headers_are_normalized() {
        let client = MockFetchClient::new();
        client.queue_response(FetchResponse::new(200, ""));
        let (fetch, sink) = capturing(client);

        fetch
            .fetch(
                FetchRequest::new("/h")
                    .with_header("X-A", "1")
                    .with_header("x-a", "2"),
            )
            .await
            .unwrap();

        let headers = &sink.records()[0].headers;
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["x-a"], "2");
    }

    #[tokio::test]
    async fn record_is_opened_before_the_future_is_polled() {
        let client = MockFetchClient::new();
        client.queue_response(FetchResponse::new(200, ""));
        let sink = Arc::new(RecordingSink::new());
        let clock = Arc::new(ManualClock::new(10.0));
        let recorder =
            Recorder::new(sink.clone(), &CaptureConfig::default()).with_clock(clock.clone());
        let fetch = CapturingFetch::new(client, recorder);

        let call = fetch.fetch(FetchRequest::new("/late"));
        clock.advance(40.0);
        call.await.unwrap();

        let record = &sink.records()[0];
        assert_eq!(record.start_time, 10.0);
        assert_eq!(record.end_time, 50.0);
        assert_eq!(record.duration, 40.0);
    }

    #[inline(never)]
    fn issue_traced_fetch(
        fetch: &CapturingFetch<MockFetchClient>,
    ) -> BoxFuture<'_, Result<FetchResponse, FetchError>> {
        fetch.fetch(FetchRequest::new("/traced"))
    }

    #[tokio::test]
    async fn trace_starts_at_the_calling_function() {
        let client = MockFetchClient::new();
        client.queue_response(FetchResponse::new(200, ""));
        let (fetch, sink) = capturing(client);

        issue_traced_fetch(&fetch).await.unwrap();

        let trace = &sink.records()[0].trace;
        let first = trace.lines().next().unwrap();
        assert!(first.contains("issue_traced_fetch"), "trace was:\n{trace}");
        assert!(!trace.contains("CapturingFetch"));
    }

    #[tokio::test]
    async fn overlapping_fetches_keep_separate_records() {
        let client = MockFetchClient::new()
            .with_delay_for("https://slow.example.com/a", Duration::from_millis(40));
        client.queue_response(FetchResponse::new(200, "slow body"));
        client.queue_response(FetchResponse::new(404, "fast body"));
        let (fetch, sink) = capturing(client);

        let (slow, fast) = tokio::join!(
            fetch.fetch(FetchRequest::new("https://slow.example.com/a")),
            fetch.fetch(FetchRequest::new("https://fast.example.com/b")),
        );
        assert!(slow.is_ok());
        assert!(fast.is_ok());

        let records = sink.records();
        assert_eq!(records.len(), 2);
        let fast_record = records.iter().find(|r| r.url.contains("fast")).unwrap();
        let slow_record = records.iter().find(|r| r.url.contains("slow")).unwrap();
        assert_ne!(fast_record.id, slow_record.id);
        assert_eq!(fast_record.status, Status::Code(404));
        assert_eq!(fast_record.response, "fast body");
        assert_eq!(slow_record.status, Status::Code(200));
        assert_eq!(slow_record.response, "slow body");
    }
}
