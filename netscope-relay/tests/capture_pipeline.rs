//! Page to consumer: capture, bridge, hub, port

mod common;

use common::{next_envelope, open_page, start_hub};
use netscope_capture::{
    FetchClient, FetchError, FetchRequest, FetchResponse, XhrFactory,
};
use netscope_core::{Body, RequestKind, Status, TabId};

#[tokio::test]
async fn fetch_success_reaches_consumer() {
    let hub = start_hub();
    let mut port = hub.connect("devtools-panel");
    port.init(TabId(1)).unwrap();

    let page = open_page(&hub, 1);
    page.fetch_backend
        .queue_response(FetchResponse::new(200, "{\"ok\":true}"));

    let response = page
        .capabilities
        .fetch
        .fetch(
            FetchRequest::new("https://api.example.com/x")
                .with_method("POST")
                .with_body(Body::from("{\"a\":1}")),
        )
        .await
        .unwrap();
    // The caller still gets an unread body
    assert_eq!(response.text(), "{\"ok\":true}");

    let envelope = next_envelope(&mut port).await;
    let record = envelope.record;
    assert_eq!(envelope.tab_id, TabId(1));
    assert_eq!(record.kind, RequestKind::Fetch);
    assert_eq!(record.method, "POST");
    assert_eq!(record.url, "https://api.example.com/x");
    assert_eq!(record.status, Status::Code(200));
    assert_eq!(record.response, "{\"ok\":true}");
    assert!(record.duration > 0.0);
    assert_eq!(record.duration, record.end_time - record.start_time);
}

#[tokio::test]
async fn fetch_failure_is_recorded_and_rethrown() {
    let hub = start_hub();
    let mut port = hub.connect("devtools-panel");
    port.init(TabId(1)).unwrap();

    let page = open_page(&hub, 1);
    page.fetch_backend
        .queue_error(FetchError::Network("Network down".to_string()));

    let error = page
        .capabilities
        .fetch
        .fetch(FetchRequest::new("https://api.example.com/x"))
        .await
        .unwrap_err();
    assert_eq!(error, FetchError::Network("Network down".to_string()));

    let record = next_envelope(&mut port).await.record;
    assert_eq!(record.status, Status::Error);
    assert_eq!(record.response, "Network down");
}

#[tokio::test]
async fn xhr_request_reaches_consumer_with_headers() {
    let hub = start_hub();
    let mut port = hub.connect("devtools-panel");
    port.init(TabId(4)).unwrap();

    let page = open_page(&hub, 4);
    let mut xhr = page.capabilities.xhr.create();
    xhr.open("PUT", "/items/1").unwrap();
    xhr.set_request_header("X-A", "1").unwrap();
    xhr.set_request_header("X-A", "2").unwrap();
    xhr.send(Some(Body::from("{\"name\":\"n\"}"))).unwrap();
    page.xhr_backend
        .controller(0)
        .unwrap()
        .respond(201, "{\"id\":1}");

    let record = next_envelope(&mut port).await.record;
    assert_eq!(record.kind, RequestKind::Xhr);
    assert_eq!(record.method, "PUT");
    assert_eq!(record.status, Status::Code(201));
    assert_eq!(record.headers.len(), 1);
    assert_eq!(record.headers["X-A"], "2");
    assert_eq!(record.response, "{\"id\":1}");
}
