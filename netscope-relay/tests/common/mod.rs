//! Shared test utilities for netscope-relay integration tests

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use netscope_capture::mock::{MockFetchClient, MockXhrFactory};
use netscope_capture::{CaptureConfig, CaptureLayer, NetworkCapabilities, PageEmitter};
use netscope_core::{CapturedRequest, Envelope, Outcome, PageEvent, PendingRequest, RequestKind, TabId};
use netscope_relay::{ConsumerPort, HubHandle, PageBridge, RelayConfig, RelayHub};
use netscope_transport::{Inbox, MemoryTransport, channel};
use tokio::task::JoinHandle;

/// Latency of every scripted fetch, so captured durations are non-zero
pub const FETCH_LATENCY: Duration = Duration::from_millis(5);

/// One instrumented page in one tab, wired through its own bridge
#[allow(dead_code)]
pub struct TestPage {
    pub tab: TabId,
    pub fetch_backend: Arc<MockFetchClient>,
    pub xhr_backend: Arc<MockXhrFactory>,
    pub capabilities: NetworkCapabilities,
    /// Raw access to the page's message surface, for posting forged events
    pub surface: MemoryTransport<PageEvent>,
    pub bridge: JoinHandle<usize>,
}

/// Spawns a hub with default config
pub fn start_hub() -> HubHandle {
    start_hub_with_config(RelayConfig::default())
}

#[allow(dead_code)]
pub fn start_hub_with_config(config: RelayConfig) -> HubHandle {
    let (hub, _task) = netscope_relay::spawn(RelayHub::new(config));
    hub
}

/// Instruments a fresh page in `tab` and starts its bridge
pub fn open_page(hub: &HubHandle, tab: i64) -> TestPage {
    let tab = TabId(tab);
    let (surface, page_events) = channel::<PageEvent>();

    let bridge = PageBridge::new(hub.endpoint(tab));
    let bridge = tokio::spawn(async move { bridge.run(page_events).await });

    let fetch_backend = Arc::new(MockFetchClient::new().with_delay(FETCH_LATENCY));
    let xhr_backend = Arc::new(MockXhrFactory::new());
    let mut capabilities = NetworkCapabilities::new(fetch_backend.clone(), xhr_backend.clone());

    let mut layer = CaptureLayer::new(
        Arc::new(PageEmitter::new(surface.clone())),
        &CaptureConfig::default(),
    );
    layer.install(&mut capabilities);

    TestPage {
        tab,
        fetch_backend,
        xhr_backend,
        capabilities,
        surface,
        bridge,
    }
}

/// Waits until the hub has buffered `count` envelopes in total
#[allow(dead_code)]
pub async fn wait_for_pending(hub: &HubHandle, count: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let stats = hub.stats().await.expect("hub stopped");
            if stats.pending_envelopes == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("timed out waiting for buffered records");
}

/// Receives the next envelope or fails the test after a short wait
pub async fn next_envelope(port: &mut ConsumerPort) -> Envelope {
    tokio::time::timeout(Duration::from_secs(2), port.recv())
        .await
        .expect("timed out waiting for an envelope")
        .expect("hub closed the port")
}

/// A completed record built outside any page, for forging events
#[allow(dead_code)]
pub fn detached_record(url: &str) -> CapturedRequest {
    PendingRequest::new(RequestKind::Fetch, "GET", url, 0.0, String::new()).complete(
        Outcome::response(200, ""),
        1.0,
        Utc::now(),
    )
}
