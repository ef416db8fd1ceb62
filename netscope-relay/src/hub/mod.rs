//! Per-tab routing of captured records to consumers
//!
//! [`RelayHub`] owns every [`Channel`] and [`PendingQueue`]. It is driven by
//! one task ([`RelayHub::run`]) and mutated only by [`RelayHub::handle`], so
//! a handshake and an arrival never interleave mid-handler.
//!
//! Per tab, envelopes reach the consumer in arrival order whether they were
//! delivered live or replayed from the queue.

mod handle;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use netscope_core::{CapturedRequest, Envelope, PortMessage, RuntimeMessage, TabId};
use netscope_transport::{Inbox, SendError, Transport};
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::queue::PendingQueue;

pub use handle::{ConsumerPort, HubHandle, RuntimeEndpoint, spawn};

/// Runtime deliveries handled in a row before a waiting port event gets a turn
pub const RUNTIME_BURST: usize = 64;

/// Identity of one consumer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(pub Uuid);

impl PortId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Origin of a runtime message, as stamped by the transport
///
/// Never taken from the message payload, so a page cannot claim another
/// tab's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageSender {
    pub tab: Option<TabId>,
}

impl MessageSender {
    pub fn tab(tab: TabId) -> Self {
        Self { tab: Some(tab) }
    }

    /// A sender outside any tab (e.g. another extension page)
    pub fn detached() -> Self {
        Self { tab: None }
    }
}

/// A runtime message together with who sent it
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeDelivery {
    pub sender: MessageSender,
    pub message: RuntimeMessage,
}

/// Everything the hub reacts to
pub enum HubEvent {
    Runtime {
        sender: MessageSender,
        message: RuntimeMessage,
    },
    PortConnected {
        port: PortId,
        name: String,
        outbound: Arc<dyn Transport<Envelope>>,
    },
    PortMessage {
        port: PortId,
        message: PortMessage,
    },
    PortDisconnected {
        port: PortId,
    },
    /// Diagnostics query, answered with the current [`HubStats`]
    Stats { reply: oneshot::Sender<HubStats> },
}

impl fmt::Debug for HubEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime { sender, message } => f
                .debug_struct("Runtime")
                .field("sender", sender)
                .field("message", message)
                .finish(),
            Self::PortConnected { port, name, .. } => f
                .debug_struct("PortConnected")
                .field("port", port)
                .field("name", name)
                .finish_non_exhaustive(),
            Self::PortMessage { port, message } => f
                .debug_struct("PortMessage")
                .field("port", port)
                .field("message", message)
                .finish(),
            Self::PortDisconnected { port } => f
                .debug_struct("PortDisconnected")
                .field("port", port)
                .finish(),
            Self::Stats { .. } => f.write_str("Stats"),
        }
    }
}

impl From<RuntimeDelivery> for HubEvent {
    fn from(delivery: RuntimeDelivery) -> Self {
        Self::Runtime {
            sender: delivery.sender,
            message: delivery.message,
        }
    }
}

/// Snapshot of the hub's routing state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Tabs with a live consumer
    pub channels: usize,
    /// Tabs with buffered envelopes
    pub pending_tabs: usize,
    /// Buffered envelopes across all tabs
    pub pending_envelopes: usize,
    /// Envelopes given up to queue overflow since start
    pub dropped: u64,
}

struct Connection {
    name: String,
    outbound: Arc<dyn Transport<Envelope>>,
}

/// Live delivery path for one tab
struct Channel {
    port: PortId,
    outbound: Arc<dyn Transport<Envelope>>,
}

/// Routes captured records to per-tab consumers
pub struct RelayHub {
    config: RelayConfig,
    connections: HashMap<PortId, Connection>,
    channels: HashMap<TabId, Channel>,
    pending: HashMap<TabId, PendingQueue>,
    dropped: u64,
}

impl RelayHub {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            connections: HashMap::new(),
            channels: HashMap::new(),
            pending: HashMap::new(),
            dropped: 0,
        }
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            channels: self.channels.len(),
            pending_tabs: self.pending.len(),
            pending_envelopes: self.pending.values().map(PendingQueue::len).sum(),
            dropped: self.dropped,
        }
    }

    /// Whether `tab` currently has a live consumer
    pub fn has_channel(&self, tab: TabId) -> bool {
        self.channels.contains_key(&tab)
    }

    /// Buffered envelopes for `tab`, oldest first
    pub fn pending_for(&self, tab: TabId) -> Vec<&CapturedRequest> {
        self.pending
            .get(&tab)
            .map(|queue| queue.iter().map(|envelope| &envelope.record).collect())
            .unwrap_or_default()
    }

    /// Apply one event to the routing state
    pub fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Runtime { sender, message } => self.on_runtime(sender, message),
            HubEvent::PortConnected {
                port,
                name,
                outbound,
            } => {
                debug!(%port, %name, "Consumer connected");
                self.connections.insert(port, Connection { name, outbound });
            }
            HubEvent::PortMessage { port, message } => match message {
                PortMessage::Init { tab_id } => self.handshake(port, tab_id),
            },
            HubEvent::PortDisconnected { port } => self.disconnect(port),
            HubEvent::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    /// Drive the hub until both inboxes close, then hand it back
    ///
    /// Runtime deliveries are drained before port events, so a record sent
    /// before a handshake is routed before that handshake. After
    /// [`RUNTIME_BURST`] deliveries in a row, one waiting port event is
    /// handled first, so a steady stream of records cannot starve
    /// handshakes, disconnects, or stats queries.
    pub async fn run<R, P>(mut self, mut runtime: R, mut ports: P) -> Self
    where
        R: Inbox<RuntimeDelivery>,
        P: Inbox<HubEvent>,
    {
        let mut runtime_open = true;
        let mut ports_open = true;
        let mut burst = 0;

        while runtime_open || ports_open {
            if burst >= RUNTIME_BURST {
                burst = 0;
                if let Some(event) = ports.try_recv() {
                    self.handle(event);
                    continue;
                }
            }

            let event = tokio::select! {
                biased;
                delivery = runtime.recv(), if runtime_open => match delivery {
                    Some(delivery) => {
                        burst += 1;
                        HubEvent::from(delivery)
                    }
                    None => {
                        runtime_open = false;
                        continue;
                    }
                },
                event = ports.recv(), if ports_open => match event {
                    Some(event) => {
                        burst = 0;
                        event
                    }
                    None => {
                        ports_open = false;
                        continue;
                    }
                },
            };
            self.handle(event);
        }

        debug!(stats = ?self.stats(), "Relay hub stopped");
        self
    }

    fn on_runtime(&mut self, sender: MessageSender, message: RuntimeMessage) {
        let Some(tab) = sender.tab else {
            trace!("Ignoring runtime message without a sender tab");
            return;
        };

        match message {
            RuntimeMessage::InterceptedRequest(record) => self.arrival(tab, record),
        }
    }

    fn arrival(&mut self, tab: TabId, record: CapturedRequest) {
        let envelope = Envelope::new(tab, record);

        let Some(channel) = self.channels.get(&tab) else {
            trace!(%tab, "No consumer, buffering record");
            self.enqueue(tab, envelope);
            return;
        };

        match channel.outbound.send(envelope) {
            Ok(()) => trace!(%tab, "Delivered record live"),
            Err(SendError(envelope)) => {
                // Consumer went away before its disconnect was processed
                warn!(%tab, "Consumer unreachable, buffering record");
                self.channels.remove(&tab);
                self.enqueue(tab, envelope);
            }
        }
    }

    fn handshake(&mut self, port: PortId, tab: TabId) {
        let Some(connection) = self.connections.get(&port) else {
            debug!(%port, %tab, "Handshake from unknown port, ignoring");
            return;
        };
        let outbound = Arc::clone(&connection.outbound);

        info!(%port, name = %connection.name, %tab, "Consumer attached to tab");
        let previous = self.channels.insert(
            tab,
            Channel {
                port,
                outbound: Arc::clone(&outbound),
            },
        );
        if previous.is_some_and(|channel| channel.port != port) {
            debug!(%tab, "Replaced existing consumer channel");
        }

        let Some(queue) = self.pending.remove(&tab) else {
            return;
        };

        let total = queue.len();
        let mut backlog = queue.into_iter();
        while let Some(envelope) = backlog.next() {
            if let Err(SendError(envelope)) = outbound.send(envelope) {
                warn!(%tab, "Consumer closed during replay, keeping the rest buffered");
                self.channels.remove(&tab);
                for envelope in std::iter::once(envelope).chain(backlog) {
                    self.enqueue(tab, envelope);
                }
                return;
            }
        }
        debug!(%tab, replayed = total, "Replayed buffered records");
    }

    fn disconnect(&mut self, port: PortId) {
        let Some(connection) = self.connections.remove(&port) else {
            return;
        };

        // Only channels still bound to this port: a newer handshake for the
        // same tab keeps its channel.
        let before = self.channels.len();
        self.channels.retain(|_, channel| channel.port != port);

        info!(
            %port,
            name = %connection.name,
            channels_closed = before - self.channels.len(),
            "Consumer disconnected"
        );
    }

    fn enqueue(&mut self, tab: TabId, envelope: Envelope) {
        let RelayConfig {
            max_pending_per_tab,
            overflow,
        } = self.config;
        let queue = self
            .pending
            .entry(tab)
            .or_insert_with(|| PendingQueue::new(max_pending_per_tab, overflow));

        if let Some(evicted) = queue.push(envelope) {
            self.dropped += 1;
            warn!(
                %tab,
                url = %evicted.record.url,
                policy = ?overflow,
                dropped_total = self.dropped,
                "Pending queue full, dropping record"
            );
        }
    }
}
