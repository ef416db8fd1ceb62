//! Handles through which the other contexts reach a running hub

use std::sync::Arc;

use async_trait::async_trait;
use netscope_core::{Envelope, PortMessage, RuntimeMessage, TabId};
use netscope_transport::{Inbox, MemoryInbox, MemoryTransport, SendError, Transport, channel};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{HubEvent, HubStats, MessageSender, PortId, RelayHub, RuntimeDelivery};

/// Start `hub` on its own task
///
/// The task ends, returning the hub, once every handle, endpoint, and port
/// is gone.
pub fn spawn(hub: RelayHub) -> (HubHandle, JoinHandle<RelayHub>) {
    let (runtime, runtime_inbox) = channel();
    let (ports, port_inbox) = channel();
    let task = tokio::spawn(hub.run(runtime_inbox, port_inbox));
    (HubHandle { runtime, ports }, task)
}

/// Cloneable access to a running hub
#[derive(Clone)]
pub struct HubHandle {
    runtime: MemoryTransport<RuntimeDelivery>,
    ports: MemoryTransport<HubEvent>,
}

impl HubHandle {
    /// Runtime endpoint for a bridge running in `tab`
    pub fn endpoint(&self, tab: TabId) -> RuntimeEndpoint {
        self.endpoint_for(MessageSender::tab(tab))
    }

    /// Runtime endpoint with an explicit sender identity
    pub fn endpoint_for(&self, sender: MessageSender) -> RuntimeEndpoint {
        RuntimeEndpoint {
            sender,
            hub: self.runtime.clone(),
        }
    }

    /// Open a named consumer connection
    ///
    /// The port receives nothing until [`ConsumerPort::init`] names a tab.
    pub fn connect(&self, name: impl Into<String>) -> ConsumerPort {
        let id = PortId::new();
        let (outbound, inbox) = channel();
        // A closed hub leaves the port with a dead inbox: recv yields None
        let _ = self.ports.send(HubEvent::PortConnected {
            port: id,
            name: name.into(),
            outbound: Arc::new(outbound),
        });
        ConsumerPort {
            id,
            hub: self.ports.clone(),
            inbox,
        }
    }

    /// Current routing stats, or `None` if the hub has stopped
    pub async fn stats(&self) -> Option<HubStats> {
        let (reply, answer) = oneshot::channel();
        self.ports.send(HubEvent::Stats { reply }).ok()?;
        answer.await.ok()
    }
}

/// Send side handed to one tab's bridge; stamps every message with the tab
#[derive(Clone)]
pub struct RuntimeEndpoint {
    sender: MessageSender,
    hub: MemoryTransport<RuntimeDelivery>,
}

impl RuntimeEndpoint {
    pub fn sender(&self) -> MessageSender {
        self.sender
    }
}

impl Transport<RuntimeMessage> for RuntimeEndpoint {
    fn send(&self, message: RuntimeMessage) -> Result<(), SendError<RuntimeMessage>> {
        self.hub
            .send(RuntimeDelivery {
                sender: self.sender,
                message,
            })
            .map_err(|SendError(delivery)| SendError(delivery.message))
    }

    fn is_closed(&self) -> bool {
        self.hub.is_closed()
    }
}

/// A consumer's connection to the hub
///
/// Dropping the port disconnects it.
pub struct ConsumerPort {
    id: PortId,
    hub: MemoryTransport<HubEvent>,
    inbox: MemoryInbox<Envelope>,
}

impl ConsumerPort {
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Handshake: start receiving records for `tab`, buffered ones first
    pub fn init(&self, tab: TabId) -> Result<(), SendError<PortMessage>> {
        let message = PortMessage::Init { tab_id: tab };
        self.hub
            .send(HubEvent::PortMessage {
                port: self.id,
                message,
            })
            .map_err(|_| SendError(message))
    }
}

#[async_trait]
impl Inbox<Envelope> for ConsumerPort {
    async fn recv(&mut self) -> Option<Envelope> {
        self.inbox.recv().await
    }

    fn try_recv(&mut self) -> Option<Envelope> {
        self.inbox.try_recv()
    }
}

impl Drop for ConsumerPort {
    fn drop(&mut self) {
        let _ = self.hub.send(HubEvent::PortDisconnected { port: self.id });
    }
}
