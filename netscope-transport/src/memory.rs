//! In-memory transport.
//!
//! Backed by an unbounded tokio mpsc channel, which preserves send order
//! per sender and never blocks the sending context.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::error::SendError;
use crate::traits::{Inbox, Transport};

/// Create a connected in-memory hop.
pub fn channel<T>() -> (MemoryTransport<T>, MemoryInbox<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MemoryTransport { tx }, MemoryInbox { rx })
}

/// Send side of an in-memory hop. Cloning yields another sender.
#[derive(Debug)]
pub struct MemoryTransport<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for MemoryTransport<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Transport<T> for MemoryTransport<T>
where
    T: Send,
{
    fn send(&self, message: T) -> Result<(), SendError<T>> {
        self.tx.send(message).map_err(|err| SendError(err.0))
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receive side of an in-memory hop.
#[derive(Debug)]
pub struct MemoryInbox<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> MemoryInbox<T> {
    /// Stop accepting messages; already queued ones can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Number of messages waiting to be received.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Consume the inbox as a `Stream`.
    pub fn into_stream(self) -> UnboundedReceiverStream<T> {
        UnboundedReceiverStream::new(self.rx)
    }
}

#[async_trait]
impl<T> Inbox<T> for MemoryInbox<T>
where
    T: Send,
{
    async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}
