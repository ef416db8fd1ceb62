//! Core traits for one hop of the relay.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SendError;

/// Send side of a hop.
///
/// Sends never wait for the receiver: a message is either accepted for
/// delivery or handed back in a [`SendError`] because the other side is gone.
pub trait Transport<T>: Send + Sync {
    /// Hand a message to the hop.
    fn send(&self, message: T) -> Result<(), SendError<T>>;

    /// Whether the receiving side has gone away.
    fn is_closed(&self) -> bool;
}

impl<T, X> Transport<T> for Arc<X>
where
    X: Transport<T> + ?Sized,
{
    fn send(&self, message: T) -> Result<(), SendError<T>> {
        (**self).send(message)
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// Receive side of a hop.
///
/// `recv` must be cancel-safe: dropping its future before it resolves
/// must not lose a message, so inboxes can be raced in `select!`.
#[async_trait]
pub trait Inbox<T>: Send {
    /// Wait for the next message. `None` once every sender is gone.
    async fn recv(&mut self) -> Option<T>;

    /// Take the next message if one is already queued.
    fn try_recv(&mut self) -> Option<T>;
}
