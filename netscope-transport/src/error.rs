//! Error types for transports.

use std::fmt;

/// The receiving side of a hop is gone.
///
/// Carries the undelivered message back so the caller can re-route it.
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    /// Recover the message that could not be delivered.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendError").finish_non_exhaustive()
    }
}

impl<T> fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("transport closed")
    }
}

impl<T> std::error::Error for SendError<T> {}
