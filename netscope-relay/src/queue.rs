//! Bounded per-tab buffer of envelopes awaiting a consumer

use std::collections::VecDeque;

use netscope_core::Envelope;

use crate::config::OverflowPolicy;

/// FIFO of envelopes for one tab with no live channel
///
/// Holds at most `capacity` envelopes (at least one). When full, the
/// [`OverflowPolicy`] decides which envelope is given up.
#[derive(Debug)]
pub struct PendingQueue {
    items: VecDeque<Envelope>,
    capacity: usize,
    policy: OverflowPolicy,
}

impl PendingQueue {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
            policy,
        }
    }

    /// Append an envelope, returning the one evicted to make room, if any
    pub fn push(&mut self, envelope: Envelope) -> Option<Envelope> {
        if self.items.len() < self.capacity {
            self.items.push_back(envelope);
            return None;
        }

        match self.policy {
            OverflowPolicy::DropOldest => {
                let evicted = self.items.pop_front();
                self.items.push_back(envelope);
                evicted
            }
            OverflowPolicy::DropNewest => Some(envelope),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Envelope> {
        self.items.iter()
    }
}

impl IntoIterator for PendingQueue {
    type Item = Envelope;
    type IntoIter = std::collections::vec_deque::IntoIter<Envelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
