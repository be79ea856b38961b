use crate::libserver::{Client, ConnId, SessionError};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::oneshot;

/// A queued connection plus the signal that tells its task the match it was
/// pulled into is over.
pub struct Waiter {
    pub client: Arc<Client>,
    pub release: oneshot::Sender<()>,
}

impl Waiter {
    pub fn new(client: Arc<Client>) -> (Waiter, oneshot::Receiver<()>) {
        let (release, released) = oneshot::channel();
        (Waiter { client, release }, released)
    }
}

/// FIFO of connections waiting for an opponent.
///
/// Order lives in `order`, membership in `waiting`. Removing a waiter only
/// touches the map; its stale ticket is skipped on the next dequeue.
#[derive(Default)]
pub struct MatchQueue {
    order: VecDeque<(ConnId, u64)>,
    waiting: HashMap<ConnId, (u64, Waiter)>,
    tickets: u64,
}

impl MatchQueue {
    pub fn new() -> MatchQueue {
        MatchQueue::default()
    }

    pub fn enqueue(&mut self, waiter: Waiter) -> Result<(), SessionError> {
        let id = waiter.client.id;
        if self.waiting.contains_key(&id) {
            return Err(SessionError::AlreadyQueued(id));
        }
        self.tickets += 1;
        self.order.push_back((id, self.tickets));
        self.waiting.insert(id, (self.tickets, waiter));
        Ok(())
    }

    pub fn dequeue_or_none(&mut self) -> Option<Waiter> {
        while let Some((id, ticket)) = self.order.pop_front() {
            if matches!(self.waiting.get(&id), Some((current, _)) if *current == ticket) {
                return self.waiting.remove(&id).map(|(_, waiter)| waiter);
            }
        }
        None
    }

    pub fn remove_if_present(&mut self, id: ConnId) -> bool {
        let removed = self.waiting.remove(&id).is_some();
        if self.waiting.is_empty() {
            self.order.clear();
        }
        removed
    }

    #[cfg(test)]
    pub fn contains(&self, id: ConnId) -> bool {
        self.waiting.contains_key(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
