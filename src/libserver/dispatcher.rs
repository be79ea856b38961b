use crate::libcommon::ServerMessage;
use crate::libserver::{Client, GameSession, MatchQueue, SessionConfig, SessionError, Waiter};
use log::{debug, info};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

pub type QueueArc = Arc<Mutex<MatchQueue>>;

enum Placement {
    Paired(Waiter),
    Queued(oneshot::Receiver<()>),
}

/// Pairs incoming connections through the shared queue and drives the
/// resulting sessions. Cheap to clone, one clone per connection task.
#[derive(Clone)]
pub struct Dispatcher {
    queue: QueueArc,
    config: SessionConfig,
}

impl Dispatcher {
    pub fn new(queue: QueueArc, config: SessionConfig) -> Dispatcher {
        Dispatcher { queue, config }
    }

    fn queue(&self) -> Result<MutexGuard<'_, MatchQueue>, SessionError> {
        self.queue.lock().map_err(|_| SessionError::QueuePoisoned)
    }

    /// Returns once the connection has played out its session, or left the
    /// queue before anyone showed up.
    pub async fn dispatch(&self, client: Arc<Client>) -> Result<(), SessionError> {
        match self.place(&client)? {
            Placement::Paired(Waiter {
                client: waiting,
                release,
            }) => {
                info!("pairing {} with {}", waiting.addr, client.addr);
                GameSession::new(waiting, client, self.config).run().await;
                let _ = release.send(());
                Ok(())
            }
            Placement::Queued(released) => self.wait(client, released).await,
        }
    }

    /// Pairs with the longest live waiter, or queues the client. One lock for
    /// both so two arrivals can never end up waiting on each other.
    fn place(&self, client: &Arc<Client>) -> Result<Placement, SessionError> {
        let mut queue = self.queue()?;
        while let Some(waiter) = queue.dequeue_or_none() {
            if waiter.client.is_open() {
                return Ok(Placement::Paired(waiter));
            }
            info!("{} left before being paired", waiter.client.addr);
            let _ = waiter.release.send(());
        }

        let (waiter, released) = Waiter::new(client.clone());
        queue.enqueue(waiter)?;
        if let Err(e) = client.send(&ServerMessage::waiting()) {
            debug!("waiting notice to {} lost: {}", client.addr, e);
        }
        Ok(Placement::Queued(released))
    }

    async fn wait(
        &self,
        client: Arc<Client>,
        released: oneshot::Receiver<()>,
    ) -> Result<(), SessionError> {
        info!("{} is waiting for an opponent", client.addr);

        tokio::select! {
            _ = released => {
                debug!("{} finished its session", client.addr);
            }
            _ = client.closed() => {
                let removed = self.queue()?.remove_if_present(client.id);
                if removed {
                    info!("{} left the queue", client.addr);
                }
            }
        }
        Ok(())
    }
}
