use crate::libcommon::ServerMessage;
use crate::libserver::SessionError;
use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::{future, pin_mut, Sink, Stream, StreamExt, TryStreamExt};
use log::debug;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tungstenite::protocol::Message;

pub type Tx = UnboundedSender<Message>;
pub type Rx = UnboundedReceiver<Message>;
pub type ConnId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Server side of one remote player.
///
/// Frames travel through channels, so the handle knows nothing about the
/// socket behind it. The matching [`Link`] pumps those channels into the
/// actual websocket.
pub struct Client {
    pub id: ConnId,
    pub addr: SocketAddr,
    tx: Tx,
    rx: Mutex<Rx>,
    open: watch::Receiver<bool>,
}

/// Transport end of a [`Client`].
pub struct Link {
    pub(crate) outbound: Rx,
    pub(crate) inbound: Tx,
    pub(crate) open: watch::Sender<bool>,
}

impl Client {
    pub fn pair(addr: SocketAddr) -> (Arc<Client>, Link) {
        let (tx, outbound) = unbounded();
        let (inbound, rx) = unbounded();
        let (open_tx, open_rx) = watch::channel(true);
        let client = Client {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            addr,
            tx,
            rx: Mutex::new(rx),
            open: open_rx,
        };
        let link = Link {
            outbound,
            inbound,
            open: open_tx,
        };
        (Arc::new(client), link)
    }

    pub fn send(&self, msg: &ServerMessage) -> Result<(), SessionError> {
        if !self.is_open() {
            return Err(SessionError::Closed);
        }
        let text = msg.encode()?;
        debug!("-> {}: {}", self.addr, text);
        self.tx
            .unbounded_send(Message::Text(text))
            .map_err(|_| SessionError::Closed)
    }

    /// Next text frame from the peer. Control frames are skipped.
    pub async fn recv(&self) -> Result<String, SessionError> {
        let mut rx = self.rx.lock().await;
        loop {
            match rx.next().await {
                Some(Message::Text(text)) => {
                    debug!("<- {}: {}", self.addr, text);
                    return Ok(text);
                }
                Some(Message::Binary(_)) => return Err(SessionError::Binary),
                Some(Message::Close(_)) | None => return Err(SessionError::Closed),
                Some(other) => debug!("ignoring frame from {}: {:?}", self.addr, other),
            }
        }
    }

    pub fn is_open(&self) -> bool {
        *self.open.borrow()
    }

    /// Resolves once the transport behind this handle is gone.
    pub async fn closed(&self) {
        let mut open = self.open.clone();
        loop {
            let still_open = *open.borrow_and_update();
            if !still_open || open.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Link {
    /// Shuttles frames between the socket halves and the client channels
    /// until either direction stops, then marks the client closed.
    pub async fn run<S, R, E>(self, outgoing: S, incoming: R)
    where
        S: Sink<Message, Error = E>,
        R: Stream<Item = Result<Message, E>>,
    {
        let Link {
            outbound,
            inbound,
            open,
        } = self;

        let handle_incoming = incoming.try_for_each(|msg| {
            if inbound.unbounded_send(msg).is_err() {
                debug!("dropping frame, nobody is listening");
            }
            future::ok(())
        });
        let receive_from_others = outbound.map(Ok).forward(outgoing);

        pin_mut!(handle_incoming, receive_from_others);
        future::select(handle_incoming, receive_from_others).await;
        let _ = open.send(false);
    }
}
