pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod queue;
pub mod session;

pub use client::{Client, ConnId, Link};
pub use config::{ServerArgs, SessionConfig};
pub use dispatcher::{Dispatcher, QueueArc};
pub use error::SessionError;
pub use queue::{MatchQueue, Waiter};
pub use session::{Ending, GameSession, Summary};

use futures_util::StreamExt;
use log::{info, warn};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

pub async fn handle_connection(dispatcher: Dispatcher, raw_stream: TcpStream, addr: SocketAddr) {
    info!("Incoming TCP connection from: {}", addr);

    let ws_stream = match tokio_tungstenite::accept_async(raw_stream).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            warn!("websocket handshake with {} failed: {}", addr, e);
            return;
        }
    };

    let (outgoing, incoming) = ws_stream.split();
    let (client, link) = Client::pair(addr);

    let play = async move {
        if let Err(e) = dispatcher.dispatch(client).await {
            warn!("{} dropped: {}", addr, e);
        }
    };
    tokio::join!(link.run(outgoing, incoming), play);
    info!("{} disconnected", addr);
}

/// Accepts connections forever, one task each.
pub async fn serve(listener: TcpListener, dispatcher: Dispatcher) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tokio::spawn(handle_connection(dispatcher.clone(), stream, addr));
            }
            Err(e) => warn!("accept failed: {}", e),
        }
    }
}
