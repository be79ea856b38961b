//! accepts websocket connections and queues them until an opponent shows up
//! pairs players two by two and runs one game session per pair
//! each session: start, moves, result, rematch vote, end

use anyhow::Context;
use clap::Parser;
use log::info;
use rpsduel::libserver::{serve, Dispatcher, MatchQueue, QueueArc, ServerArgs};
use std::sync::Mutex;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ServerArgs::parse();

    let queue = QueueArc::new(Mutex::new(MatchQueue::new()));
    let dispatcher = Dispatcher::new(queue, args.session_config());

    let listener = TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("failed to bind {}", args.addr))?;
    info!("Server started at ws://{}", listener.local_addr()?);

    tokio::select! {
        _ = serve(listener, dispatcher) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            info!("shutting down");
        }
    }
    Ok(())
}
