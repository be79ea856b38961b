use anyhow::Context;
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::debug;
use rpsduel::libclient::{prompt, Scoreboard, Standing};
use rpsduel::libcommon::{ClientMessage, Role, ServerMessage};
use tokio::task::spawn_blocking;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

/// Play rock paper scissors against whoever connects next
#[derive(Debug, Parser)]
#[command(name = "client", version)]
struct ClientArgs {
    /// Server websocket url
    #[arg(default_value = "ws://127.0.0.1:6789/")]
    url: String,
}

enum Flow {
    Continue,
    Reply(ClientMessage),
    Stop,
}

#[derive(Default)]
struct Player {
    role: Option<Role>,
    scores: Scoreboard,
}

impl Player {
    async fn handle(&mut self, msg: ServerMessage) -> anyhow::Result<Flow> {
        match msg {
            ServerMessage::Waiting { message } => println!("{}", message),
            ServerMessage::Start { player, message } => {
                self.role = Some(player);
                println!("{}", message);
            }
            ServerMessage::YourMove { message } => {
                let choice = spawn_blocking(move || prompt::ask_move(&message)).await??;
                return Ok(Flow::Reply(ClientMessage::Move { choice }));
            }
            ServerMessage::Result {
                move1,
                move2,
                result,
            } => {
                println!("Player 1 chose: {}", move1);
                println!("Player 2 chose: {}", move2);
                match self.role {
                    Some(role) => {
                        let standing = Standing::from_outcome(result, role);
                        self.scores.record(standing);
                        println!("{} (won/lost/drawn: {})", standing.headline(), self.scores);
                    }
                    None => println!("Result: {:?}", result),
                }
            }
            ServerMessage::Rematch => {
                let yes = spawn_blocking(prompt::ask_rematch).await??;
                return Ok(Flow::Reply(ClientMessage::rematch(yes)));
            }
            ServerMessage::End { .. } => {
                println!("Game over.");
                return Ok(Flow::Stop);
            }
            ServerMessage::Error { message } => {
                println!("Error: {}", message);
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = ClientArgs::parse();
    let url = url::Url::parse(&args.url).with_context(|| format!("bad url {}", args.url))?;

    let (ws, _) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to {}", args.url))?;
    let (mut write, mut read) = ws.split();
    let mut player = Player::default();

    while let Some(frame) = read.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(other) => {
                debug!("ignoring {:?}", other);
                continue;
            }
            Err(e) => {
                debug!("read failed: {}", e);
                break;
            }
        };

        let msg = match ServerMessage::decode(&text) {
            Ok(msg) => msg,
            Err(_) => {
                println!("Unknown message: {}", text);
                continue;
            }
        };

        match player.handle(msg).await? {
            Flow::Continue => {}
            Flow::Reply(reply) => write.send(Message::Text(reply.encode()?)).await?,
            Flow::Stop => {
                let _ = write.close().await;
                return Ok(());
            }
        }
    }

    println!("Connection closed");
    Ok(())
}
