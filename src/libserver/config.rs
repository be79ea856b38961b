use clap::Parser;
use std::time::Duration;

/// Rock paper scissors matchmaking server
#[derive(Debug, Parser)]
#[command(name = "server", version)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(default_value = "127.0.0.1:6789")]
    pub addr: String,

    /// Seconds to wait for each move, 0 waits forever
    #[arg(long, default_value_t = 120)]
    pub move_timeout: u64,

    /// Seconds to wait for each rematch answer, 0 waits forever
    #[arg(long, default_value_t = 60)]
    pub rematch_timeout: u64,
}

/// Per-session knobs handed out by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    pub move_timeout: Option<Duration>,
    pub rematch_timeout: Option<Duration>,
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl ServerArgs {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            move_timeout: seconds(self.move_timeout),
            rematch_timeout: seconds(self.rematch_timeout),
        }
    }
}
