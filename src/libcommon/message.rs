use crate::libcommon::{Choice, Outcome, Role};
use serde::{Deserialize, Serialize};

pub const WAITING_TEXT: &str = "Waiting for an opponent...";
pub const YOUR_MOVE_TEXT: &str = "Enter your move (rock, paper, or scissors):";
pub const END_TEXT: &str = "Game over.";
pub const ROUND_ERROR_TEXT: &str = "A player disconnected or made an invalid move.";
pub const INVALID_MOVE_TEXT: &str = "Invalid move";

/// Everything the server ever writes to a socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Waiting {
        message: String,
    },
    Start {
        player: Role,
        message: String,
    },
    YourMove {
        message: String,
    },
    Result {
        move1: Choice,
        move2: Choice,
        result: Outcome,
    },
    Rematch,
    End {
        message: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn waiting() -> Self {
        ServerMessage::Waiting {
            message: WAITING_TEXT.to_string(),
        }
    }

    pub fn start(player: Role) -> Self {
        ServerMessage::Start {
            player,
            message: format!("Game started. You are Player {}", player.number()),
        }
    }

    pub fn your_move() -> Self {
        ServerMessage::YourMove {
            message: YOUR_MOVE_TEXT.to_string(),
        }
    }

    pub fn end() -> Self {
        ServerMessage::End {
            message: END_TEXT.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        ServerMessage::Error {
            message: message.to_string(),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

/// The two payloads a client sends: `{"move": ...}` and `{"rematch": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientMessage {
    Move {
        #[serde(rename = "move")]
        choice: Choice,
    },
    Rematch {
        rematch: Answer,
    },
}

impl ClientMessage {
    pub fn rematch(yes: bool) -> Self {
        ClientMessage::Rematch {
            rematch: if yes { Answer::Yes } else { Answer::No },
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
