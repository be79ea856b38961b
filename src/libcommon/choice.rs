use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

pub const CHOICES: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

impl Choice {
    /// The one choice this choice defeats.
    pub fn beats(self) -> Choice {
        match self {
            Choice::Rock => Choice::Scissors,
            Choice::Scissors => Choice::Paper,
            Choice::Paper => Choice::Rock,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Choice::Rock => "rock",
            Choice::Paper => "paper",
            Choice::Scissors => "scissors",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seat of a connection inside a session, fixed for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "player1")]
    Player1,
    #[serde(rename = "player2")]
    Player2,
}

impl Role {
    pub const BOTH: [Role; 2] = [Role::Player1, Role::Player2];

    pub fn index(self) -> usize {
        match self {
            Role::Player1 => 0,
            Role::Player2 => 1,
        }
    }

    pub fn number(self) -> usize {
        self.index() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "draw")]
    Draw,
    #[serde(rename = "player1")]
    Player1Wins,
    #[serde(rename = "player2")]
    Player2Wins,
}

impl Outcome {
    pub fn winner(self) -> Option<Role> {
        match self {
            Outcome::Draw => None,
            Outcome::Player1Wins => Some(Role::Player1),
            Outcome::Player2Wins => Some(Role::Player2),
        }
    }
}

pub fn resolve(p1_selected: Choice, p2_selected: Choice) -> Outcome {
    if p1_selected == p2_selected {
        Outcome::Draw
    } else if p1_selected.beats() == p2_selected {
        Outcome::Player1Wins
    } else {
        Outcome::Player2Wins
    }
}
