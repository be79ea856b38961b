use crate::libcommon::{Outcome, Role};
use std::fmt;

/// A round result seen from one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Won,
    Lost,
    Tie,
}

impl Standing {
    pub fn from_outcome(outcome: Outcome, me: Role) -> Standing {
        match outcome.winner() {
            None => Standing::Tie,
            Some(winner) if winner == me => Standing::Won,
            Some(_) => Standing::Lost,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Standing::Won => "You won!",
            Standing::Lost => "You lost.",
            Standing::Tie => "Draw!",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Scoreboard {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Scoreboard {
    pub fn record(&mut self, standing: Standing) {
        match standing {
            Standing::Won => self.wins += 1,
            Standing::Lost => self.losses += 1,
            Standing::Tie => self.ties += 1,
        }
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.wins, self.losses, self.ties)
    }
}
