pub mod prompt;
pub mod state;

pub use state::{Scoreboard, Standing};
