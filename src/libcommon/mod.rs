pub mod choice;
pub mod message;

pub use choice::{resolve, Choice, Outcome, Role, CHOICES};
pub use message::{ClientMessage, ServerMessage};
