//! Hexfront - turn-based hex strategy with spoken commands
//!
//! Every participant is an actor: the board, each unit, the turn director,
//! the empires and the voice device all run as tokio tasks and talk through
//! typed channels.

pub mod board;
pub mod core;
pub mod dialogue;
pub mod director;
pub mod empire;
pub mod nlu;
pub mod unit;
pub mod voice;
