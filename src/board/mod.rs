//! Hex board: geometry, placement rules and the board actor
//!
//! The board actor is the single writer of unit placement. Everything else
//! talks to it through [`BoardHandle`].

pub mod actor;
pub mod grid;
pub mod handle;
pub mod hex;
pub mod notation;
pub mod production;
pub mod protocol;

pub use actor::BoardPhase;
pub use grid::{BoardGrid, Field};
pub use handle::BoardHandle;
pub use hex::HexCoord;
pub use notation::{describe, field_name, parse_field};
pub use production::{ProductionOrder, ProductionQueue};
pub use protocol::{
    ActionKind, BoardRequest, FieldSnapshot, MovableUnit, Moves, Outcome, PossibleMove,
    Registered,
};
