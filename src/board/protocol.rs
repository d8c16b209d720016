//! Board mailbox vocabulary
//!
//! Every request carries its own `oneshot` reply sender, so a response can
//! only ever reach the actor that asked.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::core::types::{FactionId, Position, Turn, UnitId};
use crate::unit::Archetype;

/// Result code for MOVE, ATTACK and PRODUCE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Executed,
    /// The unit is not on the board
    ExistsNot,
    /// Target off the board or beyond the unit's range
    OutOfRange,
    /// Target field holds a unit of the same faction
    OccAlly,
    /// MOVE onto a field held by another faction
    OccEnemy,
    /// ATTACK on an empty field
    OccNot,
    /// The faction already has a unit in production
    ProdInProgress,
    /// Request arrived while no turn is running
    OutOfTurn,
    NotProducible,
}

impl Outcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Outcome::Executed)
    }
}

/// Reply to REGISTER
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registered {
    pub faction: FactionId,
    /// Base location, `None` when every spawn corner was taken
    pub corner: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovableUnit {
    pub id: UnitId,
    pub archetype: Archetype,
    pub position: Position,
}

/// Reply to GET_MOVES
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moves {
    pub units: Vec<MovableUnit>,
    pub can_produce: bool,
}

impl Moves {
    /// Nothing left to do this turn
    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && !self.can_produce
    }

    pub fn first_of(&self, archetype: Archetype) -> Option<&MovableUnit> {
        self.units.iter().find(|u| u.archetype == archetype)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Move,
    Attack,
}

/// One entry of POSSIBLE_MOVES
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossibleMove {
    pub kind: ActionKind,
    pub position: Position,
}

/// Read-only view of an occupied field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub position: Position,
    pub unit: UnitId,
    pub faction: FactionId,
    pub archetype: Archetype,
    pub health: u32,
    pub max_health: u32,
    pub movable: bool,
}

/// Messages accepted by the board actor
#[derive(Debug)]
pub enum BoardRequest {
    Register {
        faction: FactionId,
        reply: oneshot::Sender<Registered>,
    },
    /// Put an arbitrary unit on the board while setting up
    PlaceUnit {
        faction: FactionId,
        archetype: Archetype,
        position: Position,
        reply: oneshot::Sender<Option<UnitId>>,
    },
    StartGame {
        reply: oneshot::Sender<()>,
    },
    StartTurn {
        faction: FactionId,
        turn: Turn,
        reply: oneshot::Sender<()>,
    },
    EndTurn {
        reply: oneshot::Sender<()>,
    },
    Move {
        unit: UnitId,
        to: Position,
        reply: oneshot::Sender<Outcome>,
    },
    Attack {
        unit: UnitId,
        target: Position,
        reply: oneshot::Sender<Outcome>,
    },
    Produce {
        archetype: Archetype,
        reply: oneshot::Sender<Outcome>,
    },
    GetMoves {
        faction: FactionId,
        reply: oneshot::Sender<Moves>,
    },
    MovesForUnit {
        unit: UnitId,
        reply: oneshot::Sender<Vec<PossibleMove>>,
    },
    ReqTurn {
        reply: oneshot::Sender<Turn>,
    },
    LivingEmpires {
        reply: oneshot::Sender<Vec<FactionId>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<FieldSnapshot>>,
    },
    /// Sent by a unit actor as it dies
    Dead {
        unit: UnitId,
        archetype: Archetype,
        faction: FactionId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_names() {
        let json = serde_json::to_string(&Outcome::ProdInProgress).unwrap();
        assert_eq!(json, "\"PROD_IN_PROGRESS\"");
        let outcome: Outcome = serde_json::from_str("\"OCC_ENEMY\"").unwrap();
        assert_eq!(outcome, Outcome::OccEnemy);
    }

    #[test]
    fn test_moves_is_empty() {
        let mut moves = Moves::default();
        assert!(moves.is_empty());
        moves.can_produce = true;
        assert!(!moves.is_empty());
    }
}
