//! Empire actors: the AI players and the voice-driven human player
//!
//! Every empire is a tokio task that registers at the board, reports ready to
//! the director, and then plays one turn per [`EmpireCommand::Turn`].

pub mod ai;
pub mod phrases;
pub mod user;

pub use ai::AiEmpire;
pub use user::{Order, UserEmpire};

use tokio::sync::mpsc;

use crate::board::BoardHandle;
use crate::core::error::{GameError, Result};
use crate::core::types::{FactionId, Turn};
use crate::director::DirectorHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmpireCommand {
    /// Play the given round, then report EMPIRE_DONE
    Turn { turn: Turn },
}

/// Director-side reference to a running empire
#[derive(Debug, Clone)]
pub struct EmpireRef {
    faction: FactionId,
    tx: mpsc::UnboundedSender<EmpireCommand>,
}

impl EmpireRef {
    pub fn new(faction: FactionId, tx: mpsc::UnboundedSender<EmpireCommand>) -> Self {
        Self { faction, tx }
    }

    pub fn faction(&self) -> FactionId {
        self.faction
    }

    pub fn signal_turn(&self, turn: Turn) -> Result<()> {
        self.tx
            .send(EmpireCommand::Turn { turn })
            .map_err(|_| GameError::ActorGone("empire"))
    }

    /// Resolves once the empire has stopped listening
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

/// Handles injected into every empire at construction
#[derive(Debug, Clone)]
pub struct SupervisorContext {
    pub board: BoardHandle,
    pub director: DirectorHandle,
}
