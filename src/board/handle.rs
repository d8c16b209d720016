//! Cloneable address of the board actor

use tokio::sync::{mpsc, oneshot};

use crate::board::actor::BoardActor;
use crate::board::protocol::{
    BoardRequest, FieldSnapshot, Moves, Outcome, PossibleMove, Registered,
};
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{FactionId, Position, Turn, UnitId};
use crate::unit::Archetype;

/// Handle used by the director and empires to talk to the board
#[derive(Debug, Clone)]
pub struct BoardHandle {
    tx: mpsc::UnboundedSender<BoardRequest>,
}

impl BoardHandle {
    /// Spawn a board actor sized and seeded from `config`
    pub fn spawn(config: &GameConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = BoardActor::new(
            config.board_width,
            config.board_height,
            config.seed,
            rx,
            tx.downgrade(),
        );
        tokio::spawn(actor.run());
        Self { tx }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> BoardRequest) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .map_err(|_| GameError::ActorGone("board"))?;
        rx.await.map_err(|_| GameError::ActorGone("board"))
    }

    pub async fn register(&self, faction: FactionId) -> Result<Registered> {
        self.request(|reply| BoardRequest::Register { faction, reply })
            .await
    }

    /// Place a unit directly; only honoured before the game starts
    pub async fn place_unit(
        &self,
        faction: FactionId,
        archetype: Archetype,
        position: Position,
    ) -> Result<Option<UnitId>> {
        self.request(|reply| BoardRequest::PlaceUnit {
            faction,
            archetype,
            position,
            reply,
        })
        .await
    }

    pub async fn start_game(&self) -> Result<()> {
        self.request(|reply| BoardRequest::StartGame { reply }).await
    }

    pub async fn start_turn(&self, faction: FactionId, turn: Turn) -> Result<()> {
        self.request(|reply| BoardRequest::StartTurn {
            faction,
            turn,
            reply,
        })
        .await
    }

    pub async fn end_turn(&self) -> Result<()> {
        self.request(|reply| BoardRequest::EndTurn { reply }).await
    }

    pub async fn move_unit(&self, unit: UnitId, to: Position) -> Result<Outcome> {
        self.request(|reply| BoardRequest::Move { unit, to, reply })
            .await
    }

    pub async fn attack(&self, unit: UnitId, target: Position) -> Result<Outcome> {
        self.request(|reply| BoardRequest::Attack {
            unit,
            target,
            reply,
        })
        .await
    }

    /// Order a unit for the faction whose turn it is
    pub async fn produce(&self, archetype: Archetype) -> Result<Outcome> {
        self.request(|reply| BoardRequest::Produce { archetype, reply })
            .await
    }

    pub async fn get_moves(&self, faction: FactionId) -> Result<Moves> {
        self.request(|reply| BoardRequest::GetMoves { faction, reply })
            .await
    }

    pub async fn moves_for_unit(&self, unit: UnitId) -> Result<Vec<PossibleMove>> {
        self.request(|reply| BoardRequest::MovesForUnit { unit, reply })
            .await
    }

    pub async fn turn(&self) -> Result<Turn> {
        self.request(|reply| BoardRequest::ReqTurn { reply }).await
    }

    pub async fn living_empires(&self) -> Result<Vec<FactionId>> {
        self.request(|reply| BoardRequest::LivingEmpires { reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<Vec<FieldSnapshot>> {
        self.request(|reply| BoardRequest::Snapshot { reply }).await
    }
}
