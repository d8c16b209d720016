//! Turn director: spawns the game's actors and sequences the rounds

pub mod actor;
pub mod roster;

pub use actor::{Director, DirectorStatus, GameOutcome, USER_FACTION};
pub use roster::EmpireRoster;

use tokio::sync::mpsc;

use crate::core::error::{GameError, Result};
use crate::core::types::FactionId;

/// Messages empires send up to the director
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorEvent {
    EmpireReady(FactionId),
    EmpireDone(FactionId),
}

/// Address empires use to report to the director
#[derive(Debug, Clone)]
pub struct DirectorHandle {
    tx: mpsc::UnboundedSender<DirectorEvent>,
}

impl DirectorHandle {
    /// A handle plus the receiving end the director listens on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DirectorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn ready(&self, faction: FactionId) -> Result<()> {
        self.send(DirectorEvent::EmpireReady(faction))
    }

    pub fn done(&self, faction: FactionId) -> Result<()> {
        self.send(DirectorEvent::EmpireDone(faction))
    }

    fn send(&self, event: DirectorEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| GameError::ActorGone("director"))
    }
}
