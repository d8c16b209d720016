//! Per-unit actor: health, movability and death
//!
//! The unit acknowledges every command once its state is updated. When health
//! reaches zero it posts DEAD to the board before acknowledging, then stops.

use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use crate::board::BoardRequest;
use crate::core::error::{GameError, Result};
use crate::core::types::{FactionId, UnitId};
use crate::unit::archetype::{Archetype, UnitStats};

/// Immutable identity of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitProfile {
    pub id: UnitId,
    pub faction: FactionId,
    pub archetype: Archetype,
}

impl UnitProfile {
    pub fn new(faction: FactionId, archetype: Archetype) -> Self {
        Self {
            id: UnitId::new(),
            faction,
            archetype,
        }
    }
}

/// Lifecycle of a unit actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Idle,
    InAction,
    Dead,
}

/// Latest published state of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStatus {
    pub state: UnitState,
    pub health: u32,
    pub max_health: u32,
    pub movable: bool,
}

impl UnitStatus {
    pub fn is_alive(&self) -> bool {
        self.state != UnitState::Dead
    }
}

#[derive(Debug)]
pub enum UnitCommand {
    Damage {
        amount: u32,
        ack: oneshot::Sender<UnitStatus>,
    },
    SetMovable {
        movable: bool,
        ack: oneshot::Sender<UnitStatus>,
    },
}

/// Board-side handle to a running unit
#[derive(Debug, Clone)]
pub struct UnitHandle {
    profile: UnitProfile,
    tx: mpsc::UnboundedSender<UnitCommand>,
    status: watch::Receiver<UnitStatus>,
}

impl UnitHandle {
    /// Spawn the unit actor at full health, not movable
    pub fn spawn(profile: UnitProfile, board: mpsc::WeakUnboundedSender<BoardRequest>) -> Self {
        let stats = profile.archetype.stats();
        let initial = UnitStatus {
            state: UnitState::Idle,
            health: stats.max_health,
            max_health: stats.max_health,
            movable: false,
        };
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(initial);

        let actor = UnitActor {
            profile,
            status: initial,
            status_tx,
            board,
            rx,
        };
        tokio::spawn(actor.run());

        Self { profile, tx, status }
    }

    pub fn id(&self) -> UnitId {
        self.profile.id
    }

    pub fn faction(&self) -> FactionId {
        self.profile.faction
    }

    pub fn archetype(&self) -> Archetype {
        self.profile.archetype
    }

    pub fn stats(&self) -> UnitStats {
        self.profile.archetype.stats()
    }

    /// Last status the unit published
    pub fn status(&self) -> UnitStatus {
        *self.status.borrow()
    }

    pub async fn damage(&self, amount: u32) -> Result<UnitStatus> {
        self.command(|ack| UnitCommand::Damage { amount, ack }).await
    }

    pub async fn set_movable(&self, movable: bool) -> Result<UnitStatus> {
        self.command(|ack| UnitCommand::SetMovable { movable, ack })
            .await
    }

    async fn command(
        &self,
        make: impl FnOnce(oneshot::Sender<UnitStatus>) -> UnitCommand,
    ) -> Result<UnitStatus> {
        let (ack, rx) = oneshot::channel();
        self.tx
            .send(make(ack))
            .map_err(|_| GameError::ActorGone("unit"))?;
        rx.await.map_err(|_| GameError::ActorGone("unit"))
    }
}

struct UnitActor {
    profile: UnitProfile,
    status: UnitStatus,
    status_tx: watch::Sender<UnitStatus>,
    board: mpsc::WeakUnboundedSender<BoardRequest>,
    rx: mpsc::UnboundedReceiver<UnitCommand>,
}

impl UnitActor {
    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                UnitCommand::Damage { amount, ack } => {
                    self.status.state = UnitState::InAction;
                    self.status.health = self.status.health.saturating_sub(amount);
                    if self.status.health == 0 {
                        self.die();
                        let _ = ack.send(self.status);
                        break;
                    }
                    self.status.state = UnitState::Idle;
                    self.publish();
                    let _ = ack.send(self.status);
                }
                UnitCommand::SetMovable { movable, ack } => {
                    self.status.movable = movable;
                    self.publish();
                    let _ = ack.send(self.status);
                }
            }
        }
        debug!(unit = %self.profile.id, "unit actor stopped");
    }

    fn die(&mut self) {
        self.status.state = UnitState::Dead;
        self.status.movable = false;
        self.publish();
        debug!(unit = %self.profile.id, archetype = %self.profile.archetype, "unit died");
        if let Some(board) = self.board.upgrade() {
            let _ = board.send(BoardRequest::Dead {
                unit: self.profile.id,
                archetype: self.profile.archetype,
                faction: self.profile.faction,
            });
        }
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct TestBoard {
        _tx: mpsc::UnboundedSender<BoardRequest>,
        rx: mpsc::UnboundedReceiver<BoardRequest>,
    }

    fn spawn_unit(archetype: Archetype) -> (UnitHandle, TestBoard) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = UnitHandle::spawn(
            UnitProfile::new(FactionId::new(1), archetype),
            tx.downgrade(),
        );
        (handle, TestBoard { _tx: tx, rx })
    }

    #[tokio::test]
    async fn test_damage_reduces_health() {
        let (unit, _board) = spawn_unit(Archetype::Archer);
        let status = unit.damage(30).await.unwrap();
        assert_eq!(status.health, 70);
        assert_eq!(status.state, UnitState::Idle);
        assert_eq!(unit.status().health, 70);
    }

    #[tokio::test]
    async fn test_health_clamps_at_zero_and_reports_dead() {
        let (unit, mut board) = spawn_unit(Archetype::Worker);
        let status = unit.damage(500).await.unwrap();
        assert_eq!(status.health, 0);
        assert!(!status.is_alive());

        match board.rx.try_recv() {
            Ok(BoardRequest::Dead {
                unit: id,
                archetype,
                ..
            }) => {
                assert_eq!(id, unit.id());
                assert_eq!(archetype, Archetype::Worker);
            }
            other => panic!("expected DEAD, got {:?}", other),
        }

        // Dead units stop answering
        assert!(unit.set_movable(true).await.is_err());
    }

    #[tokio::test]
    async fn test_set_movable_in_any_live_state() {
        let (unit, _board) = spawn_unit(Archetype::Horseman);
        assert!(!unit.status().movable);
        assert!(unit.set_movable(true).await.unwrap().movable);
        unit.damage(10).await.unwrap();
        assert!(unit.status().movable);
        assert!(!unit.set_movable(false).await.unwrap().movable);
    }

    #[tokio::test]
    async fn test_health_never_increases() {
        let (unit, _board) = spawn_unit(Archetype::Base);
        let mut last = unit.status().health;
        for amount in [0, 15, 60, 1, 40] {
            let health = unit.damage(amount).await.unwrap().health;
            assert!(health <= last);
            last = health;
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_health_only_decreases_and_stops_at_zero(
            amounts in proptest::collection::vec(0u32..120, 1..12),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let (unit, mut board) = spawn_unit(Archetype::Base);
                let mut last = unit.status().health;
                let mut taken = 0u32;
                for amount in amounts {
                    let Ok(status) = unit.damage(amount).await else {
                        // Dead units stop answering
                        prop_assert_eq!(last, 0);
                        break;
                    };
                    taken = taken.saturating_add(amount);
                    prop_assert!(status.health <= last);
                    prop_assert_eq!(status.health, 250u32.saturating_sub(taken));
                    prop_assert_eq!(status.is_alive(), status.health > 0);
                    last = status.health;
                }
                let died = matches!(board.rx.try_recv(), Ok(BoardRequest::Dead { .. }));
                prop_assert_eq!(died, last == 0);
                Ok(())
            })?;
        }
    }
}
