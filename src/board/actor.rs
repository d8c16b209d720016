//! The board actor: sole owner of placement, production and turn bookkeeping
//!
//! Requests are handled strictly one at a time. Unit mutations are awaited
//! (each unit acknowledges) before the requester gets its reply, and a dying
//! unit queues DEAD ahead of that acknowledgement, so the next request always
//! sees the board with the dead unit removed.

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::board::grid::BoardGrid;
use crate::board::production::{ProductionOrder, ProductionQueue};
use crate::board::protocol::{
    ActionKind, BoardRequest, FieldSnapshot, MovableUnit, Moves, Outcome, PossibleMove,
    Registered,
};
use crate::core::types::{FactionId, Position, Turn, UnitId};
use crate::unit::{Archetype, UnitHandle, UnitProfile};

/// Coarse board phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    SettingUp,
    WaitingForTurn,
    Turn,
}

pub(crate) struct BoardActor {
    rx: mpsc::UnboundedReceiver<BoardRequest>,
    /// Handed to units so they can report DEAD without keeping the board alive
    mailbox: mpsc::WeakUnboundedSender<BoardRequest>,
    phase: BoardPhase,
    grid: BoardGrid,
    units: AHashMap<UnitId, UnitHandle>,
    living: Vec<FactionId>,
    claimed_corners: Vec<Position>,
    current: Option<FactionId>,
    turn: Turn,
    production: ProductionQueue,
    rng: ChaCha8Rng,
}

impl BoardActor {
    pub(crate) fn new(
        width: u32,
        height: u32,
        seed: u64,
        rx: mpsc::UnboundedReceiver<BoardRequest>,
        mailbox: mpsc::WeakUnboundedSender<BoardRequest>,
    ) -> Self {
        Self {
            rx,
            mailbox,
            phase: BoardPhase::SettingUp,
            grid: BoardGrid::new(width, height),
            units: AHashMap::new(),
            living: Vec::new(),
            claimed_corners: Vec::new(),
            current: None,
            turn: 0,
            production: ProductionQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub(crate) async fn run(mut self) {
        info!(
            width = self.grid.width(),
            height = self.grid.height(),
            "board actor started"
        );
        while let Some(request) = self.rx.recv().await {
            self.handle(request).await;
        }
        debug!("board actor stopped");
    }

    async fn handle(&mut self, request: BoardRequest) {
        match request {
            BoardRequest::Register { faction, reply } => {
                let registered = self.register(faction);
                let _ = reply.send(registered);
            }
            BoardRequest::PlaceUnit {
                faction,
                archetype,
                position,
                reply,
            } => {
                let placed = if self.phase == BoardPhase::SettingUp {
                    self.place_unit(faction, archetype, position)
                } else {
                    warn!("PlaceUnit outside setup ignored");
                    None
                };
                let _ = reply.send(placed);
            }
            BoardRequest::StartGame { reply } => {
                if self.phase == BoardPhase::SettingUp {
                    self.phase = BoardPhase::WaitingForTurn;
                    info!(factions = self.living.len(), "game started");
                }
                let _ = reply.send(());
            }
            BoardRequest::StartTurn {
                faction,
                turn,
                reply,
            } => {
                self.start_turn(faction, turn).await;
                let _ = reply.send(());
            }
            BoardRequest::EndTurn { reply } => {
                if self.phase == BoardPhase::Turn {
                    debug!(faction = ?self.current, "turn ended");
                    self.current = None;
                    self.phase = BoardPhase::WaitingForTurn;
                }
                let _ = reply.send(());
            }
            BoardRequest::Move { unit, to, reply } => {
                let outcome = match self.phase {
                    BoardPhase::Turn => self.move_unit(unit, to).await,
                    _ => Outcome::OutOfTurn,
                };
                debug!(%unit, target = %to, ?outcome, "MOVE");
                let _ = reply.send(outcome);
            }
            BoardRequest::Attack {
                unit,
                target,
                reply,
            } => {
                let outcome = match self.phase {
                    BoardPhase::Turn => self.attack(unit, target).await,
                    _ => Outcome::OutOfTurn,
                };
                debug!(%unit, %target, ?outcome, "ATTACK");
                let _ = reply.send(outcome);
            }
            BoardRequest::Produce { archetype, reply } => {
                let outcome = self.produce(archetype);
                debug!(%archetype, ?outcome, "PRODUCE");
                let _ = reply.send(outcome);
            }
            BoardRequest::GetMoves { faction, reply } => {
                let _ = reply.send(self.moves_for_faction(faction));
            }
            BoardRequest::MovesForUnit { unit, reply } => {
                let _ = reply.send(self.moves_for_unit(unit));
            }
            BoardRequest::ReqTurn { reply } => {
                let _ = reply.send(self.turn);
            }
            BoardRequest::LivingEmpires { reply } => {
                let _ = reply.send(self.living.clone());
            }
            BoardRequest::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            BoardRequest::Dead {
                unit,
                archetype,
                faction,
            } => self.handle_dead(unit, archetype, faction),
        }
    }

    // === SETUP ===

    fn register(&mut self, faction: FactionId) -> Registered {
        if self.phase != BoardPhase::SettingUp || self.living.contains(&faction) {
            warn!(%faction, phase = ?self.phase, "registration refused");
            return Registered {
                faction,
                corner: None,
            };
        }

        let corner = self.grid.spawn_corners().into_iter().find(|c| {
            !self.claimed_corners.contains(c) && self.grid.occupant(*c).is_none()
        });
        let Some(corner) = corner else {
            warn!(%faction, "no spawn corner left");
            return Registered {
                faction,
                corner: None,
            };
        };

        self.claimed_corners.push(corner);
        self.place_unit(faction, Archetype::Base, corner);
        if let Some(spot) = self.grid.free_neighbours(corner).choose(&mut self.rng).copied() {
            self.place_unit(faction, Archetype::Archer, spot);
        }
        info!(%faction, %corner, "empire registered");

        Registered {
            faction,
            corner: Some(corner),
        }
    }

    fn place_unit(
        &mut self,
        faction: FactionId,
        archetype: Archetype,
        position: Position,
    ) -> Option<UnitId> {
        let profile = UnitProfile::new(faction, archetype);
        if !self.grid.place(position, profile.id) {
            return None;
        }
        self.units
            .insert(profile.id, UnitHandle::spawn(profile, self.mailbox.clone()));
        if archetype == Archetype::Base && !self.living.contains(&faction) {
            self.living.push(faction);
        }
        Some(profile.id)
    }

    // === TURNS ===

    async fn start_turn(&mut self, faction: FactionId, turn: Turn) {
        if self.phase == BoardPhase::SettingUp {
            warn!(%faction, "START_TURN before START_GAME ignored");
            return;
        }
        self.current = Some(faction);
        self.turn = turn;
        self.phase = BoardPhase::Turn;
        debug!(%faction, turn, "turn started");

        for order in self.production.take_due(turn) {
            self.deliver(order);
        }

        for unit in self.units.values() {
            let movable = unit.faction() == faction && unit.archetype() != Archetype::Base;
            if unit.status().movable != movable {
                if let Err(e) = unit.set_movable(movable).await {
                    warn!(unit = %unit.id(), "could not update movability: {}", e);
                }
            }
        }
    }

    /// Spawn a finished production order next to its faction's base
    fn deliver(&mut self, order: ProductionOrder) {
        let base = self
            .units
            .values()
            .find(|u| u.faction() == order.faction && u.archetype() == Archetype::Base)
            .map(|u| u.id());
        let Some(base_pos) = base.and_then(|id| self.grid.locate(id)) else {
            debug!(faction = %order.faction, "production discarded, base gone");
            return;
        };
        let Some(spot) = self.grid.free_neighbours(base_pos).choose(&mut self.rng).copied() else {
            debug!(faction = %order.faction, "production discarded, base surrounded");
            return;
        };
        self.place_unit(order.faction, order.archetype, spot);
        info!(faction = %order.faction, archetype = %order.archetype, position = %spot, "unit produced");
    }

    // === REQUESTS ===

    async fn move_unit(&mut self, unit: UnitId, to: Position) -> Outcome {
        let Some((handle, from)) = self.locate(unit) else {
            return Outcome::ExistsNot;
        };
        if !self.grid.contains(to) || self.grid.distance(from, to) > handle.stats().move_range {
            return Outcome::OutOfRange;
        }
        if let Some(other) = self.grid.occupant(to) {
            return if self.same_faction(unit, other) {
                Outcome::OccAlly
            } else {
                Outcome::OccEnemy
            };
        }

        self.grid.clear(from);
        self.grid.place(to, unit);
        if let Err(e) = handle.set_movable(false).await {
            warn!(%unit, "unit lost after move: {}", e);
        }
        Outcome::Executed
    }

    async fn attack(&mut self, unit: UnitId, target: Position) -> Outcome {
        let Some((attacker, from)) = self.locate(unit) else {
            return Outcome::ExistsNot;
        };
        if !self.grid.contains(target)
            || self.grid.distance(from, target) > attacker.stats().attack_range
        {
            return Outcome::OutOfRange;
        }
        let Some(defender) = self
            .grid
            .occupant(target)
            .and_then(|id| self.units.get(&id).cloned())
        else {
            return Outcome::OccNot;
        };
        if defender.faction() == attacker.faction() {
            return Outcome::OccAlly;
        }

        // Both sides strike from their pre-combat attributes
        let distance = self.grid.distance(from, target);
        let damage = attacker.archetype().damage_against(defender.archetype());
        let retaliation = if distance <= defender.stats().attack_range {
            defender.archetype().damage_against(attacker.archetype())
        } else {
            0
        };

        if let Err(e) = defender.damage(damage).await {
            warn!(unit = %defender.id(), "defender lost during attack: {}", e);
        }
        let attacker_alive = if retaliation > 0 {
            match attacker.damage(retaliation).await {
                Ok(status) => status.is_alive(),
                Err(_) => false,
            }
        } else {
            true
        };
        if attacker_alive {
            if let Err(e) = attacker.set_movable(false).await {
                warn!(%unit, "attacker lost after combat: {}", e);
            }
        }
        Outcome::Executed
    }

    fn produce(&mut self, archetype: Archetype) -> Outcome {
        let Some(faction) = self.current.filter(|_| self.phase == BoardPhase::Turn) else {
            return Outcome::OutOfTurn;
        };
        if !archetype.is_producible() {
            return Outcome::NotProducible;
        }
        let order = ProductionOrder {
            faction,
            archetype,
            target_turn: self.turn + archetype.stats().lead_time,
        };
        if self.production.enqueue(order) {
            Outcome::Executed
        } else {
            Outcome::ProdInProgress
        }
    }

    fn moves_for_faction(&self, faction: FactionId) -> Moves {
        let mut units: Vec<MovableUnit> = self
            .grid
            .occupied()
            .filter_map(|(position, id)| {
                let unit = self.units.get(&id)?;
                (unit.faction() == faction
                    && unit.archetype() != Archetype::Base
                    && unit.status().movable)
                    .then(|| MovableUnit {
                        id,
                        archetype: unit.archetype(),
                        position,
                    })
            })
            .collect();
        units.sort_by_key(|u| (u.position.y, u.position.x));

        let can_produce = self.phase == BoardPhase::Turn
            && self.current == Some(faction)
            && self.living.contains(&faction)
            && !self.production.is_busy(faction);

        Moves { units, can_produce }
    }

    fn moves_for_unit(&self, unit: UnitId) -> Vec<PossibleMove> {
        let Some((handle, from)) = self.locate(unit) else {
            return Vec::new();
        };
        let stats = handle.stats();
        let reach = stats.move_range.max(stats.attack_range);

        self.grid
            .positions_within(from, reach)
            .into_iter()
            .filter_map(|position| {
                let distance = self.grid.distance(from, position);
                match self.grid.occupant(position) {
                    None if distance <= stats.move_range => Some(PossibleMove {
                        kind: ActionKind::Move,
                        position,
                    }),
                    Some(other)
                        if distance <= stats.attack_range && !self.same_faction(unit, other) =>
                    {
                        Some(PossibleMove {
                            kind: ActionKind::Attack,
                            position,
                        })
                    }
                    _ => None,
                }
            })
            .collect()
    }

    fn snapshot(&self) -> Vec<FieldSnapshot> {
        self.grid
            .occupied()
            .filter_map(|(position, id)| {
                let unit = self.units.get(&id)?;
                let status = unit.status();
                Some(FieldSnapshot {
                    position,
                    unit: id,
                    faction: unit.faction(),
                    archetype: unit.archetype(),
                    health: status.health,
                    max_health: status.max_health,
                    movable: status.movable,
                })
            })
            .collect()
    }

    // === ELIMINATION ===

    fn handle_dead(&mut self, unit: UnitId, archetype: Archetype, faction: FactionId) {
        if archetype == Archetype::Base {
            self.living.retain(|f| *f != faction);
            self.production.discard_faction(faction);
            let doomed: Vec<UnitId> = self
                .units
                .values()
                .filter(|u| u.faction() == faction)
                .map(|u| u.id())
                .collect();
            for id in doomed {
                self.remove_unit(id);
            }
            info!(%faction, remaining = self.living.len(), "empire eliminated");
        } else {
            self.remove_unit(unit);
            debug!(%unit, %archetype, "unit removed");
        }
    }

    /// Dropping the handle closes the unit's mailbox, which stops its actor
    fn remove_unit(&mut self, unit: UnitId) {
        self.units.remove(&unit);
        if let Some(pos) = self.grid.locate(unit) {
            self.grid.clear(pos);
        }
    }

    // === HELPERS ===

    fn locate(&self, unit: UnitId) -> Option<(UnitHandle, Position)> {
        let handle = self.units.get(&unit)?.clone();
        let position = self.grid.locate(unit)?;
        Some((handle, position))
    }

    fn same_faction(&self, a: UnitId, b: UnitId) -> bool {
        match (self.units.get(&a), self.units.get(&b)) {
            (Some(a), Some(b)) => a.faction() == b.faction(),
            _ => false,
        }
    }
}
