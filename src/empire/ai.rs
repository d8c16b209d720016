//! Computer-controlled empire
//!
//! Plays greedily at random: produce whenever possible, then let each movable
//! unit attack something in range or, failing that, wander to a random legal
//! field. Rejected requests are not retried.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::board::protocol::{ActionKind, PossibleMove};
use crate::core::error::Result;
use crate::core::types::{FactionId, Turn};
use crate::empire::{EmpireCommand, EmpireRef, SupervisorContext};
use crate::unit::PRODUCIBLE;

pub struct AiEmpire {
    faction: FactionId,
    ctx: SupervisorContext,
    rng: ChaCha8Rng,
    rx: mpsc::UnboundedReceiver<EmpireCommand>,
}

impl AiEmpire {
    /// Spawn the empire task; it registers itself and reports ready
    pub fn spawn(faction: FactionId, ctx: SupervisorContext, seed: u64) -> EmpireRef {
        let (tx, rx) = mpsc::unbounded_channel();
        let empire = Self {
            faction,
            ctx,
            rng: ChaCha8Rng::seed_from_u64(seed),
            rx,
        };
        tokio::spawn(empire.run());
        EmpireRef::new(faction, tx)
    }

    async fn run(mut self) {
        match self.ctx.board.register(self.faction).await {
            Ok(registered) if registered.corner.is_some() => {
                info!(faction = %self.faction, "AI empire registered")
            }
            Ok(_) => warn!(faction = %self.faction, "AI empire got no spawn corner"),
            Err(e) => warn!(faction = %self.faction, "AI registration failed: {}", e),
        }
        if self.ctx.director.ready(self.faction).is_err() {
            return;
        }

        while let Some(EmpireCommand::Turn { turn }) = self.rx.recv().await {
            if let Err(e) = self.play_turn(turn).await {
                warn!(faction = %self.faction, turn, "AI turn aborted: {}", e);
            }
            if self.ctx.director.done(self.faction).is_err() {
                break;
            }
        }
        debug!(faction = %self.faction, "AI empire stopped");
    }

    async fn play_turn(&mut self, turn: Turn) -> Result<()> {
        let board = &self.ctx.board;
        let moves = board.get_moves(self.faction).await?;
        if moves.is_empty() {
            debug!(faction = %self.faction, turn, "nothing to do");
            return Ok(());
        }

        if moves.can_produce {
            if let Some(archetype) = PRODUCIBLE.choose(&mut self.rng).copied() {
                let outcome = board.produce(archetype).await?;
                debug!(faction = %self.faction, %archetype, ?outcome, "AI produce");
            }
        }

        for unit in &moves.units {
            let options = board.moves_for_unit(unit.id).await?;
            let Some(choice) = pick(&options, &mut self.rng) else {
                continue;
            };
            let outcome = match choice.kind {
                ActionKind::Attack => board.attack(unit.id, choice.position).await?,
                ActionKind::Move => board.move_unit(unit.id, choice.position).await?,
            };
            debug!(
                faction = %self.faction,
                unit = %unit.archetype,
                kind = ?choice.kind,
                target = %choice.position,
                ?outcome,
                "AI action"
            );
        }
        Ok(())
    }
}

/// Uniform choice among attacks if there are any, otherwise among moves
fn pick(options: &[PossibleMove], rng: &mut ChaCha8Rng) -> Option<PossibleMove> {
    let attacks: Vec<PossibleMove> = options
        .iter()
        .filter(|m| m.kind == ActionKind::Attack)
        .copied()
        .collect();
    if attacks.is_empty() {
        options.choose(rng).copied()
    } else {
        attacks.choose(rng).copied()
    }
}
