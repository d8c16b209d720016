//! The turn director
//!
//! Owns the board and every empire. A game runs through
//! `registering → settingUp → rounds → won | lost`, with each round visiting
//! the living empires one at a time in faction order (the user empire is
//! faction 1, so it always goes first).

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::board::BoardHandle;
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{FactionId, Turn};
use crate::director::{DirectorEvent, DirectorHandle, EmpireRoster};
use crate::empire::{AiEmpire, EmpireRef, SupervisorContext, UserEmpire};
use crate::nlu::Nlu;
use crate::voice::{VoiceClient, VoiceHandle};

pub const USER_FACTION: FactionId = FactionId(1);

const GAME_STARTING: &str = "The game is starting! We are playing black.";
const GAME_WON: &str = "We have defeated our enemies and conquered the world!";
const GAME_LOST: &str = "The enemies were too strong! We need to prepare better next time!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost,
    /// The configured turn limit was reached with several empires alive
    Abandoned { turns: Turn },
}

/// What the director is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectorStatus {
    pub turn: Turn,
    pub current: Option<FactionId>,
}

pub struct Director {
    config: GameConfig,
    board: BoardHandle,
    voice: Option<VoiceHandle>,
    nlu: Option<Nlu>,
    status: watch::Sender<DirectorStatus>,
}

impl Director {
    /// Spawn the board; empires are spawned when the game runs
    pub fn new(config: GameConfig, voice: Option<VoiceHandle>, nlu: Nlu) -> Self {
        let board = BoardHandle::spawn(&config);
        let (status, _) = watch::channel(DirectorStatus::default());
        Self {
            config,
            board,
            voice,
            nlu: Some(nlu),
            status,
        }
    }

    pub fn board(&self) -> BoardHandle {
        self.board.clone()
    }

    /// Follow turn changes, e.g. to redraw the board for the user
    pub fn subscribe(&self) -> watch::Receiver<DirectorStatus> {
        self.status.subscribe()
    }

    /// Play until somebody wins, the user loses or the turn limit is hit
    pub async fn run(mut self) -> Result<GameOutcome> {
        // registering
        let mut announcer = match &self.voice {
            Some(voice) => match voice.register().await {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("director could not register for speech: {}", e);
                    None
                }
            },
            None => None,
        };

        // settingUp
        let (handle, mut events) = DirectorHandle::channel();
        let empires = self.spawn_empires(handle, &mut events).await?;
        info!(empires = empires.len(), "all empires ready");

        announce(&mut announcer, GAME_STARTING).await;
        self.board.start_game().await?;

        let mut roster = EmpireRoster::new(empires);
        let mut turn: Turn = 1;

        let outcome = loop {
            info!(turn, "round started");
            while let Some(empire) = roster.promote_next() {
                self.play_turn(&empire, turn, &mut events).await?;
                roster.finish_current();
            }
            self.publish(turn, None);

            let living = self.board.living_empires().await?;
            debug!(turn, ?living, "round finished");
            if !living.contains(&USER_FACTION) {
                break GameOutcome::Lost;
            }
            if living.len() == 1 {
                break GameOutcome::Won;
            }
            if self.config.max_turns.is_some_and(|max| turn >= max) {
                break GameOutcome::Abandoned { turns: turn };
            }

            turn += 1;
            roster.start_round(&living);
        };

        info!(?outcome, turn, "game over");
        match outcome {
            GameOutcome::Won => announce(&mut announcer, GAME_WON).await,
            GameOutcome::Lost => announce(&mut announcer, GAME_LOST).await,
            GameOutcome::Abandoned { .. } => {}
        }
        Ok(outcome)
    }

    /// Spawn the user empire, then the AIs, each only after the previous one
    /// reported ready
    ///
    /// Empires register with the board before reporting ready, so corners and
    /// starter units are handed out in faction order whatever the scheduler does.
    async fn spawn_empires(
        &mut self,
        handle: DirectorHandle,
        events: &mut mpsc::UnboundedReceiver<DirectorEvent>,
    ) -> Result<Vec<EmpireRef>> {
        let ctx = SupervisorContext {
            board: self.board.clone(),
            director: handle,
        };
        let nlu = self
            .nlu
            .take()
            .ok_or_else(|| GameError::InvalidConfig("director already ran".into()))?;

        let user = UserEmpire::spawn(
            USER_FACTION,
            ctx.clone(),
            self.voice.clone(),
            nlu,
            &self.config,
        );
        await_ready(events, USER_FACTION).await?;

        let mut empires = vec![user];
        for n in 0..self.config.ai_empires {
            let faction = FactionId::new(USER_FACTION.0 + 1 + n);
            let seed = self.config.seed.wrapping_add(u64::from(faction.0));
            empires.push(AiEmpire::spawn(faction, ctx.clone(), seed));
            await_ready(events, faction).await?;
        }
        Ok(empires)
    }

    /// One empire's turn: START_TURN, TURN, wait for EMPIRE_DONE, END_TURN
    async fn play_turn(
        &self,
        empire: &EmpireRef,
        turn: Turn,
        events: &mut mpsc::UnboundedReceiver<DirectorEvent>,
    ) -> Result<()> {
        let faction = empire.faction();
        self.publish(turn, Some(faction));
        self.board.start_turn(faction, turn).await?;

        if empire.signal_turn(turn).is_ok() {
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Some(DirectorEvent::EmpireDone(done)) if done == faction => break,
                        Some(other) => debug!(?other, "ignoring out-of-turn event"),
                        None => return Err(GameError::ActorGone("empires")),
                    },
                    _ = empire.closed() => {
                        warn!(%faction, "empire stopped, skipping its turn");
                        break;
                    }
                }
            }
        } else {
            warn!(%faction, "empire is gone, skipping its turn");
        }

        self.board.end_turn().await?;
        debug!(%faction, turn, "turn finished");
        Ok(())
    }

    fn publish(&self, turn: Turn, current: Option<FactionId>) {
        self.status.send_replace(DirectorStatus { turn, current });
    }
}

/// Wait for EMPIRE_READY from one empire
async fn await_ready(
    events: &mut mpsc::UnboundedReceiver<DirectorEvent>,
    faction: FactionId,
) -> Result<()> {
    loop {
        match events.recv().await {
            Some(DirectorEvent::EmpireReady(ready)) if ready == faction => return Ok(()),
            Some(other) => debug!(?other, "event before setup finished"),
            None => return Err(GameError::ActorGone("empires")),
        }
    }
}

async fn announce(announcer: &mut Option<VoiceClient>, text: &str) {
    info!("{}", text);
    if let Some(client) = announcer {
        if let Err(e) = client.say(text).await {
            warn!("announcement failed: {}", e);
        }
    }
}
