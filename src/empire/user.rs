//! The human player's empire, driven by spoken dialogue
//!
//! Each turn runs a command loop: prompt with a suggestion, listen, classify
//! the utterance, fill any missing slots with their own prompt machines, issue
//! the board request and say how it went. The loop ends when the player skips
//! the round or has nothing left to do.
//!
//! Without a voice device the empire still registers and reports ready, but
//! passes every turn.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::board::protocol::{ActionKind, MovableUnit, Moves};
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{FactionId, Position, Turn};
use crate::dialogue::binary;
use crate::dialogue::{
    CommandKind, CommandTranslator, PromptAction, PromptEvent, Slot, SlotPrompt,
};
use crate::empire::phrases;
use crate::empire::{EmpireCommand, EmpireRef, SupervisorContext};
use crate::nlu::{IntentKind, Nlu, NluResult};
use crate::unit::Archetype;
use crate::voice::{VoiceClient, VoiceEvent, VoiceHandle};

/// A fully specified board request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Move { unit: MovableUnit, to: Position },
    Attack { unit: MovableUnit, target: Position },
    Produce(Archetype),
}

/// State shared by every prompt of one turn
#[derive(Debug, Clone, Default)]
pub struct DialogueContext {
    pub turn: Turn,
    pub moves: Moves,
    pub translator: CommandTranslator,
    pub kind: Option<CommandKind>,
    pub intent: Option<IntentKind>,
    pub last_result: Option<NluResult>,
    pub proposal: Option<Order>,
    /// Some unit has a legal move or attack, or production is open
    pub actionable: bool,
    pub confirm: Option<bool>,
}

impl DialogueContext {
    fn new(turn: Turn, moves: Moves) -> Self {
        Self {
            turn,
            moves,
            ..Self::default()
        }
    }

    /// Forget the previous command
    fn reset(&mut self) {
        self.translator.reset();
        self.kind = None;
        self.intent = None;
        self.last_result = None;
        self.confirm = None;
    }

    fn source_name(&self) -> &'static str {
        self.translator
            .source
            .map(|u| u.archetype.name())
            .unwrap_or("unit")
    }
}

// === PROMPTS ===

fn what_is_your_move(ctx: &DialogueContext) -> String {
    match ctx.proposal {
        Some(order) => format!("What is your move? {}", describe_order(order)),
        None => "What is your move?".into(),
    }
}

fn it_is_your_turn(_: &DialogueContext) -> String {
    "It is your turn.".into()
}

fn which_unit(ctx: &DialogueContext) -> String {
    match ctx.kind {
        Some(CommandKind::Move) => "Which unit do you want to move?".into(),
        Some(CommandKind::Attack) => "Which unit should attack?".into(),
        _ => "Which unit do you mean?".into(),
    }
}

fn which_unit_hint(_: &DialogueContext) -> String {
    "Name a unit, like the archer, or its field, like the unit on C4.".into()
}

fn which_field(ctx: &DialogueContext) -> String {
    match ctx.kind {
        Some(CommandKind::Attack) => format!("Which field should your {} attack?", ctx.source_name()),
        _ => format!("Where should your {} go?", ctx.source_name()),
    }
}

fn which_field_hint(_: &DialogueContext) -> String {
    "Please name a field, for example B3.".into()
}

fn which_archetype(_: &DialogueContext) -> String {
    "Which unit do you want to produce?".into()
}

fn which_archetype_hint(_: &DialogueContext) -> String {
    "You can produce an archer, a horseman, a spearman or a worker.".into()
}

fn really_skip(_: &DialogueContext) -> String {
    "You can still make moves. Do you really want to end your turn?".into()
}

fn really_skip_short(_: &DialogueContext) -> String {
    "Should I end your turn?".into()
}

fn has_intent(ctx: &DialogueContext) -> bool {
    matches!(ctx.intent, Some(intent) if intent != IntentKind::Unknown)
}

fn has_source(ctx: &DialogueContext) -> bool {
    ctx.translator.is_filled(Slot::Source)
}

fn has_target(ctx: &DialogueContext) -> bool {
    ctx.translator.is_filled(Slot::Target)
}

fn has_unit_type(ctx: &DialogueContext) -> bool {
    ctx.translator.is_filled(Slot::UnitType)
}

fn has_answer(ctx: &DialogueContext) -> bool {
    ctx.confirm.is_some()
}

fn command_prompt() -> SlotPrompt<DialogueContext> {
    SlotPrompt::new(vec![what_is_your_move, it_is_your_turn], has_intent)
}

fn slot_prompt(slot: Slot) -> SlotPrompt<DialogueContext> {
    match slot {
        Slot::Source => SlotPrompt::new(vec![which_unit, which_unit_hint], has_source),
        Slot::Target => SlotPrompt::new(vec![which_field, which_field_hint], has_target),
        Slot::UnitType => {
            SlotPrompt::new(vec![which_archetype, which_archetype_hint], has_unit_type)
        }
    }
}

fn confirm_prompt() -> SlotPrompt<DialogueContext> {
    SlotPrompt::new(vec![really_skip, really_skip_short], has_answer)
}

fn describe_order(order: Order) -> String {
    match order {
        Order::Attack { unit, target } => phrases::suggest_attack(unit.archetype, target),
        Order::Move { unit, to } => phrases::suggest_move(unit.archetype, unit.position, to),
        Order::Produce(archetype) => phrases::suggest_produce(archetype),
    }
}

/// What a conversation is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Command,
    Slot(Slot),
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversation {
    Completed,
    Cancelled,
}

enum Understood {
    Applied,
    Rejected(String),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    EndTurn,
}

pub struct UserEmpire {
    faction: FactionId,
    ctx: SupervisorContext,
    voice: Option<VoiceHandle>,
    nlu: Nlu,
    board_size: (u32, u32),
    rng: ChaCha8Rng,
    rx: mpsc::UnboundedReceiver<EmpireCommand>,
}

impl UserEmpire {
    pub fn spawn(
        faction: FactionId,
        ctx: SupervisorContext,
        voice: Option<VoiceHandle>,
        nlu: Nlu,
        config: &GameConfig,
    ) -> EmpireRef {
        let (tx, rx) = mpsc::unbounded_channel();
        let empire = Self {
            faction,
            ctx,
            voice,
            nlu,
            board_size: (config.board_width, config.board_height),
            rng: ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(u64::from(faction.0))),
            rx,
        };
        tokio::spawn(empire.run());
        EmpireRef::new(faction, tx)
    }

    async fn run(mut self) {
        match self.ctx.board.register(self.faction).await {
            Ok(registered) => match registered.corner {
                Some(corner) => info!(faction = %self.faction, %corner, "user empire registered"),
                None => warn!(faction = %self.faction, "user empire got no spawn corner"),
            },
            Err(e) => warn!(faction = %self.faction, "user registration failed: {}", e),
        }

        let mut client = match &self.voice {
            Some(voice) => match voice.register().await {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("voice registration failed, user turns will be passed: {}", e);
                    None
                }
            },
            None => None,
        };

        if self.ctx.director.ready(self.faction).is_err() {
            return;
        }

        while let Some(EmpireCommand::Turn { turn }) = self.rx.recv().await {
            match client.as_mut() {
                Some(client) => {
                    if let Err(e) = self.play_turn(client, turn).await {
                        warn!(turn, "user turn aborted: {}", e);
                    }
                }
                None => debug!(turn, "no voice device, passing"),
            }
            if self.ctx.director.done(self.faction).is_err() {
                break;
            }
        }
        debug!("user empire stopped");
    }

    async fn play_turn(&mut self, client: &mut VoiceClient, turn: Turn) -> Result<()> {
        let moves = self.ctx.board.get_moves(self.faction).await?;
        let mut ctx = DialogueContext::new(turn, moves);

        let mut prompted = false;
        loop {
            ctx.reset();
            self.survey(&mut ctx).await?;
            if !ctx.actionable {
                debug!(turn, "no legal action left");
                if prompted {
                    client.say(phrases::NOTHING_LEFT).await?;
                }
                break;
            }
            prompted = true;

            let mut prompt = command_prompt();
            if self
                .converse(client, &mut prompt, &mut ctx, Stage::Command)
                .await?
                == Conversation::Cancelled
            {
                continue;
            }

            let intent = ctx.intent.unwrap_or(IntentKind::Unknown);
            debug!(?intent, "user command");
            if self.route(client, &mut ctx, intent).await? == Step::EndTurn {
                break;
            }

            ctx.moves = self.ctx.board.get_moves(self.faction).await?;
        }
        Ok(())
    }

    /// Look at every movable unit's options
    ///
    /// Sets whether anything is left to do and picks something sensible to
    /// suggest: an attack, else a move, else production.
    async fn survey(&mut self, ctx: &mut DialogueContext) -> Result<()> {
        let mut attack = None;
        let mut first_move = None;
        let mut any_option = false;
        for unit in &ctx.moves.units {
            let options = self.ctx.board.moves_for_unit(unit.id).await?;
            any_option |= !options.is_empty();
            if attack.is_some() {
                continue;
            }
            if let Some(m) = options.iter().find(|m| m.kind == ActionKind::Attack) {
                attack = Some(Order::Attack {
                    unit: *unit,
                    target: m.position,
                });
            } else if first_move.is_none() {
                let steps: Vec<_> = options
                    .iter()
                    .filter(|m| m.kind == ActionKind::Move)
                    .collect();
                first_move = steps.choose(&mut self.rng).map(|m| Order::Move {
                    unit: *unit,
                    to: m.position,
                });
            }
        }

        let can_produce = ctx.moves.can_produce;
        ctx.actionable = any_option || can_produce;
        ctx.proposal = attack
            .or(first_move)
            .or_else(|| can_produce.then_some(Order::Produce(Archetype::Archer)));
        Ok(())
    }

    async fn route(
        &mut self,
        client: &mut VoiceClient,
        ctx: &mut DialogueContext,
        intent: IntentKind,
    ) -> Result<Step> {
        let kind = match intent {
            IntentKind::Move => CommandKind::Move,
            IntentKind::Attack => CommandKind::Attack,
            IntentKind::Produce => CommandKind::Produce,
            IntentKind::RequestMoves | IntentKind::RequestUnitMoveRange => CommandKind::Inspect,
            IntentKind::RequestTurn => {
                let turn = self.ctx.board.turn().await?;
                client.say(phrases::current_turn(turn)).await?;
                return Ok(Step::Continue);
            }
            IntentKind::SkipRound => return self.skip_round(client, ctx).await,
            IntentKind::Approve => {
                match ctx.proposal {
                    Some(order) => self.execute(client, order).await?,
                    None => client.say(phrases::NOTHING_TO_APPROVE).await?,
                }
                return Ok(Step::Continue);
            }
            IntentKind::Cancel => {
                client.say(phrases::CANCELLED).await?;
                return Ok(Step::Continue);
            }
            IntentKind::Unknown => return Ok(Step::Continue),
        };

        ctx.kind = Some(kind);
        if let Some(result) = ctx.last_result.take() {
            if let Err(e) =
                ctx.translator
                    .absorb(&result, kind, None, &ctx.moves, self.board_size)
            {
                client.say(e.to_string()).await?;
            }
        }

        for slot in [Slot::Source, Slot::Target, Slot::UnitType] {
            if !kind.needs(slot) || ctx.translator.is_filled(slot) {
                continue;
            }
            let mut prompt = slot_prompt(slot);
            if self.converse(client, &mut prompt, ctx, Stage::Slot(slot)).await?
                == Conversation::Cancelled
            {
                client.say(phrases::CANCELLED).await?;
                return Ok(Step::Continue);
            }
        }

        let translator = &ctx.translator;
        match (kind, translator.source, translator.target, translator.unit_type) {
            (CommandKind::Move, Some(unit), Some(to), _) => {
                self.execute(client, Order::Move { unit, to }).await?
            }
            (CommandKind::Attack, Some(unit), Some(target), _) => {
                self.execute(client, Order::Attack { unit, target }).await?
            }
            (CommandKind::Produce, _, _, Some(archetype)) => {
                self.execute(client, Order::Produce(archetype)).await?
            }
            (CommandKind::Inspect, Some(unit), _, _) => {
                let text = if intent == IntentKind::RequestUnitMoveRange {
                    phrases::unit_range(unit.archetype, unit.archetype.stats())
                } else {
                    let options = self.ctx.board.moves_for_unit(unit.id).await?;
                    phrases::options(unit.archetype, &options)
                };
                client.say(text).await?;
            }
            _ => {}
        }
        Ok(Step::Continue)
    }

    async fn skip_round(
        &mut self,
        client: &mut VoiceClient,
        ctx: &mut DialogueContext,
    ) -> Result<Step> {
        if ctx.actionable {
            ctx.confirm = None;
            let mut prompt = confirm_prompt();
            self.converse(client, &mut prompt, ctx, Stage::Confirm)
                .await?;
            if ctx.confirm != Some(true) {
                client.say(phrases::KEEP_PLAYING).await?;
                return Ok(Step::Continue);
            }
        }
        client.say(phrases::ENDING_TURN).await?;
        Ok(Step::EndTurn)
    }

    async fn execute(&mut self, client: &mut VoiceClient, order: Order) -> Result<()> {
        let board = &self.ctx.board;
        let (outcome, success) = match order {
            Order::Move { unit, to } => (
                board.move_unit(unit.id, to).await?,
                phrases::moved(unit.archetype, to),
            ),
            Order::Attack { unit, target } => (
                board.attack(unit.id, target).await?,
                phrases::attacked(unit.archetype, target),
            ),
            Order::Produce(archetype) => (
                board.produce(archetype).await?,
                phrases::producing(archetype),
            ),
        };
        info!(?order, ?outcome, "user order");
        let text = if outcome.is_executed() {
            success
        } else {
            phrases::rejection(outcome).to_string()
        };
        client.say(text).await
    }

    /// Run one prompt machine against the voice device until it finishes
    async fn converse(
        &mut self,
        client: &mut VoiceClient,
        prompt: &mut SlotPrompt<DialogueContext>,
        ctx: &mut DialogueContext,
        stage: Stage,
    ) -> Result<Conversation> {
        let mut actions = prompt.handle(PromptEvent::Start, ctx, &mut self.rng);
        loop {
            for action in std::mem::take(&mut actions) {
                match action {
                    PromptAction::Speak(text) => client.speak(text)?,
                    PromptAction::Listen => client.listen()?,
                    PromptAction::Done => return Ok(Conversation::Completed),
                }
            }

            let event = match client.next_event().await {
                Some(VoiceEvent::EndSpeech) => PromptEvent::EndSpeech,
                Some(VoiceEvent::Timeout) => PromptEvent::Timeout,
                Some(VoiceEvent::StartSpeech) => continue,
                Some(VoiceEvent::Recognised(hypothesis)) => {
                    debug!(utterance = %hypothesis.utterance, ?stage, "heard");
                    match self.understand(ctx, stage, &hypothesis.utterance).await {
                        Understood::Applied => PromptEvent::Recognised,
                        Understood::Rejected(explanation) => PromptEvent::Rejected(explanation),
                        Understood::Cancelled => return Ok(Conversation::Cancelled),
                    }
                }
                Some(VoiceEvent::Failed) => {
                    return Err(GameError::VoiceSetup("device unavailable".into()))
                }
                None => return Err(GameError::ActorGone("voice")),
            };
            actions = prompt.handle(event, ctx, &mut self.rng);
        }
    }

    /// Apply an utterance to the context for the given stage
    ///
    /// NLU failures leave the context untouched, which the prompt machine
    /// treats as a no-match.
    async fn understand(&self, ctx: &mut DialogueContext, stage: Stage, utterance: &str) -> Understood {
        if stage == Stage::Confirm {
            ctx.confirm = binary::classify(utterance);
            return Understood::Applied;
        }

        let result = match self.nlu.parse(utterance).await {
            Ok(result) => result,
            Err(e) => {
                warn!("NLU failed, treating as no-match: {}", e);
                return Understood::Applied;
            }
        };

        match stage {
            Stage::Command => {
                if result.intent() != IntentKind::Unknown {
                    ctx.intent = Some(result.intent());
                }
                ctx.last_result = Some(result);
                Understood::Applied
            }
            Stage::Slot(slot) => {
                if result.intent() == IntentKind::Cancel {
                    return Understood::Cancelled;
                }
                let kind = ctx.kind.unwrap_or(CommandKind::Move);
                match ctx
                    .translator
                    .absorb(&result, kind, Some(slot), &ctx.moves, self.board_size)
                {
                    Ok(()) => Understood::Applied,
                    Err(e) => Understood::Rejected(e.to_string()),
                }
            }
            Stage::Confirm => Understood::Applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitId;

    fn archer_at(x: i32, y: i32) -> MovableUnit {
        MovableUnit {
            id: UnitId::new(),
            archetype: Archetype::Archer,
            position: Position::new(x, y),
        }
    }

    #[test]
    fn test_first_prompt_carries_suggestion() {
        let mut ctx = DialogueContext::default();
        assert_eq!(what_is_your_move(&ctx), "What is your move?");
        ctx.proposal = Some(Order::Move {
            unit: archer_at(2, 1),
            to: Position::new(1, 2),
        });
        assert_eq!(
            what_is_your_move(&ctx),
            "What is your move? You could move your archer from C2 to B3."
        );
    }

    #[test]
    fn test_target_prompt_names_source() {
        let mut ctx = DialogueContext::default();
        ctx.kind = Some(CommandKind::Attack);
        ctx.translator.source = Some(archer_at(2, 1));
        assert_eq!(which_field(&ctx), "Which field should your archer attack?");
    }

    #[test]
    fn test_has_intent_ignores_unknown() {
        let mut ctx = DialogueContext::default();
        assert!(!has_intent(&ctx));
        ctx.intent = Some(IntentKind::Unknown);
        assert!(!has_intent(&ctx));
        ctx.intent = Some(IntentKind::SkipRound);
        assert!(has_intent(&ctx));
    }

    #[test]
    fn test_reset_keeps_turn_state() {
        let mut ctx = DialogueContext::new(4, Moves::default());
        ctx.intent = Some(IntentKind::Move);
        ctx.confirm = Some(true);
        ctx.translator.target = Some(Position::new(1, 1));
        ctx.reset();
        assert_eq!(ctx.turn, 4);
        assert!(ctx.intent.is_none());
        assert!(ctx.confirm.is_none());
        assert!(ctx.translator.target.is_none());
    }
}
