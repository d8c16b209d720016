//! Turns NLU entities into validated command slots
//!
//! Each slot keeps the words the player used next to the validated value.
//! A slot that cannot be resolved is cleared and the reason is returned so it
//! can be spoken before asking again.

use thiserror::Error;

use crate::board::notation::{describe, parse_field};
use crate::board::protocol::{MovableUnit, Moves};
use crate::core::types::Position;
use crate::nlu::parser::{Entity, EntityKind, EntityRole, NluResult};
use crate::unit::Archetype;

/// Slots a command can need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Source,
    Target,
    UnitType,
}

/// What the slots are being filled for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Move,
    Attack,
    Produce,
    /// Questions about a single unit; only the source slot matters
    Inspect,
}

impl CommandKind {
    pub fn needs(&self, slot: Slot) -> bool {
        match self {
            CommandKind::Move | CommandKind::Attack => slot != Slot::UnitType,
            CommandKind::Produce => slot == Slot::UnitType,
            CommandKind::Inspect => slot == Slot::Source,
        }
    }
}

/// Why a slot could not be filled; the message is spoken to the player
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("I don't know a unit called {0}.")]
    UnknownUnit(String),

    #[error("None of your {} can act right now.", plural_of(.0))]
    NoSuchUnit(Archetype),

    #[error("You have no unit on {} that can act right now.", field_text(.0))]
    NoUnitOnField(Position),

    #[error("{0} is not a field on the board.")]
    OffBoard(String),

    #[error("A {0} cannot be produced.")]
    NotProducible(Archetype),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTranslator {
    pub source_utterance: Option<String>,
    pub target_utterance: Option<String>,
    pub unit_type_utterance: Option<String>,
    pub source: Option<MovableUnit>,
    pub target: Option<Position>,
    pub unit_type: Option<Archetype>,
}

impl CommandTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; called at the start of each command
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_filled(&self, slot: Slot) -> bool {
        match slot {
            Slot::Source => self.source.is_some(),
            Slot::Target => self.target.is_some(),
            Slot::UnitType => self.unit_type.is_some(),
        }
    }

    pub fn is_complete(&self, kind: CommandKind) -> bool {
        [Slot::Source, Slot::Target, Slot::UnitType]
            .into_iter()
            .all(|slot| !kind.needs(slot) || self.is_filled(slot))
    }

    pub fn clear(&mut self, slot: Slot) {
        match slot {
            Slot::Source => {
                self.source = None;
                self.source_utterance = None;
            }
            Slot::Target => {
                self.target = None;
                self.target_utterance = None;
            }
            Slot::UnitType => {
                self.unit_type = None;
                self.unit_type_utterance = None;
            }
        }
    }

    /// Fill slots from the entities of one NLU result
    ///
    /// `expecting` is the slot currently being asked for; it decides where a
    /// field without a role goes. An entity that does not resolve leaves its
    /// slot empty without stopping the others; the first such error is returned.
    pub fn absorb(
        &mut self,
        result: &NluResult,
        kind: CommandKind,
        expecting: Option<Slot>,
        moves: &Moves,
        board: (u32, u32),
    ) -> Result<(), SlotError> {
        let mut first_error = None;
        for entity in &result.entities {
            let Some(slot) = slot_for(entity, kind, expecting) else {
                continue;
            };
            if !kind.needs(slot) {
                continue;
            }
            if let Err(e) = self.fill(slot, entity, moves, board) {
                self.clear(slot);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fill(
        &mut self,
        slot: Slot,
        entity: &Entity,
        moves: &Moves,
        (width, height): (u32, u32),
    ) -> Result<(), SlotError> {
        let words = Some(entity.value.clone());
        match (slot, entity.entity) {
            (Slot::Source, EntityKind::Unit) => {
                let archetype = unit_word(&entity.value)?;
                let unit = moves
                    .first_of(archetype)
                    .ok_or(SlotError::NoSuchUnit(archetype))?;
                self.source = Some(*unit);
                self.source_utterance = words;
            }
            (Slot::Source, EntityKind::Field) => {
                let pos = field_word(&entity.value, width, height)?;
                let unit = moves
                    .units
                    .iter()
                    .find(|u| u.position == pos)
                    .ok_or(SlotError::NoUnitOnField(pos))?;
                self.source = Some(*unit);
                self.source_utterance = words;
            }
            (Slot::Target, EntityKind::Field) => {
                self.target = Some(field_word(&entity.value, width, height)?);
                self.target_utterance = words;
            }
            (Slot::UnitType, EntityKind::Unit) => {
                let archetype = unit_word(&entity.value)?;
                if !archetype.is_producible() {
                    return Err(SlotError::NotProducible(archetype));
                }
                self.unit_type = Some(archetype);
                self.unit_type_utterance = words;
            }
            _ => {}
        }
        Ok(())
    }
}

fn plural_of(archetype: &Archetype) -> &'static str {
    archetype.plural()
}

fn field_text(pos: &Position) -> String {
    describe(*pos)
}

fn slot_for(entity: &Entity, kind: CommandKind, expecting: Option<Slot>) -> Option<Slot> {
    match entity.entity {
        EntityKind::Unit if kind == CommandKind::Produce => Some(Slot::UnitType),
        EntityKind::Unit => Some(Slot::Source),
        EntityKind::Field => Some(match entity.role {
            Some(EntityRole::Source) => Slot::Source,
            Some(EntityRole::Target) => Slot::Target,
            _ => match expecting {
                Some(slot @ (Slot::Source | Slot::Target)) => slot,
                _ if kind == CommandKind::Inspect => Slot::Source,
                _ => Slot::Target,
            },
        }),
        EntityKind::Other => None,
    }
}

fn unit_word(word: &str) -> Result<Archetype, SlotError> {
    Archetype::from_word(word).ok_or_else(|| SlotError::UnknownUnit(word.to_string()))
}

fn field_word(word: &str, width: u32, height: u32) -> Result<Position, SlotError> {
    parse_field(word, width, height).ok_or_else(|| SlotError::OffBoard(word.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitId;
    use crate::nlu::KeywordNlu;

    const BOARD: (u32, u32) = (15, 10);

    fn moves() -> (Moves, MovableUnit, MovableUnit) {
        let archer = MovableUnit {
            id: UnitId::new(),
            archetype: Archetype::Archer,
            position: Position::new(2, 1),
        };
        let spearman = MovableUnit {
            id: UnitId::new(),
            archetype: Archetype::Spearman,
            position: Position::new(2, 3),
        };
        let moves = Moves {
            units: vec![archer, spearman],
            can_produce: true,
        };
        (moves, archer, spearman)
    }

    fn absorb(
        t: &mut CommandTranslator,
        text: &str,
        kind: CommandKind,
        expecting: Option<Slot>,
        moves: &Moves,
    ) -> Result<(), SlotError> {
        let result = KeywordNlu::new().parse(text);
        t.absorb(&result, kind, expecting, moves, BOARD)
    }

    #[test]
    fn test_move_the_archer_to_b3() {
        let (moves, archer, _) = moves();
        let mut t = CommandTranslator::new();
        absorb(&mut t, "Move the archer to B3", CommandKind::Move, None, &moves).unwrap();
        assert_eq!(t.source.map(|u| u.id), Some(archer.id));
        assert_eq!(t.target, Some(Position::new(1, 2)));
        assert_eq!(t.source_utterance.as_deref(), Some("archer"));
        assert!(t.is_complete(CommandKind::Move));
    }

    #[test]
    fn test_source_by_field() {
        let (moves, _, spearman) = moves();
        let mut t = CommandTranslator::new();
        absorb(&mut t, "the unit on C4", CommandKind::Move, Some(Slot::Source), &moves).unwrap();
        assert_eq!(t.source.map(|u| u.id), Some(spearman.id));
        assert!(!t.is_complete(CommandKind::Move));
    }

    #[test]
    fn test_bare_field_fills_expected_slot() {
        let (moves, archer, _) = moves();
        let mut t = CommandTranslator::new();
        absorb(&mut t, "C2", CommandKind::Attack, Some(Slot::Source), &moves).unwrap();
        assert_eq!(t.source.map(|u| u.id), Some(archer.id));

        absorb(&mut t, "F7", CommandKind::Attack, Some(Slot::Target), &moves).unwrap();
        assert_eq!(t.target, Some(Position::new(5, 6)));
    }

    #[test]
    fn test_missing_unit_is_cleared_with_reason() {
        let (moves, _, _) = moves();
        let mut t = CommandTranslator::new();
        let err = absorb(&mut t, "move the horseman to B3", CommandKind::Move, None, &moves)
            .unwrap_err();
        assert_eq!(err, SlotError::NoSuchUnit(Archetype::Horseman));
        assert_eq!(err.to_string(), "None of your horsemen can act right now.");
        assert!(t.source.is_none());
        // The rest of the utterance still counts
        assert_eq!(t.target, Some(Position::new(1, 2)));
        assert_eq!(t.target_utterance.as_deref(), Some("b3"));
    }

    #[test]
    fn test_off_board_target() {
        let (moves, _, _) = moves();
        let mut t = CommandTranslator::new();
        let err = absorb(&mut t, "to z9", CommandKind::Move, Some(Slot::Target), &moves)
            .unwrap_err();
        assert_eq!(err, SlotError::OffBoard("Z9".into()));
        assert!(t.target.is_none());
    }

    #[test]
    fn test_produce_fills_unit_type() {
        let (moves, _, _) = moves();
        let mut t = CommandTranslator::new();
        absorb(&mut t, "train archers", CommandKind::Produce, None, &moves).unwrap();
        assert_eq!(t.unit_type, Some(Archetype::Archer));
        assert!(t.source.is_none());
        assert!(t.is_complete(CommandKind::Produce));

        t.reset();
        let err = absorb(&mut t, "build a base", CommandKind::Produce, None, &moves).unwrap_err();
        assert_eq!(err, SlotError::NotProducible(Archetype::Base));
    }

    #[test]
    fn test_inspect_takes_field_as_source() {
        let (moves, _, spearman) = moves();
        let mut t = CommandTranslator::new();
        absorb(&mut t, "what can c4 do", CommandKind::Inspect, None, &moves).unwrap();
        assert_eq!(t.source.map(|u| u.id), Some(spearman.id));
        assert!(t.is_complete(CommandKind::Inspect));
    }
}
