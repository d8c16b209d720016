//! Everything the user empire says out loud

use crate::board::notation::describe;
use crate::board::protocol::{ActionKind, Outcome, PossibleMove};
use crate::core::types::{Position, Turn};
use crate::unit::{Archetype, UnitStats};

pub const NOTHING_LEFT: &str = "You have nothing left to do this turn.";
pub const ENDING_TURN: &str = "Ending your turn.";
pub const KEEP_PLAYING: &str = "All right, let's continue.";
pub const CANCELLED: &str = "Okay, forget it.";
pub const NOTHING_TO_APPROVE: &str = "I have no suggestion for you to approve.";

/// Why the board turned a request down
pub fn rejection(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Executed => "Done.",
        Outcome::ExistsNot => "That unit does not exist any more.",
        Outcome::OutOfRange => "That field is out of range.",
        Outcome::OccAlly => "One of your own units is standing there.",
        Outcome::OccEnemy => "An enemy unit is standing there.",
        Outcome::OccNot => "There is nobody to attack there.",
        Outcome::ProdInProgress => "You are already producing a unit.",
        Outcome::OutOfTurn => "It is not your turn.",
        Outcome::NotProducible => "That unit cannot be produced.",
    }
}

fn article(archetype: Archetype) -> &'static str {
    match archetype {
        Archetype::Archer => "an",
        _ => "a",
    }
}

pub fn moved(archetype: Archetype, to: Position) -> String {
    format!("Your {} moves to {}.", archetype, describe(to))
}

pub fn attacked(archetype: Archetype, target: Position) -> String {
    format!("Your {} attacks {}.", archetype, describe(target))
}

pub fn producing(archetype: Archetype) -> String {
    let lead = archetype.stats().lead_time;
    format!(
        "{} {} will be ready in {} {}.",
        capitalise(article(archetype)),
        archetype,
        lead,
        if lead == 1 { "turn" } else { "turns" }
    )
}

pub fn current_turn(turn: Turn) -> String {
    format!("It is turn {}.", turn)
}

pub fn unit_range(archetype: Archetype, stats: UnitStats) -> String {
    format!(
        "Your {} moves up to {} fields and attacks at a range of {}.",
        archetype, stats.move_range, stats.attack_range
    )
}

/// Spoken list of where a unit can go and what it can hit
pub fn options(archetype: Archetype, options: &[PossibleMove]) -> String {
    let fields = |kind: ActionKind| -> Vec<String> {
        options
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| describe(m.position))
            .collect()
    };
    let moves = fields(ActionKind::Move);
    let attacks = fields(ActionKind::Attack);

    match (moves.is_empty(), attacks.is_empty()) {
        (true, true) => format!("Your {} cannot do anything right now.", archetype),
        (false, true) => format!("Your {} can move to {}.", archetype, join(&moves)),
        (true, false) => format!("Your {} can attack {}.", archetype, join(&attacks)),
        (false, false) => format!(
            "Your {} can move to {} and attack {}.",
            archetype,
            join(&moves),
            join(&attacks)
        ),
    }
}

pub fn suggest_attack(archetype: Archetype, target: Position) -> String {
    format!(
        "You could attack {} with your {}.",
        describe(target),
        archetype
    )
}

pub fn suggest_move(archetype: Archetype, from: Position, to: Position) -> String {
    format!(
        "You could move your {} from {} to {}.",
        archetype,
        describe(from),
        describe(to)
    )
}

pub fn suggest_produce(archetype: Archetype) -> String {
    format!("You could produce {} {}.", article(archetype), archetype)
}

/// "a, b and c"
fn join(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join(&[]), "");
        assert_eq!(join(&["A1".into()]), "A1");
        assert_eq!(join(&["A1".into(), "B2".into(), "C3".into()]), "A1, B2 and C3");
    }

    #[test]
    fn test_producing() {
        assert_eq!(producing(Archetype::Archer), "An archer will be ready in 3 turns.");
        assert_eq!(producing(Archetype::Worker), "A worker will be ready in 1 turn.");
    }

    #[test]
    fn test_options() {
        let opts = [
            PossibleMove {
                kind: ActionKind::Move,
                position: Position::new(1, 2),
            },
            PossibleMove {
                kind: ActionKind::Attack,
                position: Position::new(3, 3),
            },
        ];
        assert_eq!(
            options(Archetype::Archer, &opts),
            "Your archer can move to B3 and attack D4."
        );
        assert_eq!(
            options(Archetype::Archer, &[]),
            "Your archer cannot do anything right now."
        );
    }

    #[test]
    fn test_every_rejection_has_text() {
        for outcome in [
            Outcome::ExistsNot,
            Outcome::OutOfRange,
            Outcome::OccAlly,
            Outcome::OccEnemy,
            Outcome::OccNot,
            Outcome::ProdInProgress,
            Outcome::OutOfTurn,
            Outcome::NotProducible,
        ] {
            assert!(!rejection(outcome).is_empty());
        }
    }
}
