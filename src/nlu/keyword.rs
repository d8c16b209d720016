//! Offline keyword classifier
//!
//! Recognises the game's intents from trigger words and extracts unit and
//! field entities. A field or unit gets a role from the word in front of it:
//! "with the archer" is a source, "to B3" is a target.

use crate::nlu::parser::{Entity, EntityKind, EntityRole, Intent, IntentKind, NluResult};
use crate::unit::Archetype;

/// Words skipped when looking for the word that assigns a role
const FILLER: &[&str] = &[
    "the", "a", "an", "my", "your", "our", "their", "field", "square", "hex", "tile", "position",
];

const SOURCE_MARKERS: &[&str] = &["with", "from", "using"];

const TARGET_MARKERS: &[&str] = &[
    "to", "towards", "toward", "onto", "into", "attack", "hit", "strike", "shoot", "charge",
];

const ENEMY_WORDS: &[&str] = &["enemy", "enemies", "foe", "foes", "opponent", "them"];

#[derive(Debug, Clone)]
struct Token {
    text: String,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct KeywordNlu;

impl KeywordNlu {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> NluResult {
        let tokens = tokenize(text);
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();

        let entities = tokens
            .iter()
            .enumerate()
            .filter_map(|(i, token)| {
                let (entity, value) = if let Some(archetype) = Archetype::from_word(&token.text) {
                    (EntityKind::Unit, archetype.name().to_string())
                } else if is_field_token(&token.text) {
                    (EntityKind::Field, token.text.clone())
                } else {
                    return None;
                };
                Some(Entity {
                    entity,
                    start: token.start,
                    end: token.end,
                    value,
                    role: role_for(&words, i),
                })
            })
            .collect();

        let name = classify(&words);
        NluResult {
            text: text.to_string(),
            intent: Intent {
                name,
                confidence: if name == IntentKind::Unknown { 0.0 } else { 1.0 },
            },
            entities,
        }
    }
}

/// Split into lowercase alphanumeric words with character offsets
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut count = 0;

    for (i, c) in text.chars().enumerate() {
        count = i + 1;
        if c.is_alphanumeric() {
            if current.is_empty() {
                start = i;
            }
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(Token {
                text: std::mem::take(&mut current),
                start,
                end: i,
            });
        }
    }
    if !current.is_empty() {
        tokens.push(Token {
            text: current,
            start,
            end: count,
        });
    }
    tokens
}

/// Letter followed by one or two digits, e.g. `c4` or `o10`
fn is_field_token(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let rest = chars.as_str();
    first.is_ascii_lowercase()
        && (1..=2).contains(&rest.len())
        && rest.chars().all(|c| c.is_ascii_digit())
}

fn role_for(words: &[&str], index: usize) -> Option<EntityRole> {
    let mut previous = words[..index]
        .iter()
        .rev()
        .copied()
        .filter(|w| !FILLER.contains(w));

    match previous.next()? {
        w if SOURCE_MARKERS.contains(&w) => Some(EntityRole::Source),
        w if TARGET_MARKERS.contains(&w) => Some(EntityRole::Target),
        // "the enemy on D4" is a target, "the unit on C4" a source
        "on" | "at" => match previous.next() {
            Some(w) if ENEMY_WORDS.contains(&w) => Some(EntityRole::Target),
            Some(w) if w == "unit" || Archetype::from_word(w).is_some() => {
                Some(EntityRole::Source)
            }
            _ => None,
        },
        _ => None,
    }
}

fn classify(words: &[&str]) -> IntentKind {
    let has = |w: &str| words.contains(&w);
    let any = |ws: &[&str]| ws.iter().any(|w| words.contains(w));

    if any(&["cancel", "abort", "nevermind"]) || (has("never") && has("mind")) {
        IntentKind::Cancel
    } else if any(&["skip", "pass"]) || (has("end") && has("turn")) || has("finish") {
        IntentKind::SkipRound
    } else if has("turn") && any(&["which", "what", "number", "current"]) {
        IntentKind::RequestTurn
    } else if has("range") || (has("how") && has("far")) {
        IntentKind::RequestUnitMoveRange
    } else if any(&["options", "possible", "moves"])
        || (has("where") && has("can"))
        || (has("what") && has("can"))
    {
        IntentKind::RequestMoves
    } else if any(&["attack", "hit", "strike", "shoot", "charge", "fight"]) {
        IntentKind::Attack
    } else if any(&["move", "go", "walk", "ride", "march", "send"]) {
        IntentKind::Move
    } else if any(&["produce", "build", "train", "recruit", "make", "create"]) {
        IntentKind::Produce
    } else if any(&["yes", "ok", "okay", "sure", "approve", "accept", "yeah", "yep"])
        || (has("do") && has("it"))
    {
        IntentKind::Approve
    } else {
        IntentKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> NluResult {
        KeywordNlu::new().parse(text)
    }

    #[test]
    fn test_move_with_unit_and_target() {
        let result = parse("Move the archer to B3");
        assert_eq!(result.intent(), IntentKind::Move);
        assert_eq!(result.entities.len(), 2);

        let unit = &result.entities[0];
        assert_eq!(unit.entity, EntityKind::Unit);
        assert_eq!(unit.value, "archer");
        assert_eq!((unit.start, unit.end), (9, 15));
        assert_eq!(unit.role, None);

        let field = &result.entities[1];
        assert_eq!(field.entity, EntityKind::Field);
        assert_eq!(field.value, "b3");
        assert_eq!(field.role, Some(EntityRole::Target));
    }

    #[test]
    fn test_attack_roles() {
        let result = parse("attack C4 with the horsemen");
        assert_eq!(result.intent(), IntentKind::Attack);
        let field = result.entities_of(EntityKind::Field).next().unwrap();
        assert_eq!(field.role, Some(EntityRole::Target));
        let unit = result.entities_of(EntityKind::Unit).next().unwrap();
        assert_eq!(unit.value, "horseman");
        assert_eq!(unit.role, Some(EntityRole::Source));
    }

    #[test]
    fn test_on_marks_source_or_target() {
        let result = parse("move the unit on c4 to d5");
        let fields: Vec<_> = result.entities_of(EntityKind::Field).collect();
        assert_eq!(fields[0].role, Some(EntityRole::Source));
        assert_eq!(fields[1].role, Some(EntityRole::Target));

        let result = parse("attack the enemy on d4");
        let field = result.entities_of(EntityKind::Field).next().unwrap();
        assert_eq!(field.role, Some(EntityRole::Target));
    }

    #[test]
    fn test_intents() {
        assert_eq!(parse("skip this round").intent(), IntentKind::SkipRound);
        assert_eq!(parse("end my turn").intent(), IntentKind::SkipRound);
        assert_eq!(parse("which turn is it?").intent(), IntentKind::RequestTurn);
        assert_eq!(
            parse("how far can the archer move").intent(),
            IntentKind::RequestUnitMoveRange
        );
        assert_eq!(
            parse("where can my spearman go").intent(),
            IntentKind::RequestMoves
        );
        assert_eq!(parse("build an archer").intent(), IntentKind::Produce);
        assert_eq!(parse("yes do it").intent(), IntentKind::Approve);
        assert_eq!(parse("never mind").intent(), IntentKind::Cancel);
        assert_eq!(parse("lovely weather").intent(), IntentKind::Unknown);
    }

    #[test]
    fn test_bare_field_has_no_role() {
        let result = parse("B3.");
        assert_eq!(result.intent(), IntentKind::Unknown);
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].role, None);
        assert_eq!(result.intent.confidence, 0.0);
    }

    #[test]
    fn test_field_token_shape() {
        assert!(is_field_token("c4"));
        assert!(is_field_token("o10"));
        assert!(!is_field_token("c"));
        assert!(!is_field_token("c100"));
        assert!(!is_field_token("44"));
        assert!(!is_field_token("to"));
    }
}
