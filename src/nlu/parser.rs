//! Structured NLU results
//!
//! The shape follows the Rasa `/model/parse` response: an intent with a
//! confidence plus a list of entities with character spans and an optional
//! role. Extra fields in the response are ignored.

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};

/// Intents the game understands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Move a unit to an empty field
    Move,
    /// Attack the unit on a field
    Attack,
    /// Order a new unit
    Produce,
    /// Ask which turn it is
    RequestTurn,
    /// Ask where a unit can move or attack
    RequestMoves,
    /// Ask how far a unit can move and shoot
    RequestUnitMoveRange,
    /// End the turn early
    SkipRound,
    /// Accept the suggested move
    Approve,
    /// Abandon the command being filled in
    Cancel,
    /// Could not determine intent
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    pub name: IntentKind,
    #[serde(default)]
    pub confidence: f32,
}

impl Default for Intent {
    fn default() -> Self {
        Self {
            name: IntentKind::Unknown,
            confidence: 0.0,
        }
    }
}

/// Entity type tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A unit archetype word ("archer", "horsemen")
    Unit,
    /// A board field in letter-number notation ("c4")
    Field,
    #[serde(other)]
    Other,
}

/// Which slot an entity fills when a sentence names two
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    Source,
    Target,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub entity: EntityKind,
    /// Character offset of the span start
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub value: String,
    #[serde(default)]
    pub role: Option<EntityRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NluResult {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl NluResult {
    /// Result for an utterance nothing could be made of
    pub fn unknown(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn intent(&self) -> IntentKind {
        self.intent.name
    }

    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.entity == kind)
    }
}

/// Decode a parse response body
pub fn decode(body: &str) -> Result<NluResult> {
    serde_json::from_str(body)
        .map_err(|e| GameError::NluError(format!("Failed to decode parse result: {}", e)))
}
