//! Unit archetypes and their default properties
//!
//! Archers, horsemen and spearmen form the effectiveness triangle:
//! spearmen beat horsemen, horsemen beat archers, archers beat spearmen.
//! Workers and bases sit outside it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::Turn;

/// Type of unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Archer,
    Horseman,
    Spearman,
    Worker,
    Base,
}

/// Fixed combat and production properties of an archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    pub max_health: u32,
    pub attack: u32,
    pub move_range: u32,
    pub attack_range: u32,
    /// Turns between a PRODUCE request and the unit appearing
    pub lead_time: Turn,
}

/// Archetypes a faction may order through production
pub const PRODUCIBLE: [Archetype; 4] = [
    Archetype::Archer,
    Archetype::Horseman,
    Archetype::Spearman,
    Archetype::Worker,
];

impl Archetype {
    /// Get default properties for this archetype
    pub fn stats(&self) -> UnitStats {
        match self {
            Archetype::Spearman => UnitStats {
                max_health: 100,
                attack: 30,
                move_range: 2,
                attack_range: 1,
                lead_time: 2,
            },
            Archetype::Archer => UnitStats {
                max_health: 100,
                attack: 30,
                move_range: 2,
                attack_range: 3,
                lead_time: 3,
            },
            Archetype::Horseman => UnitStats {
                max_health: 100,
                attack: 30,
                move_range: 3,
                attack_range: 1,
                lead_time: 2,
            },
            Archetype::Worker => UnitStats {
                max_health: 60,
                attack: 10,
                move_range: 2,
                attack_range: 1,
                lead_time: 1,
            },
            // Bases never move and are placed at registration, not produced
            Archetype::Base => UnitStats {
                max_health: 250,
                attack: 40,
                move_range: 0,
                attack_range: 1,
                lead_time: 0,
            },
        }
    }

    /// The archetype this one deals double damage to
    pub fn effective_against(&self) -> Option<Archetype> {
        match self {
            Archetype::Spearman => Some(Archetype::Horseman),
            Archetype::Horseman => Some(Archetype::Archer),
            Archetype::Archer => Some(Archetype::Spearman),
            Archetype::Worker | Archetype::Base => None,
        }
    }

    /// The archetype this one deals half damage to
    pub fn ineffective_against(&self) -> Option<Archetype> {
        match self {
            Archetype::Spearman => Some(Archetype::Archer),
            Archetype::Horseman => Some(Archetype::Spearman),
            Archetype::Archer => Some(Archetype::Horseman),
            Archetype::Worker | Archetype::Base => None,
        }
    }

    /// Damage this archetype deals to `defender` in one exchange
    pub fn damage_against(&self, defender: Archetype) -> u32 {
        let attack = self.stats().attack;
        if self.effective_against() == Some(defender) {
            attack * 2
        } else if self.ineffective_against() == Some(defender) {
            attack / 2
        } else {
            attack
        }
    }

    pub fn is_producible(&self) -> bool {
        PRODUCIBLE.contains(self)
    }

    /// Singular name used in speech
    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Archer => "archer",
            Archetype::Horseman => "horseman",
            Archetype::Spearman => "spearman",
            Archetype::Worker => "worker",
            Archetype::Base => "base",
        }
    }

    /// Plural name used in speech
    pub fn plural(&self) -> &'static str {
        match self {
            Archetype::Archer => "archers",
            Archetype::Horseman => "horsemen",
            Archetype::Spearman => "spearmen",
            Archetype::Worker => "workers",
            Archetype::Base => "bases",
        }
    }

    /// Resolve a spoken word (singular, plural or synonym) to an archetype
    pub fn from_word(word: &str) -> Option<Archetype> {
        match word.trim().to_lowercase().as_str() {
            "archer" | "archers" | "bowman" | "bowmen" => Some(Archetype::Archer),
            "horseman" | "horsemen" | "rider" | "riders" | "cavalry" | "knight" | "knights" => {
                Some(Archetype::Horseman)
            }
            "spearman" | "spearmen" | "pikeman" | "pikemen" => Some(Archetype::Spearman),
            "worker" | "workers" | "peasant" | "peasants" => Some(Archetype::Worker),
            "base" | "castle" | "headquarters" => Some(Archetype::Base),
            _ => None,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
