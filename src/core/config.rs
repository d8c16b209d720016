//! Game configuration with documented constants
//!
//! Defaults give the classic setup: a 15 x 10 board, one human
//! empire against three AI empires, and a four second listening window.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::{GameError, Result};

/// Configuration for a single game
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === BOARD ===
    /// Number of columns
    ///
    /// Capped at 26 so every column maps to a single letter in field notation.
    pub board_width: u32,

    /// Number of rows
    pub board_height: u32,

    // === EMPIRES ===
    /// How many AI empires play against the human
    ///
    /// The board has four spawn corners, so at most three AI empires fit.
    pub ai_empires: u8,

    /// Seed for every random source in the game (spawn placement, AI choices,
    /// clarification phrases)
    pub seed: u64,

    /// Stop after this many rounds. `None` plays until someone wins.
    pub max_turns: Option<u32>,

    // === VOICE ===
    /// Seconds the listening state waits for speech before synthesising TIMEOUT
    pub listen_timeout_secs: f32,

    // === NLU ===
    /// Rasa-compatible `/model/parse` endpoint. `None` uses the offline keyword classifier.
    pub nlu_url: Option<String>,

    /// Per-request timeout for the NLU endpoint
    pub nlu_timeout_secs: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 15,
            board_height: 10,
            ai_empires: 3,
            seed: 12345,
            max_turns: None,
            listen_timeout_secs: 4.0,
            nlu_url: None,
            nlu_timeout_secs: 5.0,
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn listen_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.listen_timeout_secs)
    }

    pub fn nlu_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.nlu_timeout_secs)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        // Spawn corners sit one field in from each edge and must not coincide
        if self.board_width < 4 || self.board_height < 4 {
            return Err(GameError::InvalidConfig(format!(
                "board must be at least 4 x 4, got {} x {}",
                self.board_width, self.board_height
            )));
        }

        if self.board_width > 26 {
            return Err(GameError::InvalidConfig(format!(
                "board_width ({}) exceeds the 26 columns field notation can name",
                self.board_width
            )));
        }

        if self.board_height > 99 {
            return Err(GameError::InvalidConfig(format!(
                "board_height ({}) exceeds 99 rows",
                self.board_height
            )));
        }

        if !(1..=3).contains(&self.ai_empires) {
            return Err(GameError::InvalidConfig(format!(
                "ai_empires must be between 1 and 3, got {}",
                self.ai_empires
            )));
        }

        if self.listen_timeout_secs <= 0.0 || self.nlu_timeout_secs <= 0.0 {
            return Err(GameError::InvalidConfig("timeouts must be positive".into()));
        }

        if self.max_turns == Some(0) {
            return Err(GameError::InvalidConfig("max_turns must be at least 1".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.board_width, 15);
        assert_eq!(config.board_height, 10);
    }

    #[test]
    fn test_too_many_ai_empires() {
        let config = GameConfig {
            ai_empires: 4,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_board_too_wide_for_notation() {
        let config = GameConfig {
            board_width: 27,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str("ai_empires = 1\nseed = 7\n").unwrap();
        assert_eq!(config.ai_empires, 1);
        assert_eq!(config.seed, 7);
        assert_eq!(config.board_width, 15);
        assert!(config.nlu_url.is_none());
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        assert!(GameConfig::from_toml_str("board_width = 2\n").is_err());
        assert!(GameConfig::from_toml_str("board_width = \"wide\"\n").is_err());
    }
}
