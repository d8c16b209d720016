use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    /// An actor's mailbox or reply channel closed before it answered
    #[error("Actor is gone: {0}")]
    ActorGone(&'static str),

    #[error("NLU error: {0}")]
    NluError(String),

    #[error("Voice setup failed: {0}")]
    VoiceSetup(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
