//! Natural-language understanding for spoken commands
//!
//! Utterances are classified either by a remote Rasa-compatible server or by
//! the offline keyword classifier. Both produce the same [`NluResult`].

pub mod client;
pub mod keyword;
pub mod parser;

pub use client::NluClient;
pub use keyword::KeywordNlu;
pub use parser::{Entity, EntityKind, EntityRole, Intent, IntentKind, NluResult};

use crate::core::config::GameConfig;
use crate::core::error::Result;

/// The NLU collaborator used by the user empire
pub enum Nlu {
    Remote(NluClient),
    Keyword(KeywordNlu),
}

impl Nlu {
    /// Remote client when an endpoint is configured, keyword classifier otherwise
    pub fn from_config(config: &GameConfig) -> Self {
        match &config.nlu_url {
            Some(url) => Nlu::Remote(NluClient::new(url.clone(), config.nlu_timeout())),
            None => Nlu::Keyword(KeywordNlu::new()),
        }
    }

    pub async fn parse(&self, utterance: &str) -> Result<NluResult> {
        match self {
            Nlu::Remote(client) => client.parse(utterance).await,
            Nlu::Keyword(keywords) => Ok(keywords.parse(utterance)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_picks_adapter() {
        let config = GameConfig::default();
        assert!(matches!(Nlu::from_config(&config), Nlu::Keyword(_)));

        let config = GameConfig {
            nlu_url: Some("http://localhost:5005/model/parse".into()),
            ..GameConfig::default()
        };
        assert!(matches!(Nlu::from_config(&config), Nlu::Remote(_)));
    }

    #[tokio::test]
    async fn test_keyword_parse_through_enum() {
        let nlu = Nlu::Keyword(KeywordNlu::new());
        let result = nlu.parse("skip").await.unwrap();
        assert_eq!(result.intent(), IntentKind::SkipRound);
    }
}
