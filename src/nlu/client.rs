//! HTTP client for a Rasa-compatible NLU server
//!
//! Posts `{"text": ...}` to the parse endpoint and decodes the intent and
//! entities. The server only classifies utterances; all game logic stays here.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::core::error::{GameError, Result};
use crate::nlu::parser::{self, NluResult};

/// Async client for the NLU parse endpoint
pub struct NluClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl NluClient {
    /// Create a client for an explicit endpoint
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url,
            timeout,
        }
    }

    /// Classify one utterance
    pub async fn parse(&self, text: &str) -> Result<NluResult> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&ParseRequest { text })
            .send()
            .await
            .map_err(|e| GameError::NluError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GameError::NluError(format!("API error: {}", error_text)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GameError::NluError(e.to_string()))?;
        let result = parser::decode(&body)?;
        debug!(intent = ?result.intent(), entities = result.entities.len(), "NLU parse");
        Ok(result)
    }
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
}
