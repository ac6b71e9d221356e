//! Anthropic token counting API implementation

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::Provider;
use crate::tokenizer::backend::Backend;
use crate::tokenizer::error::{TokenizerError, TokenizerResult};
use crate::tokenizer::{CounterSettings, API_KEY_ENV};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Claude tokenizer backed by the `count_tokens` endpoint
pub struct AnthropicProvider {
    model: String,
    api_key: String,
    endpoint: String,
    client: Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    input_tokens: usize,
}

impl AnthropicProvider {
    /// Build the client and confirm the endpoint accepts the model
    ///
    /// Performs one live request, so an unreachable API, rejected key or
    /// unknown model fails here rather than on the first file.
    pub fn connect(settings: &CounterSettings) -> TokenizerResult<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                TokenizerError::EnvVarError(format!("{} environment variable not set", API_KEY_ENV))
            })?;

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let provider = Self {
            model: settings.model.clone(),
            api_key,
            endpoint: settings.endpoint.clone(),
            client,
        };

        provider.count_tokens("test")?;

        Ok(provider)
    }
}

impl Provider for AnthropicProvider {
    fn count_tokens(&self, text: &str) -> TokenizerResult<usize> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": self.model,
                "messages": [{
                    "role": "user",
                    "content": text
                }]
            }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unable to read error message".to_string());

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    TokenizerError::AuthError(format!("{}: {}", status, error_text))
                }
                StatusCode::NOT_FOUND => TokenizerError::UnsupportedModel(format!(
                    "{} ({}: {})",
                    self.model, status, error_text
                )),
                _ => TokenizerError::ApiError(format!(
                    "Claude API returned error status {}: {}",
                    status, error_text
                )),
            });
        }

        let token_response: TokenResponse = response.json()?;

        Ok(token_response.input_tokens)
    }

    fn backend(&self) -> Backend {
        Backend::Anthropic
    }
}
