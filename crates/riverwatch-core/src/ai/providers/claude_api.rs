use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ChatProvider;
use crate::http::{HttpClient, Idempotency};
use crate::{Error, Result};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 512;

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Option<Vec<ClaudeContent>>,
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

/// Claude/Anthropic messages API provider
pub struct ClaudeApiProvider {
    http: HttpClient,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl ClaudeApiProvider {
    pub fn new(http: HttpClient, api_key: &str, model: &str, api_base: Option<&str>, timeout_secs: u64) -> Self {
        let base = api_base.unwrap_or(DEFAULT_API_BASE).trim_end_matches('/');

        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: format!("{}/v1/messages", base),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for ClaudeApiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![ClaudeMessage {
                role: "user",
                content: user,
            }],
        };

        // Completions have no server-side effect, so timeouts may be retried
        let response = self
            .http
            .send(
                self.http
                    .post(&self.endpoint)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", API_VERSION)
                    .timeout(self.timeout)
                    .json(&request),
                Idempotency::Idempotent,
            )
            .await
            .map_err(|e| Error::AiProvider(format!("Claude API request failed: {}", e)))?;

        let status = response.status();
        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::AiProvider(format!("Failed to parse Claude response (HTTP {}): {}", status, e.without_url())))?;

        if let Some(error) = claude_response.error {
            return Err(Error::AiProvider(format!("Claude API error: {}", error.message)));
        }
        if !status.is_success() {
            return Err(Error::AiProvider(format!("Claude API returned HTTP {}", status)));
        }

        let content = claude_response
            .content
            .and_then(|c| c.into_iter().next())
            .map(|c| c.text)
            .unwrap_or_default();

        Ok(content)
    }
}
