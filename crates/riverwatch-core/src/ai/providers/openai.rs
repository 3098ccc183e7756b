use std::time::Duration;

use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use serde::Deserialize;

use super::ChatProvider;
use crate::http::{HttpClient, Idempotency};
use crate::{Error, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Deserialize)]
struct OpenAiErrorBody {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

/// OpenAI (or OpenAI-compatible) chat completions provider
///
/// Wire types come from async-openai; requests go through the shared
/// `HttpClient` so they follow the same retry policy as every other call.
/// An error status (including 429) is reported once and never retried.
pub struct OpenAiProvider {
    http: HttpClient,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(http: HttpClient, api_key: &str, model: &str, api_base: Option<&str>, timeout_secs: u64) -> Self {
        let base = api_base.unwrap_or(DEFAULT_API_BASE).trim_end_matches('/');

        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: format!("{}/chat/completions", base),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn build_request(&self, system: &str, user: &str) -> Result<CreateChatCompletionRequest> {
        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| Error::AiProvider(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()
                    .map_err(|e| Error::AiProvider(e.to_string()))?
                    .into(),
            ])
            .build()
            .map_err(|e| Error::AiProvider(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = self.build_request(system, user)?;

        // Completions have no server-side effect, so timeouts may be retried
        let response = self
            .http
            .send(
                self.http
                    .post(&self.endpoint)
                    .bearer_auth(&self.api_key)
                    .timeout(self.timeout)
                    .json(&request),
                Idempotency::Idempotent,
            )
            .await
            .map_err(|e| Error::AiProvider(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::AiProvider(format!("Failed to read OpenAI response: {}", e.without_url())))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<OpenAiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Error::AiProvider(format!("OpenAI returned HTTP {}: {}", status, detail)));
        }

        let completion: CreateChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::AiProvider(format!("Failed to parse OpenAI response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(content)
    }
}
