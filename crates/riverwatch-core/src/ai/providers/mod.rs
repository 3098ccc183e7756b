mod claude_api;
mod openai;

use std::sync::Arc;

pub use claude_api::ClaudeApiProvider;
pub use openai::OpenAiProvider;

use crate::config::AiConfig;
use crate::http::HttpClient;
use crate::{Error, Result};

/// A chat-style language model endpoint
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Model identifier, for logs
    fn model(&self) -> &str;

    /// Send one system instruction and one user message, return the raw reply text
    async fn chat(&self, system: &str, user: &str) -> Result<String>;
}

/// Build the provider named in configuration
///
/// A missing API key is not an error here: requests will be rejected by the
/// service and handled per article, which matches the startup warning policy.
pub fn build_provider(config: &AiConfig, http: &HttpClient) -> Result<Arc<dyn ChatProvider>> {
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let provider: Arc<dyn ChatProvider> = match config.provider.as_str() {
        "openai" => Arc::new(OpenAiProvider::new(
            http.clone(),
            api_key,
            &config.model,
            config.api_base.as_deref(),
            config.request_timeout_secs,
        )),
        "claude_api" => Arc::new(ClaudeApiProvider::new(
            http.clone(),
            api_key,
            &config.model,
            config.api_base.as_deref(),
            config.request_timeout_secs,
        )),
        other => {
            return Err(Error::Config(format!(
                "Unknown AI provider '{}', expected 'openai' or 'claude_api'",
                other
            )))
        }
    };

    Ok(provider)
}
