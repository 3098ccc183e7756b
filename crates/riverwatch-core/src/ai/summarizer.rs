use std::sync::Arc;

use super::prompts::{article_message, SUMMARIZE_SYSTEM_PROMPT};
use super::ChatProvider;
use crate::{Error, Result};

/// Stands in for a summary the model could not produce
pub const FALLBACK_SUMMARY: &str = "Summary could not be generated.";

/// Produces a short neutral digest of an article body
pub struct Summarizer {
    provider: Arc<dyn ChatProvider>,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Generate a 2-3 sentence summary
    ///
    /// Provider errors and blank replies are `Error::Summarization`.
    pub async fn summarize(&self, body: &str) -> Result<String> {
        let reply = self
            .provider
            .chat(SUMMARIZE_SYSTEM_PROMPT, &article_message(body))
            .await
            .map_err(|e| Error::Summarization(e.to_string()))?;

        let summary = reply.trim();
        if summary.is_empty() {
            return Err(Error::Summarization("model returned an empty summary".to_string()));
        }

        tracing::debug!(model = self.provider.model(), chars = summary.len(), "Generated summary");
        Ok(summary.to_string())
    }
}
