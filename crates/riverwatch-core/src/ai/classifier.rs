use std::sync::Arc;

use super::prompts::{article_message, CLASSIFY_SYSTEM_PROMPT, IMPORTANT_ANSWER};
use super::ChatProvider;
use crate::{Error, Result};

/// Importance decision for one article in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Important,
    NotImportant,
}

impl Verdict {
    /// Only the exact (trimmed, case-sensitive) answer "important" counts
    pub fn from_response(raw: &str) -> Self {
        if raw.trim() == IMPORTANT_ANSWER {
            Verdict::Important
        } else {
            Verdict::NotImportant
        }
    }

    pub fn is_important(self) -> bool {
        self == Verdict::Important
    }
}

impl From<Verdict> for bool {
    fn from(verdict: Verdict) -> bool {
        verdict.is_important()
    }
}

/// Asks the language model whether an article is worth sharing
///
/// How selective the model is comes from the system prompt alone; the number
/// of important articles per batch is not capped here.
pub struct RelevanceClassifier {
    provider: Arc<dyn ChatProvider>,
}

impl RelevanceClassifier {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// One model call per article. Provider failures surface as
    /// `Error::Classification`; callers treat them as not important.
    pub async fn classify(&self, body: &str) -> Result<Verdict> {
        let reply = self
            .provider
            .chat(CLASSIFY_SYSTEM_PROMPT, &article_message(body))
            .await
            .map_err(|e| Error::Classification(e.to_string()))?;

        let verdict = Verdict::from_response(&reply);
        tracing::debug!(model = self.provider.model(), reply = %reply.trim(), ?verdict, "Classified article");
        Ok(verdict)
    }
}
