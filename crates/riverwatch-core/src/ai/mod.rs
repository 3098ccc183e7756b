mod classifier;
pub mod prompts;
pub mod providers;
mod summarizer;

pub use classifier::{RelevanceClassifier, Verdict};
pub use providers::{build_provider, ChatProvider};
pub use summarizer::{Summarizer, FALLBACK_SUMMARY};
