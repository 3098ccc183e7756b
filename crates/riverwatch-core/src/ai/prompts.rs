//! Fixed instructions sent to the language model.
//!
//! Both system prompts are part of the external contract: changing the wording
//! changes which stories get through.

pub const CLASSIFY_SYSTEM_PROMPT: &str = "You are a news assistant. You will be provided with the content of an article. Your task is to determine if the article contains critical or significant information that would be of interest to a general audience. Focus on breaking news, impactful events, major discoveries, or anything particularly insightful. Limit your response to only selecting highly important articles to ensure that no more than 4-5 highly relevant articles are shared at any time. Please respond with either 'important' or 'not important'.";

pub const SUMMARIZE_SYSTEM_PROMPT: &str = "You are a news assistant. Please provide a clear, concise, and engaging 2-3 sentence summary of the following article content, focusing on the key points and making it informative for a general audience.";

/// Exact answer that marks an article as important
pub const IMPORTANT_ANSWER: &str = "important";

/// User message carrying the article body
pub fn article_message(body: &str) -> String {
    format!("Article content: {}", body)
}
