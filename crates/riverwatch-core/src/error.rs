use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Feed login failed: {0}")]
    AuthFailed(String),

    #[error("Failed to fetch unread stories: {0}")]
    FetchFailed(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
