use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An unread story as delivered by the feed service
///
/// `body` is passed to the language model untouched, markup included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub body: String,
    pub url: String,
}

impl Article {
    pub fn new(title: impl Into<String>, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: url.into(),
        }
    }
}

/// Proof of a successful login. The session cookie itself lives in the
/// HTTP client's cookie store.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub authenticated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            authenticated_at: Utc::now(),
        }
    }
}
