use serde::Deserialize;
use url::Url;

use super::{Article, FeedSource, Session};
use crate::config::{AppConfig, FeedConfig};
use crate::http::{Idempotency, HttpClient};
use crate::{Error, Result};

const LOGIN_PATH: &str = "api/login";
const RIVER_PATH: &str = "reader/river_stories";

#[derive(Deserialize)]
struct LoginResponse {
    authenticated: Option<bool>,
    errors: Option<serde_json::Value>,
}

/// Parse a river-of-stories body into articles
///
/// Anything that is not a JSON object with a `stories` array yields an empty
/// batch. Individual stories that are not objects are skipped; missing or
/// non-string fields become empty strings.
pub fn parse_river_stories(body: &str) -> Vec<Article> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "River response is not valid JSON, treating as no new stories");
            return Vec::new();
        }
    };

    let Some(stories) = value.get("stories").and_then(|s| s.as_array()) else {
        tracing::warn!("River response has no stories array, treating as no new stories");
        return Vec::new();
    };

    stories
        .iter()
        .filter_map(|story| {
            let object = story.as_object()?;
            let field = |name: &str| {
                object
                    .get(name)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            Some(Article {
                title: field("story_title"),
                body: field("story_content"),
                url: field("story_permalink"),
            })
        })
        .collect()
}

/// NewsBlur feed source
pub struct NewsBlurSource {
    http: HttpClient,
    base_url: Url,
    username: String,
    password: String,
}

impl NewsBlurSource {
    pub fn new(http: HttpClient, config: &FeedConfig) -> Result<Self> {
        // A trailing slash makes Url::join append instead of replacing the last segment
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
            username: config.username.clone().unwrap_or_default(),
            password: config.password.clone().unwrap_or_default(),
        })
    }

    pub fn from_config(http: HttpClient, config: &AppConfig) -> Result<Self> {
        Self::new(http, &config.feed)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait::async_trait]
impl FeedSource for NewsBlurSource {
    fn name(&self) -> &str {
        "newsblur"
    }

    async fn authenticate(&self) -> Result<Session> {
        let url = self.endpoint(LOGIN_PATH)?;
        let form = [("username", self.username.as_str()), ("password", self.password.as_str())];

        tracing::debug!(user = %self.username, "Logging in to feed service");

        // The login POST is only repeated when the connection was never established
        let response = self
            .http
            .send(self.http.post(url).form(&form), Idempotency::NonIdempotent)
            .await
            .map_err(|e| Error::AuthFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::AuthFailed(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::AuthFailed(format!("Failed to read login response: {}", e.without_url())))?;

        // Some deployments answer 200 with `authenticated: false` for bad credentials
        if let Ok(login) = serde_json::from_str::<LoginResponse>(&body) {
            if login.authenticated == Some(false) {
                let detail = login
                    .errors
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "credentials rejected".to_string());
                return Err(Error::AuthFailed(detail));
            }
        }

        tracing::debug!("Logged in to feed service");
        Ok(Session::new(&self.username))
    }

    async fn fetch_unread(&self, session: &Session) -> Result<Vec<Article>> {
        let url = self.endpoint(RIVER_PATH)?;

        tracing::debug!(user = %session.username, "Fetching river of unread stories");

        let response = self
            .http
            .send(self.http.get(url), Idempotency::Idempotent)
            .await
            .map_err(|e| Error::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchFailed(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::FetchFailed(format!("Failed to read stories response: {}", e.without_url())))?;

        let articles = parse_river_stories(&body);
        tracing::debug!(count = articles.len(), "Fetched stories");
        Ok(articles)
    }
}
