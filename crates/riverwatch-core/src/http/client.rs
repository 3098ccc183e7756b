use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, IntoUrl, RequestBuilder, Response};

use super::retry::{Idempotency, RetryPolicy};
use crate::config::HttpConfig;
use crate::{Error, Result};

/// Pooled HTTP client with bounded retry on connection failures
///
/// Cloning is cheap and shares the connection pool and cookie store.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Self::build_client(config)?;

        Ok(Self {
            client,
            policy: RetryPolicy::from_config(config),
        })
    }

    fn build_client(config: &HttpConfig) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, */*;q=0.8"));
        match HeaderValue::from_str(&config.user_agent) {
            Ok(ua) => {
                headers.insert(USER_AGENT, ua);
            }
            Err(_) => tracing::warn!(user_agent = %config.user_agent, "Ignoring invalid User-Agent"),
        }

        Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(Error::Http)
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a request, retrying transport failures with exponential backoff
    ///
    /// Responses are returned whatever their status; callers decide what a
    /// 4xx or 5xx means for their stage.
    pub async fn send(&self, request: RequestBuilder, idempotency: Idempotency) -> Result<Response> {
        let request = request.build().map_err(|e| Error::Http(e.without_url()))?;
        let mut attempts = 0;

        loop {
            let attempt = request.try_clone().ok_or_else(|| {
                Error::Other(format!("Request to {} has a streaming body and cannot be sent", super::redact_url(request.url())))
            })?;

            let err = match self.client.execute(attempt).await {
                Ok(response) => return Ok(response),
                // The URL may carry credentials (bot tokens), keep it out of error text
                Err(e) => e.without_url(),
            };

            if self.policy.should_retry(&err, idempotency, attempts) {
                attempts += 1;
                let delay = self.policy.backoff_delay(attempts);
                tracing::debug!(
                    error = %err,
                    url = %super::redact_url(request.url()),
                    attempt = attempts,
                    max_retries = self.policy.max_retries,
                    delay_ms = delay.as_millis(),
                    "Transport error, retrying request"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if attempts > 0 {
                tracing::warn!(
                    error = %err,
                    url = %super::redact_url(request.url()),
                    attempts = attempts + 1,
                    "Request failed after retries"
                );
            }
            return Err(Error::Http(err));
        }
    }
}
