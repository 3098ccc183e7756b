mod client;
pub mod retry;

use url::Url;

pub use client::HttpClient;
pub use retry::{Idempotency, RetryPolicy};

/// Render a URL for logs with credentials removed
///
/// Drops userinfo and the query string, and masks `bot<token>` path
/// segments used by chat bot APIs.
pub fn redact_url(url: &Url) -> String {
    let path: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .map(|segment| {
                    if segment.starts_with("bot") && segment.len() > 3 {
                        "bot<redacted>".to_string()
                    } else {
                        segment.to_string()
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let mut rendered = format!("{}://{}", url.scheme(), url.host_str().unwrap_or(""));
    if let Some(port) = url.port() {
        rendered.push_str(&format!(":{}", port));
    }
    rendered.push('/');
    rendered.push_str(&path.join("/"));
    rendered
}
