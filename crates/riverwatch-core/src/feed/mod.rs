mod models;
mod newsblur;

pub use models::{Article, Session};
pub use newsblur::{parse_river_stories, NewsBlurSource};

use crate::Result;

/// A service that hands out the current batch of unread stories
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Log in to the service. Fails with `Error::AuthFailed`.
    async fn authenticate(&self) -> Result<Session>;

    /// Fetch unread stories in the order the service returns them.
    /// Fails with `Error::FetchFailed`; a malformed body is an empty batch.
    async fn fetch_unread(&self, session: &Session) -> Result<Vec<Article>>;
}
