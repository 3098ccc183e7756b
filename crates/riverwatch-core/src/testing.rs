//! In-memory stand-ins for the pipeline's external services.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::ai::prompts::CLASSIFY_SYSTEM_PROMPT;
use crate::ai::ChatProvider;
use crate::feed::{Article, FeedSource, Session};
use crate::notify::{Delivery, Notifier};
use crate::{Error, Result};

type Scripted = std::result::Result<String, String>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
}

/// Answers chat requests from a table keyed by article body
///
/// Unscripted classifications answer "not important"; unscripted summaries fail.
#[derive(Default)]
pub struct ScriptedProvider {
    classify: HashMap<String, Scripted>,
    summarize: HashMap<String, Scripted>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(mut self, body: &str, reply: std::result::Result<&str, &str>) -> Self {
        self.classify.insert(body.to_string(), reply.map(str::to_string).map_err(str::to_string));
        self
    }

    pub fn summarize(mut self, body: &str, reply: std::result::Result<&str, &str>) -> Self {
        self.summarize.insert(body.to_string(), reply.map(str::to_string).map_err(str::to_string));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn classify_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.system == CLASSIFY_SYSTEM_PROMPT).count()
    }

    pub fn summarize_calls(&self) -> usize {
        self.calls().len() - self.classify_calls()
    }
}

#[async_trait::async_trait]
impl ChatProvider for ScriptedProvider {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            user: user.to_string(),
        });

        let body = user.strip_prefix("Article content: ").unwrap_or(user);
        let reply = if system == CLASSIFY_SYSTEM_PROMPT {
            self.classify
                .get(body)
                .cloned()
                .unwrap_or_else(|| Ok("not important".to_string()))
        } else {
            self.summarize
                .get(body)
                .cloned()
                .unwrap_or_else(|| Err("no scripted summary".to_string()))
        };

        reply.map_err(Error::AiProvider)
    }
}

enum SourceBehavior {
    Articles(Vec<Article>),
    AuthFails,
    FetchFails,
}

pub struct FakeSource {
    behavior: SourceBehavior,
    logins: AtomicUsize,
    fetches: AtomicUsize,
}

impl FakeSource {
    fn with_behavior(behavior: SourceBehavior) -> Self {
        Self {
            behavior,
            logins: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self::with_behavior(SourceBehavior::Articles(articles))
    }

    pub fn auth_fails() -> Self {
        Self::with_behavior(SourceBehavior::AuthFails)
    }

    pub fn fetch_fails() -> Self {
        Self::with_behavior(SourceBehavior::FetchFails)
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FeedSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn authenticate(&self) -> Result<Session> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            SourceBehavior::AuthFails => Err(Error::AuthFailed("HTTP 401 Unauthorized".to_string())),
            _ => Ok(Session::new("tester")),
        }
    }

    async fn fetch_unread(&self, _session: &Session) -> Result<Vec<Article>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            SourceBehavior::Articles(articles) => Ok(articles.clone()),
            SourceBehavior::FetchFails => Err(Error::FetchFailed("HTTP 502 Bad Gateway".to_string())),
            SourceBehavior::AuthFails => unreachable!("fetch after failed login"),
        }
    }
}

/// Records every message it is asked to post
#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    posts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every post fails as if the chat endpoint answered HTTP 500
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Messages that reached the (simulated) network
    pub fn posts(&self) -> Vec<String> {
        self.posts.lock().unwrap().clone()
    }

    /// All `deliver` calls, including no-ops
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, message: Option<&str>) -> Result<Delivery> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(text) = message else {
            return Ok(Delivery::NothingToSend);
        };

        self.posts.lock().unwrap().push(text.to_string());
        if self.fail {
            Err(Error::DeliveryFailed("HTTP 500 Internal Server Error".to_string()))
        } else {
            Ok(Delivery::Sent)
        }
    }
}

/// Counts error-level events emitted on the current thread while installed
#[derive(Clone, Default)]
pub struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    pub fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}
