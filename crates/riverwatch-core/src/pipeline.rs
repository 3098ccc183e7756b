use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::ai::{build_provider, ChatProvider, RelevanceClassifier, Summarizer, Verdict, FALLBACK_SUMMARY};
use crate::config::AppConfig;
use crate::digest::{format_digest, Digest, DigestEntry};
use crate::feed::{FeedSource, NewsBlurSource};
use crate::http::HttpClient;
use crate::notify::{Delivery, Notifier, TelegramNotifier};
use crate::{Error, Result};

/// Stage at which a run can be aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Authenticate,
    Fetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Authenticate => write!(f, "authenticate"),
            Stage::Fetch => write!(f, "fetch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    Completed,
    /// Login or fetch failed; nothing downstream ran
    Aborted { stage: Stage, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeliveryStatus {
    Sent,
    NothingToSend,
    Failed(String),
    /// Delivery was not requested (preview runs)
    Skipped,
}

/// What one run did, for logs and scheduler events
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub fetched: usize,
    pub important: usize,
    pub classification_errors: usize,
    pub summary_fallbacks: usize,
    pub delivery: DeliveryStatus,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Completed && !matches!(self.delivery, DeliveryStatus::Failed(_))
    }
}

struct Triage {
    fetched: usize,
    digest: Digest,
    classification_errors: usize,
    summary_fallbacks: usize,
}

/// Drives fetch -> classify -> summarize -> format -> deliver
///
/// Articles are processed one at a time, in feed order, to keep model usage
/// and output ordering predictable. Nothing survives from one run to the next.
pub struct TriagePipeline {
    source: Arc<dyn FeedSource>,
    classifier: RelevanceClassifier,
    summarizer: Summarizer,
    notifier: Arc<dyn Notifier>,
}

impl TriagePipeline {
    pub fn new(
        source: Arc<dyn FeedSource>,
        provider: Arc<dyn ChatProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            classifier: RelevanceClassifier::new(provider.clone()),
            summarizer: Summarizer::new(provider),
            notifier,
        }
    }

    /// Wire the production services. One HTTP client (and connection pool)
    /// is shared by every component.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpClient::new(&config.http)?;

        let source = Arc::new(NewsBlurSource::from_config(http.clone(), config)?);
        let provider = build_provider(&config.ai, &http)?;
        let notifier = Arc::new(TelegramNotifier::from_config(http, config)?);

        info!(
            feed = source.name(),
            model = provider.model(),
            "Triage pipeline ready"
        );

        Ok(Self::new(source, provider, notifier))
    }

    /// Fetch, classify and summarize. A failed login or fetch is logged and
    /// yields an empty digest.
    pub async fn run(&self) -> Digest {
        match self.triage().await {
            Ok(triage) => triage.digest,
            Err((stage, e)) => {
                error!(%stage, error = %e, "Run aborted");
                Digest::new()
            }
        }
    }

    /// Full run including delivery of the formatted digest
    pub async fn run_and_deliver(&self) -> RunReport {
        self.execute(true).await.0
    }

    /// Full run without delivery; returns the message that would be posted
    pub async fn preview(&self) -> (RunReport, Option<String>) {
        self.execute(false).await
    }

    async fn execute(&self, deliver: bool) -> (RunReport, Option<String>) {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);

        async move {
            let started_at = Utc::now();
            debug!("Job started.");

            let (report, message) = match self.triage().await {
                Ok(triage) => {
                    let message = format_digest(&triage.digest);
                    let delivery = if deliver {
                        self.deliver(message.as_deref()).await
                    } else {
                        DeliveryStatus::Skipped
                    };

                    let report = RunReport {
                        run_id,
                        started_at,
                        finished_at: Utc::now(),
                        outcome: RunOutcome::Completed,
                        fetched: triage.fetched,
                        important: triage.digest.len(),
                        classification_errors: triage.classification_errors,
                        summary_fallbacks: triage.summary_fallbacks,
                        delivery,
                    };
                    (report, message)
                }
                Err((stage, e)) => {
                    error!(%stage, error = %e, "Run aborted");
                    let report = RunReport {
                        run_id,
                        started_at,
                        finished_at: Utc::now(),
                        outcome: RunOutcome::Aborted {
                            stage,
                            reason: e.to_string(),
                        },
                        fetched: 0,
                        important: 0,
                        classification_errors: 0,
                        summary_fallbacks: 0,
                        delivery: if deliver {
                            DeliveryStatus::NothingToSend
                        } else {
                            DeliveryStatus::Skipped
                        },
                    };
                    (report, None)
                }
            };

            debug!("Job completed.");
            (report, message)
        }
        .instrument(span)
        .await
    }

    async fn deliver(&self, message: Option<&str>) -> DeliveryStatus {
        match self.notifier.deliver(message).await {
            Ok(Delivery::Sent) => DeliveryStatus::Sent,
            Ok(Delivery::NothingToSend) => DeliveryStatus::NothingToSend,
            Err(e) => DeliveryStatus::Failed(e.to_string()),
        }
    }

    async fn triage(&self) -> std::result::Result<Triage, (Stage, Error)> {
        let session = self
            .source
            .authenticate()
            .await
            .map_err(|e| (Stage::Authenticate, e))?;
        debug!(user = %session.username, "Logged into feed service successfully.");

        let articles = self
            .source
            .fetch_unread(&session)
            .await
            .map_err(|e| (Stage::Fetch, e))?;

        let mut triage = Triage {
            fetched: articles.len(),
            digest: Digest::new(),
            classification_errors: 0,
            summary_fallbacks: 0,
        };

        if articles.is_empty() {
            info!("No new articles found.");
            return Ok(triage);
        }

        debug!(count = articles.len(), "Filtering important articles...");

        for article in &articles {
            let verdict = match self.classifier.classify(&article.body).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    triage.classification_errors += 1;
                    warn!(title = %article.title, error = %e, "Treating article as not important");
                    Verdict::NotImportant
                }
            };

            if !verdict.is_important() {
                continue;
            }

            let summary = match self.summarizer.summarize(&article.body).await {
                Ok(summary) => summary,
                Err(e) => {
                    triage.summary_fallbacks += 1;
                    warn!(title = %article.title, error = %e, "Using fallback summary");
                    FALLBACK_SUMMARY.to_string()
                }
            };

            triage.digest.push(DigestEntry {
                title: article.title.clone(),
                summary,
                url: article.url.clone(),
            });
        }

        if triage.digest.is_empty() {
            info!("No important articles found.");
        } else {
            info!(
                fetched = triage.fetched,
                important = triage.digest.len(),
                "Found {} important articles.",
                triage.digest.len()
            );
        }

        Ok(triage)
    }
}
