use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::ScheduledJob;
use crate::config::AppConfig;
use crate::pipeline::{DeliveryStatus, RunOutcome, RunReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    RunningJob,
}

/// Events emitted by the scheduler around each run
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    RunStarted { tick: u64 },
    RunFinished { tick: u64, report: RunReport },
}

/// Runs a job immediately, then once per period, until shutdown
///
/// Runs never overlap: a tick that comes due while a run is in progress is
/// delayed until the run finishes. Shutdown is observed between runs only.
pub struct SchedulerService {
    job: Arc<dyn ScheduledJob>,
    period: Duration,
    event_tx: Option<mpsc::UnboundedSender<SchedulerEvent>>,
    state_tx: watch::Sender<SchedulerState>,
}

impl SchedulerService {
    pub fn new(job: Arc<dyn ScheduledJob>, period: Duration) -> Self {
        let (state_tx, _) = watch::channel(SchedulerState::Idle);
        Self {
            job,
            period: period.max(Duration::from_millis(1)),
            event_tx: None,
            state_tx,
        }
    }

    pub fn from_config(job: Arc<dyn ScheduledJob>, config: &AppConfig) -> Self {
        Self::new(job, config.schedule.period())
    }

    /// Set the event sender for run notifications
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<SchedulerEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Observe Idle/RunningJob transitions
    pub fn subscribe_state(&self) -> watch::Receiver<SchedulerState> {
        self.state_tx.subscribe()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn send_event(&self, event: SchedulerEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                warn!("Failed to send scheduler event: receiver dropped");
            }
        }
    }

    /// Run the job loop until the shutdown flag flips to true
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(period_secs = self.period.as_secs(), "Scheduler started");

        // The first tick completes immediately, giving the initial run at startup
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick: u64 = 0;

        loop {
            tokio::select! {
                biased;

                result = shutdown.changed() => {
                    if result.is_err() {
                        info!("Shutdown sender dropped, stopping scheduler");
                        break;
                    }
                    if *shutdown.borrow() {
                        info!("Scheduler received shutdown signal");
                        break;
                    }
                }

                _ = interval.tick() => {
                    tick += 1;
                    self.execute(tick).await;
                    debug!("Waiting for the next run...");
                }
            }
        }

        info!("Scheduler stopped");
    }

    async fn execute(&self, tick: u64) {
        self.state_tx.send_replace(SchedulerState::RunningJob);
        self.send_event(SchedulerEvent::RunStarted { tick });

        let report = self.job.run_once().await;
        log_report(tick, &report);

        self.state_tx.send_replace(SchedulerState::Idle);
        self.send_event(SchedulerEvent::RunFinished { tick, report });
    }
}

/// One summary line per run. Stage failures are already logged at error
/// level where they happen, so the outcome here stays at info.
fn log_report(tick: u64, report: &RunReport) {
    let elapsed_ms = (report.finished_at - report.started_at).num_milliseconds();

    match &report.outcome {
        RunOutcome::Aborted { stage, .. } => {
            info!(tick, run_id = %report.run_id, %stage, elapsed_ms, "Run aborted, waiting for the next tick");
        }
        RunOutcome::Completed => {
            info!(
                tick,
                run_id = %report.run_id,
                fetched = report.fetched,
                important = report.important,
                classification_errors = report.classification_errors,
                summary_fallbacks = report.summary_fallbacks,
                delivered = matches!(report.delivery, DeliveryStatus::Sent),
                delivery = ?report.delivery,
                elapsed_ms,
                "Run finished"
            );
        }
    }
}
