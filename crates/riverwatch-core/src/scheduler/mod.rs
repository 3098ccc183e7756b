mod service;

pub use service::{SchedulerEvent, SchedulerService, SchedulerState};

use crate::pipeline::{RunReport, TriagePipeline};

/// Work executed once per scheduler tick
#[async_trait::async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Run to completion. Failures are part of the report, never a panic or error.
    async fn run_once(&self) -> RunReport;
}

#[async_trait::async_trait]
impl ScheduledJob for TriagePipeline {
    async fn run_once(&self) -> RunReport {
        self.run_and_deliver().await
    }
}
