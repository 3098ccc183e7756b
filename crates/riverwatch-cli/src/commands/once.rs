use anyhow::{bail, Result};

use riverwatch_core::pipeline::RunOutcome;
use riverwatch_core::{AppConfig, TriagePipeline};

pub async fn run(config: &AppConfig) -> Result<()> {
    let pipeline = TriagePipeline::from_config(config)?;
    let report = pipeline.run_and_deliver().await;

    println!(
        "Fetched {} stories, {} important. Delivery: {:?}",
        report.fetched, report.important, report.delivery
    );

    if let RunOutcome::Aborted { stage, reason } = &report.outcome {
        bail!("run aborted at {}: {}", stage, reason);
    }
    if !report.is_success() {
        bail!("digest was not delivered");
    }
    Ok(())
}
