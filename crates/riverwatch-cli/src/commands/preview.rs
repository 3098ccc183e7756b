use anyhow::{bail, Result};

use riverwatch_core::pipeline::RunOutcome;
use riverwatch_core::{AppConfig, TriagePipeline};

pub async fn run(config: &AppConfig) -> Result<()> {
    let pipeline = TriagePipeline::from_config(config)?;
    let (report, message) = pipeline.preview().await;

    if let RunOutcome::Aborted { stage, reason } = &report.outcome {
        bail!("run aborted at {}: {}", stage, reason);
    }

    match message {
        Some(message) => println!("{}", message),
        None => println!("No important articles ({} fetched).", report.fetched),
    }
    Ok(())
}
