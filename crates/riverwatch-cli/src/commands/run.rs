use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};

use riverwatch_core::scheduler::SchedulerService;
use riverwatch_core::{AppConfig, TriagePipeline};

/// Flip `shutdown` once `signal` fires
///
/// If the signal handler cannot be installed the scheduler keeps running;
/// the process can still be stopped from outside.
async fn forward_shutdown<F>(signal: F, shutdown: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "Cannot listen for Ctrl+C, running until the process is terminated");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
    let _ = shutdown.send(true);
}

/// Run immediately, then every `schedule.interval_secs`, until Ctrl+C
pub async fn run(config: &AppConfig) -> Result<()> {
    let pipeline = Arc::new(TriagePipeline::from_config(config)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx));

    let scheduler = SchedulerService::from_config(pipeline, config);
    println!(
        "riverwatch started. Running every {} seconds; press Ctrl+C to stop.",
        scheduler.period().as_secs()
    );

    // Blocks until shutdown
    scheduler.run(shutdown_rx).await;

    println!("riverwatch stopped.");
    Ok(())
}
