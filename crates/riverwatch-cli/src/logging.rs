use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use riverwatch_core::AppConfig;

/// Console output plus an append-only log file under `general.log_dir`
///
/// `RUST_LOG` overrides `general.log_level`. If the log directory cannot be
/// created, logging continues on the console only.
pub fn init(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_dir = config.log_dir();
    let (file_layer, guard, dir_error) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(&log_dir, &config.general.log_file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()?;

    if let Some(e) = dir_error {
        tracing::warn!(dir = %log_dir.display(), error = %e, "Cannot create log directory, logging to console only");
    }

    Ok(guard)
}
