use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::{TelemetryConfig, LogFormat};
use anyhow::Result;

/// Installs the global subscriber. Logs go to a daily-rolling file when one
/// is configured, otherwise to stderr; stdout belongs to the stdio transport.
pub fn init(config: &TelemetryConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

  let (non_blocking, guard) = if let Some(file_path) = &config.file {
    let path = Path::new(file_path);
    let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path
      .file_name()
      .ok_or_else(|| anyhow::anyhow!("log file path has no file name: {file_path}"))?;
    let file_appender = tracing_appender::rolling::daily(directory, file_name);
    tracing_appender::non_blocking(file_appender)
  } else {
    tracing_appender::non_blocking(std::io::stderr())
  };

  let subscriber = tracing_subscriber::registry()
    .with(env_filter);

  match config.format {
    LogFormat::Pretty => {
      subscriber.with(tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(config.file.is_none())
        .pretty())
        .try_init()?;
    }
    LogFormat::Json => {
      subscriber.with(tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json())
        .try_init()?;
    }
  }

  Ok(guard)
}
