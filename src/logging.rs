use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const FILTER_ENV: &str = "CADM_LOG";
const LOG_FILE: &str = "cadm.log";

/// Directory holding the log file: $XDG_DATA_HOME/cadm
pub fn log_dir() -> Option<PathBuf> {
  dirs::data_dir().map(|d| d.join("cadm"))
}

/// Install the global subscriber writing to the log file.
///
/// The filter comes from `CADM_LOG`, then `default_filter`. Keep the returned
/// guard alive for the life of the process or buffered lines are lost.
pub fn init(default_filter: &str) -> Result<WorkerGuard> {
  let dir = log_dir().ok_or_else(|| eyre!("Could not determine data directory"))?;
  std::fs::create_dir_all(&dir)?;

  let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}
