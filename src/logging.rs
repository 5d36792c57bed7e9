use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::SystemConfig;

const DEFAULT_FILTER: &str = "indietalk_backend=debug,tower_http=debug";

/// Log to stdout and append plain text to the file served by `/logs`.
pub fn init_logging(system_config: &SystemConfig) -> Result<()> {
    fs::create_dir_all(&system_config.log_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(system_config.log_file_path())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stdout_layer = fmt::layer();
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
