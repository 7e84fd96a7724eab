#![forbid(unsafe_code)]

use crate::config::{LogFormat, ServerConfig};
use tracing_subscriber::EnvFilter;

pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Installs the global subscriber. Logs go to stderr.
pub fn init(config: &ServerConfig) -> Result<(), InitError> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|err| format!("invalid log_filter '{}': {err}", config.log_filter))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    match config.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}
