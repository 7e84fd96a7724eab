#![forbid(unsafe_code)]

pub mod config;
mod error;
mod handlers;
mod router;
mod state;
pub mod telemetry;

pub use config::{Command, ConfigError, LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use router::router;
pub use state::AppState;
