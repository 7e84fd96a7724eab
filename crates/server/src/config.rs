#![forbid(unsafe_code)]

//! Server settings, resolved from defaults, an optional YAML file, the
//! environment and finally the command line. Later layers win.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_STORAGE_DIR: &str = "./temdb_data";
pub const DEFAULT_LOG_FILTER: &str = "info,temdb_server=info,temdb_storage=info";
pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

const ENV_CONFIG: &str = "TEMDB_CONFIG";
const ENV_BIND: &str = "TEMDB_BIND";
const ENV_STORAGE_DIR: &str = "TEMDB_STORAGE_DIR";
const ENV_LOG: &str = "TEMDB_LOG";
const ENV_LOG_FORMAT: &str = "TEMDB_LOG_FORMAT";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "fmt" | "pretty" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub storage_dir: PathBuf,
    pub log_filter: String,
    pub log_format: LogFormat,
    pub default_page_limit: usize,
    pub max_page_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::Text,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: MAX_PAGE_LIMIT,
        }
    }
}

/// What the process was asked to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Serve(ServerConfig),
    Help,
    Version,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    bind: Option<String>,
    storage_dir: Option<PathBuf>,
    log_filter: Option<String>,
    log_format: Option<String>,
    default_page_limit: Option<usize>,
    max_page_limit: Option<usize>,
}

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    bind: Option<String>,
    storage_dir: Option<PathBuf>,
    log_format: Option<String>,
}

impl ServerConfig {
    /// Resolves the process configuration from `std::env`.
    pub fn from_process() -> Result<Command, ConfigError> {
        resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }
}

/// `args` excludes the program name; `env` looks up one variable.
pub fn resolve<I, F>(args: I, env: F) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--config" => cli.config = Some(PathBuf::from(flag_value(&arg, args.next())?)),
            "--bind" => cli.bind = Some(flag_value(&arg, args.next())?),
            "--storage-dir" => cli.storage_dir = Some(PathBuf::from(flag_value(&arg, args.next())?)),
            "--log-format" => cli.log_format = Some(flag_value(&arg, args.next())?),
            _ => return Err(ConfigError::UnknownArgument(arg)),
        }
    }

    let mut config = ServerConfig::default();

    let config_path = cli
        .config
        .clone()
        .or_else(|| non_empty(env(ENV_CONFIG)).map(PathBuf::from));
    if let Some(path) = config_path {
        apply_file(&mut config, load_file(&path)?)?;
    }

    if let Some(bind) = non_empty(env(ENV_BIND)) {
        config.bind = parse_bind(&bind)?;
    }
    if let Some(dir) = non_empty(env(ENV_STORAGE_DIR)) {
        config.storage_dir = PathBuf::from(dir);
    }
    if let Some(filter) = non_empty(env(ENV_LOG)) {
        config.log_filter = filter;
    }
    if let Some(format) = non_empty(env(ENV_LOG_FORMAT)) {
        config.log_format = parse_log_format(&format)?;
    }

    if let Some(bind) = cli.bind {
        config.bind = parse_bind(&bind)?;
    }
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }
    if let Some(format) = cli.log_format {
        config.log_format = parse_log_format(&format)?;
    }

    validate_page_limits(&config)?;
    Ok(Command::Serve(config))
}

pub fn usage() -> &'static str {
    "temdb_server: lab data tracking service for electron-microscopy pipelines\n\n\
USAGE:\n\
  temdb_server [--config FILE] [--bind ADDR] [--storage-dir DIR] [--log-format text|json]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version and exit\n\
\n\
ENVIRONMENT:\n\
  TEMDB_CONFIG       YAML config file (same keys as the flags, plus log_filter,\n\
                     default_page_limit, max_page_limit)\n\
  TEMDB_BIND         Listen address (default 127.0.0.1:8080)\n\
  TEMDB_STORAGE_DIR  Store directory (default ./temdb_data)\n\
  TEMDB_LOG          tracing filter directives\n\
  TEMDB_LOG_FORMAT   text|json\n"
}

pub fn version_line() -> String {
    format!("temdb_server {}", env!("CARGO_PKG_VERSION"))
}

fn flag_value(flag: &str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .filter(|value| !value.starts_with("--"))
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_file(config: &mut ServerConfig, file: FileConfig) -> Result<(), ConfigError> {
    if let Some(bind) = file.bind {
        config.bind = parse_bind(&bind)?;
    }
    if let Some(dir) = file.storage_dir {
        config.storage_dir = dir;
    }
    if let Some(filter) = non_empty(file.log_filter) {
        config.log_filter = filter;
    }
    if let Some(format) = file.log_format {
        config.log_format = parse_log_format(&format)?;
    }
    if let Some(limit) = file.default_page_limit {
        config.default_page_limit = limit;
    }
    if let Some(limit) = file.max_page_limit {
        config.max_page_limit = limit;
    }
    Ok(())
}

fn parse_bind(value: &str) -> Result<SocketAddr, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: "bind",
        message: format!("'{value}' is not a socket address"),
    })
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    LogFormat::parse(value).ok_or_else(|| ConfigError::Invalid {
        key: "log_format",
        message: format!("'{value}' is not one of text|json"),
    })
}

fn validate_page_limits(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.max_page_limit == 0 {
        return Err(ConfigError::Invalid {
            key: "max_page_limit",
            message: "must be at least 1".to_string(),
        });
    }
    if config.default_page_limit == 0 || config.default_page_limit > config.max_page_limit {
        return Err(ConfigError::Invalid {
            key: "default_page_limit",
            message: format!("must be between 1 and {}", config.max_page_limit),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn serve(command: Command) -> ServerConfig {
        match command {
            Command::Serve(config) => config,
            other => panic!("expected serve, got {other:?}"),
        }
    }

    fn write_yaml(name: &str, body: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "temdb_server_config_{name}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("temdb.yaml");
        std::fs::write(&path, body).expect("write yaml");
        path
    }

    #[test]
    fn defaults_apply_without_input() {
        let config = serve(resolve(Vec::new(), |_| None).expect("resolve"));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
    }

    #[test]
    fn later_layers_win() {
        let path = write_yaml(
            "later_layers_win",
            "bind: 127.0.0.1:9000\nstorage_dir: /from/file\nlog_format: json\ndefault_page_limit: 25\n",
        );
        let env = HashMap::from([
            (ENV_CONFIG, path.display().to_string()),
            (ENV_STORAGE_DIR, "/from/env".to_string()),
            (ENV_LOG, "debug".to_string()),
        ]);
        let config = serve(
            resolve(args(&["--bind", "0.0.0.0:7000"]), |key| env.get(key).cloned())
                .expect("resolve"),
        );
        assert_eq!(config.bind.to_string(), "0.0.0.0:7000");
        assert_eq!(config.storage_dir, PathBuf::from("/from/env"));
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.default_page_limit, 25);
        assert_eq!(config.max_page_limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn unknown_yaml_keys_are_rejected() {
        let path = write_yaml("unknown_yaml_keys_are_rejected", "listen: 1.2.3.4:5\n");
        let err = resolve(args(&["--config", &path.display().to_string()]), |_| None)
            .expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_values_name_their_key() {
        let err = resolve(args(&["--bind", "nowhere"]), |_| None).expect_err("bad bind");
        assert!(err.to_string().starts_with("invalid bind:"));

        let err = resolve(Vec::new(), |key| {
            (key == ENV_LOG_FORMAT).then(|| "xml".to_string())
        })
        .expect_err("bad format");
        assert!(err.to_string().starts_with("invalid log_format:"));

        let path = write_yaml("invalid_values_name_their_key", "default_page_limit: 500\n");
        let err = resolve(args(&["--config", &path.display().to_string()]), |_| None)
            .expect_err("limit above max");
        assert!(err.to_string().starts_with("invalid default_page_limit:"));
    }

    #[test]
    fn help_version_and_bad_flags() {
        assert_eq!(resolve(args(&["-h"]), |_| None).expect("help"), Command::Help);
        assert_eq!(
            resolve(args(&["--storage-dir", "x", "--version"]), |_| None).expect("version"),
            Command::Version
        );
        assert!(matches!(
            resolve(args(&["--storage-dir"]), |_| None),
            Err(ConfigError::MissingValue(_))
        ));
        assert!(matches!(
            resolve(args(&["--frobnicate"]), |_| None),
            Err(ConfigError::UnknownArgument(_))
        ));
    }
}
