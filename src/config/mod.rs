//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;


const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PUBLIC_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_CONTENT_DATASET: &str = "production";
const DEFAULT_CONTENT_API_VERSION: &str = "2024-01-01";
const DEFAULT_CONTENT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_REVALIDATE_SECS: u64 = 60;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina site server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Vetrina HTTP service.
    Serve(Box<ServeArgs>),
    /// Validate configuration and probe the content store, then exit.
    Check(CheckArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub content: ContentOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Override the content-store project identifier.
    #[arg(long = "content-project-id", value_name = "ID")]
    pub project_id: Option<String>,

    /// Override the content-store dataset name.
    #[arg(long = "content-dataset", value_name = "NAME")]
    pub dataset: Option<String>,

    /// Override the content-store API version.
    #[arg(long = "content-api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Override the content-store access token.
    #[arg(long = "content-token", value_name = "TOKEN")]
    pub token: Option<String>,

    /// Override the content-store base URL (bypasses project/dataset assembly).
    #[arg(long = "content-base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the content fetch timeout.
    #[arg(long = "content-timeout-seconds", value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Enable or disable the response cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the response-cache revalidation interval.
    #[arg(long = "cache-revalidate-seconds", value_name = "SECONDS")]
    pub cache_revalidate_seconds: Option<u64>,

    /// Override the response-cache entry ceiling.
    #[arg(long = "cache-max-entries", value_name = "COUNT")]
    pub cache_max_entries: Option<usize>,

    /// Override the shared secret expected by the revalidation endpoint.
    #[arg(long = "revalidate-secret", value_name = "SECRET")]
    pub revalidate_secret: Option<String>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub cache: CacheSettings,
    pub revalidate: RevalidateSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub project_id: Option<String>,
    pub dataset: String,
    pub api_version: String,
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub revalidate: Duration,
    pub max_entries: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct RevalidateSettings {
    pub secret: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Parse CLI arguments and load the matching settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Check(args)) => raw.apply_content_overrides(&args.content),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    cache: RawCacheSettings,
    revalidate: RawRevalidateSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    public_port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    project_id: Option<String>,
    dataset: Option<String>,
    api_version: Option<String>,
    token: Option<String>,
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    revalidate_seconds: Option<u64>,
    max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRevalidateSettings {
    secret: Option<String>,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.public_port {
            self.server.public_port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(seconds) = overrides.cache_revalidate_seconds {
            self.cache.revalidate_seconds = Some(seconds);
        }
        if let Some(limit) = overrides.cache_max_entries {
            self.cache.max_entries = Some(limit);
        }
        if let Some(secret) = overrides.revalidate_secret.as_ref() {
            self.revalidate.secret = Some(secret.clone());
        }

        self.apply_content_overrides(&overrides.content);
    }

    fn apply_content_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(project_id) = overrides.project_id.as_ref() {
            self.content.project_id = Some(project_id.clone());
        }
        if let Some(dataset) = overrides.dataset.as_ref() {
            self.content.dataset = Some(dataset.clone());
        }
        if let Some(version) = overrides.api_version.as_ref() {
            self.content.api_version = Some(version.clone());
        }
        if let Some(token) = overrides.token.as_ref() {
            self.content.token = Some(token.clone());
        }
        if let Some(base_url) = overrides.base_url.as_ref() {
            self.content.base_url = Some(base_url.clone());
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.content.timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            cache,
            revalidate,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            cache: build_cache_settings(cache)?,
            revalidate: build_revalidate_settings(revalidate),
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let public_port = server.public_port.unwrap_or(DEFAULT_PUBLIC_PORT);
    if public_port == 0 {
        return Err(LoadError::invalid(
            "server.public_port",
            "port must be greater than zero",
        ));
    }

    let public_addr = parse_socket_addr(&host, public_port)
        .map_err(|reason| LoadError::invalid("server.public_addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        public_addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let project_id = non_blank(content.project_id);
    let base_url = non_blank(content.base_url);
    let token = non_blank(content.token);

    let dataset = non_blank(content.dataset).unwrap_or_else(|| DEFAULT_CONTENT_DATASET.to_string());
    let api_version =
        non_blank(content.api_version).unwrap_or_else(|| DEFAULT_CONTENT_API_VERSION.to_string());

    let timeout_secs = content
        .timeout_seconds
        .unwrap_or(DEFAULT_CONTENT_TIMEOUT_SECS);
    let timeout_secs = NonZeroU64::new(timeout_secs)
        .ok_or_else(|| LoadError::invalid("content.timeout_seconds", "must be greater than zero"))?;

    Ok(ContentSettings {
        project_id,
        dataset,
        api_version,
        token,
        base_url,
        timeout: Duration::from_secs(timeout_secs.get()),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let enabled = cache.enabled.unwrap_or(true);

    let revalidate_secs = cache
        .revalidate_seconds
        .unwrap_or(DEFAULT_CACHE_REVALIDATE_SECS);
    if revalidate_secs == 0 {
        return Err(LoadError::invalid(
            "cache.revalidate_seconds",
            "must be greater than zero",
        ));
    }

    let max_entries = cache.max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES);
    let max_entries = NonZeroUsize::new(max_entries)
        .ok_or_else(|| LoadError::invalid("cache.max_entries", "must be greater than zero"))?;

    Ok(CacheSettings {
        enabled,
        revalidate: Duration::from_secs(revalidate_secs),
        max_entries,
    })
}

fn build_revalidate_settings(revalidate: RawRevalidateSettings) -> RevalidateSettings {
    RevalidateSettings {
        secret: non_blank(revalidate.secret),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    format!("{host}:{port}")
        .parse()
        .map_err(|err| format!("failed to parse `{host}:{port}`: {err}"))
}
