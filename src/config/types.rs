//! Configuration types and CLI options.
//!
//! `Opt` is the clap-derived command line surface used by the binary. `Config`
//! is the library configuration and can be built without touching the CLI.
//! `PipelineConfig` carries the tunables of the prefetch pipeline and is handed
//! to the producer and the request handlers at construction.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
/// - `JsonPretty`: The same JSON record, indented over several lines
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
    /// Indented JSON, for reading structured logs by eye
    JsonPretty,
}

/// Errors returned by [`Config::validate`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `budget_count` is zero.
    #[error("budget count must be at least 1")]
    ZeroBudget,

    /// `window_duration` is zero.
    #[error("budget window must be longer than zero")]
    ZeroWindow,

    /// `queue_capacity` is zero.
    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,

    /// The throttling cooldown is not longer than the full-queue pause.
    #[error("cooldown ({cooldown:?}) must be longer than the backpressure interval ({backpressure:?})")]
    CooldownTooShort {
        /// Configured cooldown.
        cooldown: Duration,
        /// Configured backpressure interval.
        backpressure: Duration,
    },

    /// One of the server timeouts is zero.
    #[error("server {0} timeout must be longer than zero")]
    ZeroServerTimeout(&'static str),

    /// An upstream URL does not parse.
    #[error("invalid {name} URL '{value}': {reason}")]
    InvalidUrl {
        /// Which upstream (`names` or `jokes`).
        name: &'static str,
        /// The rejected value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Tunables of the prefetch pipeline.
///
/// Created once at startup and passed by value to the producer and the
/// request handlers. Nothing reads these from global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum names API calls per rolling window (`N`).
    pub budget_count: usize,
    /// Width of the rolling window (`MinDiff`).
    pub window_duration: Duration,
    /// Capacity of the name queue (`C`).
    pub queue_capacity: usize,
    /// How long a request waits for a name.
    pub pop_timeout: Duration,
    /// Extra pause after a throttling signal from the names API.
    pub cooldown_duration: Duration,
    /// Pause while the queue is full.
    pub backpressure_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            budget_count: DEFAULT_BUDGET_COUNT,
            window_duration: Duration::from_secs(DEFAULT_WINDOW_SECS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            pop_timeout: Duration::from_secs(DEFAULT_POP_TIMEOUT_SECS),
            cooldown_duration: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
            backpressure_interval: Duration::from_millis(DEFAULT_BACKPRESSURE_MILLIS),
        }
    }
}

impl PipelineConfig {
    /// Checks the invariants the producer and tracker rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.budget_count == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        if self.window_duration.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.cooldown_duration <= self.backpressure_interval {
            return Err(ConfigError::CooldownTooShort {
                cooldown: self.cooldown_duration,
                backpressure: self.backpressure_interval,
            });
        }
        Ok(())
    }
}

/// Timeouts applied to inbound connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerTimeouts {
    /// Time allowed for a complete request head, also the keep-alive idle limit.
    pub header_read: Duration,
    /// Time allowed for a handler to produce its response; 408 after that.
    pub request: Duration,
}

impl Default for ServerTimeouts {
    fn default() -> Self {
        Self {
            header_read: Duration::from_secs(DEFAULT_HEADER_READ_TIMEOUT_SECS),
            request: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ServerTimeouts {
    /// Rejects zero timeouts, which would close every connection at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.header_read.is_zero() {
            return Err(ConfigError::ZeroServerTimeout("header read"));
        }
        if self.request.is_zero() {
            return Err(ConfigError::ZeroServerTimeout("request"));
        }
        Ok(())
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use jokes_on_tap::Config;
///
/// let config = Config {
///     port: 9000,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server listens on
    pub port: u16,

    /// Names API URL (queried as-is)
    pub names_url: String,

    /// Jokes API base URL (name parameters are appended)
    pub jokes_url: String,

    /// Per-request timeout for upstream calls, in seconds
    pub http_timeout_seconds: u64,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Prefetch pipeline tunables
    pub pipeline: PipelineConfig,

    /// Inbound connection timeouts
    pub server: ServerTimeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            names_url: DEFAULT_NAMES_URL.to_string(),
            jokes_url: DEFAULT_JOKES_URL.to_string(),
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            pipeline: PipelineConfig::default(),
            server: ServerTimeouts::default(),
        }
    }
}

impl Config {
    /// Validates upstream URLs, pipeline tunables and server timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_url("names", &self.names_url)?;
        parse_url("jokes", &self.jokes_url)?;
        self.pipeline.validate()?;
        self.server.validate()
    }
}

/// Parses an upstream URL, naming the upstream in the error.
pub fn parse_url(name: &'static str, value: &str) -> Result<url::Url, ConfigError> {
    url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Defaults: port 8080, 7 names calls per 61s, 500 buffered names
/// jokes_on_tap
///
/// # Tighter budget and a smaller buffer
/// jokes_on_tap --budget-count 3 --window-seconds 30 --queue-capacity 50
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "jokes_on_tap",
    about = "Serves jokes personalized with prefetched names.",
    version
)]
pub struct Opt {
    /// Port to listen on
    #[arg(long, short, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Names API URL
    #[arg(long, default_value = DEFAULT_NAMES_URL)]
    pub names_url: String,

    /// Jokes API base URL
    #[arg(long, default_value = DEFAULT_JOKES_URL)]
    pub jokes_url: String,

    /// Per-request timeout for upstream calls, in seconds
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_seconds: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Maximum names API calls per rolling window
    #[arg(long, default_value_t = DEFAULT_BUDGET_COUNT)]
    pub budget_count: usize,

    /// Width of the rolling window, in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_SECS)]
    pub window_seconds: u64,

    /// Number of names buffered ahead of requests
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Seconds a request waits for a name before failing
    #[arg(long, default_value_t = DEFAULT_POP_TIMEOUT_SECS)]
    pub pop_timeout_seconds: u64,

    /// Seconds to pause after the names API signals throttling
    #[arg(long, default_value_t = DEFAULT_COOLDOWN_SECS)]
    pub cooldown_seconds: u64,

    /// Milliseconds to pause while the name queue is full
    #[arg(long, default_value_t = DEFAULT_BACKPRESSURE_MILLIS)]
    pub backpressure_millis: u64,

    /// Seconds a client has to send a request head (also the idle keep-alive limit)
    #[arg(long, default_value_t = DEFAULT_HEADER_READ_TIMEOUT_SECS)]
    pub header_read_timeout_seconds: u64,

    /// Seconds a request may take before the server answers 408
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_seconds: u64,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            port: opt.port,
            names_url: opt.names_url,
            jokes_url: opt.jokes_url,
            http_timeout_seconds: opt.http_timeout_seconds,
            log_level: opt.log_level,
            log_format: opt.log_format,
            pipeline: PipelineConfig {
                budget_count: opt.budget_count,
                window_duration: Duration::from_secs(opt.window_seconds),
                queue_capacity: opt.queue_capacity,
                pop_timeout: Duration::from_secs(opt.pop_timeout_seconds),
                cooldown_duration: Duration::from_secs(opt.cooldown_seconds),
                backpressure_interval: Duration::from_millis(opt.backpressure_millis),
            },
            server: ServerTimeouts {
                header_read: Duration::from_secs(opt.header_read_timeout_seconds),
                request: Duration::from_secs(opt.request_timeout_seconds),
            },
        }
    }
}
