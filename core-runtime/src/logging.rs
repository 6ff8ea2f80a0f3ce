//! # Logging
//!
//! `tracing` subscriber setup for hosts, plus helpers that keep credentials
//! and personal data out of log lines.
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .with_format(LogFormat::Compact)
//!         .with_level(LogLevel::Debug),
//! )?;
//! tracing::info!("Player ready");
//! ```
//!
//! `RUST_LOG`, when set, wins over the configured level unless
//! [`LoggingConfig::with_env_override`] turns that off.

use crate::error::{Error, Result};

use std::fmt;
use std::io;
use std::str::FromStr;

use tracing_subscriber::{
    filter::EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, Layer,
    Registry,
};

/// Crates whose level follows [`LoggingConfig::level`].
const WORKSPACE_TARGETS: &[&str] = &[
    "tunestream_workspace",
    "core_runtime",
    "core_auth",
    "core_library",
    "core_playback",
    "core_service",
    "bridge_desktop",
];

/// Transport crates are only interesting when they fail.
const QUIET_TARGETS: &[&str] = &["h2=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(Error::Config(format!("Unknown log level: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, coloured; for local development
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event; for log shipping
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Full directive string, e.g. `core_playback=trace,core_auth=debug`.
    /// Replaces the per-crate defaults.
    pub filter: Option<String>,
    pub respect_env: bool,
    /// Also log span open/close, useful to time `play_track` stages.
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            respect_env: true,
            span_events: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_env_override(mut self, respect: bool) -> Self {
        self.respect_env = respect;
        self
    }

    pub fn with_span_events(mut self, enable: bool) -> Self {
        self.span_events = enable;
        self
    }
}

/// Install the global subscriber.
///
/// Only the first call in a process succeeds; later calls return
/// [`Error::Config`].
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    tracing_subscriber::registry()
        .with(output_layer(&config))
        .with(filter)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

fn output_layer(config: &LoggingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let spans = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_span_events(spans);

    match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer
            .json()
            .flatten_event(true)
            .with_current_span(config.span_events)
            .boxed(),
    }
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| config.respect_env && !value.trim().is_empty());

    let directives = from_env.unwrap_or_else(|| filter_directives(config));
    EnvFilter::try_new(&directives)
        .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", directives, e)))
}

fn filter_directives(config: &LoggingConfig) -> String {
    if let Some(custom) = &config.filter {
        return custom.clone();
    }

    WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, config.level))
        .chain(QUIET_TARGETS.iter().map(|d| d.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Sign-in identifier safe to log. Email addresses keep their first
/// character only; plain usernames pass through.
pub fn redact_identifier(identifier: &str) -> String {
    match identifier.split_once('@') {
        Some((local, domain)) if domain.contains('.') => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@[REDACTED]", first)
        }
        _ => identifier.to_string(),
    }
}

/// Short fingerprint of a token for correlating log lines without exposing it.
pub fn mask_token(token: &str) -> String {
    let len = token.chars().count();
    if len <= 8 {
        return "****".to_string();
    }
    let visible: String = token.chars().take(4).collect();
    format!("{}…({} chars)", visible, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Trace < LogLevel::Error);
    }

    #[test]
    fn default_directives_raise_workspace_and_quiet_transport() {
        let config = LoggingConfig::default().with_level(LogLevel::Debug);
        let directives = filter_directives(&config);

        assert!(directives.contains("core_playback=debug"));
        assert!(directives.contains("bridge_desktop=debug"));
        assert!(directives.contains("reqwest=warn"));
        assert!(!directives.contains("reqwest=debug"));
    }

    #[test]
    fn custom_filter_replaces_defaults() {
        let config = LoggingConfig::default()
            .with_env_override(false)
            .with_filter("core_auth=trace");

        assert_eq!(filter_directives(&config), "core_auth=trace");
        assert!(build_filter(&config)
            .unwrap()
            .to_string()
            .contains("core_auth=trace"));
    }

    #[test]
    fn malformed_filter_is_config_error() {
        let config = LoggingConfig::default()
            .with_env_override(false)
            .with_filter("core_auth=[");
        assert!(matches!(build_filter(&config), Err(Error::Config(_))));
    }

    #[test]
    fn identifiers_hide_email_domains() {
        assert_eq!(redact_identifier("listener@example.com"), "l***@[REDACTED]");
        assert_eq!(redact_identifier("listener"), "listener");
        assert_eq!(redact_identifier("odd@localhost"), "odd@localhost");
    }

    #[test]
    fn tokens_keep_a_short_prefix() {
        assert_eq!(mask_token("short"), "****");
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9"), "eyJh…(20 chars)");
    }
}
