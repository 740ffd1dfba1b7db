//! Structured logging initialization
//!
//! Every subsystem logs through the `tracing` macros. This module installs
//! the subscriber: an `EnvFilter` (`RUST_LOG` wins over the configured level)
//! and a JSON or pretty fmt layer writing to stderr, so command output on
//! stdout stays machine-readable.
//!
//! ## Environment Variables
//!
//! - `FSROUTER_LOG_LEVEL`: trace/debug/info/warn/error (default `info`)
//! - `FSROUTER_LOG_FORMAT`: `json` or `pretty` (default `pretty`)
//! - `FSROUTER_LOG_TARGET_FILTER`: extra comma-separated directives, e.g.
//!   `fsrouter::navigation=debug,fsrouter::manifest=warn`
//! - `FSROUTER_LOG_INCLUDE_LOCATION`: include file:line (default `false`)

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for machines, pretty-print for people
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("FSROUTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("FSROUTER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            ),
            target_filter: env::var("FSROUTER_LOG_TARGET_FILTER").ok(),
            include_location: env::var("FSROUTER_LOG_INCLUDE_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Verbose configuration for local debugging
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    /// Level parsed from `log_level`, `INFO` when unrecognised
    #[must_use]
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// `RUST_LOG` if set, otherwise the configured level, plus the target filter
#[must_use]
pub fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let base = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    apply_target_filter(base, config.target_filter.as_deref())
}

fn apply_target_filter(mut env_filter: EnvFilter, target_filter: Option<&str>) -> EnvFilter {
    let Some(target_filter) = target_filter else {
        return env_filter;
    };
    for filter in target_filter.split(',') {
        let filter = filter.trim();
        if filter.is_empty() {
            continue;
        }
        match filter.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            // The subscriber is not installed yet, so this cannot go through tracing.
            Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
        }
    }
    env_filter
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    build_subscriber(config)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// Filter plus fmt layer for `config`, not yet installed
pub fn build_subscriber(config: &LogConfig) -> impl tracing::Subscriber + Send + Sync + 'static {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(fmt_layer)
}

/// [`init_logging_with_config`] with [`LogConfig::from_env`]
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LogConfig::from_env())
}
