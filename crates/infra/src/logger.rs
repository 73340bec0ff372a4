//! Logging infrastructure for wikiproxy
//!
//! Centralized `tracing-subscriber` setup shared by the server and the CLI.

use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use wikiproxy_core::{LoggingSettings, ProxyError, Result};

/// Dependencies whose debug output drowns the request log
const NOISY_TARGETS: [&str; 4] = ["hyper=warn", "reqwest=warn", "h2=warn", "redis=warn"];

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to use JSON format
    pub json_format: bool,
    /// Whether to include timestamps
    pub with_timestamps: bool,
    /// Whether to include file/line information
    pub with_file_info: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamps: true,
            with_file_info: false,
        }
    }
}

impl From<&LoggingSettings> for LoggerConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            json_format: settings.json,
            ..Default::default()
        }
    }
}

/// Build the env filter for `level`, keeping `RUST_LOG` directives
fn build_filter(level: &str) -> Result<EnvFilter> {
    let level = Level::from_str(level)
        .map_err(|e| ProxyError::validation(format!("Invalid log level '{}': {}", level, e)))?;

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for target in NOISY_TARGETS {
        let directive = target.parse().map_err(|e| {
            ProxyError::validation(format!("Invalid filter directive '{}': {}", target, e))
        })?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Initialize the global logger with the given configuration
pub fn init_logger(config: LoggerConfig) -> Result<()> {
    let env_filter = build_filter(&config.level)?;

    let fmt_layer = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info)
            .boxed()
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info);

        if config.with_timestamps {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ProxyError::validation(format!("Failed to initialize logger: {}", e)))?;

    tracing::debug!(level = %config.level, json = config.json_format, "Logger initialized");
    Ok(())
}

/// Initialize logger for testing (reduces noise)
pub fn init_test_logger() {
    let config = LoggerConfig {
        level: "warn".to_string(),
        with_timestamps: false,
        ..Default::default()
    };

    // Ignore errors if already initialized
    let _ = init_logger(config);
}
