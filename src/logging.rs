//! Logging setup for s3nav.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Map a configured level name to a tracing level, defaulting to INFO.
fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Build the filter: `RUST_LOG` wins when set, else the configured level.
///
/// The AWS SDK and hyper are noisy at debug, so they are capped at `warn`
/// unless `RUST_LOG` says otherwise.
fn build_filter(level: Level) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(format!(
            "{},aws_config=warn,aws_smithy_runtime=warn,hyper=warn",
            level.as_str().to_lowercase()
        )),
    }
}

/// Initialize logging to stdout and the configured log file.
///
/// The log file is appended to so restarts keep earlier output.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(parse_level(&config.level));

    if let Some(parent) = Path::new(&config.file).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)?;
    let writer = std::io::stdout.and(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .init();

    Ok(())
}

/// Console-only logging, used when the log file cannot be opened.
pub fn init_console_only(level: &str) {
    let filter = build_filter(parse_level(level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_target(true),
        )
        .with(filter)
        .init();
}
