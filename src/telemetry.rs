//! Tracing subscriber installation.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::OnceLock;

use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};

use crate::uiforge_config::{LogFormat, LoggingSection};

static TELEMETRY_GUARD: OnceLock<()> = OnceLock::new();

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to create log directory: {0}")]
    LogDir(#[from] io::Error),
    #[error("failed to open log file: {0}")]
    LogFile(#[from] InitError),
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Install the global subscriber on first call; later calls do nothing.
///
/// `RUST_LOG` wins over `logging.filter`. With `logging.file` set, events go
/// to `log_file` instead of stderr.
pub fn initialise(logging: &LoggingSection, log_file: &Path) -> Result<(), TelemetryError> {
    if TELEMETRY_GUARD.get().is_some() {
        return Ok(());
    }
    install_subscriber(logging, log_file)?;
    let _ = TELEMETRY_GUARD.set(());
    Ok(())
}

fn env_filter(logging: &LoggingSection) -> Result<EnvFilter, TelemetryError> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(directive),
        _ => EnvFilter::try_new(&logging.filter),
    }
    .map_err(|error| TelemetryError::Filter(error.to_string()))
}

fn install_subscriber(logging: &LoggingSection, log_file: &Path) -> Result<(), TelemetryError> {
    let filter = env_filter(logging)?;

    let (writer, ansi) = if logging.file {
        let dir = log_file.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;
        let mut builder = RollingFileAppender::builder().rotation(Rotation::NEVER);
        if let Some(name) = log_file.file_name().and_then(|n| n.to_str()) {
            builder = builder.filename_prefix(name);
        }
        (BoxMakeWriter::new(builder.build(dir)?), false)
    } else {
        (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal())
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(writer)
        .with_ansi(ansi);

    let subscriber: Box<dyn Subscriber + Send + Sync> = match logging.format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
