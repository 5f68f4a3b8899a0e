//! Tracing subscriber setup shared by the services.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

const FALLBACK_LEVEL: &str = "info";

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(&config.level));
    let to_file = config.file_path.is_some();
    let writer = match &config.file_path {
        Some(path) => file_writer(Path::new(path))?,
        None => BoxMakeWriter::new(std::io::stdout),
    };

    // Exactly one of the two layers is present.
    let (json, plain) = match config.format {
        LogFormat::Json => (
            Some(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(writer),
            ),
            None,
        ),
        LogFormat::Plain => (
            None,
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(!to_file)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(writer),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .try_init()
        .context("a global subscriber is already installed")?;

    tracing::info!(level = %config.level, format = ?config.format, to_file, "Logging initialized");
    Ok(())
}

/// Filter for the configured level; an unparseable directive falls back to info.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

fn file_writer(path: &Path) -> Result<BoxMakeWriter> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    Ok(BoxMakeWriter::new(Arc::new(file)))
}
