//! Tracing subscriber setup.
//!
//! Console output goes to stderr so `diagnose` and `batch` keep stdout clean
//! for results. When `logging.audit_file` is set, events on the `audit`
//! target are also appended to that file as JSON lines, independent of the
//! console filter.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{error, Level, Subscriber};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::audit::AUDIT_TARGET;
use crate::config::{LogFormat, LoggingConfig};
use crate::diagnostician::panic_message;

/// Tracing target for panic reports.
pub const PANIC_TARGET: &str = "panic";

/// Console filter: `RUST_LOG` when set, otherwise the configured level.
pub fn console_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level '{}'", config.level)),
    }
}

/// JSON-lines layer that only sees audit events.
pub fn audit_layer<S>(path: &Path) -> Result<impl Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open audit log {}", path.display()))?;

    Ok(fmt::layer()
        .json()
        .with_writer(Mutex::new(file))
        .with_filter(Targets::new().with_target(AUDIT_TARGET, Level::INFO)))
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = console_filter(config)?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    layers.push(match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
    });
    if let Some(path) = &config.audit_file {
        layers.push(audit_layer(path)?.boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("Failed to install tracing subscriber")
}

/// Replace the default panic hook so panic reports reach the subscriber
/// instead of raw stderr. Contained evaluator panics are logged here too.
pub fn route_panics_to_tracing() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(ToString::to_string)
            .unwrap_or_default();
        error!(
            target: PANIC_TARGET,
            location = %location,
            "{}",
            panic_message(info.payload())
        );
    }));
}
