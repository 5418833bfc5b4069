use std::fs::File;
use std::sync::Mutex;

use anyhow::{Context, Result};
use markdown_rewrite_config::{LogLevel, LoggingSettings};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

static LOG_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(None);

/// Install the global subscriber: stderr always, plus a file layer when configured.
///
/// `RUST_LOG` directives take precedence over the configured levels.
pub fn init(settings: &LoggingSettings, quiet: bool) -> Result<()> {
    let stderr_level = if quiet {
        LevelFilter::ERROR
    } else {
        level_filter(settings.level)
    };

    let stderr_filter = EnvFilter::builder()
        .with_default_directive(stderr_level.into())
        .from_env_lossy();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_filter(stderr_filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let Some(path) = &settings.file else {
        registry.try_init().context("failed to install log subscriber")?;
        return Ok(());
    };

    let file_level = level_filter(settings.file_level.unwrap_or(settings.level));
    let file_filter = EnvFilter::builder()
        .with_default_directive(file_level.into())
        .from_env_lossy();

    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // The guard flushes the background writer on drop; keep it for the process lifetime.
    if let Ok(mut slot) = LOG_GUARD.lock() {
        *slot = Some(guard);
    }

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(file_filter);

    registry
        .with(file_layer)
        .try_init()
        .context("failed to install log subscriber")
}

/// Drop the file writer guard so buffered lines reach disk before exit.
pub fn flush() {
    if let Ok(mut slot) = LOG_GUARD.lock() {
        slot.take();
    }
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}
