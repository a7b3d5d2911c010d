//! Logging setup
//!
//! Console output (pretty or JSON) plus an optional daily rotating file
//! under `<log_dir>/app/`. Rotated files older than [`LOG_RETENTION_DAYS`]
//! are removed by [`cleanup_old_logs`].

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Days a rotated log file is kept
pub const LOG_RETENTION_DAYS: i64 = 14;

const APP_LOG_PREFIX: &str = "app";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Console only
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Initialize logging
///
/// `RUST_LOG` wins over `level` when set.
///
/// ```no_run
/// floor_client::logger::init_logger_with_file("debug", false, Some("./logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    // Console layer
    let console = fmt::layer().with_target(true).with_file(true).with_line_number(true);
    if json_format {
        layers.push(console.json().with_current_span(true).with_thread_ids(true).boxed());
    } else {
        layers.push(console.with_thread_ids(false).boxed());
    }

    if let Some(dir) = log_dir {
        let app_log_dir = Path::new(dir).join(APP_LOG_PREFIX);
        fs::create_dir_all(&app_log_dir)
            .with_context(|| format!("Failed to create log directory {}", app_log_dir.display()))?;

        if let Err(e) = cleanup_old_logs(Path::new(dir), LOG_RETENTION_DAYS) {
            eprintln!("Failed to clean old logs: {e}");
        }

        let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, APP_LOG_PREFIX);
        let file = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(app_log));
        if json_format {
            layers.push(file.json().with_current_span(true).boxed());
        } else {
            layers.push(file.boxed());
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Logger already initialized")?;

    Ok(())
}

/// Delete `app.YYYY-MM-DD` files older than `keep_days`
///
/// Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path, keep_days: i64) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join(APP_LOG_PREFIX);
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Local::now().date_naive() - Duration::days(keep_days);
    let mut removed = 0;

    for entry in fs::read_dir(&app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // tracing-appender names daily files "<prefix>.YYYY-MM-DD"
        let Some(date) = name
            .strip_prefix(APP_LOG_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }

    Ok(removed)
}
