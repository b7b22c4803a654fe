//! Logging setup for optscope hosts, with file output and optional stdout.
//!
//! Logs always go to a file at `warn` level (or higher if a filter is set in the
//! environment). Stdout logging is enabled when `OPTSCOPE_LOG` or `RUST_LOG` is set, or in
//! debug builds.
//!
//! ## Environment Variables
//!
//! 1. **`OPTSCOPE_LOG`** (highest priority) - optscope-specific logging control
//! 2. **`RUST_LOG`** - Standard tracing environment variable
//! 3. **Default** - `warn` globally, `info` for optscope crates
//!
//! `OPTSCOPE_LOG=debug` is shorthand for `debug` on every optscope crate; values with
//! module syntax (`OPTSCOPE_LOG=optscope::group=trace`) are used as-is.
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/optscope/logs/optscope-<pid>.log`
//! - macOS: `~/Library/Application Support/optscope/logs/optscope-12345.log`
//! - Linux: `~/.local/share/optscope/logs/optscope-12345.log`
//!
//! Override with [`LogConfig::log_file_path`].

use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Crates whose level follows the `OPTSCOPE_LOG` shorthand.
const CRATES: &[&str] = &["optscope", "optscope_log"];

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Default)]
pub struct LogConfig {
    /// A file path, or a directory to place the default file name in
    pub log_file_path: Option<PathBuf>,
}

/// Initialize logging.
///
/// This function respects the environment variable priority described in the module docs:
/// `OPTSCOPE_LOG` > `RUST_LOG` > default settings.
///
/// The returned [`LogGuard`] must be held for the lifetime of the program --
/// dropping it flushes and stops the background file writer.
pub fn init(config: LogConfig) -> Result<LogGuard, Box<dyn std::error::Error + Send + Sync>> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_file_filter());

    let stdout_enabled = env::var("OPTSCOPE_LOG").is_ok()
        || env::var("RUST_LOG").is_ok()
        || cfg!(debug_assertions);

    let stdout_layer = if stdout_enabled {
        Some(fmt::layer().with_filter(create_filter()))
    } else {
        None
    };

    Registry::default()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    let log_file = log_dir.join(filename);
    tracing::info!("logging to {}", log_file.display());

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file,
    })
}

/// Initialize logging for tests.
///
/// Stdout-only (no file output), routed through the test harness writer so output is
/// captured per test. Will not crash if called multiple times or if logging is already
/// initialized by another test.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("optscope-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir.to_path_buf(), name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("optscope")
        .join("logs");

    (dir, filename)
}

/// File filter: uses user-specified level if set, otherwise defaults to `warn`.
fn create_file_filter() -> EnvFilter {
    if env::var("OPTSCOPE_LOG").is_ok() || env::var("RUST_LOG").is_ok() {
        return create_filter();
    }
    EnvFilter::new("warn")
}

/// Create the appropriate [`EnvFilter`] based on environment variables.
///
/// Implements the priority system: `OPTSCOPE_LOG` > `RUST_LOG` > defaults.
fn create_filter() -> EnvFilter {
    if let Ok(optscope_log) = env::var("OPTSCOPE_LOG") {
        return expand_optscope_log(&optscope_log);
    }

    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }

    expand_optscope_log("info")
}

/// Expand `OPTSCOPE_LOG` values into full tracing filter strings.
///
/// - `OPTSCOPE_LOG=debug` becomes `warn,optscope=debug,optscope_log=debug`
/// - `OPTSCOPE_LOG=optscope::group=trace` is used as-is
fn expand_optscope_log(optscope_log: &str) -> EnvFilter {
    EnvFilter::new(expand_directives(optscope_log))
}

fn expand_directives(optscope_log: &str) -> String {
    if optscope_log.contains('=') || optscope_log.contains(':') || optscope_log.contains(',') {
        return optscope_log.to_string();
    }

    let mut directives = String::from("warn");
    for name in CRATES {
        directives.push_str(&format!(",{name}={optscope_log}"));
    }
    directives
}
