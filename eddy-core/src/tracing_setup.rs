//! Tracing setup for Eddy
//!
//! Console logs at a user-selected level, plus a detailed log of the current
//! run written to disk.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Name of the per-run log file inside the logs directory.
pub const RUN_LOG_FILE: &str = "eddy-last-run.log";

/// Directives for the file layer: everything from our own crates and the
/// HTTP trace layer, `info` for dependencies.
const FILE_DIRECTIVES: &str = "info,eddy_core=trace,eddy_web=trace,eddy=trace,tower_http=debug";

/// Initialize tracing with a console layer and a run log file.
///
/// `RUST_LOG` takes precedence over `console_level` for the console layer.
/// The run log at `{logs_dir}/eddy-last-run.log` is truncated on every start.
/// Returns the path of the run log.
///
/// # Errors
///
/// - `std::io::Error` - If the logs directory or the run log cannot be created
pub fn init_tracing(console_level: Level, logs_dir: Option<&Path>) -> std::io::Result<PathBuf> {
    let logs_path = logs_dir.unwrap_or_else(|| Path::new("logs"));
    create_dir_all(logs_path)?;

    let log_file_path = logs_path.join(RUN_LOG_FILE);
    let log_file = File::create(&log_file_path)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(log_file)
        .with_filter(EnvFilter::new(FILE_DIRECTIVES));

    // A second call (tests, embedding) keeps the first subscriber.
    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }

    tracing::info!(
        console = %console_level,
        run_log = %log_file_path.display(),
        "Tracing initialized"
    );

    Ok(log_file_path)
}

/// CLI log levels for user control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliLogLevel {
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Informational, warning, and error messages
    #[default]
    Info,
    /// Debug, informational, warning, and error messages
    Debug,
    /// All messages including detailed tracing
    Trace,
}

impl CliLogLevel {
    /// Converts CLI log level to tracing Level enum.
    ///
    /// # Examples
    /// ```
    /// use eddy_core::tracing_setup::CliLogLevel;
    ///
    /// let level = CliLogLevel::Info.as_tracing_level();
    /// assert_eq!(level, tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tracing_level().as_str().to_lowercase())
    }
}
