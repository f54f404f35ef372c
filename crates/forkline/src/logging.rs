//! Tracing setup for the binary.
//!
//! The viewer owns the terminal, so it logs to a file; the headless
//! commands log to stderr. Filtering is configured via `RUST_LOG`.

use chrono::Local;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Directory the viewer writes its log files to
pub fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("forkline").join("logs"))
}

/// Log to a timestamp-named file under `log_dir()`. Falls back to stderr
/// when no data directory is available. Returns the log file path.
pub fn init_file_tracing() -> io::Result<Option<PathBuf>> {
    let Some(log_dir) = log_dir() else {
        init_stderr_tracing()?;
        return Ok(None);
    };
    std::fs::create_dir_all(&log_dir)?;

    let file_name = format!("{}.log", Local::now().format("%Y%m%d_%H%M%S"));
    let file_appender = tracing_appender::rolling::never(&log_dir, &file_name);

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_file(true)
                .with_line_number(true),
        )
        .with(EnvFilter::from_default_env());
    tracing::subscriber::set_global_default(subscriber).map_err(io::Error::other)?;

    let path = log_dir.join(file_name);
    tracing::debug!(
        target: "forkline::logging",
        path = %path.display(),
        "Tracing initialized with file output"
    );
    Ok(Some(path))
}

/// Log warnings and above to stderr unless `RUST_LOG` says otherwise
pub fn init_stderr_tracing() -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::Layer::default()
                .with_writer(io::stderr)
                .with_target(true),
        )
        .with(filter);
    tracing::subscriber::set_global_default(subscriber).map_err(io::Error::other)
}
