//! Tracing initialization and subscriber setup.
//!
//! Configures a `tracing-subscriber` registry with an `EnvFilter` and a
//! formatting layer, writing to stderr or to a rotating log file.

use std::path::PathBuf;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::file_writer::RotatingFileWriter;
use crate::GridConfig;

/// Installs the global tracing subscriber.
///
/// # Filter Resolution
///
/// The filter is determined by:
/// 1. `RUST_LOG` if set and valid
/// 2. `config.trace_level` if set
/// 3. Default: `"info"`
///
/// # Output
///
/// Events go to `config.log_file` through a [`RotatingFileWriter`] when set,
/// otherwise to stderr. If the log directory cannot be created, output falls
/// back to stderr.
///
/// # Initialization Behavior
///
/// Idempotent: only the first call in a process installs a subscriber; later
/// calls (or a subscriber installed by the host) are left alone. Never fails
/// the caller.
///
/// # Example
///
/// ```rust
/// use virtgrid::observability::init_tracing;
/// use virtgrid::GridConfig;
///
/// let config = GridConfig {
///     trace_level: Some("virtgrid=debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// init_tracing(&config);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &GridConfig) {
    let level = config
        .trace_level
        .clone()
        .unwrap_or_else(|| "info".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.log_file.as_deref().and_then(prepare_log_file) {
        Some(path) => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(RotatingFileWriter::new(path)),
            )
            .try_init(),
        None => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    match result {
        Ok(()) => tracing::debug!(log_file = ?config.log_file, "tracing initialized"),
        Err(e) => tracing::debug!(error = %e, "tracing subscriber already installed"),
    }
}

fn prepare_log_file(path: &str) -> Option<PathBuf> {
    let path = PathBuf::from(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("virtgrid: cannot create log directory {}: {e}", parent.display());
            return None;
        }
    }
    Some(path)
}
