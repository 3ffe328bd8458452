//! Run-wide logging setup.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber once for this run.
///
/// Console verbosity follows `-v` (WARN, INFO, DEBUG, TRACE) unless
/// `RUST_LOG` is set. When `log_file` is given, INFO and above are also
/// appended to it without colors.
pub fn init(verbose: u8, log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file = match log_file {
        Some(path) => {
            let handle = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(handle))
                    .with_filter(LevelFilter::INFO.max(level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()?;

    if let Some(path) = log_file {
        info!("Logging to {}", path.display());
    }

    Ok(())
}
