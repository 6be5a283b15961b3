//! Structured logging setup.

use crate::error::{Result, ResultsError};
use tracing::debug;

/// Install a global `tracing` subscriber writing compact records to stderr.
///
/// `RUST_LOG` takes precedence; otherwise `level` applies to this crate.
/// Fails if a global subscriber is already installed.
pub fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("eplus_results={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .map_err(|e| ResultsError::Configuration {
            message: format!("Failed to initialise logging: {}", e),
        })?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}
