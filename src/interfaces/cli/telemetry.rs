//! Logging subscriber initialisation.

use crate::error::{Result, SyncError};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a compact stderr logger so stdout only carries command output.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},hyper=warn,reqwest=warn,rustls=warn")));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init()
        .map_err(|e| SyncError::InternalError(Box::new(e)))
}
