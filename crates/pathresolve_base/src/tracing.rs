use crate::error::PathResolveResult;
pub use tracing::instrument;
pub use tracing::{debug, error, info, trace, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter directive, e.g. `debug`.
pub const LOG_FILTER_ENV: &str = "PATHRESOLVE_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the global subscriber.
///
/// Log lines go to stderr so they never mix with the path listing on stdout.
/// The filter only applies to the fmt layer; the error layer sees every span so
/// errors always carry a complete span trace.
pub fn init_tracing() -> PathResolveResult<()> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| crate::err!("Failed to install tracing subscriber: {}", e))?;
    Ok(())
}
