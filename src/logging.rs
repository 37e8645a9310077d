//! Two-phase logging initialization.
//!
//! A bootstrap subscriber is installed before the manifest is parsed so that
//! configuration loading itself can log; once the manifest is available the
//! verbosity is raised through [`Logging::reconfigure`] instead of
//! re-initializing the global subscriber.

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Registry;

/// Handle to the installed subscriber's filter.
pub struct Logging {
    handle: reload::Handle<EnvFilter, Registry>,
}

/// Install the global subscriber at `info` level (or `RUST_LOG` if set).
///
/// Must be called once, before any other component logs.
pub fn init() -> Logging {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time(),
        )
        .init();

    Logging { handle }
}

impl Logging {
    /// Switch to debug-level output once configuration says so.
    pub fn reconfigure(&self, verbose: bool) {
        let level = if verbose { "debug" } else { "info" };
        if let Err(e) = self.handle.reload(EnvFilter::new(level)) {
            tracing::warn!("failed to reconfigure log level: {e}");
        }
    }
}
