use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Logger configuration.
///
/// `env_filter` uses the `tracing-subscriber` directive syntax, e.g. `"info"` or
/// `"auramatic=debug,reqwest=warn"`.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Explicit filter. Falls back to `RUST_LOG`, then `info`.
    pub env_filter: Option<String>,
    /// Emit ANSI colors.
    pub ansi: bool,
}

static INIT: Once = Once::new();

fn build_filter(explicit: Option<&str>) -> EnvFilter {
    if let Some(filter) = explicit.and_then(|f| EnvFilter::try_new(f).ok()) {
        return filter;
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber once. Later calls are ignored.
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let installed = tracing_subscriber::fmt()
            .with_env_filter(build_filter(config.env_filter.as_deref()))
            .with_ansi(config.ansi)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!("logging initialized");
        }
    });
}
