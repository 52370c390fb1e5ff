use tracing_subscriber::EnvFilter;

/// Environment variable consulted before the configured filter.
pub const LOG_ENV: &str = "OTTERWRAP_LOG";

pub const DEFAULT_FILTER: &str = "warn";

/// Install the global fmt subscriber.
///
/// `OTTERWRAP_LOG` wins over `fallback`; a malformed directive string falls
/// back to [`DEFAULT_FILTER`]. Calling this more than once is harmless, later
/// calls leave the first subscriber in place.
pub fn init_logging(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(fallback.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
