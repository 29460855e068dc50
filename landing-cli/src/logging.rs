//! Log output for operators

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. "debug", "landing_core=trace")
pub const LOG_ENV: &str = "LANDING_LOG";

/// Install the stderr subscriber
///
/// Progress lines go to stderr so `--json` output on stdout stays parseable.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
