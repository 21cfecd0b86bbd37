//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "DEVGEN_LOG";

/// Pick the filter directives: `DEVGEN_LOG`, then `RUST_LOG`, then the
/// configured level. A blank variable counts as unset.
pub fn directives(devgen_log: Option<String>, rust_log: Option<String>, level: &str) -> String {
    let set = |var: Option<String>| var.filter(|d| !d.trim().is_empty());
    set(devgen_log)
        .or_else(|| set(rust_log))
        .unwrap_or_else(|| level.to_string())
}

/// Install the global subscriber, writing to stderr.
///
/// A second call is a no-op.
pub fn init(config: &LoggingConfig) {
    let directives = directives(
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
        &config.level,
    );
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.color)
        .try_init();
}
