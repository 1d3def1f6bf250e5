//! Subscriber setup

use tlgen_core::LogLevel;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter directive: the flag wins, then `RUST_LOG`, then the settings file.
pub fn filter(flag: Option<LogLevel>, configured: LogLevel) -> EnvFilter {
    match flag {
        Some(level) => EnvFilter::new(level.as_directive()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.as_directive())),
    }
}

/// Install the global fmt subscriber, writing to stderr.
pub fn init(flag: Option<LogLevel>, configured: LogLevel) {
    tracing_subscriber::registry()
        .with(filter(flag, configured))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
