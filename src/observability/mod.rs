//! Logging setup and tool-call spans.
//!
//! Logs always go to stderr: in stdio mode stdout carries the protocol.

mod spans;

pub use spans::SpanContext;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. Calling this twice
/// returns an error instead of replacing the first subscriber.
pub fn init_logging() -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}
