//! Diagnostic output for csvgen and csvgen-server.
//!
//! Two kinds of output leave the process, and they do not share a switch:
//!
//! - `tracing` events (artifact created, collisions, sweep results, storage
//!   failures) go to stderr. `RUST_LOG` picks the verbosity; the binary passes
//!   its own default directive for when it is unset or does not parse.
//! - With `DEBUG=true`, every incoming HTTP request is also captured as a
//!   `<millis>.json` file under `LOG_DIR` by [`crate::io::request_log`]. Those
//!   files are written regardless of `RUST_LOG`, and a quiet `RUST_LOG` does
//!   not suppress them.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber, filtered by `RUST_LOG` or `default_directive`.
///
/// ```bash
/// RUST_LOG=csvgen=debug,csvgen_server=debug csvgen-server
/// ```
pub fn init(default_directive: &str) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(filter_from(rust_log.as_deref(), default_directive))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn filter_from(rust_log: Option<&str>, default_directive: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive))
}
