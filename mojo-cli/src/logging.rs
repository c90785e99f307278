//! Diagnostic logging for the CLI host.
//!
//! Mojo channel writes go through `TracingLog` under the `mojo` target, so a
//! single subscriber carries both plugin output and adapter diagnostics.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `info` if unset.
/// Output: stderr, compact format, so stdout stays machine-readable.
///
/// ```bash
/// RUST_LOG=mojo_plugin=debug mojo run find-todo -D basedir=src
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
