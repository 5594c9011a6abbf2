//! Structured logging init: `tracing` + `tracing-subscriber` with an
//! env-filter. [`crate::app::App::new`] installs it at startup; safe to
//! call more than once (e.g. from a binary's `main` before constructing an
//! `App`) since `try_init` silently no-ops once a subscriber is set.

use tracing_subscriber::EnvFilter;

/// Install a `tracing-subscriber` fmt layer filtered by `RUST_LOG` (falling
/// back to `WEFT_LOG`, then `warn`). Writes to stderr so stdout stays clean
/// for the alternate-screen terminal output.
pub fn init() {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("WEFT_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
