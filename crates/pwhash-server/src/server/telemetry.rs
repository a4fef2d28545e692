//! Logging setup.
//!
//! Spans and events from both this binary and the `pwhash` core (built with
//! its `tracing` feature) are printed as human-readable output through
//! `tracing_subscriber::fmt`. Verbosity follows `RUST_LOG`, defaulting to
//! `info`:
//!
//! ```bash
//! RUST_LOG=pwhash=debug,pwhash_server=info cargo run
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;

    Ok(())
}
