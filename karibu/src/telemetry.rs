//! Telemetry initialization: structured logging via `tracing`.
//!
//! Log filtering is controlled through the standard `RUST_LOG` environment
//! variable (`EnvFilter` syntax), defaulting to `info`. For example:
//!
//! ```bash
//! RUST_LOG=karibu=debug,sqlx=warn karibu -f config.yaml
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the tracing subscriber with console output.
///
/// Uses `try_init` so repeated calls (as happens across tests sharing a
/// process) are harmless.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    Ok(())
}
