//! Logging initialization for logwarden-daemon.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `LogwardenConfig`. The `RUST_LOG` environment variable, when set,
//! takes precedence over the configured level.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use logwarden_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// Supported formats: `"json"` (machine-parseable, production default)
/// and `"pretty"` (human-readable, for development).
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.log_format.as_str() {
        "json" => registry.with(layer().json()).try_init(),
        "pretty" => registry.with(layer().pretty()).try_init(),
        other => {
            anyhow::bail!("unknown log format '{}', expected 'json' or 'pretty'", other);
        }
    };

    result.map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {}", e))
}
