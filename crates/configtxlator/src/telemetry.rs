//! Logging setup for the binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when neither a flag nor `RUST_LOG` is given.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolve the filter: an explicit level wins, then `RUST_LOG`, then
/// [`DEFAULT_LOG_LEVEL`].
pub fn env_filter(level: Option<&str>) -> anyhow::Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("invalid log level '{}': {}", level, e)),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))),
    }
}

/// Install a stderr `tracing` subscriber. Stdout is left to command output.
pub fn init_tracing(level: Option<&str>) -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_parses() {
        assert!(env_filter(Some("debug")).is_ok());
        assert!(env_filter(Some("configtxlator=trace,warn")).is_ok());
    }

    #[test]
    fn test_bad_level_is_rejected() {
        assert!(env_filter(Some("[not a filter")).is_err());
    }
}
