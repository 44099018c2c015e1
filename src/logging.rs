//! Tracing subscriber setup.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_TARGET: &str = "gemini_gateway";

/// How the gateway writes logs.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Verbosity for the gateway's own targets
    pub level: Level,
    /// Emit JSON lines instead of human readable output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
        }
    }
}

fn default_filter(level: Level) -> String {
    format!("{DEFAULT_LOG_TARGET}={}", level.as_str().to_lowercase())
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config.level)));

    let layer = fmt::layer().with_file(true).with_line_number(true);
    let layer = if config.json_format {
        layer.json().flatten_event(true).boxed()
    } else {
        layer.boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_targets_gateway() {
        assert_eq!(default_filter(Level::DEBUG), "gemini_gateway=debug");
    }
}
