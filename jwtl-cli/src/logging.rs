//! Diagnostic logging on stderr.
//!
//! Command output goes to stdout; everything emitted through `tracing` goes
//! to stderr so tokens can be piped without log noise.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_output: false,
        }
    }
}

impl LoggingConfig {
    /// Override the fallback filter.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON output.
    #[must_use]
    pub const fn with_json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_tracing(config: &LoggingConfig) {
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if config.json_output {
        tracing_subscriber::registry()
            .with(config.filter())
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(config.filter())
            .with(layer)
            .init();
    }
}
