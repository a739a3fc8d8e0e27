//! Logging configuration for quality-probe.
//!
//! The executor logs every statement it dispatches and the size of every
//! result through `tracing`. [`LogConfig`] decides how much of that is
//! emitted; [`setup`] installs a `tracing-subscriber` for binaries.

use tracing::Level;

/// Logging configuration for query dispatch.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for quality-probe components
    pub base_level: Level,
    /// Whether to log the SQL text of each statement
    pub log_queries: bool,
    /// Whether to log row counts of each result
    pub log_results: bool,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_queries: false,
            log_results: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Logs full statements; the equivalent of a debug switch on the connection.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_queries: true,
            log_results: true,
            max_field_length: 4096,
        }
    }

    /// Creates a minimal configuration for production with lowest overhead.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_queries: false,
            log_results: false,
            max_field_length: 128,
        }
    }
}

impl LogConfig {
    /// Statements are logged at DEBUG, so `base_level` must admit DEBUG.
    pub fn logs_queries(&self) -> bool {
        self.log_queries && self.base_level >= Level::DEBUG
    }

    /// Results are logged at INFO, so `base_level` must admit INFO.
    pub fn logs_results(&self) -> bool {
        self.log_results && self.base_level >= Level::INFO
    }
}

/// Logs a statement when query logging is enabled.
#[macro_export]
macro_rules! log_query {
    ($config:expr, $($arg:tt)*) => {
        if $config.logs_queries() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs result details when result logging is enabled.
#[macro_export]
macro_rules! log_result {
    ($config:expr, $($arg:tt)*) => {
        if $config.logs_results() {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to the maximum field length if needed.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber setup for binaries and demos.
pub mod setup {
    use tracing::Level;

    /// Configuration for the global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything else
        pub level: Level,
        /// Log level for quality-probe itself
        pub probe_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                probe_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                probe_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                probe_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_probe_level(mut self, level: Level) -> Self {
            self.probe_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},quality_probe={}",
                    self.level.as_str().to_lowercase(),
                    self.probe_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global `tracing` subscriber. `RUST_LOG` wins over the config.
    ///
    /// ```rust,no_run
    /// use quality_probe::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development()).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
