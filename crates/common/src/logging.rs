//! Provides utilities to initialize logging.
use std::env;

use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable name for the service label, which is appended to the whoami string.
pub const SVC_LABEL_ENVVAR: &str = "VIDSTAKE_SVC_LABEL";

/// Environment variable that turns on source file names in log lines when set to `1`.
pub const LOG_FILE_ENVVAR: &str = "LOG_FILE";

/// Environment variable that turns on source line numbers in log lines when set to `1`.
pub const LOG_LINE_NUM_ENVVAR: &str = "LOG_LINE_NUM";

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// The whoami string, which is used to identify the service in logs.
    whoami: String,

    /// The filter used when `RUST_LOG` is not set.
    default_directive: Option<String>,
}

impl LoggerConfig {
    /// Creates a new instance with whoami set.
    pub const fn new(whoami: String) -> Self {
        Self {
            whoami,
            default_directive: None,
        }
    }

    /// Creates a new instance with the whoami string set to the provided string.
    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    /// Sets the filter used when `RUST_LOG` is not set, such as `info` or `vidstake_ledger=debug`.
    pub fn set_default_directive(&mut self, directive: impl Into<String>) {
        self.default_directive = Some(directive.into());
    }

    /// Returns the whoami string.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(vidstake)")
    }
}

/// Initializes the logging subsystem with the provided config.
pub fn init(config: LoggerConfig) {
    let filt = match (&config.default_directive, env::var(EnvFilter::DEFAULT_ENV)) {
        (Some(directive), Err(_)) => EnvFilter::new(directive),
        _ => EnvFilter::from_default_env(),
    };

    let log_file = env::var(LOG_FILE_ENVVAR).is_ok_and(|v| v == "1");
    let log_line_num = env::var(LOG_LINE_NUM_ENVVAR).is_ok_and(|v| v == "1");

    // Stdout logging.
    let stdout_sub = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(log_file)
                .with_line_number(log_line_num),
        )
        .with_filter(filt);

    tracing_subscriber::registry().with(stdout_sub).init();

    info!(whoami = %config.whoami, "logging started");
}

/// Gets the service label from the standard envvar, which should be included in the whoami
/// string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    match get_service_label_from_env() {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
