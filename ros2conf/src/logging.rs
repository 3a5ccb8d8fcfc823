//! Logging configuration assembly
//!
//! Turns the log-related pieces of a parsed [`Arguments`] into a
//! `tracing` setup: severities become an `EnvFilter`, the stdout switch
//! gates the stderr formatting layer, and the external-lib switch gates
//! the `log`-to-`tracing` bridge. Installation is explicit and happens at
//! most once per process.

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::arguments::Arguments;
use crate::log_levels::{LogLevels, LogSeverity};

static LOGGING_INSTALLED: OnceLock<()> = OnceLock::new();

/// Resolved logging configuration for one process
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default and per-logger severities
    pub levels: LogLevels,
    /// Whether console output is wanted
    pub stdout_enabled: bool,
    /// Whether the rosout sink is wanted (the sink itself lives outside
    /// this crate)
    pub rosout_enabled: bool,
    /// Whether external-library log capture is wanted
    pub external_lib_enabled: bool,
    /// External logging configuration file, if any
    pub config_file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Resolve the logging pieces of a parsed argument aggregate
    #[must_use]
    pub fn from_arguments(args: &Arguments) -> Self {
        Self {
            levels: args.log_levels.clone(),
            stdout_enabled: args.logging.stdout_enabled(),
            rosout_enabled: args.logging.rosout_enabled(),
            external_lib_enabled: args.logging.external_lib_enabled(),
            config_file: args.log_config_file.clone(),
        }
    }

    /// Render the severities as `EnvFilter` directives
    ///
    /// An unset default falls back to `info`; unset per-logger entries
    /// defer to the default and are omitted.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        let mut directives = severity_directive(self.levels.default_level)
            .unwrap_or("info")
            .to_string();
        for setting in &self.levels.loggers {
            if let Some(level) = severity_directive(setting.level) {
                directives.push(',');
                directives.push_str(&setting.name);
                directives.push('=');
                directives.push_str(level);
            }
        }
        directives
    }

    /// Build an `EnvFilter` from the rendered directives
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::new(self.filter_directives())
    }

    /// Install the configuration process-globally
    ///
    /// Idempotent: only the first call per process takes effect. The
    /// `RUST_LOG` environment variable, when set, overrides the rendered
    /// directives.
    pub fn install(&self) {
        LOGGING_INSTALLED.get_or_init(|| {
            if self.external_lib_enabled {
                tracing_log::LogTracer::init().ok();
            }
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| self.env_filter());
            if self.stdout_enabled {
                let fmt_layer = fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr);
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
                    .ok();
            } else {
                tracing_subscriber::registry().with(filter).try_init().ok();
            }
        });
    }
}

// tracing has no fatal level, fold it into error; unset defers
fn severity_directive(level: LogSeverity) -> Option<&'static str> {
    match level {
        LogSeverity::Unset => None,
        LogSeverity::Debug => Some("debug"),
        LogSeverity::Info => Some("info"),
        LogSeverity::Warn => Some("warn"),
        LogSeverity::Error | LogSeverity::Fatal => Some("error"),
    }
}
