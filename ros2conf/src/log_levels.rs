//! Log severities and the log-level rule store
//!
//! Rules arrive from `--log-level` in two spellings: a bare severity sets
//! the default, `logger:=severity` sets one logger. The store keeps at
//! most one entry per logger name; for the default, the last bare rule
//! wins.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{ArgsError, ArgsResult};

/// Severity of a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LogSeverity {
    /// No severity chosen, inherit the surrounding default
    #[default]
    Unset,
    /// Debug level logging
    Debug,
    /// Info level logging
    Info,
    /// Warning level logging
    Warn,
    /// Error level logging
    Error,
    /// Fatal level logging
    Fatal,
}

impl LogSeverity {
    /// Convert the severity to its canonical upper-case spelling
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "UNSET",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UNSET" => Ok(Self::Unset),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "FATAL" => Ok(Self::Fatal),
            _ => Err(format!(
                "invalid severity '{s}': expected unset, debug, info, warn, error, or fatal"
            )),
        }
    }
}

/// Severity chosen for one named logger
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoggerSetting {
    /// The logger's name
    pub name: String,
    /// The chosen severity
    pub level: LogSeverity,
}

/// The default severity plus per-logger overrides
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogLevels {
    /// Severity for loggers without an override
    pub default_level: LogSeverity,
    /// Per-logger overrides, one entry per name
    pub loggers: Vec<LoggerSetting>,
}

impl LogLevels {
    /// Create an empty store with an unset default
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default severity; the last caller wins
    pub fn set_default(&mut self, level: LogSeverity) {
        if self.default_level != LogSeverity::Unset && self.default_level != level {
            debug!(
                previous = self.default_level.as_str(),
                new = level.as_str(),
                "overwriting default log severity"
            );
        }
        self.default_level = level;
    }

    /// Set one logger's severity, overwriting any earlier setting in place
    pub fn set_logger(&mut self, name: &str, level: LogSeverity) {
        match self.loggers.iter_mut().find(|s| s.name == name) {
            Some(setting) => setting.level = level,
            None => self.loggers.push(LoggerSetting {
                name: name.to_string(),
                level,
            }),
        }
    }

    /// Look up one logger's severity
    #[must_use]
    pub fn logger_level(&self, name: &str) -> Option<LogSeverity> {
        self.loggers
            .iter()
            .find_map(|s| (s.name == name).then_some(s.level))
    }

    /// Apply one `--log-level` rule: `severity` or `logger:=severity`
    ///
    /// # Errors
    ///
    /// Returns [`ArgsError::InvalidLogLevelRule`] for an empty logger name
    /// or an unknown severity.
    pub fn apply_rule(&mut self, rule: &str) -> ArgsResult<()> {
        let invalid = |reason: String| ArgsError::InvalidLogLevelRule {
            rule: rule.to_string(),
            reason,
        };
        if let Some((name, level_text)) = rule.split_once(":=") {
            if name.is_empty() {
                return Err(invalid("logger name must not be empty".to_string()));
            }
            let level = level_text.parse().map_err(invalid)?;
            self.set_logger(name, level);
        } else {
            let level = rule.parse().map_err(invalid)?;
            self.set_default(level);
        }
        Ok(())
    }

    /// Whether nothing has been configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.default_level == LogSeverity::Unset && self.loggers.is_empty()
    }

    /// Release spare capacity after parsing settles
    pub fn shrink_to_fit(&mut self) {
        self.loggers.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parsing_is_case_insensitive() {
        assert_eq!("debug".parse::<LogSeverity>().unwrap(), LogSeverity::Debug);
        assert_eq!("DEBUG".parse::<LogSeverity>().unwrap(), LogSeverity::Debug);
        assert_eq!("Warn".parse::<LogSeverity>().unwrap(), LogSeverity::Warn);
        assert_eq!("unset".parse::<LogSeverity>().unwrap(), LogSeverity::Unset);
        assert!("verbose".parse::<LogSeverity>().is_err());
        assert!("warning".parse::<LogSeverity>().is_err());
    }

    #[test]
    fn test_bare_rules_set_default_last_wins() {
        let mut levels = LogLevels::new();
        levels.apply_rule("info").unwrap();
        levels.apply_rule("rcl:=debug").unwrap();
        levels.apply_rule("warn").unwrap();
        assert_eq!(levels.default_level, LogSeverity::Warn);
        assert_eq!(levels.logger_level("rcl"), Some(LogSeverity::Debug));
        assert_eq!(levels.loggers.len(), 1);
    }

    #[test]
    fn test_named_rules_overwrite_in_place() {
        let mut levels = LogLevels::new();
        levels.apply_rule("rcl:=debug").unwrap();
        levels.apply_rule("other:=error").unwrap();
        levels.apply_rule("rcl:=fatal").unwrap();
        assert_eq!(levels.loggers.len(), 2);
        assert_eq!(levels.logger_level("rcl"), Some(LogSeverity::Fatal));
        assert_eq!(levels.loggers[0].name, "rcl");
    }

    #[test]
    fn test_invalid_rules() {
        let mut levels = LogLevels::new();
        assert!(levels.apply_rule(":=debug").is_err());
        assert!(levels.apply_rule("rcl:=loud").is_err());
        assert!(levels.apply_rule("nonsense").is_err());
    }

    #[test]
    fn test_empty_check() {
        let mut levels = LogLevels::new();
        assert!(levels.is_empty());
        levels.apply_rule("error").unwrap();
        assert!(!levels.is_empty());
    }
}
