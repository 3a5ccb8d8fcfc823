//! The parsed argument aggregate handed to consumers

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ros2conf_names::RemapRule;
use ros2conf_params::{NodeParameters, ParameterStore};

use crate::errors::ArgsResult;
use crate::log_levels::LogLevels;
use crate::parser::parse_arguments;

/// Tri-state switches for the logging sinks
///
/// `None` means the command line said nothing; every sink defaults to
/// enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoggingDirectives {
    /// `--enable-stdout-logs` / `--disable-stdout-logs`
    pub stdout: Option<bool>,
    /// `--enable-rosout-logs` / `--disable-rosout-logs`
    pub rosout: Option<bool>,
    /// `--enable-external-lib-logs` / `--disable-external-lib-logs`
    pub external_lib: Option<bool>,
}

impl LoggingDirectives {
    /// Whether console output is enabled (default yes)
    #[must_use]
    pub fn stdout_enabled(self) -> bool {
        self.stdout.unwrap_or(true)
    }

    /// Whether the rosout sink is enabled (default yes)
    #[must_use]
    pub fn rosout_enabled(self) -> bool {
        self.rosout.unwrap_or(true)
    }

    /// Whether external-library log capture is enabled (default yes)
    #[must_use]
    pub fn external_lib_enabled(self) -> bool {
        self.external_lib.unwrap_or(true)
    }
}

/// Everything the argument parser produced
///
/// Built once by [`parse_arguments`], never mutated afterwards; consumers
/// that need a stable view across the original's lifetime take a deep copy
/// via `Clone`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    /// Remap rules in argv order
    pub remap_rules: Vec<RemapRule>,
    /// Parameter files in argv order, each already loaded into
    /// [`param_overrides`](Self::param_overrides)
    pub param_files: Vec<PathBuf>,
    /// Overlay built from `-p` rules and parameter files
    pub param_overrides: ParameterStore,
    /// Log severities from `--log-level` rules
    pub log_levels: LogLevels,
    /// External logging configuration file, if any
    pub log_config_file: Option<PathBuf>,
    /// Logging sink switches
    pub logging: LoggingDirectives,
    /// Enclave name, if any
    pub enclave: Option<String>,
    /// argv positions inside a ROS region nobody recognized
    pub unparsed_ros_indices: Vec<usize>,
    /// argv positions outside every ROS region, program name included
    pub unparsed_nonros_indices: Vec<usize>,
}

impl Arguments {
    /// Create an empty aggregate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the given argument vector
    ///
    /// # Errors
    ///
    /// Returns the first parse error; on error nothing is produced.
    ///
    /// # Examples
    ///
    /// ```
    /// use ros2conf::Arguments;
    ///
    /// let args = Arguments::from_args([
    ///     "node",
    ///     "--ros-args",
    ///     "-r",
    ///     "chatter:=/ns/chat",
    ///     "-p",
    ///     "rate:=30",
    /// ])?;
    /// assert_eq!(args.remap_rules.len(), 1);
    /// assert_eq!(args.param_overrides.len(), 1);
    /// # Ok::<(), ros2conf::ArgsError>(())
    /// ```
    pub fn from_args<I, S>(args: I) -> ArgsResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        parse_arguments(&argv)
    }

    /// Parse the current process's command-line arguments
    ///
    /// # Errors
    ///
    /// Returns the first parse error.
    pub fn from_env() -> ArgsResult<Self> {
        let argv: Vec<String> = std::env::args().collect();
        parse_arguments(&argv)
    }

    /// Resolve the non-ROS argv positions back to their strings
    #[must_use]
    pub fn unparsed_non_ros<'a, S: AsRef<str>>(&self, argv: &'a [S]) -> Vec<&'a str> {
        self.unparsed_nonros_indices
            .iter()
            .filter_map(|&i| argv.get(i).map(AsRef::as_ref))
            .collect()
    }

    /// Resolve the unrecognized in-region argv positions back to their
    /// strings
    #[must_use]
    pub fn unparsed_ros<'a, S: AsRef<str>>(&self, argv: &'a [S]) -> Vec<&'a str> {
        self.unparsed_ros_indices
            .iter()
            .filter_map(|&i| argv.get(i).map(AsRef::as_ref))
            .collect()
    }

    /// Remap rules applying to a node, by short name
    #[must_use]
    pub fn remap_rules_for_node(&self, node_name: &str) -> Vec<&RemapRule> {
        self.remap_rules
            .iter()
            .filter(|rule| rule.applies_to_node(node_name))
            .collect()
    }

    /// Every parameter override applying to a node FQN, wildcards included
    #[must_use]
    pub fn params_for_node(&self, node_fqn: &str) -> NodeParameters {
        self.param_overrides.params_for_node(node_fqn)
    }

    /// Post-parse compaction: release spare capacity everywhere
    pub(crate) fn shrink(&mut self) {
        self.remap_rules.shrink_to_fit();
        self.param_files.shrink_to_fit();
        self.param_overrides.shrink_to_fit();
        self.log_levels.shrink_to_fit();
        self.unparsed_ros_indices.shrink_to_fit();
        self.unparsed_nonros_indices.shrink_to_fit();
    }
}
