//! Error types for argument parsing

use std::path::PathBuf;
use thiserror::Error;

use ros2conf_names::NameError;
use ros2conf_params::ParamsError;

/// Errors that can occur while parsing command-line arguments
#[derive(Debug, Error)]
pub enum ArgsError {
    /// A flag requiring a value appeared at the end of the argument vector
    #[error("missing value for argument '{0}'")]
    MissingArgumentValue(String),

    /// A parameter rule does not follow the parameter-rule grammar
    #[error("invalid parameter rule '{rule}': {reason}")]
    InvalidParamRule {
        /// The offending rule text
        rule: String,
        /// Why the rule was rejected
        reason: String,
    },

    /// A log-level rule does not follow the log-rule grammar
    #[error("invalid log level rule '{rule}': {reason}")]
    InvalidLogLevelRule {
        /// The offending rule text
        rule: String,
        /// Why the rule was rejected
        reason: String,
    },

    /// A name, namespace, enclave, or remap rule was rejected
    #[error(transparent)]
    Name(#[from] NameError),

    /// A parameter file failed to load
    #[error("failed to load parameter file '{path}': {source}")]
    ParamFile {
        /// Path given on the command line
        path: PathBuf,
        /// What went wrong while loading it
        source: ParamsError,
    },

    /// The two middleware-identifier environment variables disagree
    #[error(
        "middleware identifier mismatch: RMW_IMPLEMENTATION='{rmw_implementation}' \
         but RCL_ASSERT_RMW_ID_MATCHES expects '{expected}'"
    )]
    MismatchedRmwId {
        /// Value of `RMW_IMPLEMENTATION`
        rmw_implementation: String,
        /// Value of `RCL_ASSERT_RMW_ID_MATCHES`
        expected: String,
    },
}

impl ArgsError {
    /// Recommended process exit code for this error
    ///
    /// `0` is success; each error kind maps to a distinct non-zero value.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingArgumentValue(_) => 11,
            Self::Name(name) => match name {
                NameError::InvalidRemapRule { .. } => 15,
                NameError::Unsupported { .. } => 18,
                _ => 13,
            },
            Self::InvalidParamRule { .. } | Self::ParamFile { .. } => 14,
            Self::InvalidLogLevelRule { .. } => 16,
            Self::MismatchedRmwId { .. } => 17,
        }
    }
}

/// Result type for argument-parsing operations
pub type ArgsResult<T> = Result<T, ArgsError>;
