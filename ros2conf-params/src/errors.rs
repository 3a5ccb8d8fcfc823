//! Error types for parameter stores and parameter-file parsing

use std::path::PathBuf;
use thiserror::Error;
use yaml_rust2::scanner::ScanError;

/// Errors that can occur while loading or typing parameters
#[derive(Debug, Error)]
pub enum ParamsError {
    /// A parameter file could not be read
    #[error("failed to read parameter file '{path}': {source}")]
    Io {
        /// Path of the file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The YAML scanner rejected the input
    #[error("malformed YAML: {0}")]
    Scan(#[from] ScanError),

    /// The document does not follow the parameter-file shape
    #[error("invalid parameter file structure at line {line}: {reason}")]
    InvalidStructure {
        /// What was wrong
        reason: String,
        /// 1-based line of the offence
        line: usize,
    },

    /// A sequence mixed elements of different resolved types
    #[error(
        "heterogeneous sequence for parameter '{name}' at line {line}: \
         expected {expected}, found {found}"
    )]
    HeterogeneousSequence {
        /// The parameter being filled
        name: String,
        /// 1-based line of the offending element
        line: usize,
        /// Type fixed by the first element
        expected: &'static str,
        /// Type of the offending element
        found: &'static str,
    },

    /// A YAML feature outside the supported subset
    #[error("unsupported YAML feature at line {line}: {feature}")]
    Unsupported {
        /// The feature encountered
        feature: String,
        /// 1-based line of the offence
        line: usize,
    },

    /// A node key is not a valid node name, namespace path, or wildcard
    #[error("invalid node name key '{name}' at line {line}: {reason}")]
    InvalidNodeKey {
        /// The offending key
        name: String,
        /// Why the key was rejected
        reason: String,
        /// 1-based line of the key's mapping
        line: usize,
    },
}

/// Result type for parameter operations
pub type ParamsResult<T> = Result<T, ParamsError>;
