//! Error types for name lexing, validation, expansion, and remapping

use thiserror::Error;

use crate::validate::{
    EnclaveIssue, FqnIssue, NameKind, NamespaceIssue, NodeNameIssue, TopicNameIssue,
};

/// Errors that can occur while lexing, validating, expanding, or remapping names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// A topic name failed validation
    #[error("invalid topic name '{name}': {issue}")]
    InvalidTopicName {
        /// The invalid name
        name: String,
        /// The reason the name is invalid
        issue: TopicNameIssue,
    },

    /// A service name failed validation
    #[error("invalid service name '{name}': {issue}")]
    InvalidServiceName {
        /// The invalid name
        name: String,
        /// The reason the name is invalid
        issue: TopicNameIssue,
    },

    /// A node name failed validation
    #[error("invalid node name '{name}': {issue}")]
    InvalidNodeName {
        /// The invalid name
        name: String,
        /// The reason the name is invalid
        issue: NodeNameIssue,
    },

    /// A namespace failed validation
    #[error("invalid namespace '{name}': {issue}")]
    InvalidNamespace {
        /// The invalid namespace
        name: String,
        /// The reason the namespace is invalid
        issue: NamespaceIssue,
    },

    /// An enclave name failed validation
    #[error("invalid enclave name '{name}': {issue}")]
    InvalidEnclave {
        /// The invalid enclave name
        name: String,
        /// The reason the enclave name is invalid
        issue: EnclaveIssue,
    },

    /// An expanded name is not a valid fully qualified name
    #[error("invalid fully qualified {kind} name '{name}': {issue}")]
    InvalidFullyQualifiedName {
        /// The kind of name that failed validation
        kind: NameKind,
        /// The invalid name
        name: String,
        /// The reason the name is invalid
        issue: FqnIssue,
    },

    /// A `{token}` substitution did not resolve to anything known
    #[error("unknown substitution '{{{token}}}' in '{name}'")]
    UnknownSubstitution {
        /// The name containing the substitution
        name: String,
        /// The unresolved substitution token
        token: String,
    },

    /// A remap rule does not follow the remap grammar
    #[error("invalid remap rule '{rule}': {reason}")]
    InvalidRemapRule {
        /// The offending rule text
        rule: String,
        /// Why the rule was rejected
        reason: String,
    },

    /// A reserved but unimplemented construct (wildcard, back-reference)
    #[error("unsupported construct in '{input}' at offset {offset}: {feature}")]
    Unsupported {
        /// The input containing the construct
        input: String,
        /// Byte offset of the construct
        offset: usize,
        /// What was recognized but is not implemented
        feature: String,
    },

    /// The lexer met a character no token starts with
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedCharacter {
        /// The offending character
        found: char,
        /// Byte offset of the character
        offset: usize,
    },

    /// A specific lexeme was required but something else was found
    #[error("expected {expected} at offset {offset}")]
    WrongLexeme {
        /// Description of the expected lexeme
        expected: &'static str,
        /// Byte offset of the mismatch
        offset: usize,
    },
}

/// Result type for name operations
pub type NameResult<T> = Result<T, NameError>;
