#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! Graph resource names: lexing, validation, expansion, and remapping
//!
//! This crate is the name-handling layer of the node configuration core.
//! It provides:
//!
//! - a shared [`lexer`] with two-token lookahead used by the remap and
//!   parameter-rule grammars
//! - allocation-free validators ([`validate_topic_name`],
//!   [`validate_node_name`], [`validate_namespace`],
//!   [`validate_enclave_name`]) reporting a specific reason with a byte
//!   offset
//! - [`expand_topic_name`], turning relative, private (`~/`), and
//!   `{token}`-substituted names into fully qualified ones
//! - the remap-rule grammar and the rule-matching engine
//!   ([`parse_remap_rule`], [`remap_topic_name`], [`remap_node_name`], …)
//!
//! # Examples
//!
//! ```
//! use ros2conf_names::{Substitutions, expand_topic_name, parse_remap_rule, remap_topic_name};
//!
//! let subs = Substitutions::new();
//! let name = expand_topic_name("~/status", "alice", "/ns1", &subs)?;
//! assert_eq!(name, "/ns1/alice/status");
//!
//! let rules = vec![parse_remap_rule("~/status:=/diagnostics")?];
//! let remapped = remap_topic_name(&name, &[], &rules, "alice", "/ns1", &subs)?;
//! assert_eq!(remapped.as_deref(), Some("/diagnostics"));
//! # Ok::<(), ros2conf_names::NameError>(())
//! ```

mod errors;
pub mod lexer;

mod expand;
mod remap;
mod validate;

pub use errors::{NameError, NameResult};
pub use expand::{Substitutions, expand_topic_name, node_fqn};
pub use remap::{
    RemapRule, RemapScope, parse_remap_rule, remap_node_name, remap_node_namespace,
    remap_service_name, remap_topic_name,
};
pub use validate::{
    ENCLAVE_NAME_MAX_LENGTH, EnclaveIssue, FqnIssue, NAMESPACE_MAX_LENGTH, NODE_NAME_MAX_LENGTH,
    NameKind, NamespaceIssue, NodeNameIssue, TOPIC_NAME_MAX_LENGTH, TopicNameIssue,
    validate_enclave_name, validate_fully_qualified_name, validate_namespace, validate_node_name,
    validate_topic_name,
};
