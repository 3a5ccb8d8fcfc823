#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! Node configuration core
//!
//! Turns untyped external inputs — a command-line argument vector and one
//! or more YAML parameter files — into validated, typed, hierarchically
//! scoped configuration for graph participants.
//!
//! The grammar recognizes a bracketed region inside a normal argv:
//!
//! ```text
//! <program> [nonros…] [--ros-args <ros-arg>… [-- [nonros…]]] […]
//! ```
//!
//! and within it name remaps (`-r`), parameter overrides (`-p`),
//! parameter files (`--params-file`), log levels (`--log-level`), an
//! enclave (`-e`), a log configuration file, and the three tri-state
//! logging switches. YAML parameter handling lives in
//! [`ros2conf_params`], name handling in [`ros2conf_names`]; both are
//! re-exported here.
//!
//! # Examples
//!
//! ```
//! use ros2conf::{Arguments, Value};
//!
//! let args = Arguments::from_args([
//!     "talker",
//!     "--ros-args",
//!     "-r",
//!     "chatter:=/ns/chat",
//!     "-p",
//!     "rate:=30",
//!     "--log-level",
//!     "debug",
//!     "--",
//!     "extra",
//! ])?;
//!
//! assert_eq!(args.remap_rules.len(), 1);
//! assert_eq!(
//!     args.param_overrides.node("/**").unwrap().get("rate"),
//!     Some(&Value::I64(30))
//! );
//! # Ok::<(), ros2conf::ArgsError>(())
//! ```

mod arguments;
mod errors;
mod log_levels;
mod param_rule;
mod parser;

pub mod env;
pub mod logging;

pub use arguments::{Arguments, LoggingDirectives};
pub use errors::{ArgsError, ArgsResult};
pub use log_levels::{LogLevels, LogSeverity, LoggerSetting};
pub use parser::{ROS_ARGS_END, ROS_ARGS_FLAG, parse_arguments};

pub use ros2conf_names::{
    NameError, NameKind, RemapRule, RemapScope, Substitutions, expand_topic_name, node_fqn,
    parse_remap_rule, remap_node_name, remap_node_namespace, remap_service_name, remap_topic_name,
    validate_enclave_name, validate_fully_qualified_name, validate_namespace, validate_node_name,
    validate_topic_name,
};
pub use ros2conf_params::{
    NodeParameters, ParameterStore, ParamsError, Value, key_matches_node, parse_param_file,
    parse_param_str, parse_param_value,
};
