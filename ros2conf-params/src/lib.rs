#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! Typed parameter store and YAML parameter-file parser
//!
//! This crate turns YAML parameter files and CLI value strings into typed,
//! hierarchically-scoped parameters:
//!
//! - [`Value`] — tagged sum over bool/int/float/string scalars and their
//!   homogeneous arrays
//! - [`NodeParameters`] / [`ParameterStore`] — insertion-ordered two-level
//!   mapping from node FQN keys (wildcards `/**`, `/*`, and `/ns/*`
//!   included) through dotted parameter names to values
//! - [`parse_param_file`] / [`parse_param_str`] — a streaming YAML
//!   event consumer implementing the `ros__parameters` document shape
//! - [`parse_param_value`] — the value-suffix parser behind
//!   `-p name:=value`
//!
//! # Examples
//!
//! ```
//! use ros2conf_params::{ParameterStore, Value, parse_param_str};
//!
//! let mut store = ParameterStore::new();
//! parse_param_str(
//!     "/my_node:\n  ros__parameters:\n    rate: 30\n    frame: base_link\n",
//!     &mut store,
//! )?;
//!
//! let params = store.node("/my_node").unwrap();
//! assert_eq!(params.get("rate"), Some(&Value::I64(30)));
//! assert_eq!(params.get("frame"), Some(&Value::String("base_link".to_string())));
//! # Ok::<(), ros2conf_params::ParamsError>(())
//! ```

mod errors;
mod store;
mod value;
mod yaml;

pub use errors::{ParamsError, ParamsResult};
pub use store::{NodeParameters, ParameterStore, key_matches_node};
pub use value::Value;
pub use yaml::{PARAMS_KEY, parse_param_file, parse_param_str, parse_param_value};
