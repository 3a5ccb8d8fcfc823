//! Insertion-ordered parameter stores
//!
//! A [`ParameterStore`] maps node FQN keys (or the wildcards `/**`, `/*`,
//! and terminal-wildcard paths such as `/ns/*`) to [`NodeParameters`],
//! which map dotted parameter names to typed values. Both levels keep
//! insertion order for deterministic printing and deduplicate keys on
//! write.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Parameters of one node: dotted name → typed value
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeParameters {
    entries: Vec<(String, Value)>,
}

impl NodeParameters {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parameter by its dotted name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }

    /// Set a parameter, replacing any previous value in place
    pub fn set(&mut self, name: &str, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }
}

/// Two-level parameter store: node FQN key → [`NodeParameters`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterStore {
    nodes: Vec<(String, NodeParameters)>,
}

impl ParameterStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node entry by its exact key
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&NodeParameters> {
        self.nodes
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Get the entry for a node key, creating it if absent
    pub fn node_mut(&mut self, key: &str) -> &mut NodeParameters {
        let idx = match self.nodes.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.nodes.push((key.to_string(), NodeParameters::new()));
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[idx].1
    }

    /// Set a single parameter under a node key
    pub fn set(&mut self, key: &str, name: &str, value: Value) {
        self.node_mut(key).set(name, value);
    }

    /// Fold another store into this one
    ///
    /// Entries of `other` override same-named parameters already present;
    /// node and parameter insertion order is otherwise preserved.
    pub fn merge(&mut self, other: ParameterStore) {
        for (key, params) in other.nodes {
            let node = self.node_mut(&key);
            for (name, value) in params.entries {
                node.set(&name, value);
            }
        }
    }

    /// Iterate node entries in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeParameters)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of node entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store holds no node entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Release spare capacity after parsing settles
    pub fn shrink_to_fit(&mut self) {
        for (_, params) in &mut self.nodes {
            params.shrink_to_fit();
        }
        self.nodes.shrink_to_fit();
    }

    /// Collect every parameter applying to a node, wildcard keys included
    ///
    /// Store entries are visited in insertion order and matched against the
    /// node's FQN with [`key_matches_node`]; later matches override earlier
    /// ones parameter by parameter.
    #[must_use]
    pub fn params_for_node(&self, node_fqn: &str) -> NodeParameters {
        let mut out = NodeParameters::new();
        for (key, params) in &self.nodes {
            if key_matches_node(key, node_fqn) {
                for (name, value) in params.iter() {
                    out.set(name, value.clone());
                }
            }
        }
        out
    }
}

impl fmt::Display for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, params) in &self.nodes {
            writeln!(f, "{key}:")?;
            writeln!(f, "  ros__parameters:")?;
            for (name, value) in params.iter() {
                writeln!(f, "    {name}: {value}")?;
            }
        }
        Ok(())
    }
}

/// Match a store key against a node FQN
///
/// `*` matches exactly one slash-delimited token, `**` matches zero or
/// more; anything else matches literally.
///
/// # Examples
///
/// ```
/// use ros2conf_params::key_matches_node;
///
/// assert!(key_matches_node("/**", "/foo/bar"));
/// assert!(key_matches_node("/foo/*", "/foo/bar"));
/// assert!(!key_matches_node("/foo/*", "/foo/bar/baz"));
/// assert!(key_matches_node("/ns/node", "/ns/node"));
/// ```
#[must_use]
pub fn key_matches_node(key: &str, node_fqn: &str) -> bool {
    let pattern: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
    let name: Vec<&str> = node_fqn.split('/').filter(|s| !s.is_empty()).collect();
    match_tokens(&pattern, &name)
}

fn match_tokens(pattern: &[&str], name: &[&str]) -> bool {
    let Some((head, tail)) = pattern.split_first() else {
        return name.is_empty();
    };
    match *head {
        "**" => (0..=name.len()).any(|skip| match_tokens(tail, &name[skip..])),
        "*" => !name.is_empty() && match_tokens(tail, &name[1..]),
        literal => name.first() == Some(&literal) && match_tokens(tail, &name[1..]),
    }
}
