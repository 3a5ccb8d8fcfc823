//! Expansion of topic and service names to their fully qualified form

use std::collections::HashMap;

use crate::errors::{NameError, NameResult};
use crate::validate::{validate_namespace, validate_node_name, validate_topic_name};

/// Caller-supplied `{token}` substitution mapping
///
/// The built-ins `{node}`, `{ns}`, and `{namespace}` are always available
/// and take precedence over entries in this map.
pub type Substitutions = HashMap<String, String>;

/// Build the fully qualified node name from namespace and node name
///
/// # Examples
///
/// ```
/// use ros2conf_names::node_fqn;
///
/// assert_eq!(node_fqn("/my_ns", "my_node"), "/my_ns/my_node");
/// assert_eq!(node_fqn("/", "my_node"), "/my_node");
/// ```
#[must_use]
pub fn node_fqn(namespace: &str, node_name: &str) -> String {
    if namespace == "/" {
        format!("/{node_name}")
    } else {
        format!("{namespace}/{node_name}")
    }
}

/// Expand a topic or service name to its fully qualified form
///
/// Expansion resolves, in order: the private prefix `~/` (and the bare
/// `~`), `{token}` substitutions, and finally prefixes relative names with
/// the node's namespace. The result always starts with `/`; callers that
/// need the strict form apply
/// [`validate_fully_qualified_name`](crate::validate_fully_qualified_name)
/// afterwards.
///
/// # Errors
///
/// Returns an error if any input fails validation or a substitution token
/// is neither a built-in nor present in `substitutions`.
///
/// # Examples
///
/// ```
/// use ros2conf_names::{Substitutions, expand_topic_name};
///
/// let subs = Substitutions::new();
/// assert_eq!(
///     expand_topic_name("~/status", "alice", "/ns1", &subs).unwrap(),
///     "/ns1/alice/status"
/// );
/// assert_eq!(
///     expand_topic_name("chatter", "alice", "/ns1", &subs).unwrap(),
///     "/ns1/chatter"
/// );
/// assert_eq!(
///     expand_topic_name("/already/absolute", "alice", "/ns1", &subs).unwrap(),
///     "/already/absolute"
/// );
/// assert_eq!(
///     expand_topic_name("{node}/odom", "alice", "/", &subs).unwrap(),
///     "/alice/odom"
/// );
/// ```
pub fn expand_topic_name(
    name: &str,
    node_name: &str,
    node_namespace: &str,
    substitutions: &Substitutions,
) -> NameResult<String> {
    validate_topic_name(name).map_err(|issue| NameError::InvalidTopicName {
        name: name.to_string(),
        issue,
    })?;
    validate_node_name(node_name).map_err(|issue| NameError::InvalidNodeName {
        name: node_name.to_string(),
        issue,
    })?;
    validate_namespace(node_namespace).map_err(|issue| NameError::InvalidNamespace {
        name: node_namespace.to_string(),
        issue,
    })?;

    if name.starts_with('/') && !name.contains('{') {
        return Ok(name.to_string());
    }

    let mut expanded = if name == "~" {
        node_fqn(node_namespace, node_name)
    } else if let Some(rest) = name.strip_prefix("~/") {
        format!("{}/{rest}", node_fqn(node_namespace, node_name))
    } else {
        name.to_string()
    };

    if expanded.contains('{') {
        expanded = apply_substitutions(&expanded, name, node_name, node_namespace, substitutions)?;
    }

    if !expanded.starts_with('/') {
        expanded = if node_namespace == "/" {
            format!("/{expanded}")
        } else {
            format!("{node_namespace}/{expanded}")
        };
    }
    Ok(expanded)
}

fn apply_substitutions(
    input: &str,
    original: &str,
    node_name: &str,
    node_namespace: &str,
    substitutions: &Substitutions,
) -> NameResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        // topic validation checked brace balance
        let Some(offset) = rest[open..].find('}') else {
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let close = open + offset;
        let token = &rest[open + 1..close];
        match token {
            "node" => out.push_str(node_name),
            "ns" | "namespace" => out.push_str(node_namespace),
            _ => match substitutions.get(token) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(NameError::UnknownSubstitution {
                        name: original.to_string(),
                        token: token.to_string(),
                    });
                }
            },
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(pairs: &[(&str, &str)]) -> Substitutions {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_absolute_names_pass_through() {
        let s = Substitutions::new();
        assert_eq!(
            expand_topic_name("/foo/bar", "n", "/ns", &s).unwrap(),
            "/foo/bar"
        );
    }

    #[test]
    fn test_private_names() {
        let s = Substitutions::new();
        assert_eq!(
            expand_topic_name("~/status", "alice", "/ns1", &s).unwrap(),
            "/ns1/alice/status"
        );
        assert_eq!(
            expand_topic_name("~/status", "alice", "/", &s).unwrap(),
            "/alice/status"
        );
        assert_eq!(expand_topic_name("~", "alice", "/ns1", &s).unwrap(), "/ns1/alice");
        assert_eq!(expand_topic_name("~", "alice", "/", &s).unwrap(), "/alice");
    }

    #[test]
    fn test_relative_names() {
        let s = Substitutions::new();
        assert_eq!(
            expand_topic_name("chatter", "n", "/deep/ns", &s).unwrap(),
            "/deep/ns/chatter"
        );
        assert_eq!(expand_topic_name("chatter", "n", "/", &s).unwrap(), "/chatter");
    }

    #[test]
    fn test_builtin_substitutions() {
        let s = Substitutions::new();
        assert_eq!(
            expand_topic_name("{node}/odom", "alice", "/ns", &s).unwrap(),
            "/ns/alice/odom"
        );
        assert_eq!(
            expand_topic_name("{ns}/raw", "alice", "/ns", &s).unwrap(),
            "/ns/raw"
        );
        assert_eq!(
            expand_topic_name("{namespace}/raw", "alice", "/ns", &s).unwrap(),
            "/ns/raw"
        );
    }

    #[test]
    fn test_caller_substitutions() {
        let s = subs(&[("robot", "r2d2")]);
        assert_eq!(
            expand_topic_name("{robot}/cmd", "n", "/fleet", &s).unwrap(),
            "/fleet/r2d2/cmd"
        );
    }

    #[test]
    fn test_unknown_substitution() {
        let s = Substitutions::new();
        let err = expand_topic_name("{mystery}/x", "n", "/", &s).unwrap_err();
        assert_eq!(
            err,
            NameError::UnknownSubstitution {
                name: "{mystery}/x".to_string(),
                token: "mystery".to_string(),
            }
        );
    }

    #[test]
    fn test_absolute_with_substitution_is_expanded() {
        let s = Substitutions::new();
        assert_eq!(
            expand_topic_name("/base/{node}", "alice", "/ns", &s).unwrap(),
            "/base/alice"
        );
    }

    #[test]
    fn test_expansion_idempotent_for_fqns() {
        let s = Substitutions::new();
        for name in ["/a", "/a/b", "/deep/ly/nested"] {
            assert_eq!(expand_topic_name(name, "n", "/ns", &s).unwrap(), name);
        }
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let s = Substitutions::new();
        assert!(expand_topic_name("foo//bar", "n", "relative", &s).is_err());
        assert!(expand_topic_name("ok", "bad/name", "/", &s).is_err());
        assert!(expand_topic_name("9bad", "n", "/", &s).is_err());
    }
}
