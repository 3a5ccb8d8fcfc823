//! Remap rules: grammar, rule set matching, and name resolution
//!
//! A remap rule pairs a match with a replacement, optionally scoped to one
//! node by short-name prefix and to one kind of name by a URL-style tag or
//! the reserved `__ns` / `__node` targets:
//!
//! ```text
//! [node ":"] match ":=" replacement
//! [node ":"] "rostopic://" match ":=" replacement
//! [node ":"] "rosservice://" match ":=" replacement
//! [node ":"] "__ns" ":=" /fully/qualified/namespace
//! [node ":"] "__node" ":=" new_name        ("__name" is an alias)
//! ```
//!
//! Wildcards (`*`, `**`) and back-references (`\1` … `\9`) are reserved:
//! the parser recognizes them and rejects the rule as unsupported.

use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{NameError, NameResult};
use crate::expand::{Substitutions, expand_topic_name};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::validate::{NameKind, validate_fully_qualified_name};

/// The set of name kinds a remap rule applies to
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemapScope(u8);

impl RemapScope {
    /// Topic names
    pub const TOPIC: Self = Self(1);
    /// Service names
    pub const SERVICE: Self = Self(1 << 1);
    /// Node base names
    pub const NODE_NAME: Self = Self(1 << 2);
    /// Node namespaces
    pub const NAMESPACE: Self = Self(1 << 3);

    /// Whether the scope covers the given kind
    #[must_use]
    pub const fn contains(self, kind: NameKind) -> bool {
        self.0 & Self::from_kind(kind).0 != 0
    }

    const fn from_kind(kind: NameKind) -> Self {
        match kind {
            NameKind::Topic => Self::TOPIC,
            NameKind::Service => Self::SERVICE,
            NameKind::NodeName => Self::NODE_NAME,
            NameKind::Namespace => Self::NAMESPACE,
        }
    }
}

impl std::ops::BitOr for RemapScope {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::fmt::Debug for RemapScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut set = f.debug_set();
        for (bit, kind) in [
            (Self::TOPIC, NameKind::Topic),
            (Self::SERVICE, NameKind::Service),
            (Self::NODE_NAME, NameKind::NodeName),
            (Self::NAMESPACE, NameKind::Namespace),
        ] {
            if self.0 & bit.0 != 0 {
                set.entry(&kind);
            }
        }
        set.finish()
    }
}

/// A parsed remap rule
///
/// Rules are matched in insertion order, local rules before global ones,
/// and the first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemapRule {
    /// The name kinds this rule applies to
    pub scope: RemapScope,
    /// Restricts the rule to one node by short name; `None` applies to any
    pub node_prefix: Option<String>,
    /// The name to match; `None` for node-name and namespace rules, whose
    /// match is implicit
    pub match_pattern: Option<String>,
    /// The replacement text
    pub replacement: String,
}

impl RemapRule {
    /// Whether this rule applies to the given node
    #[must_use]
    pub fn applies_to_node(&self, node_name: &str) -> bool {
        self.node_prefix.as_deref().is_none_or(|p| p == node_name)
    }
}

/// Parse a remap rule from its command-line spelling
///
/// # Errors
///
/// Returns [`NameError::InvalidRemapRule`] when the text fails the grammar
/// and [`NameError::Unsupported`] for wildcards and back-references.
///
/// # Examples
///
/// ```
/// use ros2conf_names::{RemapScope, parse_remap_rule};
///
/// let rule = parse_remap_rule("chatter:=/ns/chat").unwrap();
/// assert_eq!(rule.scope, RemapScope::TOPIC | RemapScope::SERVICE);
/// assert_eq!(rule.match_pattern.as_deref(), Some("chatter"));
/// assert_eq!(rule.replacement, "/ns/chat");
///
/// let rule = parse_remap_rule("alice:__ns:=/ns2").unwrap();
/// assert_eq!(rule.node_prefix.as_deref(), Some("alice"));
/// assert_eq!(rule.scope, RemapScope::NAMESPACE);
/// ```
pub fn parse_remap_rule(rule: &str) -> NameResult<RemapRule> {
    let mut lex = Lexer::new(rule);

    let mut node_prefix = None;
    if lex.peek().map_err(|e| grammar_error(rule, &e))?.kind == TokenKind::Token
        && lex.peek2().map_err(|e| grammar_error(rule, &e))?.kind == TokenKind::Colon
    {
        let token = lex.next_token().map_err(|e| grammar_error(rule, &e))?;
        node_prefix = Some(lex.text(token).to_string());
        lex.next_token().map_err(|e| grammar_error(rule, &e))?;
    }

    let head = lex.peek().map_err(|e| grammar_error(rule, &e))?;
    let parsed = match head.kind {
        TokenKind::Ns => parse_namespace_rule(&mut lex, rule, node_prefix),
        TokenKind::Node => parse_node_name_rule(&mut lex, rule, node_prefix),
        _ => parse_name_rule(&mut lex, rule, node_prefix),
    };
    parsed.map_err(|e| grammar_error(rule, &e))
}

/// Fold lexer-level errors into `InvalidRemapRule`, keeping the
/// distinguishable kinds intact
fn grammar_error(rule: &str, err: &NameError) -> NameError {
    match err {
        NameError::UnexpectedCharacter { .. } | NameError::WrongLexeme { .. } => {
            NameError::InvalidRemapRule {
                rule: rule.to_string(),
                reason: err.to_string(),
            }
        }
        other => other.clone(),
    }
}

fn reject_reserved(rule: &str, token: Token) -> NameError {
    let feature = match token.kind {
        TokenKind::WildOne => "wildcard '*' in remap rules is not implemented",
        TokenKind::WildMulti => "wildcard '**' in remap rules is not implemented",
        _ => "back-references in remap rules are not implemented",
    };
    NameError::Unsupported {
        input: rule.to_string(),
        offset: token.start,
        feature: feature.to_string(),
    }
}

fn parse_namespace_rule(
    lex: &mut Lexer<'_>,
    rule: &str,
    node_prefix: Option<String>,
) -> NameResult<RemapRule> {
    lex.next_token()?;
    lex.expect(TokenKind::Separator)?;

    let first = lex.peek()?;
    if first.kind != TokenKind::ForwardSlash {
        warn!(rule, "rejecting namespace replacement that is not fully qualified");
        return Err(NameError::InvalidRemapRule {
            rule: rule.to_string(),
            reason: "namespace replacement must be absolute, it must lead with a '/'".to_string(),
        });
    }
    lex.next_token()?;

    let mut replacement = String::new();
    loop {
        let token = lex.peek()?;
        match token.kind {
            TokenKind::Token => {
                replacement.push('/');
                replacement.push_str(lex.text(token));
                lex.next_token()?;
            }
            TokenKind::WildOne | TokenKind::WildMulti | TokenKind::BackRef => {
                return Err(reject_reserved(rule, token));
            }
            // a single trailing slash is grammatical, normalize it away
            TokenKind::Eof if !replacement.is_empty() => break,
            _ => {
                return Err(NameError::WrongLexeme {
                    expected: "a namespace token",
                    offset: token.start,
                });
            }
        }
        if lex.accept(TokenKind::ForwardSlash)?.is_none() {
            break;
        }
    }
    lex.expect(TokenKind::Eof)?;

    Ok(RemapRule {
        scope: RemapScope::NAMESPACE,
        node_prefix,
        match_pattern: None,
        replacement,
    })
}

fn parse_node_name_rule(
    lex: &mut Lexer<'_>,
    rule: &str,
    node_prefix: Option<String>,
) -> NameResult<RemapRule> {
    lex.next_token()?;
    lex.expect(TokenKind::Separator)?;

    let token = lex.peek()?;
    if matches!(
        token.kind,
        TokenKind::WildOne | TokenKind::WildMulti | TokenKind::BackRef
    ) {
        return Err(reject_reserved(rule, token));
    }
    let token = lex.expect(TokenKind::Token)?;
    let replacement = lex.text(token).to_string();
    lex.expect(TokenKind::Eof)?;

    Ok(RemapRule {
        scope: RemapScope::NODE_NAME,
        node_prefix,
        match_pattern: None,
        replacement,
    })
}

fn parse_name_rule(
    lex: &mut Lexer<'_>,
    rule: &str,
    node_prefix: Option<String>,
) -> NameResult<RemapRule> {
    let scope = if lex.accept(TokenKind::UrlTopic)?.is_some() {
        RemapScope::TOPIC
    } else if lex.accept(TokenKind::UrlService)?.is_some() {
        RemapScope::SERVICE
    } else {
        RemapScope::TOPIC | RemapScope::SERVICE
    };

    let match_pattern = parse_name(lex, rule)?;
    lex.expect(TokenKind::Separator)?;
    let replacement = parse_name(lex, rule)?;
    lex.expect(TokenKind::Eof)?;

    Ok(RemapRule {
        scope,
        node_prefix,
        match_pattern: Some(match_pattern),
        replacement,
    })
}

/// `["~/" | "/"] segment ("/" segment)*`
fn parse_name(lex: &mut Lexer<'_>, rule: &str) -> NameResult<String> {
    let mut out = String::new();
    if lex.accept(TokenKind::TildeSlash)?.is_some() {
        out.push_str("~/");
    } else if lex.accept(TokenKind::ForwardSlash)?.is_some() {
        out.push('/');
    }

    loop {
        let token = lex.peek()?;
        match token.kind {
            TokenKind::Token => {
                out.push_str(lex.text(token));
                lex.next_token()?;
            }
            TokenKind::WildOne | TokenKind::WildMulti | TokenKind::BackRef => {
                return Err(reject_reserved(rule, token));
            }
            _ => {
                return Err(NameError::WrongLexeme {
                    expected: "a name token",
                    offset: token.start,
                });
            }
        }
        if lex.accept(TokenKind::ForwardSlash)?.is_none() {
            break;
        }
        out.push('/');
    }
    Ok(out)
}

/// Find the first rule of `rules` matching `kind` for the given node
///
/// For topic and service kinds the rule's match pattern is expanded and
/// compared with the (already expanded) `name`; an unknown substitution in
/// a single rule skips that rule, any other expansion failure aborts.
fn first_match<'r>(
    kind: NameKind,
    name: &str,
    rules: &'r [RemapRule],
    node_name: &str,
    node_namespace: &str,
    substitutions: &Substitutions,
) -> NameResult<Option<&'r RemapRule>> {
    for rule in rules {
        if !rule.scope.contains(kind) || !rule.applies_to_node(node_name) {
            continue;
        }
        match kind {
            NameKind::Topic | NameKind::Service => {
                let Some(pattern) = rule.match_pattern.as_deref() else {
                    continue;
                };
                match expand_topic_name(pattern, node_name, node_namespace, substitutions) {
                    Ok(expanded) if expanded == name => return Ok(Some(rule)),
                    Ok(_) => {}
                    Err(NameError::UnknownSubstitution { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            NameKind::NodeName | NameKind::Namespace => return Ok(Some(rule)),
        }
    }
    Ok(None)
}

fn remap_expanded_name(
    kind: NameKind,
    name: &str,
    local_rules: &[RemapRule],
    global_rules: &[RemapRule],
    node_name: &str,
    node_namespace: &str,
    substitutions: &Substitutions,
) -> NameResult<Option<String>> {
    for rules in [local_rules, global_rules] {
        if let Some(rule) = first_match(kind, name, rules, node_name, node_namespace, substitutions)?
        {
            let replaced =
                expand_topic_name(&rule.replacement, node_name, node_namespace, substitutions)?;
            validate_fully_qualified_name(&replaced).map_err(|issue| {
                NameError::InvalidFullyQualifiedName {
                    kind,
                    name: replaced.clone(),
                    issue,
                }
            })?;
            return Ok(Some(replaced));
        }
    }
    Ok(None)
}

/// Remap an expanded topic name against two ordered rule sets
///
/// `name` must already be fully qualified (see
/// [`expand_topic_name`](crate::expand_topic_name)). Local rules are
/// scanned before global rules, in insertion order; only the first matching
/// rule applies. Returns `None` when no rule matches.
///
/// # Errors
///
/// Returns an error when a rule's match or replacement expands to an
/// invalid name.
pub fn remap_topic_name(
    name: &str,
    local_rules: &[RemapRule],
    global_rules: &[RemapRule],
    node_name: &str,
    node_namespace: &str,
    substitutions: &Substitutions,
) -> NameResult<Option<String>> {
    remap_expanded_name(
        NameKind::Topic,
        name,
        local_rules,
        global_rules,
        node_name,
        node_namespace,
        substitutions,
    )
}

/// Remap an expanded service name against two ordered rule sets
///
/// Identical to [`remap_topic_name`] but matches rules whose scope covers
/// services.
///
/// # Errors
///
/// Returns an error when a rule's match or replacement expands to an
/// invalid name.
pub fn remap_service_name(
    name: &str,
    local_rules: &[RemapRule],
    global_rules: &[RemapRule],
    node_name: &str,
    node_namespace: &str,
    substitutions: &Substitutions,
) -> NameResult<Option<String>> {
    remap_expanded_name(
        NameKind::Service,
        name,
        local_rules,
        global_rules,
        node_name,
        node_namespace,
        substitutions,
    )
}

fn first_implicit_match<'r>(
    kind: NameKind,
    local_rules: &'r [RemapRule],
    global_rules: &'r [RemapRule],
    node_name: &str,
) -> Option<&'r RemapRule> {
    [local_rules, global_rules]
        .into_iter()
        .flatten()
        .find(|rule| rule.scope.contains(kind) && rule.applies_to_node(node_name))
}

/// Look up a node-name replacement for the given node
///
/// The match is implicit: the first node-name rule applying to `node_name`
/// wins. Returns `None` when no rule matches.
#[must_use]
pub fn remap_node_name(
    local_rules: &[RemapRule],
    global_rules: &[RemapRule],
    node_name: &str,
) -> Option<String> {
    first_implicit_match(NameKind::NodeName, local_rules, global_rules, node_name)
        .map(|rule| rule.replacement.clone())
}

/// Look up a namespace replacement for the given node
///
/// The match is implicit: the first namespace rule applying to `node_name`
/// wins. Returns `None` when no rule matches.
#[must_use]
pub fn remap_node_namespace(
    local_rules: &[RemapRule],
    global_rules: &[RemapRule],
    node_name: &str,
) -> Option<String> {
    first_implicit_match(NameKind::Namespace, local_rules, global_rules, node_name)
        .map(|rule| rule.replacement.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_rule() {
        let rule = parse_remap_rule("chatter:=/ns/chat").unwrap();
        assert_eq!(rule.scope, RemapScope::TOPIC | RemapScope::SERVICE);
        assert_eq!(rule.node_prefix, None);
        assert_eq!(rule.match_pattern.as_deref(), Some("chatter"));
        assert_eq!(rule.replacement, "/ns/chat");
    }

    #[test]
    fn test_parse_node_prefixed_rule() {
        let rule = parse_remap_rule("alice:foo:=bar").unwrap();
        assert_eq!(rule.node_prefix.as_deref(), Some("alice"));
        assert_eq!(rule.match_pattern.as_deref(), Some("foo"));
        assert_eq!(rule.replacement, "bar");
    }

    #[test]
    fn test_parse_url_scoped_rules() {
        let rule = parse_remap_rule("rostopic://foo:=bar").unwrap();
        assert_eq!(rule.scope, RemapScope::TOPIC);
        let rule = parse_remap_rule("rosservice://foo:=bar").unwrap();
        assert_eq!(rule.scope, RemapScope::SERVICE);
    }

    #[test]
    fn test_parse_private_and_absolute_names() {
        let rule = parse_remap_rule("~/in:=/out/deep").unwrap();
        assert_eq!(rule.match_pattern.as_deref(), Some("~/in"));
        assert_eq!(rule.replacement, "/out/deep");
    }

    #[test]
    fn test_parse_namespace_rule() {
        let rule = parse_remap_rule("__ns:=/ns2").unwrap();
        assert_eq!(rule.scope, RemapScope::NAMESPACE);
        assert_eq!(rule.match_pattern, None);
        assert_eq!(rule.replacement, "/ns2");
    }

    #[test]
    fn test_parse_namespace_rule_trailing_slash_normalized() {
        let rule = parse_remap_rule("__ns:=/a/b/").unwrap();
        assert_eq!(rule.replacement, "/a/b");
    }

    #[test]
    fn test_namespace_rule_must_be_absolute() {
        let err = parse_remap_rule("__ns:=relative").unwrap_err();
        assert!(matches!(err, NameError::InvalidRemapRule { .. }));
    }

    #[test]
    fn test_namespace_rule_rejects_bare_root() {
        assert!(parse_remap_rule("__ns:=/").is_err());
    }

    #[test]
    fn test_parse_node_name_rule_and_alias() {
        let rule = parse_remap_rule("__node:=bob").unwrap();
        assert_eq!(rule.scope, RemapScope::NODE_NAME);
        assert_eq!(rule.replacement, "bob");
        let alias = parse_remap_rule("__name:=bob").unwrap();
        assert_eq!(alias, rule);
    }

    #[test]
    fn test_node_name_replacement_must_be_bare() {
        assert!(parse_remap_rule("__node:=/abs").is_err());
        assert!(parse_remap_rule("__node:=a/b").is_err());
    }

    #[test]
    fn test_wildcards_are_recognized_and_rejected() {
        for spec in ["*:=foo", "**:=foo", "foo/*:=bar", "foo:=**", "__node:=*"] {
            let err = parse_remap_rule(spec).unwrap_err();
            assert!(
                matches!(err, NameError::Unsupported { .. }),
                "expected unsupported for '{spec}', got {err:?}"
            );
        }
    }

    #[test]
    fn test_backrefs_are_recognized_and_rejected() {
        let err = parse_remap_rule("foo:=\\1").unwrap_err();
        assert!(matches!(err, NameError::Unsupported { .. }));
    }

    #[test]
    fn test_malformed_rules() {
        for spec in ["", "foo", "foo:=", ":=bar", "foo:=bar:=baz", "a:b:c:=d"] {
            assert!(
                parse_remap_rule(spec).is_err(),
                "expected '{spec}' to be rejected"
            );
        }
    }

    fn rules(specs: &[&str]) -> Vec<RemapRule> {
        specs.iter().map(|s| parse_remap_rule(s).unwrap()).collect()
    }

    #[test]
    fn test_first_match_wins_over_specificity() {
        let subs = Substitutions::new();
        let ordered = rules(&["alice:foo:=bar", "foo:=baz"]);

        let for_alice = remap_topic_name("/foo", &[], &ordered, "alice", "/", &subs).unwrap();
        assert_eq!(for_alice.as_deref(), Some("/bar"));

        let for_bob = remap_topic_name("/foo", &[], &ordered, "bob", "/", &subs).unwrap();
        assert_eq!(for_bob.as_deref(), Some("/baz"));

        // reversed: the general rule shadows the node-specific one for everyone
        let reversed = rules(&["foo:=baz", "alice:foo:=bar"]);
        let for_alice = remap_topic_name("/foo", &[], &reversed, "alice", "/", &subs).unwrap();
        assert_eq!(for_alice.as_deref(), Some("/baz"));
    }

    #[test]
    fn test_local_rules_take_precedence() {
        let subs = Substitutions::new();
        let local = rules(&["foo:=local_target"]);
        let global = rules(&["foo:=global_target"]);
        let result = remap_topic_name("/foo", &local, &global, "n", "/", &subs).unwrap();
        assert_eq!(result.as_deref(), Some("/local_target"));
    }

    #[test]
    fn test_scope_mismatch_is_skipped() {
        let subs = Substitutions::new();
        let ns_only = rules(&["__ns:=/ns2"]);
        let result = remap_topic_name("/status", &[], &ns_only, "alice", "/", &subs).unwrap();
        assert_eq!(result, None);
        assert_eq!(
            remap_node_namespace(&[], &ns_only, "alice").as_deref(),
            Some("/ns2")
        );
    }

    #[test]
    fn test_service_scope() {
        let subs = Substitutions::new();
        let topic_only = rules(&["rostopic://foo:=bar"]);
        assert_eq!(
            remap_service_name("/foo", &[], &topic_only, "n", "/", &subs).unwrap(),
            None
        );
        let both = rules(&["foo:=bar"]);
        assert_eq!(
            remap_service_name("/foo", &[], &both, "n", "/", &subs)
                .unwrap()
                .as_deref(),
            Some("/bar")
        );
    }

    #[test]
    fn test_relative_match_expands_against_node_namespace() {
        let subs = Substitutions::new();
        let r = rules(&["chatter:=/ns/chat"]);
        // expanded name matches only when the namespaces line up
        assert_eq!(
            remap_topic_name("/ns1/chatter", &[], &r, "n", "/ns1", &subs)
                .unwrap()
                .as_deref(),
            Some("/ns/chat")
        );
        assert_eq!(
            remap_topic_name("/other/chatter", &[], &r, "n", "/ns1", &subs).unwrap(),
            None
        );
    }

    #[test]
    fn test_node_name_remap_lookup() {
        let r = rules(&["__node:=renamed", "bob:__node:=bobby"]);
        assert_eq!(remap_node_name(&[], &r, "alice").as_deref(), Some("renamed"));
        // first match wins even for bob
        assert_eq!(remap_node_name(&[], &r, "bob").as_deref(), Some("renamed"));
        let r = rules(&["bob:__node:=bobby"]);
        assert_eq!(remap_node_name(&[], &r, "alice"), None);
        assert_eq!(remap_node_name(&[], &r, "bob").as_deref(), Some("bobby"));
    }

    #[test]
    fn test_replacement_with_substitution() {
        let subs = Substitutions::new();
        let r = rules(&["in:={node}/in"]);
        assert_eq!(
            remap_topic_name("/in", &[], &r, "alice", "/", &subs)
                .unwrap()
                .as_deref(),
            Some("/alice/in")
        );
    }

    #[test]
    fn test_unknown_substitution_in_match_skips_rule() {
        let subs = Substitutions::new();
        let r = rules(&["{mystery}:=bar", "foo:=baz"]);
        assert_eq!(
            remap_topic_name("/foo", &[], &r, "n", "/", &subs)
                .unwrap()
                .as_deref(),
            Some("/baz")
        );
    }

    #[test]
    fn test_unknown_substitution_in_replacement_fails() {
        let subs = Substitutions::new();
        let r = rules(&["foo:={mystery}/bar"]);
        let err = remap_topic_name("/foo", &[], &r, "n", "/", &subs).unwrap_err();
        assert!(matches!(err, NameError::UnknownSubstitution { .. }));
    }
}
