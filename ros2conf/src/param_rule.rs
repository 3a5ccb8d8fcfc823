//! The `-p name:=value` rule grammar
//!
//! `[node ":"] segment (("." | "/") segment)* ":=" <yaml scalar>`
//!
//! Segments join with `.` whichever separator was written; the `/` form is
//! a compatibility spelling. Without a node prefix the rule targets every
//! node (`/**`); with a prefix `n` it targets the store key `/n`. The raw
//! suffix after `:=` is typed by the YAML scalar rules.

use ros2conf_names::lexer::{Lexer, TokenKind};
use ros2conf_params::{Value, parse_param_value};

use crate::errors::{ArgsError, ArgsResult};

/// A parsed parameter override rule
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParamRule {
    /// Store key the override lands under
    pub(crate) node_key: String,
    /// Dotted parameter name
    pub(crate) name: String,
    /// Typed value
    pub(crate) value: Value,
}

pub(crate) fn parse_param_rule(rule: &str) -> ArgsResult<ParamRule> {
    let invalid = |reason: String| ArgsError::InvalidParamRule {
        rule: rule.to_string(),
        reason,
    };

    let mut lex = Lexer::new(rule);

    let mut node_key = "/**".to_string();
    if lex.peek().map_err(|e| invalid(e.to_string()))?.kind == TokenKind::Token
        && lex.peek2().map_err(|e| invalid(e.to_string()))?.kind == TokenKind::Colon
    {
        let token = lex.next_token().map_err(|e| invalid(e.to_string()))?;
        node_key = format!("/{}", lex.text(token));
        lex.next_token().map_err(|e| invalid(e.to_string()))?;
    }

    let first = lex
        .expect(TokenKind::Token)
        .map_err(|e| invalid(e.to_string()))?;
    let mut name = lex.text(first).to_string();
    loop {
        let sep = lex.peek().map_err(|e| invalid(e.to_string()))?.kind;
        if sep != TokenKind::Dot && sep != TokenKind::ForwardSlash {
            break;
        }
        lex.next_token().map_err(|e| invalid(e.to_string()))?;
        let segment = lex
            .expect(TokenKind::Token)
            .map_err(|e| invalid(e.to_string()))?;
        name.push('.');
        name.push_str(lex.text(segment));
    }
    lex.expect(TokenKind::Separator)
        .map_err(|e| invalid(e.to_string()))?;

    let value = parse_param_value(lex.remainder()).map_err(|e| invalid(e.to_string()))?;

    Ok(ParamRule {
        node_key,
        name,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_rule_targets_all_nodes() {
        let rule = parse_param_rule("rate:=30").unwrap();
        assert_eq!(rule.node_key, "/**");
        assert_eq!(rule.name, "rate");
        assert_eq!(rule.value, Value::I64(30));
    }

    #[test]
    fn test_node_prefixed_rule() {
        let rule = parse_param_rule("alice:rate:=30").unwrap();
        assert_eq!(rule.node_key, "/alice");
        assert_eq!(rule.name, "rate");
    }

    #[test]
    fn test_dotted_and_slashed_names_join_with_dots() {
        let rule = parse_param_rule("motion.gains.kp:=0.5").unwrap();
        assert_eq!(rule.name, "motion.gains.kp");
        assert_eq!(rule.value, Value::F64(0.5));

        let rule = parse_param_rule("motion/gains/kp:=0.5").unwrap();
        assert_eq!(rule.name, "motion.gains.kp");

        let rule = parse_param_rule("motion.gains/kd:=1").unwrap();
        assert_eq!(rule.name, "motion.gains.kd");
    }

    #[test]
    fn test_value_typing() {
        assert_eq!(
            parse_param_rule("flag:=true").unwrap().value,
            Value::Bool(true)
        );
        assert_eq!(
            parse_param_rule("name:=\"42\"").unwrap().value,
            Value::String("42".to_string())
        );
        assert_eq!(
            parse_param_rule("xs:=[1, 2]").unwrap().value,
            Value::VecI64(vec![1, 2])
        );
        assert_eq!(
            parse_param_rule("empty:=").unwrap().value,
            Value::String(String::new())
        );
    }

    #[test]
    fn test_reserved_names_rejected() {
        assert!(parse_param_rule("__ns:=1").is_err());
        assert!(parse_param_rule("__node:=1").is_err());
    }

    #[test]
    fn test_malformed_rules() {
        for rule in ["", "noseparator", ":=1", "a..b:=1", "a.:=1", "9x:=1"] {
            assert!(
                parse_param_rule(rule).is_err(),
                "expected '{rule}' to be rejected"
            );
        }
    }

    #[test]
    fn test_heterogeneous_value_rejected() {
        let err = parse_param_rule("xs:=[1, a]").unwrap_err();
        assert!(matches!(err, ArgsError::InvalidParamRule { .. }));
    }
}
