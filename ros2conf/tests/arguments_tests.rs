//! Integration tests for the full argument-parsing pipeline

use std::io::Write;

use tempfile::NamedTempFile;

use ros2conf::{
    Arguments, ArgsError, LogSeverity, RemapScope, Substitutions, Value, expand_topic_name,
    parse_arguments, remap_node_namespace, remap_topic_name,
};

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

// ============================================================================
// Bracketed region with remap and param
// ============================================================================

#[test]
fn test_bracketed_region_with_remap_and_param() {
    let argv = argv(&[
        "prog",
        "--ros-args",
        "-r",
        "chatter:=/ns/chat",
        "-p",
        "rate:=30",
        "--",
        "extra",
    ]);
    let args = parse_arguments(&argv).unwrap();

    assert_eq!(args.remap_rules.len(), 1);
    let rule = &args.remap_rules[0];
    assert_eq!(rule.scope, RemapScope::TOPIC | RemapScope::SERVICE);
    assert_eq!(rule.match_pattern.as_deref(), Some("chatter"));
    assert_eq!(rule.replacement, "/ns/chat");

    assert_eq!(
        args.param_overrides.node("/**").unwrap().get("rate"),
        Some(&Value::I64(30))
    );
    assert_eq!(args.unparsed_nonros_indices, vec![0, 7]);
    assert_eq!(args.unparsed_non_ros(&argv), vec!["prog", "extra"]);
}

// ============================================================================
// Parameter files
// ============================================================================

#[test]
fn test_params_file_loads_into_overlay() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"/listener:\n  ros__parameters:\n    queue: 10\n    frame: map\n")
        .unwrap();
    file.flush().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let args = parse_arguments(&argv(&["prog", "--ros-args", "--params-file", &path])).unwrap();

    assert_eq!(args.param_files.len(), 1);
    assert_eq!(args.param_files[0].to_str().unwrap(), path);
    let params = args.param_overrides.node("/listener").unwrap();
    assert_eq!(params.get("queue"), Some(&Value::I64(10)));
    assert_eq!(params.get("frame"), Some(&Value::String("map".to_string())));
}

#[test]
fn test_param_rule_overrides_file_value() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"/**:\n  ros__parameters:\n    rate: 10\n")
        .unwrap();
    file.flush().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let args = parse_arguments(&argv(&[
        "prog",
        "--ros-args",
        "--params-file",
        &path,
        "-p",
        "rate:=50",
    ]))
    .unwrap();

    assert_eq!(
        args.param_overrides.node("/**").unwrap().get("rate"),
        Some(&Value::I64(50))
    );
}

#[test]
fn test_missing_params_file_fails() {
    let err = parse_arguments(&argv(&[
        "prog",
        "--ros-args",
        "--params-file",
        "/no/such/file.yaml",
    ]))
    .unwrap_err();
    assert!(matches!(err, ArgsError::ParamFile { .. }));
    assert_eq!(err.exit_code(), 14);
}

#[test]
fn test_bad_params_file_aborts_whole_parse() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"/n:\n  ros__parameters:\n    xs: [1, 2.0]\n")
        .unwrap();
    file.flush().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let err = parse_arguments(&argv(&[
        "prog",
        "--ros-args",
        "-p",
        "ok:=1",
        "--params-file",
        &path,
    ]))
    .unwrap_err();
    assert!(matches!(err, ArgsError::ParamFile { .. }));
}

// ============================================================================
// Namespace remap and expansion (end to end)
// ============================================================================

#[test]
fn test_namespace_remap_and_expansion() {
    let args = parse_arguments(&argv(&["prog", "--ros-args", "-r", "__ns:=/ns2"])).unwrap();
    let subs = Substitutions::new();

    let expanded = expand_topic_name("~/status", "alice", "/ns1", &subs).unwrap();
    assert_eq!(expanded, "/ns1/alice/status");

    let remapped =
        remap_topic_name(&expanded, &[], &args.remap_rules, "alice", "/ns1", &subs).unwrap();
    assert_eq!(remapped, None);

    assert_eq!(
        remap_node_namespace(&[], &args.remap_rules, "alice").as_deref(),
        Some("/ns2")
    );
}

// ============================================================================
// Log levels
// ============================================================================

#[test]
fn test_multiple_default_log_levels_last_wins() {
    let args = parse_arguments(&argv(&[
        "prog",
        "--ros-args",
        "--log-level",
        "info",
        "--log-level",
        "rcl:=debug",
        "--log-level",
        "warn",
    ]))
    .unwrap();

    assert_eq!(args.log_levels.default_level, LogSeverity::Warn);
    assert_eq!(args.log_levels.loggers.len(), 1);
    assert_eq!(args.log_levels.loggers[0].name, "rcl");
    assert_eq!(args.log_levels.loggers[0].level, LogSeverity::Debug);
}

#[test]
fn test_invalid_log_level_rule() {
    let err =
        parse_arguments(&argv(&["prog", "--ros-args", "--log-level", "shouting"])).unwrap_err();
    assert!(matches!(err, ArgsError::InvalidLogLevelRule { .. }));
    assert_eq!(err.exit_code(), 16);
}

// ============================================================================
// Enclaves
// ============================================================================

#[test]
fn test_enclave_accepted() {
    let args = parse_arguments(&argv(&["prog", "--ros-args", "--enclave", "/robot1/arm"]))
        .unwrap();
    assert_eq!(args.enclave.as_deref(), Some("/robot1/arm"));
}

#[test]
fn test_enclave_rejected_with_reason() {
    let err = parse_arguments(&argv(&["prog", "--ros-args", "-e", "1bad"])).unwrap_err();
    assert!(err.to_string().contains("context name must be absolute"));
    assert_eq!(err.exit_code(), 13);
}

// ============================================================================
// Clone fidelity and re-parse stability
// ============================================================================

#[test]
fn test_clone_is_deep_and_equal() {
    let argv = argv(&[
        "prog",
        "--ros-args",
        "-r",
        "a:=b",
        "-p",
        "xs:=[1, 2]",
        "--log-level",
        "rcl:=debug",
        "-e",
        "/enclave",
    ]);
    let original = parse_arguments(&argv).unwrap();
    let copy = original.clone();
    assert_eq!(original, copy);

    drop(original);
    // the copy is independent of the original's lifetime
    assert_eq!(
        copy.param_overrides.node("/**").unwrap().get("xs"),
        Some(&Value::VecI64(vec![1, 2]))
    );
    assert_eq!(copy.enclave.as_deref(), Some("/enclave"));
}

#[test]
fn test_reparse_produces_equal_aggregates() {
    let argv = argv(&[
        "prog",
        "nonros",
        "--ros-args",
        "-r",
        "chatter:=/chat",
        "-p",
        "f:=.inf",
        "--disable-rosout-logs",
        "--",
        "tail",
    ]);
    assert_eq!(parse_arguments(&argv).unwrap(), parse_arguments(&argv).unwrap());
}

// ============================================================================
// Scalar round trip through the -p form
// ============================================================================

fn roundtrip(value: &Value) -> Value {
    let text = match value {
        Value::Bool(b) => b.to_string(),
        Value::I64(i) => i.to_string(),
        Value::F64(f) => float_text(*f),
        Value::String(s) => format!("\"{s}\""),
        _ => panic!("scalar expected"),
    };
    let argv = vec![
        "prog".to_string(),
        "--ros-args".to_string(),
        "-p".to_string(),
        format!("name:={text}"),
    ];
    let args = parse_arguments(&argv).unwrap();
    args.param_overrides
        .node("/**")
        .unwrap()
        .get("name")
        .unwrap()
        .clone()
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f == f64::INFINITY {
        ".inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        format!("{f:?}")
    }
}

#[test]
fn test_scalar_round_trip() {
    for value in [
        Value::Bool(true),
        Value::Bool(false),
        Value::I64(0),
        Value::I64(-42),
        Value::I64(i64::MAX),
        Value::F64(1.5),
        Value::F64(-0.125),
        Value::F64(1e300),
        Value::String("plain".to_string()),
        Value::String("42".to_string()),
        Value::String("no".to_string()),
    ] {
        assert_eq!(roundtrip(&value), value, "round trip of {value:?}");
    }
}

#[test]
fn test_nan_and_infinities_round_trip_bit_exact() {
    match roundtrip(&Value::F64(f64::NAN)) {
        Value::F64(f) => assert!(f.is_nan()),
        other => panic!("NaN round-tripped as {other:?}"),
    }
    assert_eq!(
        roundtrip(&Value::F64(f64::INFINITY)),
        Value::F64(f64::INFINITY)
    );
    assert_eq!(
        roundtrip(&Value::F64(f64::NEG_INFINITY)),
        Value::F64(f64::NEG_INFINITY)
    );
}

// ============================================================================
// Node-targeted queries
// ============================================================================

#[test]
fn test_remap_rules_for_node() {
    let args = parse_arguments(&argv(&[
        "prog",
        "--ros-args",
        "-r",
        "alice:foo:=bar",
        "-r",
        "shared:=thing",
    ]))
    .unwrap();

    assert_eq!(args.remap_rules_for_node("alice").len(), 2);
    assert_eq!(args.remap_rules_for_node("bob").len(), 1);
}

#[test]
fn test_params_for_node_combines_wildcards() {
    let args = parse_arguments(&argv(&[
        "prog",
        "--ros-args",
        "-p",
        "shared:=1",
        "-p",
        "alice:own:=2",
    ]))
    .unwrap();

    let alice = args.params_for_node("/alice");
    assert_eq!(alice.get("shared"), Some(&Value::I64(1)));
    assert_eq!(alice.get("own"), Some(&Value::I64(2)));

    let bob = args.params_for_node("/bob");
    assert_eq!(bob.get("shared"), Some(&Value::I64(1)));
    assert_eq!(bob.get("own"), None);
}

// ============================================================================
// From convenience constructors
// ============================================================================

#[test]
fn test_from_args_matches_parse_arguments() {
    let parts = ["prog", "--ros-args", "-p", "a:=1"];
    let via_from = Arguments::from_args(parts).unwrap();
    let via_parse = parse_arguments(&argv(&parts)).unwrap();
    assert_eq!(via_from, via_parse);
}
