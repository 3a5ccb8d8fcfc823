//! The top-level command-line grammar
//!
//! ```text
//! argv ::= nonros* ("--ros-args" ros* ("--" nonros*)?)* nonros*
//! ```
//!
//! Every `--ros-args` opens a region, every `--` closes it; regions may
//! repeat. Tokens outside every region are left for the application, with
//! one compatibility exception: a bare `name:=value` that parses as a
//! remap rule is accepted with a deprecation warning. Index 0, the
//! program name, always counts as a non-ROS argument.

use std::path::PathBuf;

use tracing::{debug, warn};

use ros2conf_names::{NameError, parse_remap_rule, validate_enclave_name};
use ros2conf_params::parse_param_file;

use crate::arguments::Arguments;
use crate::errors::{ArgsError, ArgsResult};
use crate::param_rule::parse_param_rule;

/// Open and close tokens of a ROS argument region
pub const ROS_ARGS_FLAG: &str = "--ros-args";
/// Closes the innermost open ROS argument region
pub const ROS_ARGS_END: &str = "--";

/// Parse a full argument vector into an [`Arguments`] aggregate
///
/// # Errors
///
/// Returns the first error encountered; partially populated state is torn
/// down and nothing is produced. A token inside a ROS region that merely
/// fails to be a known flag is not an error, it is recorded in
/// [`Arguments::unparsed_ros_indices`].
///
/// # Examples
///
/// ```
/// use ros2conf::parse_arguments;
///
/// let argv: Vec<String> = ["prog", "--ros-args", "-p", "rate:=30", "--", "extra"]
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// let args = parse_arguments(&argv)?;
/// assert_eq!(args.unparsed_nonros_indices, vec![0, 5]);
/// # Ok::<(), ros2conf::ArgsError>(())
/// ```
pub fn parse_arguments(args: &[String]) -> ArgsResult<Arguments> {
    let mut out = Arguments::new();
    if !args.is_empty() {
        out.unparsed_nonros_indices.push(0);
    }

    let mut in_ros_region = false;
    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();

        if !in_ros_region {
            if arg == ROS_ARGS_FLAG {
                in_ros_region = true;
            } else if let Some(rule) = deprecated_bare_remap(arg) {
                warn!(
                    arg,
                    "found remap rule outside a '--ros-args' region, this syntax is deprecated"
                );
                out.remap_rules.push(rule);
            } else {
                out.unparsed_nonros_indices.push(i);
            }
            i += 1;
            continue;
        }

        match arg {
            ROS_ARGS_END => in_ros_region = false,
            // already inside a region, another opener is redundant
            ROS_ARGS_FLAG => {}
            "--params-file" => {
                let path = take_value(args, i, "--params-file")?;
                parse_param_file(path, &mut out.param_overrides).map_err(|source| {
                    ArgsError::ParamFile {
                        path: PathBuf::from(path),
                        source,
                    }
                })?;
                out.param_files.push(PathBuf::from(path));
                i += 1;
            }
            "-p" | "--param" => {
                let rule = take_value(args, i, "--param")?;
                let parsed = parse_param_rule(rule)?;
                out.param_overrides
                    .set(&parsed.node_key, &parsed.name, parsed.value);
                i += 1;
            }
            "-r" | "--remap" => {
                let rule = take_value(args, i, "--remap")?;
                out.remap_rules.push(parse_remap_rule(rule)?);
                i += 1;
            }
            "-e" | "--enclave" => {
                let name = take_value(args, i, "--enclave")?;
                validate_enclave_name(name).map_err(|issue| NameError::InvalidEnclave {
                    name: name.to_string(),
                    issue,
                })?;
                if let Some(previous) = &out.enclave {
                    debug!(previous = %previous, new = name, "overwriting enclave");
                }
                out.enclave = Some(name.to_string());
                i += 1;
            }
            "--log-level" => {
                let rule = take_value(args, i, "--log-level")?;
                out.log_levels.apply_rule(rule)?;
                i += 1;
            }
            "--log-config-file" => {
                let path = take_value(args, i, "--log-config-file")?;
                if let Some(previous) = &out.log_config_file {
                    debug!(previous = %previous.display(), new = path, "overwriting log config file");
                }
                out.log_config_file = Some(PathBuf::from(path));
                i += 1;
            }
            "--enable-stdout-logs" => out.logging.stdout = Some(true),
            "--disable-stdout-logs" => out.logging.stdout = Some(false),
            "--enable-rosout-logs" => out.logging.rosout = Some(true),
            "--disable-rosout-logs" => out.logging.rosout = Some(false),
            "--enable-external-lib-logs" => out.logging.external_lib = Some(true),
            "--disable-external-lib-logs" => out.logging.external_lib = Some(false),
            _ => out.unparsed_ros_indices.push(i),
        }
        i += 1;
    }

    out.shrink();
    Ok(out)
}

// the pre-region compatibility spelling: a bare rule that parses cleanly
fn deprecated_bare_remap(arg: &str) -> Option<ros2conf_names::RemapRule> {
    if !arg.contains(":=") {
        return None;
    }
    parse_remap_rule(arg).ok()
}

fn take_value<'a>(args: &'a [String], i: usize, flag: &str) -> ArgsResult<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| ArgsError::MissingArgumentValue(flag.to_string()))
}
