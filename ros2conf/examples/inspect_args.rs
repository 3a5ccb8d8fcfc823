//! Example walking a parsed argument vector
//!
//! Run with ROS-style arguments to see how they are partitioned and
//! typed:
//!
//! ```text
//! cargo run --example inspect_args -- --ros-args -r chatter:=/ns/chat \
//!     -p rate:=30 --log-level rcl:=debug -- trailing
//! ```

use std::process::exit;

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let args = match ros2conf::parse_arguments(&argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            exit(err.exit_code());
        }
    };

    println!("Non-ROS arguments: {:?}", args.unparsed_non_ros(&argv));
    println!("Unrecognized ROS arguments: {:?}", args.unparsed_ros(&argv));

    println!("\nRemap rules:");
    for rule in &args.remap_rules {
        let target = rule.node_prefix.as_deref().unwrap_or("<any node>");
        match &rule.match_pattern {
            Some(pattern) => println!("  [{target}] {pattern} -> {}", rule.replacement),
            None => println!("  [{target}] {:?} -> {}", rule.scope, rule.replacement),
        }
    }

    println!("\nParameter overrides:");
    print!("{}", args.param_overrides);

    println!("Log levels: default {}", args.log_levels.default_level);
    for setting in &args.log_levels.loggers {
        println!("  {} = {}", setting.name, setting.level);
    }

    if let Some(enclave) = &args.enclave {
        println!("Enclave: {enclave}");
    }

    let logging = ros2conf::logging::LoggingConfig::from_arguments(&args);
    println!("Logging filter: {}", logging.filter_directives());
}
