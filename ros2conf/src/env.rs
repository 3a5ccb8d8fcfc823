//! Environment variables read by the configuration core

use std::env;

use crate::errors::{ArgsError, ArgsResult};

/// Set to `"1"` to restrict communication to localhost
pub const ROS_LOCALHOST_ONLY: &str = "ROS_LOCALHOST_ONLY";

/// Expected middleware implementation identifier
pub const RMW_IMPLEMENTATION: &str = "RMW_IMPLEMENTATION";

/// Second, equivalent expected-identifier variable
pub const RCL_ASSERT_RMW_ID_MATCHES: &str = "RCL_ASSERT_RMW_ID_MATCHES";

/// Set to `"1"` to default new subscriptions to refusing loaned messages
pub const ROS_DISABLE_LOANED_MESSAGES: &str = "ROS_DISABLE_LOANED_MESSAGES";

/// Whether `ROS_LOCALHOST_ONLY` requests localhost-only mode
///
/// Only the exact value `"1"` enables it; anything else, or unset,
/// disables it.
#[must_use]
pub fn localhost_only() -> bool {
    flag_enabled(env::var(ROS_LOCALHOST_ONLY).ok().as_deref())
}

/// Whether `ROS_DISABLE_LOANED_MESSAGES` disables message loaning
///
/// Not consumed inside the core; surfaced as the default for a
/// subscription option decided by consumers.
#[must_use]
pub fn loaned_messages_disabled() -> bool {
    flag_enabled(env::var(ROS_DISABLE_LOANED_MESSAGES).ok().as_deref())
}

/// The middleware implementation the environment expects, if any
///
/// `RMW_IMPLEMENTATION` and `RCL_ASSERT_RMW_ID_MATCHES` are equivalent;
/// when both are set they must agree. Run this once at initialization,
/// before touching the middleware.
///
/// # Errors
///
/// Returns [`ArgsError::MismatchedRmwId`] when both variables are set to
/// different values.
pub fn expected_rmw_implementation() -> ArgsResult<Option<String>> {
    expected_rmw_from(
        env::var(RMW_IMPLEMENTATION).ok(),
        env::var(RCL_ASSERT_RMW_ID_MATCHES).ok(),
    )
}

fn flag_enabled(value: Option<&str>) -> bool {
    value == Some("1")
}

fn expected_rmw_from(
    rmw_implementation: Option<String>,
    assert_matches: Option<String>,
) -> ArgsResult<Option<String>> {
    let rmw_implementation = rmw_implementation.filter(|v| !v.is_empty());
    let assert_matches = assert_matches.filter(|v| !v.is_empty());
    match (rmw_implementation, assert_matches) {
        (Some(a), Some(b)) if a != b => Err(ArgsError::MismatchedRmwId {
            rmw_implementation: a,
            expected: b,
        }),
        (a, b) => Ok(a.or(b)),
    }
}
