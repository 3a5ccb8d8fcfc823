//! Typed parameter values and YAML scalar typing

use std::fmt;

use yaml_rust2::scanner::TScalarStyle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A typed parameter value
///
/// Exactly one variant is inhabited; arrays are homogeneous.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer value
    I64(i64),
    /// 64-bit floating point value
    F64(f64),
    /// String value
    String(String),
    /// Array of boolean values
    VecBool(Vec<bool>),
    /// Array of 64-bit signed integer values
    VecI64(Vec<i64>),
    /// Array of 64-bit floating point values
    VecF64(Vec<f64>),
    /// Array of string values
    VecString(Vec<String>),
}

impl Value {
    /// Returns the type name of this value as a string
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::I64(_) => "I64",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::VecBool(_) => "VecBool",
            Value::VecI64(_) => "VecI64",
            Value::VecF64(_) => "VecF64",
            Value::VecString(_) => "VecString",
        }
    }

    /// Get the value as a boolean, if it is one
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is one
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float, if it is one
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the value as a string, if it is one
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Checks if this value has the same type as another value
    #[must_use]
    pub fn type_check(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Value::Bool(_), Value::Bool(_))
                | (Value::I64(_), Value::I64(_))
                | (Value::F64(_), Value::F64(_))
                | (Value::String(_), Value::String(_))
                | (Value::VecBool(_), Value::VecBool(_))
                | (Value::VecI64(_), Value::VecI64(_))
                | (Value::VecF64(_), Value::VecF64(_))
                | (Value::VecString(_), Value::VecString(_))
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F64(v) => write_float(f, *v),
            Value::String(v) => write!(f, "{v}"),
            Value::VecBool(v) => write!(f, "{v:?}"),
            Value::VecI64(v) => write!(f, "{v:?}"),
            Value::VecF64(v) => write!(f, "{v:?}"),
            Value::VecString(v) => write!(f, "{v:?}"),
        }
    }
}

// YAML-compatible float spelling so a printed store re-reads with the same
// types
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        write!(f, ".nan")
    } else if v == f64::INFINITY {
        write!(f, ".inf")
    } else if v == f64::NEG_INFINITY {
        write!(f, "-.inf")
    } else {
        write!(f, "{v:?}")
    }
}

/// Resolve the type of a YAML scalar
///
/// Applies, in order: the `!!str` tag, quoting style, the fixed bool
/// spellings, `strtol`-style integer parsing in a prefix-selected base,
/// `strtod`-style float parsing with the YAML `.inf` / `.nan` tokens, and
/// finally the verbatim string.
pub(crate) fn typed_scalar(text: &str, style: TScalarStyle, str_tagged: bool) -> Value {
    if str_tagged {
        return Value::String(text.to_string());
    }
    if !matches!(style, TScalarStyle::Plain) {
        return Value::String(text.to_string());
    }
    if let Some(b) = parse_bool(text) {
        return Value::Bool(b);
    }
    if let Some(i) = parse_int(text) {
        return Value::I64(i);
    }
    if let Some(f) = parse_float(text) {
        return Value::F64(f);
    }
    Value::String(text.to_string())
}

// case-sensitive YAML 1.1 bool spellings
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "Y" | "y" | "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On" | "ON" => {
            Some(true)
        }
        "N" | "n" | "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off" | "Off" | "OFF" => {
            Some(false)
        }
        _ => None,
    }
}

// strtol with base 0: 0x/0X selects hex, a leading 0 selects octal; the
// whole string must be consumed
fn parse_int(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'+' => (false, &text[1..]),
        b'-' => (true, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };
    if digits.is_empty() || digits.starts_with('+') || digits.starts_with('-') {
        return None;
    }
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    text.parse::<f64>().ok()
}
