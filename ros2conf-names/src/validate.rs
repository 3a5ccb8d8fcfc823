//! Allocation-free validators for topic, node, namespace, and enclave names
//!
//! Each validator is a pure function returning `Ok(())` or a `Copy` issue
//! value carrying the byte offset of the offence. The issue's `Display`
//! implementation is the human-readable reason used verbatim in error
//! messages.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length of a topic or fully qualified name, in bytes
pub const TOPIC_NAME_MAX_LENGTH: usize = 255;

/// Maximum length of a node name, in bytes
pub const NODE_NAME_MAX_LENGTH: usize = 255;

/// Maximum length of a namespace, in bytes
///
/// Two bytes shorter than the topic bound so a namespace always leaves room
/// for a separator and a non-empty final token.
pub const NAMESPACE_MAX_LENGTH: usize = TOPIC_NAME_MAX_LENGTH - 2;

/// Maximum length of an enclave name, in bytes
pub const ENCLAVE_NAME_MAX_LENGTH: usize = 255;

/// What kind of graph resource a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NameKind {
    /// A topic name
    Topic,
    /// A service name
    Service,
    /// A node base name
    NodeName,
    /// A node namespace
    Namespace,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic => write!(f, "topic"),
            Self::Service => write!(f, "service"),
            Self::NodeName => write!(f, "node"),
            Self::Namespace => write!(f, "namespace"),
        }
    }
}

/// Why a topic or service name failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicNameIssue {
    /// The name is empty
    Empty,
    /// The name ends with a forward slash
    EndsWithSlash {
        /// Byte offset of the trailing slash
        offset: usize,
    },
    /// The name contains a character outside `[A-Za-z0-9_~{}/]`
    InvalidCharacter {
        /// Byte offset of the character
        offset: usize,
    },
    /// A segment starts with a numeric character
    SegmentStartsWithNumber {
        /// Byte offset of the digit
        offset: usize,
    },
    /// An opening brace is never closed
    UnmatchedOpenBrace {
        /// Byte offset of the opening brace
        offset: usize,
    },
    /// A closing brace has no matching opening brace
    UnmatchedCloseBrace {
        /// Byte offset of the closing brace
        offset: usize,
    },
    /// An opening brace appears inside a substitution
    NestedBrace {
        /// Byte offset of the nested brace
        offset: usize,
    },
    /// A tilde appears anywhere but the start of the name
    MisplacedTilde {
        /// Byte offset of the tilde
        offset: usize,
    },
    /// The leading tilde is not followed by a forward slash
    TildeNotFollowedBySlash {
        /// Byte offset of the character after the tilde
        offset: usize,
    },
    /// A substitution body contains a character outside `[A-Za-z0-9_]`
    SubstitutionInvalidCharacter {
        /// Byte offset of the character
        offset: usize,
    },
    /// A substitution body starts with a numeric character
    SubstitutionStartsWithNumber {
        /// Byte offset of the digit
        offset: usize,
    },
}

impl TopicNameIssue {
    /// Byte offset of the offence within the validated name
    #[must_use]
    pub fn offset(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::EndsWithSlash { offset }
            | Self::InvalidCharacter { offset }
            | Self::SegmentStartsWithNumber { offset }
            | Self::UnmatchedOpenBrace { offset }
            | Self::UnmatchedCloseBrace { offset }
            | Self::NestedBrace { offset }
            | Self::MisplacedTilde { offset }
            | Self::TildeNotFollowedBySlash { offset }
            | Self::SubstitutionInvalidCharacter { offset }
            | Self::SubstitutionStartsWithNumber { offset } => offset,
        }
    }
}

impl fmt::Display for TopicNameIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name must not be empty"),
            Self::EndsWithSlash { .. } => {
                write!(f, "name must not end with a forward slash (/)")
            }
            Self::InvalidCharacter { offset } => {
                write!(f, "invalid character at position {offset}")
            }
            Self::SegmentStartsWithNumber { offset } => write!(
                f,
                "token must not start with a numeric character at position {offset}"
            ),
            Self::UnmatchedOpenBrace { offset } => {
                write!(f, "unmatched opening brace at position {offset}")
            }
            Self::UnmatchedCloseBrace { offset } => {
                write!(f, "unmatched closing brace at position {offset}")
            }
            Self::NestedBrace { offset } => {
                write!(f, "substitutions must not nest, brace at position {offset}")
            }
            Self::MisplacedTilde { offset } => write!(
                f,
                "tilde (~) may only appear at the start of a name, found at position {offset}"
            ),
            Self::TildeNotFollowedBySlash { offset } => write!(
                f,
                "tilde (~) must be followed by a forward slash (/) at position {offset}"
            ),
            Self::SubstitutionInvalidCharacter { offset } => {
                write!(f, "invalid character in substitution at position {offset}")
            }
            Self::SubstitutionStartsWithNumber { offset } => write!(
                f,
                "substitution must not start with a numeric character at position {offset}"
            ),
        }
    }
}

/// Why a node name failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeNameIssue {
    /// The name is empty
    Empty,
    /// The name starts with a numeric character
    StartsWithNumber,
    /// The name contains a character outside `[A-Za-z0-9_]`
    InvalidCharacter {
        /// Byte offset of the character
        offset: usize,
    },
    /// The name exceeds [`NODE_NAME_MAX_LENGTH`]
    TooLong,
}

impl NodeNameIssue {
    /// Byte offset of the offence within the validated name
    #[must_use]
    pub fn offset(self) -> usize {
        match self {
            Self::InvalidCharacter { offset } => offset,
            Self::Empty | Self::StartsWithNumber | Self::TooLong => 0,
        }
    }
}

impl fmt::Display for NodeNameIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "node name must not be empty"),
            Self::StartsWithNumber => {
                write!(f, "node name must not start with a numeric character")
            }
            Self::InvalidCharacter { offset } => write!(
                f,
                "node name contains an invalid character at position {offset}"
            ),
            Self::TooLong => write!(
                f,
                "node name exceeds the maximum length of {NODE_NAME_MAX_LENGTH}"
            ),
        }
    }
}

/// Why a namespace failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceIssue {
    /// The namespace is empty
    Empty,
    /// The namespace does not start with a forward slash
    NotAbsolute,
    /// The namespace ends with a forward slash and is not the root
    EndsWithSlash {
        /// Byte offset of the trailing slash
        offset: usize,
    },
    /// Two forward slashes with nothing between them
    EmptySegment {
        /// Byte offset of the second slash
        offset: usize,
    },
    /// A segment starts with a numeric character
    SegmentStartsWithNumber {
        /// Byte offset of the digit
        offset: usize,
    },
    /// A segment contains a character outside `[A-Za-z0-9_]`
    InvalidCharacter {
        /// Byte offset of the character
        offset: usize,
    },
    /// The namespace exceeds its maximum length
    TooLong,
}

impl NamespaceIssue {
    /// Byte offset of the offence within the validated namespace
    #[must_use]
    pub fn offset(self) -> usize {
        match self {
            Self::EndsWithSlash { offset }
            | Self::EmptySegment { offset }
            | Self::SegmentStartsWithNumber { offset }
            | Self::InvalidCharacter { offset } => offset,
            Self::Empty | Self::NotAbsolute | Self::TooLong => 0,
        }
    }
}

impl fmt::Display for NamespaceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "namespace must not be empty"),
            Self::NotAbsolute => {
                write!(f, "namespace must be absolute, it must lead with a '/'")
            }
            Self::EndsWithSlash { .. } => {
                write!(f, "namespace must not end with a forward slash (/)")
            }
            Self::EmptySegment { offset } => write!(
                f,
                "namespace must not contain repeated forward slashes (//) at position {offset}"
            ),
            Self::SegmentStartsWithNumber { offset } => write!(
                f,
                "namespace token must not start with a numeric character at position {offset}"
            ),
            Self::InvalidCharacter { offset } => write!(
                f,
                "namespace contains an invalid character at position {offset}"
            ),
            Self::TooLong => write!(f, "namespace exceeds the maximum length"),
        }
    }
}

/// Why an enclave name failed validation
///
/// Enclaves reuse the namespace rules with a larger length bound; the
/// wording of the reasons speaks of the security context instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnclaveIssue(
    /// The underlying namespace issue
    pub NamespaceIssue,
);

impl EnclaveIssue {
    /// Byte offset of the offence within the validated enclave name
    #[must_use]
    pub fn offset(self) -> usize {
        self.0.offset()
    }
}

impl fmt::Display for EnclaveIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            NamespaceIssue::NotAbsolute => {
                write!(f, "context name must be absolute, it must lead with a '/'")
            }
            NamespaceIssue::TooLong => write!(
                f,
                "context name exceeds the maximum length of {ENCLAVE_NAME_MAX_LENGTH}"
            ),
            issue => issue.fmt(f),
        }
    }
}

/// Why a fully qualified name failed the strict post-expansion validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FqnIssue {
    /// The name is empty
    Empty,
    /// The name does not start with a forward slash
    NotAbsolute,
    /// The name still contains a tilde
    ContainsTilde {
        /// Byte offset of the tilde
        offset: usize,
    },
    /// The name still contains a substitution brace
    ContainsSubstitution {
        /// Byte offset of the brace
        offset: usize,
    },
    /// The name ends with a forward slash
    EndsWithSlash {
        /// Byte offset of the trailing slash
        offset: usize,
    },
    /// Two forward slashes with nothing between them
    EmptySegment {
        /// Byte offset of the second slash
        offset: usize,
    },
    /// A segment starts with a numeric character
    SegmentStartsWithNumber {
        /// Byte offset of the digit
        offset: usize,
    },
    /// The name contains a character outside `[A-Za-z0-9_/]`
    InvalidCharacter {
        /// Byte offset of the character
        offset: usize,
    },
    /// The name exceeds [`TOPIC_NAME_MAX_LENGTH`]
    TooLong,
}

impl FqnIssue {
    /// Byte offset of the offence within the validated name
    #[must_use]
    pub fn offset(self) -> usize {
        match self {
            Self::ContainsTilde { offset }
            | Self::ContainsSubstitution { offset }
            | Self::EndsWithSlash { offset }
            | Self::EmptySegment { offset }
            | Self::SegmentStartsWithNumber { offset }
            | Self::InvalidCharacter { offset } => offset,
            Self::Empty | Self::NotAbsolute | Self::TooLong => 0,
        }
    }
}

impl fmt::Display for FqnIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name must not be empty"),
            Self::NotAbsolute => write!(
                f,
                "a fully qualified name must be absolute, it must lead with a '/'"
            ),
            Self::ContainsTilde { offset } => write!(
                f,
                "a fully qualified name must not contain a tilde (~), found at position {offset}"
            ),
            Self::ContainsSubstitution { offset } => write!(
                f,
                "a fully qualified name must not contain substitutions, brace at position {offset}"
            ),
            Self::EndsWithSlash { .. } => {
                write!(f, "name must not end with a forward slash (/)")
            }
            Self::EmptySegment { offset } => write!(
                f,
                "name must not contain repeated forward slashes (//) at position {offset}"
            ),
            Self::SegmentStartsWithNumber { offset } => write!(
                f,
                "token must not start with a numeric character at position {offset}"
            ),
            Self::InvalidCharacter { offset } => {
                write!(f, "invalid character at position {offset}")
            }
            Self::TooLong => write!(
                f,
                "name exceeds the maximum length of {TOPIC_NAME_MAX_LENGTH}"
            ),
        }
    }
}

/// Validate a topic or service name before expansion
///
/// Permissive with `{}` substitutions and a leading `~`, both of which are
/// resolved by expansion.
///
/// # Errors
///
/// Returns the first [`TopicNameIssue`] found, scanning left to right.
///
/// # Examples
///
/// ```
/// use ros2conf_names::validate_topic_name;
///
/// assert!(validate_topic_name("chatter").is_ok());
/// assert!(validate_topic_name("~/status").is_ok());
/// assert!(validate_topic_name("{node}/odom").is_ok());
///
/// assert!(validate_topic_name("").is_err());
/// assert!(validate_topic_name("9fingers").is_err());
/// assert!(validate_topic_name("trailing/").is_err());
/// ```
pub fn validate_topic_name(name: &str) -> Result<(), TopicNameIssue> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Err(TopicNameIssue::Empty);
    }

    let mut in_brace = false;
    let mut brace_open = 0;
    let mut sub_first = false;
    for (i, &b) in bytes.iter().enumerate() {
        if in_brace {
            match b {
                b'}' => in_brace = false,
                b'{' => return Err(TopicNameIssue::NestedBrace { offset: i }),
                b'0'..=b'9' if sub_first => {
                    return Err(TopicNameIssue::SubstitutionStartsWithNumber { offset: i });
                }
                b if b.is_ascii_alphanumeric() || b == b'_' => sub_first = false,
                _ => return Err(TopicNameIssue::SubstitutionInvalidCharacter { offset: i }),
            }
            continue;
        }
        match b {
            b'~' if i == 0 => {
                if bytes.len() > 1 && bytes[1] != b'/' {
                    return Err(TopicNameIssue::TildeNotFollowedBySlash { offset: 1 });
                }
            }
            b'~' => return Err(TopicNameIssue::MisplacedTilde { offset: i }),
            b'/' => {}
            b'{' => {
                in_brace = true;
                sub_first = true;
                brace_open = i;
            }
            b'}' => return Err(TopicNameIssue::UnmatchedCloseBrace { offset: i }),
            b'0'..=b'9' if i == 0 || bytes[i - 1] == b'/' => {
                return Err(TopicNameIssue::SegmentStartsWithNumber { offset: i });
            }
            b if b.is_ascii_alphanumeric() || b == b'_' => {}
            _ => return Err(TopicNameIssue::InvalidCharacter { offset: i }),
        }
    }
    if in_brace {
        return Err(TopicNameIssue::UnmatchedOpenBrace { offset: brace_open });
    }
    if bytes[bytes.len() - 1] == b'/' {
        return Err(TopicNameIssue::EndsWithSlash {
            offset: bytes.len() - 1,
        });
    }
    Ok(())
}

/// Validate a node base name
///
/// # Errors
///
/// Returns the first [`NodeNameIssue`] found.
///
/// # Examples
///
/// ```
/// use ros2conf_names::validate_node_name;
///
/// assert!(validate_node_name("camera_driver").is_ok());
/// assert!(validate_node_name("_hidden").is_ok());
///
/// assert!(validate_node_name("").is_err());
/// assert!(validate_node_name("1st").is_err());
/// assert!(validate_node_name("with/slash").is_err());
/// ```
pub fn validate_node_name(name: &str) -> Result<(), NodeNameIssue> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Err(NodeNameIssue::Empty);
    }
    if bytes.len() > NODE_NAME_MAX_LENGTH {
        return Err(NodeNameIssue::TooLong);
    }
    if bytes[0].is_ascii_digit() {
        return Err(NodeNameIssue::StartsWithNumber);
    }
    for (i, &b) in bytes.iter().enumerate() {
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return Err(NodeNameIssue::InvalidCharacter { offset: i });
        }
    }
    Ok(())
}

fn validate_namespace_body(bytes: &[u8]) -> Result<(), NamespaceIssue> {
    if bytes.len() > 1 && bytes[bytes.len() - 1] == b'/' {
        return Err(NamespaceIssue::EndsWithSlash {
            offset: bytes.len() - 1,
        });
    }
    let mut seg_start = true;
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        if b == b'/' {
            if seg_start {
                return Err(NamespaceIssue::EmptySegment { offset: i });
            }
            seg_start = true;
        } else if seg_start {
            if b.is_ascii_digit() {
                return Err(NamespaceIssue::SegmentStartsWithNumber { offset: i });
            }
            if !(b.is_ascii_alphabetic() || b == b'_') {
                return Err(NamespaceIssue::InvalidCharacter { offset: i });
            }
            seg_start = false;
        } else if !(b.is_ascii_alphanumeric() || b == b'_') {
            return Err(NamespaceIssue::InvalidCharacter { offset: i });
        }
    }
    Ok(())
}

/// Validate a node namespace
///
/// # Errors
///
/// Returns the first [`NamespaceIssue`] found.
///
/// # Examples
///
/// ```
/// use ros2conf_names::validate_namespace;
///
/// assert!(validate_namespace("/").is_ok());
/// assert!(validate_namespace("/robot1/arm").is_ok());
///
/// assert!(validate_namespace("relative").is_err());
/// assert!(validate_namespace("/trailing/").is_err());
/// assert!(validate_namespace("/a//b").is_err());
/// ```
pub fn validate_namespace(namespace: &str) -> Result<(), NamespaceIssue> {
    let bytes = namespace.as_bytes();
    if bytes.is_empty() {
        return Err(NamespaceIssue::Empty);
    }
    if bytes[0] != b'/' {
        return Err(NamespaceIssue::NotAbsolute);
    }
    if bytes.len() > NAMESPACE_MAX_LENGTH {
        return Err(NamespaceIssue::TooLong);
    }
    validate_namespace_body(bytes)
}

/// Validate an enclave name
///
/// Enclave names follow namespace rules with the larger
/// [`ENCLAVE_NAME_MAX_LENGTH`] bound.
///
/// # Errors
///
/// Returns the first [`EnclaveIssue`] found.
pub fn validate_enclave_name(name: &str) -> Result<(), EnclaveIssue> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Err(EnclaveIssue(NamespaceIssue::Empty));
    }
    if bytes[0] != b'/' {
        return Err(EnclaveIssue(NamespaceIssue::NotAbsolute));
    }
    if bytes.len() > ENCLAVE_NAME_MAX_LENGTH {
        return Err(EnclaveIssue(NamespaceIssue::TooLong));
    }
    validate_namespace_body(bytes).map_err(EnclaveIssue)
}

/// Validate a fully qualified name after expansion
///
/// Stricter than [`validate_topic_name`]: the name must be absolute and
/// every substitution and tilde must already be resolved.
///
/// # Errors
///
/// Returns the first [`FqnIssue`] found.
///
/// # Examples
///
/// ```
/// use ros2conf_names::validate_fully_qualified_name;
///
/// assert!(validate_fully_qualified_name("/ns/chatter").is_ok());
///
/// assert!(validate_fully_qualified_name("chatter").is_err());
/// assert!(validate_fully_qualified_name("/~/x").is_err());
/// assert!(validate_fully_qualified_name("/a//b").is_err());
/// ```
pub fn validate_fully_qualified_name(name: &str) -> Result<(), FqnIssue> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Err(FqnIssue::Empty);
    }
    if bytes[0] != b'/' {
        return Err(FqnIssue::NotAbsolute);
    }
    if bytes.len() > TOPIC_NAME_MAX_LENGTH {
        return Err(FqnIssue::TooLong);
    }
    if bytes.len() > 1 && bytes[bytes.len() - 1] == b'/' {
        return Err(FqnIssue::EndsWithSlash {
            offset: bytes.len() - 1,
        });
    }
    let mut seg_start = true;
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        match b {
            b'~' => return Err(FqnIssue::ContainsTilde { offset: i }),
            b'{' | b'}' => return Err(FqnIssue::ContainsSubstitution { offset: i }),
            b'/' => {
                if seg_start {
                    return Err(FqnIssue::EmptySegment { offset: i });
                }
                seg_start = true;
            }
            b'0'..=b'9' if seg_start => {
                return Err(FqnIssue::SegmentStartsWithNumber { offset: i });
            }
            b if b.is_ascii_alphanumeric() || b == b'_' => seg_start = false,
            _ => return Err(FqnIssue::InvalidCharacter { offset: i }),
        }
    }
    Ok(())
}
