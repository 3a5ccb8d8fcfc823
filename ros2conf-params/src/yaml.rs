//! Streaming YAML parameter-file parser
//!
//! Parameter files have the shape
//!
//! ```yaml
//! namespace:          # zero or more nesting levels forming the namespace
//!   node_name:
//!     ros__parameters:
//!       group:
//!         leaf: value
//! ```
//!
//! The literal key `ros__parameters` is the boundary between node-name
//! mapping levels above and parameter mapping levels below. Namespace
//! levels join with `/` into the node's FQN; parameter groups join with
//! `.` into the dotted parameter name.
//!
//! The parser consumes `yaml-rust2` events as they stream, maintaining a
//! node-namespace stack and a parameter-namespace stack keyed off mapping
//! start/end pairing. A parse accumulates into a scratch store that is
//! merged into the caller's store only on success, so a failed parse
//! leaves the caller's data untouched.

use std::fs;
use std::path::Path;

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use ros2conf_names::validate_node_name;

use crate::errors::{ParamsError, ParamsResult};
use crate::store::ParameterStore;
use crate::value::{Value, typed_scalar};

/// The literal key separating node-name levels from parameter levels
pub const PARAMS_KEY: &str = "ros__parameters";

/// Load a YAML parameter file into `store`
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML, does
/// not follow the parameter-file shape, or contains a heterogeneous
/// sequence. On error `store` is left unchanged.
///
/// # Examples
///
/// ```no_run
/// use ros2conf_params::{ParameterStore, parse_param_file};
///
/// let mut store = ParameterStore::new();
/// parse_param_file("config/params.yaml", &mut store)?;
/// for (node, params) in store.nodes() {
///     println!("{node}: {} parameters", params.len());
/// }
/// # Ok::<(), ros2conf_params::ParamsError>(())
/// ```
pub fn parse_param_file<P: AsRef<Path>>(path: P, store: &mut ParameterStore) -> ParamsResult<()> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ParamsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_param_str(&text, store)
}

/// Load YAML parameter-file text into `store`
///
/// Same contract as [`parse_param_file`] with the document already in
/// memory.
///
/// # Errors
///
/// Returns an error if the text is not valid YAML, does not follow the
/// parameter-file shape, or contains a heterogeneous sequence. On error
/// `store` is left unchanged.
pub fn parse_param_str(text: &str, store: &mut ParameterStore) -> ParamsResult<()> {
    let mut builder = StoreBuilder::default();
    let mut parser = Parser::new_from_str(text);
    let scanned = parser.load(&mut builder, true);
    if let Some(err) = builder.error.take() {
        return Err(err);
    }
    scanned?;
    store.merge(builder.store);
    Ok(())
}

/// Parse the value suffix of a `-p name:=value` rule
///
/// Accepts exactly one scalar or one flow sequence, typed by the same
/// rules as file values. An empty string types as `String("")`.
///
/// # Errors
///
/// Returns an error for malformed YAML, mappings, nested or heterogeneous
/// sequences.
///
/// # Examples
///
/// ```
/// use ros2conf_params::{Value, parse_param_value};
///
/// assert_eq!(parse_param_value("30")?, Value::I64(30));
/// assert_eq!(parse_param_value("\"30\"")?, Value::String("30".to_string()));
/// assert_eq!(parse_param_value("[1, 2]")?, Value::VecI64(vec![1, 2]));
/// # Ok::<(), ros2conf_params::ParamsError>(())
/// ```
pub fn parse_param_value(text: &str) -> ParamsResult<Value> {
    if text.is_empty() {
        return Ok(Value::String(String::new()));
    }
    let mut builder = ValueBuilder::default();
    let mut parser = Parser::new_from_str(text);
    let scanned = parser.load(&mut builder, true);
    if let Some(err) = builder.error.take() {
        return Err(err);
    }
    scanned?;
    Ok(builder
        .value
        .unwrap_or_else(|| Value::String(String::new())))
}

// The kind of mapping a MAPPING_START opened, driving which stack the
// matching MAPPING_END pops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Root,
    NodeNs,
    Params,
    Group,
}

#[derive(Debug, Default)]
struct Sequence {
    name: String,
    array: Option<Value>,
    line: usize,
}

#[derive(Debug, Default)]
struct StoreBuilder {
    store: ParameterStore,
    frames: Vec<Frame>,
    node_stack: Vec<String>,
    param_stack: Vec<String>,
    current_node: Option<String>,
    pending_key: Option<String>,
    expecting_key: bool,
    sequence: Option<Sequence>,
    documents: usize,
    error: Option<ParamsError>,
}

impl MarkedEventReceiver for StoreBuilder {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        if self.error.is_none() {
            if let Err(err) = self.handle(ev, mark) {
                self.error = Some(err);
            }
        }
    }
}

impl StoreBuilder {
    fn handle(&mut self, ev: Event, mark: Marker) -> ParamsResult<()> {
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentEnd => Ok(()),
            Event::DocumentStart => {
                self.documents += 1;
                if self.documents > 1 {
                    return Err(ParamsError::Unsupported {
                        feature: "multiple documents in one parameter file".to_string(),
                        line: mark.line(),
                    });
                }
                Ok(())
            }
            Event::Alias(_) => Err(ParamsError::Unsupported {
                feature: "aliases and anchors".to_string(),
                line: mark.line(),
            }),
            Event::MappingStart(_, tag) => self.mapping_start(tag.as_ref(), mark),
            Event::MappingEnd => self.mapping_end(),
            Event::SequenceStart(_, _) => self.sequence_start(mark),
            Event::SequenceEnd => self.sequence_end(mark),
            Event::Scalar(text, style, _, tag) => self.scalar(text, style, tag.as_ref(), mark),
        }
    }

    fn mapping_start(&mut self, _tag: Option<&Tag>, mark: Marker) -> ParamsResult<()> {
        if self.sequence.is_some() {
            return Err(ParamsError::InvalidStructure {
                reason: "sequences must contain scalars only".to_string(),
                line: mark.line(),
            });
        }
        if self.frames.is_empty() {
            self.frames.push(Frame::Root);
            self.expecting_key = true;
            return Ok(());
        }
        if self.expecting_key {
            return Err(ParamsError::InvalidStructure {
                reason: "mapping keys must be scalars".to_string(),
                line: mark.line(),
            });
        }
        let key = self.pending_key.take().ok_or_else(|| ParamsError::InvalidStructure {
            reason: "a nested mapping must be the value of a key".to_string(),
            line: mark.line(),
        })?;
        match self.frames.last() {
            Some(Frame::Root | Frame::NodeNs) => {
                if key == PARAMS_KEY {
                    let fqn = self.node_key(mark)?;
                    self.store.node_mut(&fqn);
                    self.current_node = Some(fqn);
                    self.frames.push(Frame::Params);
                } else {
                    // a key may itself be slash-qualified, avoid doubling
                    // the '/' when joining
                    let segment = key.strip_prefix('/').unwrap_or(&key).to_string();
                    self.node_stack.push(segment);
                    self.frames.push(Frame::NodeNs);
                }
            }
            Some(Frame::Params | Frame::Group) => {
                self.param_stack.push(key);
                self.frames.push(Frame::Group);
            }
            None => unreachable!("frames checked non-empty above"),
        }
        self.expecting_key = true;
        Ok(())
    }

    fn mapping_end(&mut self) -> ParamsResult<()> {
        match self.frames.pop() {
            Some(Frame::NodeNs) => {
                self.node_stack.pop();
            }
            Some(Frame::Group) => {
                self.param_stack.pop();
            }
            Some(Frame::Params) => {
                self.current_node = None;
            }
            Some(Frame::Root) | None => {}
        }
        self.pending_key = None;
        self.expecting_key = true;
        Ok(())
    }

    fn sequence_start(&mut self, mark: Marker) -> ParamsResult<()> {
        if self.sequence.is_some() {
            return Err(ParamsError::InvalidStructure {
                reason: "nested sequences are not supported".to_string(),
                line: mark.line(),
            });
        }
        if self.frames.is_empty() || self.expecting_key {
            return Err(ParamsError::InvalidStructure {
                reason: "a sequence must be a parameter value".to_string(),
                line: mark.line(),
            });
        }
        let key = self.pending_key.take().ok_or_else(|| ParamsError::InvalidStructure {
            reason: "a sequence must be a parameter value".to_string(),
            line: mark.line(),
        })?;
        if !matches!(self.frames.last(), Some(Frame::Params | Frame::Group)) {
            return Err(ParamsError::InvalidStructure {
                reason: format!("parameters must be declared below '{PARAMS_KEY}'"),
                line: mark.line(),
            });
        }
        self.sequence = Some(Sequence {
            name: self.dotted_name(&key),
            array: None,
            line: mark.line(),
        });
        Ok(())
    }

    fn sequence_end(&mut self, _mark: Marker) -> ParamsResult<()> {
        let seq = self.sequence.take().ok_or_else(|| ParamsError::InvalidStructure {
            reason: "unbalanced sequence end".to_string(),
            line: 0,
        })?;
        let Some(array) = seq.array else {
            return Err(ParamsError::InvalidStructure {
                reason: format!(
                    "sequence for parameter '{}' is empty, no element fixes its type",
                    seq.name
                ),
                line: seq.line,
            });
        };
        let node = self.current_node.clone().ok_or_else(|| {
            ParamsError::InvalidStructure {
                reason: format!("parameters must be declared below '{PARAMS_KEY}'"),
                line: seq.line,
            }
        })?;
        self.store.set(&node, &seq.name, array);
        self.expecting_key = true;
        Ok(())
    }

    fn scalar(
        &mut self,
        text: String,
        style: TScalarStyle,
        tag: Option<&Tag>,
        mark: Marker,
    ) -> ParamsResult<()> {
        let str_tagged = check_tag(tag, mark)?;

        if let Some(seq) = &mut self.sequence {
            let element = typed_scalar(&text, style, str_tagged);
            return push_element(&mut seq.array, element, &seq.name, mark.line());
        }

        if self.frames.is_empty() {
            return Err(ParamsError::InvalidStructure {
                reason: "the top level of a parameter file must be a mapping".to_string(),
                line: mark.line(),
            });
        }

        if self.expecting_key {
            self.pending_key = Some(text);
            self.expecting_key = false;
            return Ok(());
        }

        let key = self.pending_key.take().ok_or_else(|| ParamsError::InvalidStructure {
            reason: "a value must follow a key".to_string(),
            line: mark.line(),
        })?;
        match self.frames.last() {
            Some(Frame::Params | Frame::Group) => {
                let node = self.current_node.clone().ok_or_else(|| {
                    ParamsError::InvalidStructure {
                        reason: format!("parameters must be declared below '{PARAMS_KEY}'"),
                        line: mark.line(),
                    }
                })?;
                let name = self.dotted_name(&key);
                let value = typed_scalar(&text, style, str_tagged);
                self.store.set(&node, &name, value);
            }
            Some(Frame::Root | Frame::NodeNs) => {
                return Err(ParamsError::InvalidStructure {
                    reason: format!(
                        "expected a mapping below '{key}', parameters must be declared \
                         below '{PARAMS_KEY}'"
                    ),
                    line: mark.line(),
                });
            }
            None => unreachable!("frames checked non-empty above"),
        }
        self.expecting_key = true;
        Ok(())
    }

    // the accumulated node-namespace stack, '/'-joined and '/'-prefixed
    fn node_key(&mut self, mark: Marker) -> ParamsResult<String> {
        if self.node_stack.is_empty() {
            return Err(ParamsError::InvalidStructure {
                reason: format!("'{PARAMS_KEY}' requires a node name above it"),
                line: mark.line(),
            });
        }
        let fqn = format!("/{}", self.node_stack.join("/"));
        validate_node_key(&fqn).map_err(|reason| ParamsError::InvalidNodeKey {
            name: fqn.clone(),
            reason,
            line: mark.line(),
        })?;
        Ok(fqn)
    }

    fn dotted_name(&self, key: &str) -> String {
        if self.param_stack.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.param_stack.join("."), key)
        }
    }
}

// node keys follow namespace segment rules, with '*' and '**' permitted as
// the terminal segment or the whole key
fn validate_node_key(key: &str) -> Result<(), String> {
    if key == "/**" || key == "/*" {
        return Ok(());
    }
    let segments: Vec<&str> = key[1..].split('/').collect();
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if i == last && (*segment == "*" || *segment == "**") {
            continue;
        }
        validate_node_name(segment).map_err(|issue| format!("segment '{segment}': {issue}"))?;
    }
    Ok(())
}

fn check_tag(tag: Option<&Tag>, mark: Marker) -> ParamsResult<bool> {
    match tag {
        None => Ok(false),
        Some(tag) if tag.suffix == "str" && is_core_handle(&tag.handle) => Ok(true),
        Some(tag) => Err(ParamsError::Unsupported {
            feature: format!("tag '{}{}'", tag.handle, tag.suffix),
            line: mark.line(),
        }),
    }
}

fn is_core_handle(handle: &str) -> bool {
    handle == "tag:yaml.org,2002:" || handle == "!!"
}

fn push_element(
    array: &mut Option<Value>,
    element: Value,
    name: &str,
    line: usize,
) -> ParamsResult<()> {
    let mismatch = |expected: &'static str, found: &Value| ParamsError::HeterogeneousSequence {
        name: name.to_string(),
        line,
        expected,
        found: found.type_name(),
    };
    match (array.as_mut(), element) {
        (None, Value::Bool(b)) => *array = Some(Value::VecBool(vec![b])),
        (None, Value::I64(i)) => *array = Some(Value::VecI64(vec![i])),
        (None, Value::F64(f)) => *array = Some(Value::VecF64(vec![f])),
        (None, Value::String(s)) => *array = Some(Value::VecString(vec![s])),
        (Some(Value::VecBool(v)), Value::Bool(b)) => v.push(b),
        (Some(Value::VecI64(v)), Value::I64(i)) => v.push(i),
        (Some(Value::VecF64(v)), Value::F64(f)) => v.push(f),
        (Some(Value::VecString(v)), Value::String(s)) => v.push(s),
        (Some(Value::VecBool(_)), other) => return Err(mismatch("Bool", &other)),
        (Some(Value::VecI64(_)), other) => return Err(mismatch("I64", &other)),
        (Some(Value::VecF64(_)), other) => return Err(mismatch("F64", &other)),
        (Some(Value::VecString(_)), other) => return Err(mismatch("String", &other)),
        (Some(_), _) | (None, _) => unreachable!("scalars type to scalar variants"),
    }
    Ok(())
}

#[derive(Debug, Default)]
struct ValueBuilder {
    value: Option<Value>,
    sequence: Option<Option<Value>>,
    documents: usize,
    error: Option<ParamsError>,
}

impl MarkedEventReceiver for ValueBuilder {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        if self.error.is_none() {
            if let Err(err) = self.handle(ev, mark) {
                self.error = Some(err);
            }
        }
    }
}

impl ValueBuilder {
    fn handle(&mut self, ev: Event, mark: Marker) -> ParamsResult<()> {
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentEnd => Ok(()),
            Event::DocumentStart => {
                self.documents += 1;
                if self.documents > 1 {
                    return Err(ParamsError::InvalidStructure {
                        reason: "a parameter value must be a single document".to_string(),
                        line: mark.line(),
                    });
                }
                Ok(())
            }
            Event::Alias(_) => Err(ParamsError::Unsupported {
                feature: "aliases and anchors".to_string(),
                line: mark.line(),
            }),
            Event::MappingStart(_, _) => Err(ParamsError::InvalidStructure {
                reason: "a parameter value must be a scalar or flow sequence".to_string(),
                line: mark.line(),
            }),
            Event::MappingEnd => Ok(()),
            Event::SequenceStart(_, _) => {
                if self.sequence.is_some() {
                    return Err(ParamsError::InvalidStructure {
                        reason: "nested sequences are not supported".to_string(),
                        line: mark.line(),
                    });
                }
                if self.value.is_some() {
                    return Err(ParamsError::InvalidStructure {
                        reason: "a parameter value must be a single value".to_string(),
                        line: mark.line(),
                    });
                }
                self.sequence = Some(None);
                Ok(())
            }
            Event::SequenceEnd => {
                let array = self.sequence.take().ok_or_else(|| {
                    ParamsError::InvalidStructure {
                        reason: "unbalanced sequence end".to_string(),
                        line: mark.line(),
                    }
                })?;
                let Some(array) = array else {
                    return Err(ParamsError::InvalidStructure {
                        reason: "sequence is empty, no element fixes its type".to_string(),
                        line: mark.line(),
                    });
                };
                self.value = Some(array);
                Ok(())
            }
            Event::Scalar(text, style, _, tag) => {
                let str_tagged = check_tag(tag.as_ref(), mark)?;
                let typed = typed_scalar(&text, style, str_tagged);
                if let Some(array) = &mut self.sequence {
                    push_element(array, typed, &text, mark.line())
                } else if self.value.is_some() {
                    Err(ParamsError::InvalidStructure {
                        reason: "a parameter value must be a single value".to_string(),
                        line: mark.line(),
                    })
                } else {
                    self.value = Some(typed);
                    Ok(())
                }
            }
        }
    }
}
