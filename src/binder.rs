//! Parameter Binder
//!
//! Validates caller-supplied parameters against the number of `?`
//! placeholders in a template body. The body's placeholder count is the only
//! thing consulted; values are opaque and passed through untouched.
//!
//! Two input shapes are accepted:
//!
//! ```json
//! ["2025-01-01", "2025-02-01"]
//! {"1": "2025-01-01", "2": "2025-02-01"}
//! ```
//!
//! The numbered map is kept for older clients and is converted to a list
//! here; nothing past the binder sees it.

use serde_json::{Map, Value};

use crate::error::BindingError;

/// Raw parameters as received from a caller
#[derive(Debug, Clone, PartialEq)]
pub enum RawParameters {
    /// Preferred form, one value per placeholder in order
    Positional(Vec<Value>),
    /// Legacy form keyed `"1"`, `"2"`, ...
    Keyed(Map<String, Value>),
    /// Anything else (scalars); always rejected
    Unsupported(Value),
}

impl RawParameters {
    /// Classify a JSON value; `null` means no parameters were given
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(Self::Positional(items)),
            Value::Object(map) => Some(Self::Keyed(map)),
            other => Some(Self::Unsupported(other)),
        }
    }
}

impl From<Vec<Value>> for RawParameters {
    fn from(values: Vec<Value>) -> Self {
        Self::Positional(values)
    }
}

/// Count `?` placeholders in a SQL body
///
/// Markers inside string literals, quoted identifiers and comments are not
/// placeholders.
pub fn placeholder_count(body: &str) -> usize {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        SingleQuoted,
        DoubleQuoted,
        LineComment,
        BlockComment,
    }

    let mut state = State::Code;
    let mut count = 0;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        state = match (state, c) {
            (State::Code, '?') => {
                count += 1;
                State::Code
            }
            (State::Code, '\'') => State::SingleQuoted,
            (State::Code, '"') => State::DoubleQuoted,
            (State::Code, '-') if chars.peek() == Some(&'-') => {
                chars.next();
                State::LineComment
            }
            (State::Code, '/') if chars.peek() == Some(&'*') => {
                chars.next();
                State::BlockComment
            }
            // A doubled quote inside a literal closes and immediately reopens
            (State::SingleQuoted, '\'') => State::Code,
            (State::DoubleQuoted, '"') => State::Code,
            (State::LineComment, '\n') => State::Code,
            (State::BlockComment, '*') if chars.peek() == Some(&'/') => {
                chars.next();
                State::Code
            }
            (state, _) => state,
        };
    }

    count
}

/// Validate `raw` against `required` placeholders and return values in
/// placeholder order
pub fn normalize(raw: Option<RawParameters>, required: usize) -> Result<Vec<Value>, BindingError> {
    match raw {
        None if required > 0 => Err(BindingError::MissingParameters { required }),
        None => Ok(Vec::new()),
        Some(RawParameters::Positional(values)) => {
            if values.len() != required {
                return Err(BindingError::ParameterCountMismatch {
                    required,
                    provided: values.len(),
                });
            }
            Ok(values)
        }
        Some(RawParameters::Keyed(mut map)) => (1..=required)
            .map(|index| {
                map.remove(&index.to_string())
                    .ok_or(BindingError::MissingParameterKey { index })
            })
            .collect(),
        Some(RawParameters::Unsupported(_)) => Err(BindingError::UnsupportedParameterShape),
    }
}
