use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A single label value as exiftool reports it (or as a caller wants it written).
///
/// Values keep the kind the engine returned; nothing is coerced to a string.
/// Serialized untagged, so `Text("Acme")` becomes `"Acme"` and
/// `Integer(400)` becomes `400` in JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Integer(i64),
    /// Only numbers with a fractional part or exponent.
    Float(f64),
    Text(String),
    /// Lists, booleans, nulls, structured tags and integers beyond `i64`.
    Composite(Value),
}

impl TagValue {
    /// Render the value as exiftool assignment operands.
    ///
    /// A list expands to one operand per element (exiftool appends each to a
    /// list-type tag); `null` renders as an empty operand, which deletes the tag.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::Composite(Value::Array(items)) => items
                .iter()
                .cloned()
                .map(|item| TagValue::from(item).to_string())
                .collect(),
            other => vec![other.to_string()],
        }
    }
}

impl From<Value> for TagValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Self::Integer(i),
                (None, Some(f)) if n.is_f64() => Self::Float(f),
                _ => Self::Composite(Value::Number(n)),
            },
            other => Self::Composite(other),
        }
    }
}

// Goes through `Value` so every source classifies numbers the same way.
impl<'de> Deserialize<'de> for TagValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Composite(Value::Null) => Ok(()),
            Self::Composite(Value::Bool(b)) => write!(f, "{b}"),
            Self::Composite(Value::Array(items)) => {
                let parts: Vec<String> = items
                    .iter()
                    .cloned()
                    .map(|item| TagValue::from(item).to_string())
                    .collect();
                f.write_str(&parts.join(", "))
            }
            Self::Composite(other) => write!(f, "{other}"),
        }
    }
}
