//! Field values carried by records.
//!
//! # Responsibility
//! - Define the closed set of value shapes a record field may hold.
//! - Convert between wire JSON values and typed field values.
//! - Parse console input into field values, honoring declared field types.
//!
//! # Invariants
//! - Only string, integer, float and list-of-strings values exist.
//! - Conversion from JSON never silently drops data: unsupported shapes are
//!   rejected, not coerced to strings.
//! - Floats that reach the wire are finite.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One named field value stored on a record.
///
/// Serialized untagged so the wire form is the plain JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

/// Declared type of a fixed field, used for coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Int,
    Float,
    List,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Float => "float",
            Self::List => "list of strings",
        }
    }
}

impl FieldValue {
    /// Returns the value's type tag.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Int(_) => FieldType::Int,
            Self::Float(_) => FieldType::Float,
            Self::Str(_) => FieldType::Str,
            Self::List(_) => FieldType::List,
        }
    }

    /// Converts one decoded JSON value.
    ///
    /// Returns `None` for `null`, booleans, objects and lists that contain
    /// anything other than strings. Integral JSON numbers become `Int`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    /// Converts to the wire JSON value.
    ///
    /// # Errors
    /// - Non-finite floats have no JSON form and are rejected rather than
    ///   written as `null`.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        if let Self::Float(value) = self {
            if !value.is_finite() {
                return Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                    "float `{value}` has no JSON form"
                )));
            }
        }
        serde_json::to_value(self)
    }

    /// Whether the value can be written to the wire.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(value) => value.is_finite(),
            _ => true,
        }
    }

    /// Coerces this value to a declared type when the conversion is lossless.
    ///
    /// Integers widen to floats; everything else must already match.
    pub fn coerce_to(self, expected: FieldType) -> Option<Self> {
        match (self, expected) {
            (value, _) if !value.is_finite() => None,
            (Self::Int(value), FieldType::Float) => Some(Self::Float(value as f64)),
            (value, expected) if value.field_type() == expected => Some(value),
            _ => None,
        }
    }

    /// Parses raw console input.
    ///
    /// `quoted` marks input that arrived inside double quotes; such input is
    /// always a string unless the declared type says otherwise.
    pub fn parse_input(raw: &str, quoted: bool, declared: Option<FieldType>) -> Option<Self> {
        match declared {
            Some(FieldType::Str) => Some(Self::Str(raw.to_string())),
            Some(FieldType::Int) => raw.trim().parse::<i64>().ok().map(Self::Int),
            Some(FieldType::Float) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Self::Float),
            Some(FieldType::List) => serde_json::from_str::<Vec<String>>(raw)
                .ok()
                .map(Self::List),
            None if quoted => Some(Self::Str(raw.to_string())),
            None => Some(infer_unquoted(raw)),
        }
    }
}

fn infer_unquoted(raw: &str) -> FieldValue {
    if let Ok(value) = raw.parse::<i64>() {
        return FieldValue::Int(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => FieldValue::Float(value),
        _ => FieldValue::Str(raw.to_string()),
    }
}

/// Display form used in record rendering: strings are single-quoted,
/// floats always carry a fractional part.
impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Str(value) => write!(f, "'{value}'"),
            Self::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{item}'")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
