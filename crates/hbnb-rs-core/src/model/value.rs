//! Tagged attribute values.

use crate::error::RecordError;
use serde_json::{Number, Value};
use std::fmt;

/// A dynamically typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl AttrValue {
    /// Coerce raw command text into a value.
    ///
    /// All digits become an integer; digits with exactly one decimal point
    /// become a float; everything else stays a string. An all-digit value
    /// too large for `i64` stays a string.
    pub fn coerce(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return match raw.parse::<i64>() {
                Ok(value) => Self::Int(value),
                Err(_) => Self::Str(raw.to_string()),
            };
        }

        let dots = raw.bytes().filter(|b| *b == b'.').count();
        let digits = raw.bytes().filter(u8::is_ascii_digit).count();
        if dots == 1
            && digits > 0
            && dots + digits == raw.len()
            && let Ok(value) = raw.parse::<f64>()
        {
            return Self::Float(value);
        }

        Self::Str(raw.to_string())
    }

    /// Convert a JSON value, rejecting nulls, arrays and objects.
    pub fn from_json(field: &str, value: &Value) -> Result<Self, RecordError> {
        let unsupported = |found| RecordError::UnsupportedValue {
            field: field.to_string(),
            found,
        };
        match value {
            Value::String(text) => Ok(Self::Str(text.clone())),
            Value::Bool(flag) => Ok(Self::Bool(*flag)),
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Ok(Self::Int(int))
                } else {
                    number
                        .as_f64()
                        .map(Self::Float)
                        .ok_or_else(|| unsupported("number"))
                }
            }
            Value::Null => Err(unsupported("null")),
            Value::Array(_) => Err(unsupported("array")),
            Value::Object(_) => Err(unsupported("object")),
        }
    }

    /// JSON form used in the persisted representation.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(value) => Value::from(*value),
            Self::Float(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
            Self::Str(value) => Value::String(value.clone()),
            Self::Bool(value) => Value::Bool(*value),
        }
    }
}

impl fmt::Display for AttrValue {
    /// Strings are single-quoted so rendered bags read like literal maps.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Str(value) => {
                write!(f, "'")?;
                for ch in value.chars() {
                    match ch {
                        '\'' => write!(f, "\\'")?,
                        '\\' => write!(f, "\\\\")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "'")
            }
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}
