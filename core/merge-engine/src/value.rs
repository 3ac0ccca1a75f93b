//! FILENAME: core/merge-engine/src/value.rs
//! PURPOSE: The values a row field can hold.
//! CONTEXT: Merge decisions compare field values of adjacent rows, so
//! equality here is strict: different variants never match and NaN never
//! matches itself.

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};

/// A single field value of a row record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Converts a JSON scalar into a field value.
    /// `field` is only used to name the offending field in the error.
    pub fn from_json(field: &str, value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(FieldValue::Empty),
            serde_json::Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
            serde_json::Value::Number(n) => Ok(FieldValue::Number(n.as_f64().unwrap_or(f64::NAN))),
            serde_json::Value::String(s) => Ok(FieldValue::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Err(MergeError::UnsupportedValue {
                    field: field.to_string(),
                })
            }
        }
    }

    /// Returns false for Empty, `false`, zero, NaN and the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Empty => false,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Boolean(b) => *b,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Empty
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}
