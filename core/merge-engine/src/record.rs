//! FILENAME: core/merge-engine/src/record.rs
//! PURPOSE: Field access for the rows being merged.
//! CONTEXT: The engine never owns or mutates rows. It only needs to read a
//! field by name, so any record type can take part by implementing
//! `FieldRecord`.

use std::collections::HashMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};
use crate::value::FieldValue;

/// Read access to the named fields of a row.
pub trait FieldRecord {
    /// Returns the value of `name`, or None when the row has no such field.
    fn field(&self, name: &str) -> Option<&FieldValue>;
}

impl<R: FieldRecord + ?Sized> FieldRecord for &R {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        (**self).field(name)
    }
}

impl FieldRecord for HashMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

impl FieldRecord for FxHashMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

// ============================================================================
// ROW
// ============================================================================

/// A generic row record: field name -> value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: FxHashMap<String, FieldValue>,
}

impl Row {
    pub fn new() -> Self {
        Row {
            fields: FxHashMap::default(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a row from a JSON object. `index` is the row position,
    /// reported back when the value is not an object.
    pub fn from_json(index: usize, value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or(MergeError::NotAnObject { index })?;

        let mut row = Row::new();
        for (name, field) in object {
            row.insert(name.clone(), FieldValue::from_json(name, field)?);
        }
        Ok(row)
    }
}

impl FieldRecord for Row {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

/// Decodes a JSON array of objects into rows, keeping their order.
pub fn rows_from_json(json: &str) -> Result<Vec<Row>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    values
        .iter()
        .enumerate()
        .map(|(index, value)| Row::from_json(index, value))
        .collect()
}
