//! # Container Schemas
//!
//! [`ArraySchema`] (homogeneous sequence) and [`MapSchema`] (homogeneous
//! string-keyed dictionary). Both check the container kind of the target
//! before looking at elements, so an empty value never widens the set of
//! acceptable targets. For empty values the element schema is still checked
//! against a scratch element of the target.
//!
//! Validation collects the issues of every element. Binding stops at the
//! first failing element and leaves the target untouched.

use serde_json::{json, Value};

use crate::error::MapError;
use crate::issue::{format_index_path, format_key_path, ValidationError};
use crate::metadata::MetaData;
use crate::schema::Schema;
use crate::target::Slot;
use crate::value::json_equal;

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// A sequence whose elements all satisfy `items`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    /// Title and description.
    pub meta: MetaData,
    /// Schema every element must satisfy.
    pub items: Box<Schema>,
    /// Reject arrays holding two structurally equal elements.
    pub unique: bool,
}

impl ArraySchema {
    /// An array of `items`.
    pub fn new(items: impl Into<Schema>) -> Self {
        Self {
            meta: MetaData::default(),
            items: Box::new(items.into()),
            unique: false,
        }
    }

    /// Require all elements to be distinct.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Attach a title and description.
    pub fn with_meta(mut self, meta: MetaData) -> Self {
        self.meta = meta;
        self
    }

    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        let mut m = self.meta.descriptor();
        m.insert("type".into(), json!("array"));
        m.insert("items".into(), self.items.descriptor());
        if self.unique {
            m.insert("uniqueItems".into(), json!(true));
        }
        Value::Object(m)
    }

    /// Validate every element, then uniqueness.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(items) = value.as_array() else {
            return Err(ValidationError::single("Expected an array at {path}"));
        };

        let mut e = ValidationError::new();
        for (i, item) in items.iter().enumerate() {
            if let Err(err) = self.items.validate(item) {
                e.add_issues_with_prefix(&err, &format_index_path(i));
            }
        }
        if self.unique && has_duplicates(items) {
            e.add_issue("", "Array at {path} contains duplicate items");
        }
        e.into_result()
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Sequence(target) => target.probe(&mut |element| self.items.check(element.slot())),
            other => Err(MapError::mismatch("array", other.type_name())),
        }
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Sequence(target) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| ValidationError::single("Expected an array at {path}"))?;
                if items.is_empty() {
                    target.probe(&mut |element| self.items.check(element.slot()))?;
                }
                target.bind_elements(items.len(), &mut |i, element| {
                    self.items
                        .bind(&items[i], element.slot())
                        .map_err(|e| e.with_prefix(&format_index_path(i)))
                })
            }
            other => Err(MapError::mismatch("array", other.type_name())),
        }
    }
}

fn has_duplicates(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, a)| items[i + 1..].iter().any(|b| json_equal(a, b)))
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// A string-keyed dictionary whose values all satisfy `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSchema {
    /// Title and description.
    pub meta: MetaData,
    /// Schema every value must satisfy.
    pub values: Box<Schema>,
}

impl MapSchema {
    /// A map of `values`.
    pub fn new(values: impl Into<Schema>) -> Self {
        Self {
            meta: MetaData::default(),
            values: Box::new(values.into()),
        }
    }

    /// Attach a title and description.
    pub fn with_meta(mut self, meta: MetaData) -> Self {
        self.meta = meta;
        self
    }

    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        let mut m = self.meta.descriptor();
        m.insert("type".into(), json!("object"));
        m.insert("additionalProperties".into(), self.values.descriptor());
        Value::Object(m)
    }

    /// Validate every value, keyed by its formatted path segment.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(entries) = value.as_object() else {
            return Err(ValidationError::single("Expected object type at {path}"));
        };

        let mut e = ValidationError::new();
        for (key, entry) in entries {
            if let Err(err) = self.values.validate(entry) {
                e.add_issues_with_prefix(&err, &format_key_path(key));
            }
        }
        e.into_result()
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Dictionary(target) => {
                target.probe(&mut |element| self.values.check(element.slot()))
            }
            other => Err(MapError::mismatch("map", other.type_name())),
        }
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Dictionary(target) => {
                let entries = value
                    .as_object()
                    .ok_or_else(|| ValidationError::single("Expected object type at {path}"))?;
                if entries.is_empty() {
                    target.probe(&mut |element| self.values.check(element.slot()))?;
                }
                let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
                target.bind_entries(&keys, &mut |key, element| {
                    let entry = entries
                        .get(key)
                        .ok_or_else(|| ValidationError::single("Missing entry at {path}"))?;
                    self.values
                        .bind(entry, element.slot())
                        .map_err(|e| e.with_prefix(&format_key_path(key)))
                })
            }
            other => Err(MapError::mismatch("map", other.type_name())),
        }
    }
}
