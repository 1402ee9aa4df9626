//! # Object Schema
//!
//! Named, heterogeneous properties with a `required` list and an
//! `additionalProperties` policy.
//!
//! ## Validation
//!
//! Three checks run over the data and their issues are reported together:
//!
//! 1. every declared property present in the data is validated against its
//!    schema,
//! 2. keys without a declared property are rejected unless additional
//!    properties are allowed,
//! 3. names in `required` absent from the data are reported.
//!
//! ## Binding
//!
//! Objects bind into a [`RecordTarget`](crate::RecordTarget) only. The
//! record's binding table must name every declared property and every
//! required name, and every declared property must fit its field whether or
//! not the data holds it. Both are checked before any field is written, so
//! a type mismatch leaves the record untouched. Fields are then written one
//! at a time and are not rolled back if a later field fails.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::error::MapError;
use crate::issue::{format_key_path, ValidationError};
use crate::metadata::MetaData;
use crate::schema::Schema;
use crate::target::{RecordTarget, Slot};

/// An object with declared properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Title and description.
    pub meta: MetaData,
    /// Schemas for the declared properties.
    pub properties: BTreeMap<String, Schema>,
    /// Accept keys without a declared property.
    pub additional_properties: bool,
    /// Names that must be present in the data.
    pub required: Vec<String>,
}

impl ObjectSchema {
    /// An object with no properties that rejects additional keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare property `name`.
    pub fn property(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.properties.insert(name.into(), schema.into());
        self
    }

    /// Require `name` to be present.
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Accept keys without a declared property.
    pub fn allow_additional(mut self) -> Self {
        self.additional_properties = true;
        self
    }

    /// Attach a title and description.
    pub fn with_meta(mut self, meta: MetaData) -> Self {
        self.meta = meta;
        self
    }

    /// JSON-Schema descriptor for this schema.
    ///
    /// `additionalProperties` is only emitted when it is `false`.
    pub fn descriptor(&self) -> Value {
        let mut m = self.meta.descriptor();
        m.insert("type".into(), json!("object"));
        if !self.properties.is_empty() {
            let props: serde_json::Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.descriptor()))
                .collect();
            m.insert("properties".into(), Value::Object(props));
        }
        if !self.additional_properties {
            m.insert("additionalProperties".into(), json!(false));
        }
        if !self.required.is_empty() {
            m.insert("required".into(), json!(self.required));
        }
        Value::Object(m)
    }

    /// Validate present properties, additional keys and required names.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(data) = value.as_object() else {
            return Err(ValidationError::single("Expected object type at {path}"));
        };

        let mut e = ValidationError::new();
        for (name, schema) in &self.properties {
            let Some(entry) = data.get(name) else {
                continue;
            };
            if let Err(err) = schema.validate(entry) {
                e.add_issues_with_prefix(&err, &format_key_path(name));
            }
        }

        if !self.additional_properties {
            for key in data.keys().filter(|k| !self.properties.contains_key(*k)) {
                e.add_issue(
                    format_key_path(key),
                    format!("Additional property '{key}' not allowed at {{path}}"),
                );
            }
        }

        for name in self.required.iter().filter(|n| !data.contains_key(*n)) {
            e.add_issue(
                format_key_path(name),
                format!("Required property '{name}' is missing at {{path}}"),
            );
        }
        e.into_result()
    }

    /// Name of a declared or required property `record` has no field for.
    fn unbound_name(&self, record: &dyn RecordTarget) -> Option<&str> {
        let fields = record.fields();
        self.properties
            .keys()
            .chain(self.required.iter())
            .map(String::as_str)
            .find(|name| !fields.iter().any(|field| field == name))
    }

    fn unbound_mismatch(&self, name: &str) -> MapError {
        MapError::mismatch(format!("object property {name:?}"), "record")
    }

    /// Check the binding table and every declared field's type.
    fn check_record(&self, record: &mut dyn RecordTarget) -> Result<(), MapError> {
        if let Some(name) = self.unbound_name(record) {
            return Err(self.unbound_mismatch(name));
        }
        for (name, schema) in &self.properties {
            if let Some(field) = record.field(name) {
                field.inspect_slot(&mut |slot| schema.check(slot))?;
            }
        }
        Ok(())
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Record(record) => self.check_record(record),
            other => Err(MapError::mismatch("object", other.type_name())),
        }
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        let record = match slot {
            Slot::Record(record) => record,
            other => return Err(MapError::mismatch("object", other.type_name())),
        };
        self.check_record(record)?;
        let data = value
            .as_object()
            .ok_or_else(|| ValidationError::single("Expected object type at {path}"))?;

        for (name, schema) in &self.properties {
            let Some(entry) = data.get(name) else {
                continue;
            };
            let Some(field) = record.field(name) else {
                continue;
            };
            schema
                .bind(entry, field.slot())
                .map_err(|e| e.with_prefix(&format_key_path(name)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_target;
    use crate::scalar::{IntegerSchema, StringSchema};
    use crate::target::MapTarget;

    fn sample() -> ObjectSchema {
        ObjectSchema::new()
            .property("int", IntegerSchema::new(-240, 240))
            .require("int")
    }

    #[derive(Debug, Default)]
    struct WithInt {
        int: i32,
    }

    record_target!(WithInt { "int" => int });

    #[derive(Debug, Default)]
    struct WithoutInt {
        other: i32,
    }

    record_target!(WithoutInt { "other" => other });

    #[derive(Debug, Default)]
    struct Partial {
        int: Option<i64>,
        label: Option<String>,
        raw: Value,
    }

    record_target!(Partial {
        "int" => int,
        "label" => label,
        "raw" => raw,
    });

    #[test]
    fn test_descriptor() {
        assert_eq!(
            sample().descriptor(),
            json!({
                "type": "object",
                "properties": {"int": {"type": "integer", "minimum": -240, "maximum": 240}},
                "additionalProperties": false,
                "required": ["int"],
            })
        );
        assert_eq!(
            ObjectSchema::new().allow_additional().descriptor(),
            json!({"type": "object"})
        );
    }

    #[test]
    fn test_validate() {
        let s = sample();
        assert!(s.validate(&json!({"int": 4})).is_ok());
        assert!(s.validate(&json!({})).is_err());
        assert!(s.validate(&json!({"int": 4, "extra": 1})).is_err());
        assert!(s.validate(&json!([])).is_err());
    }

    #[test]
    fn test_all_checks_are_reported_together() {
        let s = sample().property("name", StringSchema::default()).require("name");
        let e = s.validate(&json!({"name": 7, "extra": 1})).unwrap_err();
        let messages: Vec<String> = e.issues("").iter().map(|i| i.message()).collect();
        assert_eq!(
            messages,
            vec![
                "Expected a string at root.name".to_string(),
                "Additional property 'extra' not allowed at root.extra".to_string(),
                "Required property 'int' is missing at root.int".to_string(),
            ]
        );
    }

    #[test]
    fn test_absent_optional_property_is_not_validated() {
        let s = ObjectSchema::new().property("opt", IntegerSchema::new(0, 1));
        assert!(s.validate(&json!({})).is_ok());
    }

    #[test]
    fn test_bind_into_record() {
        let mut target = WithInt::default();
        sample().bind(&json!({"int": 4}), target.slot()).unwrap();
        assert_eq!(target.int, 4);
    }

    #[test]
    fn test_record_missing_field_is_mismatch() {
        let mut target = WithoutInt::default();
        let err = sample().bind(&json!({"int": 4}), target.slot()).unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(target.other, 0);
    }

    #[test]
    fn test_required_name_without_property_still_needs_field() {
        let s = ObjectSchema::new().allow_additional().require("int");
        let mut target = WithoutInt::default();
        assert!(s.bind(&json!({"int": 1}), target.slot()).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_optional_and_dynamic_fields() {
        let s = ObjectSchema::new()
            .property("int", IntegerSchema::default())
            .property("label", StringSchema::default())
            .property("raw", IntegerSchema::default());
        let mut target = Partial::default();
        s.bind(&json!({"int": 7, "raw": 3}), target.slot()).unwrap();
        assert_eq!(target.int, Some(7));
        assert_eq!(target.label, None);
        assert_eq!(target.raw, json!(3));
    }

    #[derive(Debug, Default)]
    struct Narrow {
        int: Option<i8>,
        label: String,
    }

    record_target!(Narrow {
        "int" => int,
        "label" => label,
    });

    #[test]
    fn test_field_types_are_checked_whether_or_not_present() {
        let s = ObjectSchema::new()
            .property("int", IntegerSchema::new(-240, 240))
            .property("label", StringSchema::default());
        for data in [json!({}), json!({"label": "x"}), json!({"int": 4, "label": "x"})] {
            let mut target = Narrow::default();
            let err = s.bind(&data, target.slot()).unwrap_err();
            assert!(err.is_type_mismatch(), "{data}");
            assert_eq!(target.int, None, "{data}");
            assert_eq!(target.label, "", "{data}");
        }
    }

    #[test]
    fn test_check_leaves_optional_fields_empty() {
        let s = ObjectSchema::new().property("int", IntegerSchema::new(-100, 100));
        let mut target = Narrow::default();
        s.check(target.slot()).unwrap();
        assert_eq!(target.int, None);
    }

    #[test]
    fn test_non_record_target_is_mismatch() {
        let mut target: Vec<i32> = Vec::new();
        assert!(sample().bind(&json!({"int": 4}), target.slot()).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_check_inspects_field_types() {
        let narrow = ObjectSchema::new().property("int", IntegerSchema::default());
        let mut target = WithInt::default();
        assert!(narrow.check(target.slot()).unwrap_err().is_type_mismatch());
        sample().check(target.slot()).unwrap();
    }
}
