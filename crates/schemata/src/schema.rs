//! # Schema
//!
//! The closed sum of every schema variant and the three operations they
//! share:
//!
//! - [`Schema::descriptor`] renders the JSON-Schema subset document,
//! - [`Schema::validate`] collects every issue in a decoded value,
//! - [`Schema::map`] validates, then binds the value into a typed target.
//!
//! Schemas are immutable once built and hold no interior mutability, so a
//! single schema can be shared across threads and used by any number of
//! concurrent calls.

use serde_json::Value;

use crate::combinator::{AllOf, AnyOf, OneOf};
use crate::container::{ArraySchema, MapSchema};
use crate::duration::DurationSchema;
use crate::error::MapError;
use crate::issue::ValidationError;
use crate::object::ObjectSchema;
use crate::scalar::{
    BooleanSchema, DateTimeSchema, IntegerSchema, NumberSchema, StringEnumSchema, StringSchema,
    UriSchema,
};
use crate::target::{MapTarget, Slot};

/// A schema: describe, validate and map.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Integer within a range.
    Integer(IntegerSchema),
    /// Number within a range.
    Number(NumberSchema),
    /// Boolean.
    Boolean(BooleanSchema),
    /// String with optional length bounds and pattern.
    String(StringSchema),
    /// One of a fixed list of strings.
    StringEnum(StringEnumSchema),
    /// URI string.
    Uri(UriSchema),
    /// RFC 3339 timestamp string.
    DateTime(DateTimeSchema),
    /// Whole seconds or a duration string.
    Duration(DurationSchema),
    /// Homogeneous sequence.
    Array(ArraySchema),
    /// Homogeneous string-keyed dictionary.
    Map(MapSchema),
    /// Named properties.
    Object(ObjectSchema),
    /// At least one branch.
    AnyOf(AnyOf),
    /// Exactly one branch.
    OneOf(OneOf),
    /// Every branch.
    AllOf(AllOf),
}

macro_rules! schema_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Schema {
                fn from(schema: $ty) -> Self {
                    Schema::$variant(schema)
                }
            }
        )*
    };
}

schema_from!(
    Integer(IntegerSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    String(StringSchema),
    StringEnum(StringEnumSchema),
    Uri(UriSchema),
    DateTime(DateTimeSchema),
    Duration(DurationSchema),
    Array(ArraySchema),
    Map(MapSchema),
    Object(ObjectSchema),
    AnyOf(AnyOf),
    OneOf(OneOf),
    AllOf(AllOf),
);

impl Schema {
    /// Short name of the variant, used in logs and mismatch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Schema::Integer(_) => "integer",
            Schema::Number(_) => "number",
            Schema::Boolean(_) => "boolean",
            Schema::String(_) => "string",
            Schema::StringEnum(_) => "string enum",
            Schema::Uri(_) => "uri",
            Schema::DateTime(_) => "date-time",
            Schema::Duration(_) => "duration",
            Schema::Array(_) => "array",
            Schema::Map(_) => "map",
            Schema::Object(_) => "object",
            Schema::AnyOf(_) => "anyOf",
            Schema::OneOf(_) => "oneOf",
            Schema::AllOf(_) => "allOf",
        }
    }

    /// The JSON-Schema descriptor document.
    ///
    /// Optional keys are omitted rather than emitted with default values.
    pub fn descriptor(&self) -> Value {
        match self {
            Schema::Integer(s) => s.descriptor(),
            Schema::Number(s) => s.descriptor(),
            Schema::Boolean(s) => s.descriptor(),
            Schema::String(s) => s.descriptor(),
            Schema::StringEnum(s) => s.descriptor(),
            Schema::Uri(s) => s.descriptor(),
            Schema::DateTime(s) => s.descriptor(),
            Schema::Duration(s) => s.descriptor(),
            Schema::Array(s) => s.descriptor(),
            Schema::Map(s) => s.descriptor(),
            Schema::Object(s) => s.descriptor(),
            Schema::AnyOf(s) => s.descriptor(),
            Schema::OneOf(s) => s.descriptor(),
            Schema::AllOf(s) => s.descriptor(),
        }
    }

    /// Validate `value`, returning every issue found.
    ///
    /// Issue paths are relative to this schema; use
    /// [`ValidationError::issues`] to render them under a root label.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let result = match self {
            Schema::Integer(s) => s.validate(value),
            Schema::Number(s) => s.validate(value),
            Schema::Boolean(s) => s.validate(value),
            Schema::String(s) => s.validate(value),
            Schema::StringEnum(s) => s.validate(value),
            Schema::Uri(s) => s.validate(value),
            Schema::DateTime(s) => s.validate(value),
            Schema::Duration(s) => s.validate(value),
            Schema::Array(s) => s.validate(value),
            Schema::Map(s) => s.validate(value),
            Schema::Object(s) => s.validate(value),
            Schema::AnyOf(s) => s.validate(value),
            Schema::OneOf(s) => s.validate(value),
            Schema::AllOf(s) => s.validate(value),
        };
        if let Err(e) = &result {
            tracing::trace!(kind = self.kind(), issues = e.len(), "value failed validation");
        }
        result
    }

    /// Validate `value` and bind it into `target`.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Validation` holding exactly what
    /// [`validate`](Self::validate) returned if the value is invalid; the
    /// target is untouched. Returns `MapError::TypeMismatch` if the value is
    /// valid but `target` cannot represent the schema. Target
    /// compatibility is decided on the schema alone, before anything is
    /// written, so a mismatch leaves the target untouched.
    pub fn map(&self, value: &Value, target: &mut dyn MapTarget) -> Result<(), MapError> {
        self.validate(value)?;
        target.inspect_slot(&mut |slot| self.check(slot))?;
        self.bind(value, target.slot())
    }

    /// Bind an already validated value into `slot`.
    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        let slot = match slot {
            Slot::Dynamic(raw) => {
                *raw = value.clone();
                return Ok(());
            }
            slot => slot,
        };
        match self {
            Schema::Integer(s) => s.bind(value, slot),
            Schema::Number(s) => s.bind(value, slot),
            Schema::Boolean(s) => s.bind(value, slot),
            Schema::String(s) => s.bind(value, slot),
            Schema::StringEnum(s) => s.bind(value, slot),
            Schema::Uri(s) => s.bind(value, slot),
            Schema::DateTime(s) => s.bind(value, slot),
            Schema::Duration(s) => s.bind(value, slot),
            Schema::Array(s) => s.bind(value, slot),
            Schema::Map(s) => s.bind(value, slot),
            Schema::Object(s) => s.bind(value, slot),
            Schema::AnyOf(s) => s.check(slot),
            Schema::OneOf(s) => s.check(slot),
            Schema::AllOf(s) => s.check(slot),
        }
    }

    /// Whether `slot` can hold any value this schema accepts.
    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        let slot = match slot {
            Slot::Dynamic(_) => return Ok(()),
            slot => slot,
        };
        match self {
            Schema::Integer(s) => s.check(slot),
            Schema::Number(s) => s.check(slot),
            Schema::Boolean(s) => s.check(slot),
            Schema::String(s) => s.check(slot),
            Schema::StringEnum(s) => s.check(slot),
            Schema::Uri(s) => s.check(slot),
            Schema::DateTime(s) => s.check(slot),
            Schema::Duration(s) => s.check(slot),
            Schema::Array(s) => s.check(slot),
            Schema::Map(s) => s.check(slot),
            Schema::Object(s) => s.check(slot),
            Schema::AnyOf(s) => s.check(slot),
            Schema::OneOf(s) => s.check(slot),
            Schema::AllOf(s) => s.check(slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_schema_is_shareable() {
        assert_send_sync::<Schema>();
    }

    #[test]
    fn test_map_returns_validation_error_unchanged() {
        let s: Schema = IntegerSchema::new(-240, 240).into();
        let direct = s.validate(&json!(500)).unwrap_err();
        let mut target = 0i64;
        match s.map(&json!(500), &mut target) {
            Err(MapError::Validation(e)) => assert_eq!(e, direct),
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert_eq!(target, 0);
    }

    #[test]
    fn test_invalid_value_into_wrong_target_is_validation_error() {
        let s: Schema = IntegerSchema::new(-240, 240).into();
        let mut target = String::new();
        let err = s.map(&json!("no"), &mut target).unwrap_err();
        assert!(!err.is_type_mismatch());
    }

    #[test]
    fn test_every_variant_maps_into_dynamic() {
        let cases: Vec<(Schema, Value)> = vec![
            (IntegerSchema::default().into(), json!(3)),
            (StringSchema::default().into(), json!("s")),
            (ArraySchema::new(BooleanSchema::default()).into(), json!([true])),
            (ObjectSchema::new().allow_additional().into(), json!({"a": 1})),
            (AnyOf(vec![BooleanSchema::default().into()]).into(), json!(false)),
            (DurationSchema::default().into(), json!("1h")),
        ];
        for (schema, value) in cases {
            let mut target = Value::Null;
            schema.map(&value, &mut target).unwrap();
            assert_eq!(target, value, "{}", schema.kind());
        }
    }

    #[test]
    fn test_mismatch_leaves_optional_target_empty() {
        let s: Schema = IntegerSchema::new(-240, 240).into();
        let mut target: Option<i8> = None;
        assert!(s.map(&json!(4), &mut target).unwrap_err().is_type_mismatch());
        assert_eq!(target, None);
        let mut wide: Option<i16> = None;
        s.map(&json!(4), &mut wide).unwrap();
        assert_eq!(wide, Some(4));
    }

    #[test]
    fn test_combinator_into_concrete_target_is_mismatch() {
        let s: Schema = AnyOf(vec![IntegerSchema::default().into()]).into();
        let mut target = 0i64;
        assert!(s.map(&json!(1), &mut target).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_nested_map_error_paths() {
        let s: Schema = ArraySchema::new(MapSchema::new(IntegerSchema::new(0, 9))).into();
        let e = s.validate(&json!([{"a": 1}, {"bad key": 10}])).unwrap_err();
        assert_eq!(e.issues("data")[0].path(), "data[1][\"bad key\"]");
    }
}
