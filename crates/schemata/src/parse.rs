//! # Descriptor Parsing
//!
//! Rebuilds a [`Schema`] from the descriptor vocabulary that
//! [`Schema::descriptor`] emits, so descriptors can be stored as JSON or
//! YAML documents and loaded back.
//!
//! ## Selection Rules
//!
//! - `anyOf` / `oneOf` / `allOf` keys select a combinator.
//! - `type: ["integer", "string"]` selects a duration.
//! - `type: "string"` selects a URI or date-time by `format`, a string enum
//!   when `enum` is present, and a plain string otherwise.
//! - `type: "object"` selects a map when `additionalProperties` is itself a
//!   schema, and an object otherwise. An absent `additionalProperties`
//!   means additional keys are allowed.
//!
//! Errors carry the location of the offending node, e.g.
//! `#/properties/items/minimum`.

use std::path::Path;

use serde_json::{Map, Value};

use crate::combinator::{AllOf, AnyOf, OneOf};
use crate::container::{ArraySchema, MapSchema};
use crate::duration::DurationSchema;
use crate::error::SchemaError;
use crate::metadata::MetaData;
use crate::object::ObjectSchema;
use crate::scalar::{
    BooleanSchema, DateTimeSchema, IntegerSchema, NumberSchema, Pattern, StringEnumSchema,
    StringSchema, UriSchema,
};
use crate::schema::Schema;
use crate::value::{integral_value, kind_name, yaml_to_json_value};

/// Parse a JSON descriptor document.
///
/// # Errors
///
/// Returns `SchemaError::Json` if `text` is not JSON, or
/// `SchemaError::InvalidDescriptor` if the document does not describe a
/// schema.
pub fn parse_schema(text: &str) -> Result<Schema, SchemaError> {
    let document: Value = serde_json::from_str(text)?;
    Schema::from_descriptor(&document)
}

impl Schema {
    /// Build a schema from a decoded descriptor document.
    pub fn from_descriptor(descriptor: &Value) -> Result<Schema, SchemaError> {
        let schema = parse_node(descriptor, "#")?;
        tracing::debug!(kind = schema.kind(), "parsed schema descriptor");
        Ok(schema)
    }

    /// Build a schema from a YAML descriptor document.
    pub fn from_yaml_str(text: &str) -> Result<Schema, SchemaError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
        let document =
            yaml_to_json_value(&yaml).map_err(|reason| SchemaError::descriptor("#", reason))?;
        Schema::from_descriptor(&document)
    }

    /// Load a descriptor file. `.yaml` and `.yml` files are read as YAML,
    /// everything else as JSON.
    pub fn from_file(path: &Path) -> Result<Schema, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );
        if is_yaml {
            Schema::from_yaml_str(&text)
        } else {
            parse_schema(&text)
        }
    }
}

fn parse_node(node: &Value, path: &str) -> Result<Schema, SchemaError> {
    let Some(doc) = node.as_object() else {
        return Err(SchemaError::descriptor(
            path,
            format!("expected a schema object, found {}", kind_name(node)),
        ));
    };

    if let Some(branches) = doc.get("anyOf") {
        return Ok(AnyOf(parse_branches(branches, &format!("{path}/anyOf"))?).into());
    }
    if let Some(branches) = doc.get("oneOf") {
        return Ok(OneOf(parse_branches(branches, &format!("{path}/oneOf"))?).into());
    }
    if let Some(branches) = doc.get("allOf") {
        return Ok(AllOf(parse_branches(branches, &format!("{path}/allOf"))?).into());
    }

    let meta = parse_meta(doc, path)?;
    match doc.get("type") {
        Some(Value::String(kind)) => match kind.as_str() {
            "integer" => Ok(IntegerSchema {
                meta,
                minimum: int_bound(doc, "minimum", path)?.unwrap_or(i64::MIN),
                maximum: int_bound(doc, "maximum", path)?.unwrap_or(i64::MAX),
            }
            .into()),
            "number" => Ok(NumberSchema {
                meta,
                minimum: float_bound(doc, "minimum", path)?.unwrap_or(f64::MIN),
                maximum: float_bound(doc, "maximum", path)?.unwrap_or(f64::MAX),
            }
            .into()),
            "boolean" => Ok(BooleanSchema { meta }.into()),
            "string" => parse_string(doc, meta, path),
            "array" => parse_array(doc, meta, path),
            "object" => parse_object(doc, meta, path),
            other => Err(SchemaError::descriptor(
                &format!("{path}/type"),
                format!("unknown type {other:?}"),
            )),
        },
        Some(Value::Array(kinds))
            if kinds.len() == 2
                && kinds.contains(&Value::from("integer"))
                && kinds.contains(&Value::from("string")) =>
        {
            Ok(DurationSchema { meta }.into())
        }
        Some(other) => Err(SchemaError::descriptor(
            &format!("{path}/type"),
            format!("unsupported type declaration {other}"),
        )),
        None => Err(SchemaError::descriptor(path, "missing \"type\"")),
    }
}

fn parse_branches(node: &Value, path: &str) -> Result<Vec<Schema>, SchemaError> {
    let Some(items) = node.as_array() else {
        return Err(SchemaError::descriptor(path, "expected an array of schemas"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_node(item, &format!("{path}/{i}")))
        .collect()
}

fn parse_meta(doc: &Map<String, Value>, path: &str) -> Result<MetaData, SchemaError> {
    Ok(MetaData {
        title: string_field(doc, "title", path)?.unwrap_or_default(),
        description: string_field(doc, "description", path)?.unwrap_or_default(),
    })
}

fn string_field(
    doc: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, SchemaError> {
    match doc.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(SchemaError::descriptor(
            &format!("{path}/{key}"),
            format!("expected a string, found {}", kind_name(other)),
        )),
    }
}

fn int_bound(doc: &Map<String, Value>, key: &str, path: &str) -> Result<Option<i64>, SchemaError> {
    let Some(node) = doc.get(key) else {
        return Ok(None);
    };
    integral_value(node)
        .and_then(|n| i64::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            SchemaError::descriptor(&format!("{path}/{key}"), "expected a 64-bit integer")
        })
}

fn float_bound(
    doc: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<f64>, SchemaError> {
    let Some(node) = doc.get(key) else {
        return Ok(None);
    };
    node.as_f64()
        .map(Some)
        .ok_or_else(|| SchemaError::descriptor(&format!("{path}/{key}"), "expected a number"))
}

fn length_bound(doc: &Map<String, Value>, key: &str, path: &str) -> Result<usize, SchemaError> {
    let Some(node) = doc.get(key) else {
        return Ok(0);
    };
    node.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            SchemaError::descriptor(&format!("{path}/{key}"), "expected a non-negative integer")
        })
}

fn parse_string(
    doc: &Map<String, Value>,
    meta: MetaData,
    path: &str,
) -> Result<Schema, SchemaError> {
    match string_field(doc, "format", path)?.as_deref() {
        Some("uri") => return Ok(UriSchema { meta }.into()),
        Some("date-time") => return Ok(DateTimeSchema { meta }.into()),
        Some(other) => {
            return Err(SchemaError::descriptor(
                &format!("{path}/format"),
                format!("unsupported format {other:?}"),
            ))
        }
        None => {}
    }

    if let Some(values) = doc.get("enum") {
        let enum_path = format!("{path}/enum");
        let Some(values) = values.as_array() else {
            return Err(SchemaError::descriptor(&enum_path, "expected an array of strings"));
        };
        let values = values
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        SchemaError::descriptor(&enum_path, "expected an array of strings")
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(StringEnumSchema::new(values)?.with_meta(meta).into());
    }

    let pattern = string_field(doc, "pattern", path)?
        .map(|p| Pattern::new(&p))
        .transpose()?;
    Ok(StringSchema {
        meta,
        min_length: length_bound(doc, "minLength", path)?,
        max_length: length_bound(doc, "maxLength", path)?,
        pattern,
    }
    .into())
}

fn parse_array(
    doc: &Map<String, Value>,
    meta: MetaData,
    path: &str,
) -> Result<Schema, SchemaError> {
    let Some(items) = doc.get("items") else {
        return Err(SchemaError::descriptor(path, "array schema without \"items\""));
    };
    let unique = match doc.get("uniqueItems") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            return Err(SchemaError::descriptor(
                &format!("{path}/uniqueItems"),
                "expected a boolean",
            ))
        }
    };
    Ok(ArraySchema {
        meta,
        items: Box::new(parse_node(items, &format!("{path}/items"))?),
        unique,
    }
    .into())
}

fn parse_object(
    doc: &Map<String, Value>,
    meta: MetaData,
    path: &str,
) -> Result<Schema, SchemaError> {
    let additional_properties = match doc.get("additionalProperties") {
        None => true,
        Some(Value::Bool(b)) => *b,
        Some(values) => {
            let values = parse_node(values, &format!("{path}/additionalProperties"))?;
            return Ok(MapSchema {
                meta,
                values: Box::new(values),
            }
            .into());
        }
    };

    let mut object = ObjectSchema {
        meta,
        additional_properties,
        ..ObjectSchema::default()
    };
    if let Some(properties) = doc.get("properties") {
        let Some(properties) = properties.as_object() else {
            return Err(SchemaError::descriptor(
                &format!("{path}/properties"),
                "expected an object of schemas",
            ));
        };
        for (name, node) in properties {
            let schema = parse_node(node, &format!("{path}/properties/{}", pointer_token(name)))?;
            object.properties.insert(name.clone(), schema);
        }
    }
    if let Some(required) = doc.get("required") {
        let required_path = format!("{path}/required");
        let Some(required) = required.as_array() else {
            return Err(SchemaError::descriptor(&required_path, "expected an array of names"));
        };
        for name in required {
            let Some(name) = name.as_str() else {
                return Err(SchemaError::descriptor(&required_path, "expected an array of names"));
            };
            object.required.push(name.to_string());
        }
    }
    Ok(object.into())
}

/// Escape `name` as a JSON Pointer reference token.
fn pointer_token(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selects_variants() {
        let cases = [
            (json!({"type": "integer"}), "integer"),
            (json!({"type": "number", "minimum": 1}), "number"),
            (json!({"type": "boolean"}), "boolean"),
            (json!({"type": "string"}), "string"),
            (json!({"type": "string", "enum": ["a"]}), "string enum"),
            (json!({"type": "string", "format": "uri"}), "uri"),
            (json!({"type": "string", "format": "date-time"}), "date-time"),
            (json!({"type": ["integer", "string"]}), "duration"),
            (json!({"type": "array", "items": {"type": "boolean"}}), "array"),
            (json!({"type": "object", "additionalProperties": {"type": "string"}}), "map"),
            (json!({"type": "object"}), "object"),
            (json!({"anyOf": []}), "anyOf"),
            (json!({"oneOf": [{"type": "string"}]}), "oneOf"),
            (json!({"allOf": [{"type": "string"}]}), "allOf"),
        ];
        for (descriptor, kind) in cases {
            assert_eq!(Schema::from_descriptor(&descriptor).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_absent_additional_properties_allows_extra_keys() {
        let s = Schema::from_descriptor(&json!({"type": "object"})).unwrap();
        assert!(s.validate(&json!({"anything": 1})).is_ok());
    }

    #[test]
    fn test_metadata_is_kept() {
        let s =
            parse_schema(r#"{"type": "boolean", "title": "flag", "description": "d"}"#).unwrap();
        assert_eq!(s.descriptor(), json!({"type": "boolean", "title": "flag", "description": "d"}));
    }

    #[test]
    fn test_error_paths() {
        let err = Schema::from_descriptor(&json!({
            "type": "object",
            "properties": {"obj": {"type": "integer", "minimum": "low"}},
        }))
        .unwrap_err();
        match err {
            SchemaError::InvalidDescriptor { path, .. } => {
                assert_eq!(path, "#/properties/obj/minimum")
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = Schema::from_descriptor(&json!({"anyOf": [{"type": "thing"}]})).unwrap_err();
        assert!(err.to_string().contains("#/anyOf/0/type"));
    }

    #[test]
    fn test_error_paths_escape_property_names() {
        let err = Schema::from_descriptor(&json!({
            "type": "object",
            "properties": {"a/b~c": {"type": "thing"}},
        }))
        .unwrap_err();
        match err {
            SchemaError::InvalidDescriptor { path, .. } => {
                assert_eq!(path, "#/properties/a~1b~0c/type")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(matches!(parse_schema("{"), Err(SchemaError::Json(_))));
        assert!(Schema::from_descriptor(&json!(3)).is_err());
        assert!(Schema::from_descriptor(&json!({})).is_err());
        assert!(Schema::from_descriptor(&json!({"type": "array"})).is_err());
        assert!(matches!(
            Schema::from_descriptor(&json!({"type": "string", "enum": []})),
            Err(SchemaError::EmptyEnum)
        ));
        assert!(matches!(
            Schema::from_descriptor(&json!({"type": "string", "pattern": "("})),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_yaml_document() {
        let s = Schema::from_yaml_str(
            "type: object\nrequired: [int]\nadditionalProperties: false\nproperties:\n  int:\n    type: integer\n    minimum: -240\n    maximum: 240\n",
        )
        .unwrap();
        assert!(s.validate(&json!({"int": 4})).is_ok());
        assert!(s.validate(&json!({"int": 400})).is_err());
        assert!(s.validate(&json!({})).is_err());
    }
}
