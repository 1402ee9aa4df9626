//! # Decoded Value Helpers
//!
//! Schemas operate on `serde_json::Value`, the decoded-value tree
//! (null/bool/number/string/sequence/mapping). This module holds the
//! comparisons and conversions the schema variants share.

use serde_json::Value;

/// Structural equality with numeric normalisation.
///
/// Unlike `Value`'s `PartialEq`, numbers compare by magnitude, so `1` and
/// `1.0` are equal. Integral numbers compare exactly, never through `f64`.
/// Used for `uniqueItems`.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (exact_integer(x), exact_integer(y)) {
            (Some(x), Some(y)) => x == y,
            (None, None) => x.as_f64() == y.as_f64(),
            _ => false,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| json_equal(v, w)))
        }
        _ => a == b,
    }
}

/// The exact integer a number holds, or `None` for fractional floats and
/// floats outside the `i128` range.
fn exact_integer(n: &serde_json::Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    let f = n.as_f64()?;
    // 2^127 is exact in f64.
    (f.fract() == 0.0 && f.abs() < 2f64.powi(127)).then(|| f as i128)
}

/// The integral value of a JSON number, if it has no fractional part.
///
/// Floats beyond the `i128` range saturate, which keeps them outside every
/// representable schema bound.
pub(crate) fn integral_value(value: &Value) -> Option<i128> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 {
        Some(f as i128)
    } else {
        None
    }
}

/// Name of a value's JSON type, for messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Descriptors written in YAML use only the JSON-compatible subset. Tags are
/// ignored; non-string scalar keys are stringified.
pub(crate) fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_by_magnitude() {
        assert!(json_equal(&json!(1), &json!(1.0)));
        assert!(!json_equal(&json!(1), &json!(1.5)));
        assert!(json_equal(&json!(u64::MAX), &json!(u64::MAX)));
    }

    #[test]
    fn test_large_integers_do_not_round_through_floats() {
        assert!(!json_equal(&json!(9007199254740993u64), &json!(9007199254740992.0)));
        assert!(json_equal(&json!(9007199254740992u64), &json!(9007199254740992.0)));
        assert!(!json_equal(&json!(i64::MAX), &json!(9223372036854775807.0)));
        assert!(json_equal(&json!(1e300), &json!(1e300)));
    }

    #[test]
    fn test_nested_structures() {
        assert!(json_equal(
            &json!({"a": [1, {"b": 2.0}]}),
            &json!({"a": [1.0, {"b": 2}]})
        ));
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!json_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!json_equal(&json!("1"), &json!(1)));
    }

    #[test]
    fn test_integral_value() {
        assert_eq!(integral_value(&json!(32)), Some(32));
        assert_eq!(integral_value(&json!(-32)), Some(-32));
        assert_eq!(integral_value(&json!(4.0)), Some(4));
        assert_eq!(integral_value(&json!(0.4)), None);
        assert_eq!(integral_value(&json!(u64::MAX)), Some(i128::from(u64::MAX)));
        assert_eq!(integral_value(&json!("4")), None);
    }

    #[test]
    fn test_yaml_to_json_conversion() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "type: object\nrequired: [int]\nproperties:\n  int:\n    type: integer\n    minimum: -240\n",
        )
        .unwrap();
        let json = yaml_to_json_value(&yaml).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["required"][0], "int");
        assert_eq!(json["properties"]["int"]["minimum"], -240);
    }
}
