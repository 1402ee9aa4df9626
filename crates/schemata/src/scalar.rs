//! # Leaf Value Schemas
//!
//! Terminal constraints with no sub-schemas: integer, number, boolean,
//! string, string enum, URI and date-time.
//!
//! Every variant offers the same internal surface used by [`Schema`]'s
//! dispatch: `descriptor`, `validate`, `check` (static target
//! compatibility) and `bind` (write an already validated value).
//!
//! [`Schema`]: crate::Schema

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{json, Value};
use url::Url;

use crate::error::{MapError, SchemaError};
use crate::issue::ValidationError;
use crate::metadata::MetaData;
use crate::target::{FloatSlot, IntSlot, Slot};
use crate::value::integral_value;

// ---------------------------------------------------------------------------
// Integer
// ---------------------------------------------------------------------------

/// An integer within an inclusive `[minimum, maximum]` range.
///
/// Defaults to the full `i64` range; default bounds are omitted from the
/// descriptor. `minimum <= maximum` is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerSchema {
    /// Title and description.
    pub meta: MetaData,
    /// Smallest accepted value.
    pub minimum: i64,
    /// Largest accepted value.
    pub maximum: i64,
}

impl Default for IntegerSchema {
    fn default() -> Self {
        Self {
            meta: MetaData::default(),
            minimum: i64::MIN,
            maximum: i64::MAX,
        }
    }
}

impl IntegerSchema {
    /// An integer schema accepting `[minimum, maximum]`.
    pub fn new(minimum: i64, maximum: i64) -> Self {
        Self {
            minimum,
            maximum,
            ..Self::default()
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
        m.insert("type".into(), json!("integer"));
        if self.minimum != i64::MIN {
            m.insert("minimum".into(), json!(self.minimum));
        }
        if self.maximum != i64::MAX {
            m.insert("maximum".into(), json!(self.maximum));
        }
        Value::Object(m)
    }

    /// Check that `value` is an integral number within bounds.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(n) = integral_value(value) else {
            return Err(ValidationError::single("Expected an integer at {path}"));
        };
        if n < i128::from(self.minimum) {
            return Err(ValidationError::single(format!(
                "Integer {n} at {{path}} is less than minimum {}",
                self.minimum
            )));
        }
        if n > i128::from(self.maximum) {
            return Err(ValidationError::single(format!(
                "Integer {n} at {{path}} is larger than maximum {}",
                self.maximum
            )));
        }
        Ok(())
    }

    /// Whether every value the declared range admits fits into `slot`.
    ///
    /// Decided on the declared bounds only, never on a concrete value.
    pub fn fits(&self, slot: &IntSlot<'_>) -> bool {
        let (lo, hi) = slot.bounds();
        i128::from(self.minimum) >= lo && i128::from(self.maximum) <= hi
    }

    pub(crate) fn label(&self) -> String {
        format!("integer[{}, {}]", self.minimum, self.maximum)
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Int(int) if self.fits(&int) => Ok(()),
            other => Err(MapError::mismatch(self.label(), other.type_name())),
        }
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Int(int) if self.fits(&int) => {
                let type_name = int.type_name();
                let n = integral_value(value)
                    .ok_or_else(|| ValidationError::single("Expected an integer at {path}"))?;
                if int.store(n) {
                    Ok(())
                } else {
                    Err(MapError::mismatch(self.label(), type_name))
                }
            }
            other => Err(MapError::mismatch(self.label(), other.type_name())),
        }
    }
}

// ---------------------------------------------------------------------------
// Number
// ---------------------------------------------------------------------------

/// A floating-point number within an inclusive range.
///
/// Defaults to `[f64::MIN, f64::MAX]`; default bounds are omitted from the
/// descriptor. Like integers, a float target must hold the whole declared
/// range, so only schemas bounded within `f32` map into `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSchema {
    /// Title and description.
    pub meta: MetaData,
    /// Smallest accepted value.
    pub minimum: f64,
    /// Largest accepted value.
    pub maximum: f64,
}

impl Default for NumberSchema {
    fn default() -> Self {
        Self {
            meta: MetaData::default(),
            minimum: f64::MIN,
            maximum: f64::MAX,
        }
    }
}

impl NumberSchema {
    /// A number schema accepting `[minimum, maximum]`.
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum,
            maximum,
            ..Self::default()
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
        m.insert("type".into(), json!("number"));
        if self.minimum != f64::MIN {
            m.insert("minimum".into(), json!(self.minimum));
        }
        if self.maximum != f64::MAX {
            m.insert("maximum".into(), json!(self.maximum));
        }
        Value::Object(m)
    }

    /// Check that `value` is a number within bounds.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(n) = value.as_f64() else {
            return Err(ValidationError::single("Expected a number at {path}"));
        };
        if n < self.minimum {
            return Err(ValidationError::single(format!(
                "Number {n} at {{path}} is less than minimum {}",
                self.minimum
            )));
        }
        if n > self.maximum {
            return Err(ValidationError::single(format!(
                "Number {n} at {{path}} is larger than maximum {}",
                self.maximum
            )));
        }
        Ok(())
    }

    /// Whether the declared range lies within the finite range of `slot`.
    pub fn fits(&self, slot: &FloatSlot<'_>) -> bool {
        let (lo, hi) = slot.bounds();
        self.minimum >= lo && self.maximum <= hi
    }

    pub(crate) fn label(&self) -> String {
        format!("number[{}, {}]", self.minimum, self.maximum)
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Float(float) if self.fits(&float) => Ok(()),
            other => Err(MapError::mismatch(self.label(), other.type_name())),
        }
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Float(float) if self.fits(&float) => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| ValidationError::single("Expected a number at {path}"))?;
                float.store(n);
                Ok(())
            }
            other => Err(MapError::mismatch(self.label(), other.type_name())),
        }
    }
}

// ---------------------------------------------------------------------------
// Boolean
// ---------------------------------------------------------------------------

/// A boolean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanSchema {
    /// Title and description.
    pub meta: MetaData,
}

impl BooleanSchema {
    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        let mut m = self.meta.descriptor();
        m.insert("type".into(), json!("boolean"));
        Value::Object(m)
    }

    /// Check that `value` is a boolean.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_boolean() {
            Ok(())
        } else {
            Err(ValidationError::single("Expected a boolean at {path}"))
        }
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Bool(_) => Ok(()),
            other => Err(MapError::mismatch("boolean", other.type_name())),
        }
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Bool(b) => {
                *b = value
                    .as_bool()
                    .ok_or_else(|| ValidationError::single("Expected a boolean at {path}"))?;
                Ok(())
            }
            other => Err(MapError::mismatch("boolean", other.type_name())),
        }
    }
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

/// A compiled regular expression together with its source text.
///
/// Matching is a search, not a full match, following JSON-Schema `pattern`
/// semantics; anchor with `^...$` to constrain the whole string.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidPattern` if the expression does not compile.
    pub fn new(pattern: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// The pattern source text.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A string with optional length bounds and pattern.
///
/// Lengths count Unicode scalar values; `0` means unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    /// Title and description.
    pub meta: MetaData,
    /// Minimum length, `0` for none.
    pub min_length: usize,
    /// Maximum length, `0` for none.
    pub max_length: usize,
    /// Pattern the string must contain a match for.
    pub pattern: Option<Pattern>,
}

impl StringSchema {
    /// Attach a title and description.
    pub fn with_meta(mut self, meta: MetaData) -> Self {
        self.meta = meta;
        self
    }

    /// Set length bounds; `0` leaves a bound unset.
    pub fn with_length(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    /// Require a match for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidPattern` if the expression does not compile.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        self.pattern = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        let mut m = self.meta.descriptor();
        m.insert("type".into(), json!("string"));
        if self.min_length != 0 {
            m.insert("minLength".into(), json!(self.min_length));
        }
        if self.max_length != 0 {
            m.insert("maxLength".into(), json!(self.max_length));
        }
        if let Some(pattern) = &self.pattern {
            m.insert("pattern".into(), json!(pattern.as_str()));
        }
        Value::Object(m)
    }

    /// Check type, length bounds and pattern. All failing constraints are
    /// reported.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(s) = value.as_str() else {
            return Err(ValidationError::single("Expected a string at {path}"));
        };

        let mut e = ValidationError::new();
        let length = s.chars().count();
        if self.min_length != 0 && length < self.min_length {
            e.add_issue(
                "",
                format!(
                    "String '{s}' at {{path}} is shorter than minimum {} length allowed",
                    self.min_length
                ),
            );
        }
        if self.max_length != 0 && length > self.max_length {
            e.add_issue(
                "",
                format!(
                    "String '{s}' at {{path}} is longer than maximum {} length allowed",
                    self.max_length
                ),
            );
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(s) {
                e.add_issue(
                    "",
                    format!(
                        "String '{s}' at {{path}} doesn't match regular expression '{}'",
                        pattern.as_str()
                    ),
                );
            }
        }
        e.into_result()
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        check_string_slot("string", slot)
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        bind_string_slot("string", value, slot)
    }
}

fn check_string_slot(label: &str, slot: Slot<'_>) -> Result<(), MapError> {
    match slot {
        Slot::String(_) => Ok(()),
        other => Err(MapError::mismatch(label, other.type_name())),
    }
}

fn bind_string_slot(label: &str, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
    match slot {
        Slot::String(target) => {
            let s = value
                .as_str()
                .ok_or_else(|| ValidationError::single("Expected a string at {path}"))?;
            s.clone_into(target);
            Ok(())
        }
        other => Err(MapError::mismatch(label, other.type_name())),
    }
}

// ---------------------------------------------------------------------------
// StringEnum
// ---------------------------------------------------------------------------

/// A string restricted to a fixed, non-empty list of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringEnumSchema {
    /// Title and description.
    pub meta: MetaData,
    values: Vec<String>,
}

impl StringEnumSchema {
    /// An enum accepting exactly `values`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::EmptyEnum` if `values` is empty.
    pub fn new<I, S>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SchemaError::EmptyEnum);
        }
        Ok(Self {
            meta: MetaData::default(),
            values,
        })
    }

    /// Attach a title and description.
    pub fn with_meta(mut self, meta: MetaData) -> Self {
        self.meta = meta;
        self
    }

    /// The allowed values, in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        let mut m = self.meta.descriptor();
        m.insert("type".into(), json!("string"));
        m.insert("enum".into(), json!(self.values));
        Value::Object(m)
    }

    /// Check that `value` is one of the allowed strings.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(s) = value.as_str() else {
            return Err(ValidationError::single("Expected a string at {path}"));
        };
        if self.values.iter().any(|v| v == s) {
            return Ok(());
        }
        Err(ValidationError::single(format!(
            "Value '{s}' at {{path}} is not valid for the enum with options: {:?}",
            self.values
        )))
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        check_string_slot("string enum", slot)
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        bind_string_slot("string enum", value, slot)
    }
}

// ---------------------------------------------------------------------------
// URI
// ---------------------------------------------------------------------------

/// A string holding an absolute URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriSchema {
    /// Title and description.
    pub meta: MetaData,
}

impl UriSchema {
    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        let mut m = self.meta.descriptor();
        m.insert("type".into(), json!("string"));
        m.insert("format".into(), json!("uri"));
        Value::Object(m)
    }

    /// Check that `value` is a string parsing as a URI.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(s) = value.as_str() else {
            return Err(ValidationError::single("Expected a string at {path}"));
        };
        match Url::parse(s) {
            Ok(_) => Ok(()),
            Err(e) => Err(ValidationError::single(format!(
                "String '{s}' at {{path}} is not a valid URI: {e}"
            ))),
        }
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Uri(_) | Slot::String(_) => Ok(()),
            other => Err(MapError::mismatch("uri", other.type_name())),
        }
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Uri(target) => {
                let url = value
                    .as_str()
                    .and_then(|s| Url::parse(s).ok())
                    .ok_or_else(|| ValidationError::single("Expected a URI at {path}"))?;
                target.store(url);
                Ok(())
            }
            other => bind_string_slot("uri", value, other),
        }
    }
}

// ---------------------------------------------------------------------------
// DateTime
// ---------------------------------------------------------------------------

/// A string holding an RFC 3339 timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeSchema {
    /// Title and description.
    pub meta: MetaData,
}

impl DateTimeSchema {
    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        let mut m = self.meta.descriptor();
        m.insert("type".into(), json!("string"));
        m.insert("format".into(), json!("date-time"));
        Value::Object(m)
    }

    /// Check that `value` is a string parsing as an RFC 3339 timestamp.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(s) = value.as_str() else {
            return Err(ValidationError::single("Expected a string at {path}"));
        };
        match DateTime::parse_from_rfc3339(s) {
            Ok(_) => Ok(()),
            Err(e) => Err(ValidationError::single(format!(
                "String '{s}' at {{path}} is not a valid RFC 3339 date-time: {e}"
            ))),
        }
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::DateTime(_) | Slot::DateTimeUtc(_) | Slot::String(_) => Ok(()),
            other => Err(MapError::mismatch("date-time", other.type_name())),
        }
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        let parsed = || {
            value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .ok_or_else(|| ValidationError::single("Expected a date-time at {path}"))
        };
        match slot {
            Slot::DateTime(target) => {
                *target = parsed()?;
                Ok(())
            }
            Slot::DateTimeUtc(target) => {
                *target = parsed()?.with_timezone(&Utc);
                Ok(())
            }
            other => bind_string_slot("date-time", value, other),
        }
    }
}
