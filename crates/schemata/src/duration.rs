//! # Duration Leaf
//!
//! A duration is either a bare integer (whole seconds) or a string in a small
//! informal grammar: zero or more `<digits><unit>` groups, separated by
//! optional whitespace and summed together.
//!
//! | Unit                            | Meaning         |
//! |---------------------------------|-----------------|
//! | `d`, `day`, `days`              | 24 hours        |
//! | `h`, `hr`, `hour`, `hours`      | 60 minutes      |
//! | `m`, `min`, `minute`, `minutes` | 60 seconds      |
//!
//! Units are case-insensitive. A single leading `+` or `-` applies to the
//! whole sum. The empty string, and a sign with no groups after it, both
//! denote a zero duration.

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;
use serde_json::{json, Value};
use thiserror::Error;

use crate::error::MapError;
use crate::issue::ValidationError;
use crate::metadata::MetaData;
use crate::target::Slot;
use crate::value::integral_value;

/// Documentary pattern emitted in the descriptor.
pub const DURATION_PATTERN: &str =
    r"^\s*[+-]?\s*([0-9]+\s*(days|day|d|hours|hour|hr|h|minutes|minute|min|m)\s*)*$";

static DURATION_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*([+-])?\s*(?:[0-9]+\s*(?:days|day|d|hours|hour|hr|h|minutes|minute|min|m)\s*)*$",
    )
    .expect("duration shape pattern compiles")
});

static DURATION_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*(days|day|d|hours|hour|hr|h|minutes|minute|min|m)")
        .expect("duration group pattern compiles")
});

/// Largest magnitude in seconds `chrono::Duration` represents without
/// panicking.
const MAX_SECONDS: i64 = i64::MAX / 1000;

/// Failure to resolve a duration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// The text does not follow the duration grammar.
    #[error("unrecognised duration syntax")]
    Syntax,

    /// The resolved magnitude does not fit a duration.
    #[error("duration is out of range")]
    Overflow,
}

fn unit_seconds(unit: &str) -> i64 {
    match unit.to_ascii_lowercase().as_str() {
        "d" | "day" | "days" => 24 * 60 * 60,
        "h" | "hr" | "hour" | "hours" => 60 * 60,
        _ => 60,
    }
}

/// Resolve a duration string.
///
/// # Errors
///
/// Returns `DurationError::Syntax` for text outside the grammar and
/// `DurationError::Overflow` when the sum does not fit a duration.
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    let shape = DURATION_SHAPE.captures(text).ok_or(DurationError::Syntax)?;
    let negative = shape.get(1).is_some_and(|sign| sign.as_str() == "-");

    let mut seconds: i64 = 0;
    for group in DURATION_GROUP.captures_iter(text) {
        let amount: i64 = group[1].parse().map_err(|_| DurationError::Overflow)?;
        seconds = amount
            .checked_mul(unit_seconds(&group[2]))
            .and_then(|s| seconds.checked_add(s))
            .ok_or(DurationError::Overflow)?;
    }
    if seconds > MAX_SECONDS {
        return Err(DurationError::Overflow);
    }
    if negative {
        seconds = -seconds;
    }
    Ok(Duration::seconds(seconds))
}

/// Resolve a decoded value: a whole number of seconds or a duration string.
fn resolve(value: &Value) -> Result<Duration, ValidationError> {
    match value {
        Value::String(s) => parse_duration(s).map_err(|e| {
            ValidationError::single(format!(
                "String '{s}' at {{path}} is not a valid duration: {e}"
            ))
        }),
        Value::Number(_) => {
            let Some(n) = integral_value(value) else {
                return Err(ValidationError::single(
                    "Expected a whole number of seconds at {path}",
                ));
            };
            if n.unsigned_abs() > u128::from(MAX_SECONDS.unsigned_abs()) {
                return Err(ValidationError::single(format!(
                    "Duration {n} at {{path}} is out of range"
                )));
            }
            // Bounded by MAX_SECONDS above.
            Ok(Duration::seconds(n as i64))
        }
        _ => Err(ValidationError::single(
            "Expected a duration string or number at {path}",
        )),
    }
}

/// A duration given as whole seconds or in the informal duration grammar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationSchema {
    /// Title and description.
    pub meta: MetaData,
}

impl DurationSchema {
    /// Attach a title and description.
    pub fn with_meta(mut self, meta: MetaData) -> Self {
        self.meta = meta;
        self
    }

    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        let mut m = self.meta.descriptor();
        m.insert("type".into(), json!(["integer", "string"]));
        m.insert("pattern".into(), json!(DURATION_PATTERN));
        Value::Object(m)
    }

    /// Check that `value` resolves to a duration.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        resolve(value).map(|_| ())
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Duration(_) => Ok(()),
            other => Err(MapError::mismatch("duration", other.type_name())),
        }
    }

    pub(crate) fn bind(&self, value: &Value, slot: Slot<'_>) -> Result<(), MapError> {
        match slot {
            Slot::Duration(target) => {
                *target = resolve(value)?;
                Ok(())
            }
            other => Err(MapError::mismatch("duration", other.type_name())),
        }
    }
}
