//! # Logical Combinators
//!
//! `anyOf`, `oneOf` and `allOf` over an ordered list of sibling schemas.
//!
//! Which branch a value "belongs to" is ambiguous, so combinators never bind
//! into a concrete target. They bind only into a dynamic
//! [`Value`](serde_json::Value) slot, which receives the raw decoded value;
//! every other slot is a type mismatch.

use serde_json::Value;

use crate::error::MapError;
use crate::issue::ValidationError;
use crate::schema::Schema;
use crate::target::Slot;

fn branches_descriptor(keyword: &str, branches: &[Schema]) -> Value {
    let mut m = serde_json::Map::new();
    m.insert(
        keyword.to_string(),
        Value::Array(branches.iter().map(Schema::descriptor).collect()),
    );
    Value::Object(m)
}

fn dynamic_only(keyword: &str, slot: Slot<'_>) -> Result<(), MapError> {
    match slot {
        Slot::Dynamic(_) => Ok(()),
        other => Err(MapError::mismatch(keyword, other.type_name())),
    }
}

/// Valid when at least one branch is valid.
///
/// On failure the issues of every branch are reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnyOf(pub Vec<Schema>);

impl AnyOf {
    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        branches_descriptor("anyOf", &self.0)
    }

    /// Check `value` against the branches, stopping at the first match.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let mut e = ValidationError::new();
        for branch in &self.0 {
            match branch.validate(value) {
                Ok(()) => return Ok(()),
                Err(err) => e.add_issues(err),
            }
        }
        if e.is_empty() {
            e.add_issue("", "No schema in anyOf to match the value at {path}");
        }
        Err(e)
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        dynamic_only("anyOf", slot)
    }
}

/// Valid when exactly one branch is valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneOf(pub Vec<Schema>);

impl OneOf {
    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        branches_descriptor("oneOf", &self.0)
    }

    /// Count matching branches; anything but one is reported as a single
    /// issue.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let matches = self
            .0
            .iter()
            .filter(|branch| branch.validate(value).is_ok())
            .count();
        if matches == 1 {
            return Ok(());
        }
        Err(ValidationError::single(format!(
            "Expected exactly one schema in oneOf to match the value at {{path}}, but {matches} matched"
        )))
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        dynamic_only("oneOf", slot)
    }
}

/// Valid when every branch is valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllOf(pub Vec<Schema>);

impl AllOf {
    /// JSON-Schema descriptor for this schema.
    pub fn descriptor(&self) -> Value {
        branches_descriptor("allOf", &self.0)
    }

    /// Check every branch and report all their issues.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let mut e = ValidationError::new();
        for branch in &self.0 {
            if let Err(err) = branch.validate(value) {
                e.add_issues(err);
            }
        }
        e.into_result()
    }

    pub(crate) fn check(&self, slot: Slot<'_>) -> Result<(), MapError> {
        dynamic_only("allOf", slot)
    }
}
